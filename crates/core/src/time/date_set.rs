use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::fmt;

pub const NO_DATA_MESSAGE: &str = "No data for selected date";

/// How long a rejection notice stays visible.
pub const NOTICE_TTL_SECS: i64 = 3;

/// Today's date on the local calendar (not UTC).
pub fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Parse the backend's date whitelist, keeping order. Malformed entries are dropped.
pub fn parse_date_set(dates: &[String]) -> Vec<NaiveDate> {
    dates
        .iter()
        .filter_map(|s| match NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d") {
            Ok(d) => Some(d),
            Err(err) => {
                tracing::warn!(date = %s, error = %err, "ignoring malformed date in whitelist");
                None
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRejected {
    pub requested: NaiveDate,
    pub kept: Option<NaiveDate>,
}

impl fmt::Display for DateRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{NO_DATA_MESSAGE} (requested {})", self.requested)
    }
}

impl std::error::Error for DateRejected {}

/// A transient message raised when a date request is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateNotice {
    pub message: &'static str,
    pub raised_at: DateTime<Utc>,
}

impl DateNotice {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now - self.raised_at < Duration::seconds(NOTICE_TTL_SECS)
    }
}

/// Available dates plus the selected date and the one selected before it.
#[derive(Debug, Clone, Default)]
pub struct DateSelection {
    available: Vec<NaiveDate>,
    selected: Option<NaiveDate>,
    previous: Option<NaiveDate>,
    notice: Option<DateNotice>,
}

impl DateSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn available(&self) -> &[NaiveDate] {
        &self.available
    }

    pub fn selected(&self) -> Option<NaiveDate> {
        self.selected
    }

    pub fn previous(&self) -> Option<NaiveDate> {
        self.previous
    }

    /// Replace the whitelist. `dates` is expected most-recent-first.
    ///
    /// With a non-empty whitelist the selection is initialized to its first entry, and also
    /// reset to it when the current selection is not a member. With an empty whitelist the
    /// selection falls back to `today`.
    pub fn set_available_dates(&mut self, dates: Vec<NaiveDate>, today: NaiveDate) {
        self.available = dates;
        match self.available.first().copied() {
            Some(latest) => {
                let keep = self.selected.is_some_and(|d| self.available.contains(&d));
                if !keep {
                    self.selected = Some(latest);
                    self.previous = Some(latest);
                }
            }
            None => {
                self.selected = Some(today);
                self.previous = Some(today);
            }
        }
    }

    /// Select `candidate`, or keep the current selection and raise a notice when the
    /// whitelist excludes it.
    pub fn request_date(
        &mut self,
        candidate: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<(), DateRejected> {
        if !self.available.is_empty() && !self.available.contains(&candidate) {
            self.notice = Some(DateNotice {
                message: NO_DATA_MESSAGE,
                raised_at: now,
            });
            tracing::debug!(requested = %candidate, "date request rejected");
            return Err(DateRejected {
                requested: candidate,
                kept: self.selected,
            });
        }

        self.previous = self.selected;
        self.selected = Some(candidate);
        Ok(())
    }

    /// The active notice, if any. Expired notices are cleared.
    pub fn notice(&mut self, now: DateTime<Utc>) -> Option<&DateNotice> {
        if self.notice.as_ref().is_some_and(|n| !n.is_active(now)) {
            self.notice = None;
        }
        self.notice.as_ref()
    }
}
