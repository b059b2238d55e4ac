use crate::domain::analysis::AnalysisRow;
use crate::domain::normalize::{batch_sources, normalize_batch};
use crate::ingest::types::RawRecord;
use crate::time::date_set::{parse_date_set, DateNotice, DateRejected, DateSelection};
use crate::view::filter::{compute_view, Tab, View};
use crate::view::strategy_index::build_strategy_index;
use chrono::{DateTime, NaiveDate, Utc};

/// Issued when a batch fetch starts; only the latest ticket may install its batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub date: Option<NaiveDate>,
}

/// UI selection state plus the current canonical batch, owned by the application shell.
#[derive(Debug, Clone, Default)]
pub struct ViewSession {
    dates: DateSelection,
    rows: Vec<AnalysisRow>,
    strategies: Vec<String>,
    sources: Vec<String>,
    active_tab: Tab,
    search: String,
    generation: u64,
}

impl ViewSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dates(&self) -> &DateSelection {
        &self.dates
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.dates.selected()
    }

    pub fn rows(&self) -> &[AnalysisRow] {
        &self.rows
    }

    pub fn strategies(&self) -> &[String] {
        &self.strategies
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn active_tab(&self) -> &Tab {
        &self.active_tab
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// `All` followed by the discovered strategies.
    pub fn tabs(&self) -> Vec<Tab> {
        std::iter::once(Tab::All)
            .chain(self.strategies.iter().map(|name| Tab::Strategy(name.clone())))
            .collect()
    }

    pub fn set_available_dates(&mut self, dates: &[String], today: NaiveDate) {
        self.dates.set_available_dates(parse_date_set(dates), today);
    }

    pub fn request_date(
        &mut self,
        candidate: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<(), DateRejected> {
        self.dates.request_date(candidate, now)
    }

    pub fn notice(&mut self, now: DateTime<Utc>) -> Option<&DateNotice> {
        self.dates.notice(now)
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    /// Start a fetch for the selected date. Any earlier ticket becomes stale.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        FetchTicket {
            generation: self.generation,
            date: self.dates.selected(),
        }
    }

    /// Install a fetched batch. Returns `false` and leaves state untouched for a stale ticket.
    pub fn apply_batch(&mut self, ticket: FetchTicket, raw: &[RawRecord]) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(
                stale = ticket.generation,
                latest = self.generation,
                "discarding stale analysis batch"
            );
            return false;
        }

        self.rows = normalize_batch(raw);
        self.strategies = build_strategy_index(&self.rows);
        self.sources = batch_sources(&self.rows);
        true
    }

    pub fn view(&self) -> View {
        compute_view(&self.rows, &self.active_tab, &self.search)
    }
}
