use crate::config::Settings;
use crate::ingest::types::{decode_batch, decode_dates, RawRecord};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_json::Value;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRIES: u32 = 3;
const MAX_RETRIES: u32 = 10;
const MAX_BACKOFF_SECS: u64 = 30;

#[async_trait::async_trait]
pub trait AnalysisSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    /// Raw records for `date`, or for the backend's default date when `None`.
    async fn fetch_batch(&self, date: Option<NaiveDate>) -> Result<Vec<RawRecord>>;

    /// Dates that have analysis, most recent first.
    async fn fetch_dates(&self) -> Result<Vec<String>>;
}

#[derive(Debug, Clone)]
pub struct HttpAnalysisSource {
    http: reqwest::Client,
    base_url: String,
    analysis_path: String,
    dates_path: String,
    retries: u32,
}

impl HttpAnalysisSource {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let timeout_secs = settings.http_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        let retries = settings.http_retries.unwrap_or(DEFAULT_RETRIES).clamp(1, MAX_RETRIES);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build analysis http client")?;

        Ok(Self {
            http,
            base_url: settings.api_url.clone(),
            analysis_path: settings.analysis_path.clone(),
            dates_path: settings.dates_path.clone(),
            retries,
        })
    }

    fn url(&self, path: &str) -> String {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn get_json_once(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let url = self.url(path);

        let res = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .with_context(|| format!("failed to read response from {url}"))?;

        if !status.is_success() {
            anyhow::bail!("backend HTTP {status} for {url}: {text}");
        }

        serde_json::from_str::<Value>(&text)
            .with_context(|| format!("response from {url} is not valid JSON: {text}"))
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.get_json_once(path, query).await {
                Ok(v) => return Ok(v),
                Err(err) => {
                    if attempt >= self.retries {
                        return Err(err);
                    }
                    let backoff = backoff_for(attempt);
                    tracing::warn!(attempt, ?backoff, error = %err, "backend fetch failed; retrying");
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl AnalysisSource for HttpAnalysisSource {
    fn source_name(&self) -> &'static str {
        "http_json"
    }

    async fn fetch_batch(&self, date: Option<NaiveDate>) -> Result<Vec<RawRecord>> {
        let query = batch_query(date);
        let payload = self.get_json(&self.analysis_path, &query).await?;
        decode_batch(payload)
    }

    async fn fetch_dates(&self) -> Result<Vec<String>> {
        let payload = self.get_json(&self.dates_path, &[]).await?;
        decode_dates(payload)
    }
}

/// Exponential backoff after the given failed attempt (1-based), capped.
fn backoff_for(attempt: u32) -> Duration {
    let secs = 1u64
        .checked_shl(attempt.saturating_sub(1))
        .unwrap_or(u64::MAX)
        .min(MAX_BACKOFF_SECS);
    Duration::from_secs(secs)
}

fn batch_query(date: Option<NaiveDate>) -> Vec<(&'static str, String)> {
    date.map(|d| vec![("date", d.format("%Y-%m-%d").to_string())])
        .unwrap_or_default()
}

/// Fetch a batch; any failure is logged and yields an empty batch.
pub async fn load_batch(source: &dyn AnalysisSource, date: Option<NaiveDate>) -> Vec<RawRecord> {
    match source.fetch_batch(date).await {
        Ok(records) => {
            tracing::debug!(source = source.source_name(), ?date, records = records.len(), "analysis batch loaded");
            records
        }
        Err(err) => {
            tracing::error!(source = source.source_name(), ?date, error = %err, "analysis batch fetch failed");
            Vec::new()
        }
    }
}

/// Fetch the date whitelist; any failure is logged and yields an empty whitelist.
pub async fn load_dates(source: &dyn AnalysisSource) -> Vec<String> {
    match source.fetch_dates().await {
        Ok(dates) => dates,
        Err(err) => {
            tracing::error!(source = source.source_name(), error = %err, "date whitelist fetch failed");
            Vec::new()
        }
    }
}
