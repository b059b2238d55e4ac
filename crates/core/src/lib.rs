pub mod domain;
pub mod ingest;
pub mod session;
pub mod time;
pub mod view;

pub mod config {
    const DEFAULT_API_URL: &str = "http://localhost:8080";
    const DEFAULT_ANALYSIS_PATH: &str = "/api/analysis";
    const DEFAULT_DATES_PATH: &str = "/api/dates";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub api_url: String,
        pub analysis_path: String,
        pub dates_path: String,
        pub http_timeout_secs: Option<u64>,
        pub http_retries: Option<u32>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                api_url: non_empty_var("FUTUNA_API_URL")
                    .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
                analysis_path: non_empty_var("FUTUNA_ANALYSIS_PATH")
                    .unwrap_or_else(|| DEFAULT_ANALYSIS_PATH.to_string()),
                dates_path: non_empty_var("FUTUNA_DATES_PATH")
                    .unwrap_or_else(|| DEFAULT_DATES_PATH.to_string()),
                http_timeout_secs: parsed_var("FUTUNA_HTTP_TIMEOUT_SECS")?,
                http_retries: parsed_var("FUTUNA_HTTP_RETRIES")?,
                sentry_dsn: non_empty_var("SENTRY_DSN"),
            })
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn parsed_var<T>(key: &str) -> anyhow::Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match non_empty_var(key) {
            Some(s) => {
                let v = s
                    .parse::<T>()
                    .map_err(|e| anyhow::anyhow!("{key} is invalid ({s:?}): {e}"))?;
                Ok(Some(v))
            }
            None => Ok(None),
        }
    }
}
