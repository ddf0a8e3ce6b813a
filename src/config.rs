use std::env;
use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

/// Default pause applied by the mock receipt validator.
const DEFAULT_RECEIPT_MOCK_DELAY_MS: u64 = 100;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: DatabaseUrl,
    pub database_service_key: String,
    pub receipt_mock_delay: Duration,
}

/// Where the data store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseUrl {
    /// Hosted backend reachable over HTTP(S).
    Hosted(Url),
    /// Local SQLite database file.
    SqliteFile(String),
    /// Throwaway in-memory SQLite database.
    SqliteMemory,
}

impl DatabaseUrl {
    /// Accepts `http(s)://host[/path]`, `sqlite://<path>` or `sqlite::memory:`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s == "sqlite::memory:" {
            return Some(DatabaseUrl::SqliteMemory);
        }
        if let Some(path) = s.strip_prefix("sqlite://") {
            return (!path.is_empty()).then(|| DatabaseUrl::SqliteFile(path.to_string()));
        }

        let url = Url::parse(s).ok()?;
        match url.scheme() {
            "http" | "https" if url.host_str().is_some() => Some(DatabaseUrl::Hosted(url)),
            _ => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Missing or invalid environment variables: {}", .0.join(", "))]
pub struct ConfigError(pub Vec<&'static str>);

impl Config {
    /// Load configuration from `.env` and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// Every missing or malformed variable is collected so the caller sees
    /// the full list in one failure.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut invalid = Vec::new();

        let port = get("PORT").and_then(|p| parse_digits::<u16>(&p));
        if port.is_none() {
            invalid.push("PORT");
        }

        let database_url = get("DATABASE_URL").and_then(|u| DatabaseUrl::parse(&u));
        if database_url.is_none() {
            invalid.push("DATABASE_URL");
        }

        let database_service_key = get("DATABASE_SERVICE_KEY").filter(|k| !k.is_empty());
        if database_service_key.is_none() {
            invalid.push("DATABASE_SERVICE_KEY");
        }

        let receipt_mock_delay = match get("RECEIPT_MOCK_DELAY_MS") {
            None => Some(Duration::from_millis(DEFAULT_RECEIPT_MOCK_DELAY_MS)),
            Some(ms) => parse_digits::<u64>(&ms).map(Duration::from_millis),
        };
        if receipt_mock_delay.is_none() {
            invalid.push("RECEIPT_MOCK_DELAY_MS");
        }

        match (port, database_url, database_service_key, receipt_mock_delay) {
            (Some(port), Some(database_url), Some(database_service_key), Some(receipt_mock_delay))
                if invalid.is_empty() =>
            {
                Ok(Self {
                    host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                    port,
                    database_url,
                    database_service_key,
                    receipt_mock_delay,
                })
            }
            _ => Err(ConfigError(invalid)),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse a value made only of ASCII digits.
fn parse_digits<T: std::str::FromStr>(s: &str) -> Option<T> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
