//! Synchronous client for the **disease.sh COVID-19 API (v3)**.
//!
//! Four reads are exposed, each a single GET against a fixed endpoint:
//! `/all`, `/countries`, `/countries/{code}` and `/historical/all?lastdays={n}`.
//!
//! ### Notes
//! - Nothing is retried. A failed read is reported to the caller as a [`FetchError`].
//! - Unknown countries come back as HTTP 404 with a `{"message": ...}` body; the message is
//!   surfaced in [`FetchError::Api`].
//! - Network timeouts use a sane default (30s) and can be adjusted by editing the client builder.
//!
//! Typical usage:
//! ```no_run
//! # use covid_tracker::{Client, StatsSource};
//! let client = Client::default();
//! let world = client.fetch_global()?;
//! let countries = client.fetch_all_countries()?;
//! # Ok::<(), covid_tracker::FetchError>(())
//! ```
use crate::models::{
    CountryEntry, CountryStat, GlobalEntry, GlobalStat, History, HistoryEntry,
};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://disease.sh/v3/covid-19";

/// Default look-back window for the chart series.
pub const DEFAULT_HISTORY_DAYS: u32 = 120;

/// Failure of a single read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Transport or connectivity failure.
    #[error("network error: {0}")]
    Network(String),
    /// Non-success HTTP status.
    #[error("api error (HTTP {status}): {message}")]
    Api { status: u16, message: String },
    /// Body does not match the expected shape.
    #[error("parse error: {0}")]
    Parse(String),
}

/// The reads the dashboard needs. Implemented by [`Client`]; tests plug in fakes.
pub trait StatsSource: Send + Sync {
    fn fetch_global(&self) -> Result<GlobalStat, FetchError>;
    fn fetch_all_countries(&self) -> Result<Vec<CountryStat>, FetchError>;
    fn fetch_country(&self, code: &str) -> Result<CountryStat, FetchError>;
    fn fetch_history(&self, last_days: u32) -> Result<History, FetchError>;
}

#[derive(Debug, Clone)]
pub struct Client {
    pub base_url: String,
    http: HttpClient,
}

impl Default for Client {
    fn default() -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30)) // total request timeout
            .connect_timeout(Duration::from_secs(10)) // connect timeout
            .redirect(Policy::limited(5)) // cap redirects
            .user_agent(concat!("covid_tracker/", env!("CARGO_PKG_VERSION"))) // set user agent
            .build()
            .expect("reqwest client build");
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            http,
        }
    }
}

// Country codes and names go into a path segment; keep - _ . readable.
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

fn enc_segment(s: &str) -> String {
    percent_encoding::utf8_percent_encode(s.trim(), SAFE).to_string()
}

fn parse_body<T: DeserializeOwned>(body: &str, what: &str) -> Result<T, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Parse(format!("{what}: {e}")))
}

/// Parse the body of `/all`.
pub fn parse_global(body: &str) -> Result<GlobalStat, FetchError> {
    parse_body::<GlobalEntry>(body, "global totals").map(GlobalStat::from)
}

/// Parse the body of `/countries`.
pub fn parse_countries(body: &str) -> Result<Vec<CountryStat>, FetchError> {
    let entries: Vec<CountryEntry> = parse_body(body, "country list")?;
    Ok(entries.into_iter().map(CountryStat::from).collect())
}

/// Parse the body of `/countries/{code}`.
pub fn parse_country(body: &str) -> Result<CountryStat, FetchError> {
    parse_body::<CountryEntry>(body, "country detail").map(CountryStat::from)
}

/// Parse the body of `/historical/all`.
pub fn parse_history(body: &str) -> Result<History, FetchError> {
    let raw: HistoryEntry = parse_body(body, "history")?;
    History::try_from(raw).map_err(FetchError::Parse)
}

/// Pull the `message` field out of an error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

impl Client {
    /// Point the client at another deployment of the same API.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn get_text(&self, path: &str) -> Result<String, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("GET {url}");
        let resp = self
            .http
            .get(&url)
            .send()
            .map_err(|e| FetchError::Network(format!("GET {url}: {e}")))?;
        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| FetchError::Network(format!("GET {url}: reading body: {e}")))?;
        if !status.is_success() {
            return Err(FetchError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        Ok(body)
    }
}

impl StatsSource for Client {
    fn fetch_global(&self) -> Result<GlobalStat, FetchError> {
        parse_global(&self.get_text("/all")?)
    }

    fn fetch_all_countries(&self) -> Result<Vec<CountryStat>, FetchError> {
        parse_countries(&self.get_text("/countries")?)
    }

    fn fetch_country(&self, code: &str) -> Result<CountryStat, FetchError> {
        if code.trim().is_empty() {
            return Err(FetchError::Api {
                status: 400,
                message: "empty country code".into(),
            });
        }
        parse_country(&self.get_text(&format!("/countries/{}", enc_segment(code)))?)
    }

    fn fetch_history(&self, last_days: u32) -> Result<History, FetchError> {
        parse_history(&self.get_text(&format!("/historical/all?lastdays={last_days}"))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_json_message() {
        let body = r#"{"message":"Country not found or doesn't have any cases"}"#;
        assert_eq!(
            error_message(body),
            "Country not found or doesn't have any cases"
        );
        assert_eq!(error_message("  Bad Gateway \n"), "Bad Gateway");
    }

    #[test]
    fn path_segments_are_encoded() {
        assert_eq!(enc_segment(" DE "), "DE");
        assert_eq!(enc_segment("Cote d'Ivoire"), "Cote%20d%27Ivoire");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let c = Client::default().with_base_url("http://localhost:3000/v3/covid-19/");
        assert_eq!(c.base_url, "http://localhost:3000/v3/covid-19");
    }
}
