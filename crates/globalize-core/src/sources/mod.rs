//! Upstream HTTP data sources.
//!
//! Every client returns `Result<_, SourceError>`; callers decide whether a
//! failure degrades to an empty result (the default everywhere in the app) or
//! is reported.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::country::{Country, Region};

pub mod countries;
pub mod photos;
pub mod rates;
pub mod wiki;

pub use countries::RestCountriesClient;
pub use photos::PhotoClient;
pub use rates::RatesClient;
pub use wiki::WikiClient;

/// Read access to the country dataset.
///
/// Implemented by the HTTP client and by in-memory fakes in tests.
#[allow(async_fn_in_trait)]
pub trait CountrySource {
    /// The full dataset.
    async fn all(&self) -> Result<Vec<Country>, SourceError>;

    /// Countries whose name matches `name`. No match is an empty list.
    async fn by_name(&self, name: &str) -> Result<Vec<Country>, SourceError>;

    /// Countries in `region`. Never called with `Region::All`.
    async fn by_region(&self, region: Region) -> Result<Vec<Country>, SourceError>;

    /// Exact lookup by 3-letter code.
    async fn by_code(&self, code: &str) -> Result<Option<Country>, SourceError>;
}

/// Categories of upstream failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceErrorKind {
    /// Connection refused, DNS failure, TLS failure
    Network,
    /// Request exceeded the configured timeout
    Timeout,
    /// Non-success HTTP status
    HttpStatus,
    /// Response body did not decode
    Parse,
    /// A required API key is not configured
    MissingApiKey,
}

impl fmt::Display for SourceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceErrorKind::Network => write!(f, "network"),
            SourceErrorKind::Timeout => write!(f, "timeout"),
            SourceErrorKind::HttpStatus => write!(f, "http_status"),
            SourceErrorKind::Parse => write!(f, "parse"),
            SourceErrorKind::MissingApiKey => write!(f, "missing_api_key"),
        }
    }
}

/// Structured upstream error with kind and details.
#[derive(Debug, Clone)]
pub struct SourceError {
    pub kind: SourceErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// HTTP status, when the server answered
    pub status: Option<u16>,
    /// Raw response body or underlying error text
    pub details: Option<String>,
}

impl SourceError {
    pub fn new(kind: SourceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            details: None,
        }
    }

    /// Creates an HTTP status error, lifting a `message` field out of a JSON body.
    pub fn http_status(status: u16, body: &str) -> Self {
        let upstream_message = serde_json::from_str::<Value>(body).ok().and_then(|json| {
            json.get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
        });
        let message = match upstream_message {
            Some(msg) => format!("HTTP {status}: {msg}"),
            None => format!("HTTP {status}"),
        };
        Self {
            kind: SourceErrorKind::HttpStatus,
            message,
            status: Some(status),
            details: (!body.is_empty()).then(|| body.to_string()),
        }
    }

    pub fn missing_api_key(what: &str) -> Self {
        Self::new(
            SourceErrorKind::MissingApiKey,
            format!("{what} API key is missing"),
        )
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Parse, message)
    }

    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            SourceErrorKind::Timeout
        } else if err.is_decode() {
            SourceErrorKind::Parse
        } else {
            SourceErrorKind::Network
        };
        Self {
            kind,
            message: format!("{kind} error"),
            status: err.status().map(|s| s.as_u16()),
            details: Some(err.to_string()),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.details {
            Some(details) if self.kind != SourceErrorKind::HttpStatus => {
                write!(f, "{}: {}", self.message, details)
            }
            _ => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for SourceError {}

/// Joins `segments` onto `base` as percent-encoded path segments.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<url::Url, SourceError> {
    let mut url = url::Url::parse(base)
        .map_err(|e| SourceError::new(SourceErrorKind::Network, format!("bad base URL: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| SourceError::new(SourceErrorKind::Network, "base URL cannot hold a path"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Sends a prepared request and decodes a JSON body.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, SourceError> {
    let response = request
        .send()
        .await
        .map_err(|e| SourceError::from_reqwest(&e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(SourceError::http_status(status.as_u16(), &body));
    }

    let body = response
        .text()
        .await
        .map_err(|e| SourceError::from_reqwest(&e))?;
    serde_json::from_str(&body).map_err(|e| {
        let mut err = SourceError::parse(format!("unexpected response body: {e}"));
        err.status = Some(status.as_u16());
        err
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_extracts_json_message() {
        let err = SourceError::http_status(404, r#"{"status":404,"message":"Not Found"}"#);
        assert_eq!(err.kind, SourceErrorKind::HttpStatus);
        assert_eq!(err.message, "HTTP 404: Not Found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_http_status_plain_body() {
        let err = SourceError::http_status(500, "boom");
        assert_eq!(err.message, "HTTP 500");
        assert_eq!(err.details.as_deref(), Some("boom"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_missing_api_key_display() {
        let err = SourceError::missing_api_key("Unsplash");
        assert_eq!(err.to_string(), "Unsplash API key is missing");
        assert_eq!(err.kind, SourceErrorKind::MissingApiKey);
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let url = endpoint("https://restcountries.com/v3.1", &["name", "united states"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://restcountries.com/v3.1/name/united%20states"
        );
    }

    #[test]
    fn test_endpoint_handles_trailing_slash() {
        let url = endpoint("http://localhost:4000/", &["api", "auth", "login"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:4000/api/auth/login");
    }
}
