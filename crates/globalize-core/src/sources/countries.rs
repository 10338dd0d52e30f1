//! REST Countries client.

use anyhow::Result;

use super::{CountrySource, SourceError, endpoint, send_json};
use crate::config::Config;
use crate::country::{Country, Region};

/// HTTP client for a REST Countries v3.1 compatible API.
pub struct RestCountriesClient {
    base_url: String,
    http: reqwest::Client,
}

impl RestCountriesClient {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }

    /// Creates a client from the effective configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.countries_url()?, config.http_client()?))
    }

    async fn fetch_list(&self, segments: &[&str]) -> Result<Vec<Country>, SourceError> {
        let url = endpoint(&self.base_url, segments)?;
        tracing::debug!(%url, "fetching countries");
        send_json(self.http.get(url)).await
    }
}

impl CountrySource for RestCountriesClient {
    async fn all(&self) -> Result<Vec<Country>, SourceError> {
        self.fetch_list(&["all"]).await
    }

    async fn by_name(&self, name: &str) -> Result<Vec<Country>, SourceError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(Vec::new());
        }
        // Upstream answers 404 when nothing matches.
        match self.fetch_list(&["name", name]).await {
            Err(err) if err.is_not_found() => Ok(Vec::new()),
            other => other,
        }
    }

    async fn by_region(&self, region: Region) -> Result<Vec<Country>, SourceError> {
        let segment = region.as_str().to_ascii_lowercase();
        match self.fetch_list(&["region", &segment]).await {
            Err(err) if err.is_not_found() => Ok(Vec::new()),
            other => other,
        }
    }

    async fn by_code(&self, code: &str) -> Result<Option<Country>, SourceError> {
        let code = code.trim().to_ascii_uppercase();
        if code.is_empty() {
            return Ok(None);
        }
        match self.fetch_list(&["alpha", &code]).await {
            Ok(list) => Ok(list.into_iter().next()),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }
}
