//! Encyclopedia intro summaries (MediaWiki `prop=extracts`).

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Deserialize;

use super::{SourceError, endpoint, send_json};
use crate::config::Config;

#[derive(Debug, Deserialize)]
struct QueryResponse {
    query: Option<QueryPages>,
}

#[derive(Debug, Deserialize)]
struct QueryPages {
    #[serde(default)]
    pages: BTreeMap<String, Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    extract: Option<String>,
}

pub struct WikiClient {
    base_url: String,
    http: reqwest::Client,
}

impl WikiClient {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.wiki_url()?, config.http_client()?))
    }

    /// Plain-text intro of the article titled `title`. `None` when there is no such article.
    pub async fn summary(&self, title: &str) -> Result<Option<String>, SourceError> {
        let url = endpoint(&self.base_url, &["w", "api.php"])?;
        let request = self.http.get(url).query(&[
            ("action", "query"),
            ("format", "json"),
            ("prop", "extracts"),
            ("exintro", "1"),
            ("explaintext", "1"),
            ("titles", title.trim()),
        ]);

        let response: QueryResponse = send_json(request).await?;
        Ok(response
            .query
            .into_iter()
            .flat_map(|query| query.pages.into_values())
            .filter_map(|page| page.extract)
            .map(|extract| extract.trim().to_string())
            .find(|extract| !extract.is_empty()))
    }

    /// Like [`summary`](Self::summary), but any failure is logged and yields no summary.
    pub async fn summary_or_empty(&self, title: &str) -> Option<String> {
        match self.summary(title).await {
            Ok(summary) => summary,
            Err(err) => {
                tracing::warn!(title, error = %err, "summary lookup failed");
                None
            }
        }
    }
}
