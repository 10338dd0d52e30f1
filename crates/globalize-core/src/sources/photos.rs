//! Photo search (Unsplash compatible).

use anyhow::Result;
use serde::Deserialize;

use super::{SourceError, endpoint, send_json};
use crate::config::Config;

/// Photos requested per search.
const PHOTOS_PER_PAGE: u32 = 8;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<PhotoResult>,
}

#[derive(Debug, Deserialize)]
struct PhotoResult {
    urls: PhotoUrls,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    small: Option<String>,
}

pub struct PhotoClient {
    base_url: String,
    access_key: Option<String>,
    http: reqwest::Client,
}

impl PhotoClient {
    pub fn new(
        base_url: impl Into<String>,
        access_key: Option<String>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            access_key,
            http,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            config.photos_url()?,
            config.photo_key(),
            config.http_client()?,
        ))
    }

    /// Small-size image URLs for `query`.
    pub async fn search(&self, query: &str) -> Result<Vec<String>, SourceError> {
        let Some(key) = self.access_key.as_deref() else {
            return Err(SourceError::missing_api_key("Unsplash"));
        };

        let url = endpoint(&self.base_url, &["search", "photos"])?;
        let per_page = PHOTOS_PER_PAGE.to_string();
        let request = self
            .http
            .get(url)
            .query(&[("query", query), ("per_page", per_page.as_str())])
            .header("Authorization", format!("Client-ID {key}"));

        let response: SearchResponse = send_json(request).await?;
        Ok(response
            .results
            .into_iter()
            .filter_map(|r| r.urls.small)
            .collect())
    }

    /// Like [`search`](Self::search), but any failure is logged and yields no photos.
    pub async fn search_or_empty(&self, query: &str) -> Vec<String> {
        match self.search(query).await {
            Ok(urls) => urls,
            Err(err) => {
                tracing::warn!(query, error = %err, "photo search failed");
                Vec::new()
            }
        }
    }
}
