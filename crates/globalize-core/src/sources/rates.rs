//! Exchange rates for the currency converter.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Deserialize;

use super::{SourceError, endpoint, send_json};
use crate::config::Config;

#[derive(Debug, Deserialize)]
struct LatestRates {
    #[serde(default)]
    rates: BTreeMap<String, f64>,
}

/// A completed conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub amount: f64,
    pub from: String,
    pub to: String,
    pub rate: f64,
    pub converted: f64,
}

pub struct RatesClient {
    base_url: String,
    http: reqwest::Client,
}

impl RatesClient {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.rates_url()?, config.http_client()?))
    }

    /// Rates for one unit of `base` keyed by target currency code.
    pub async fn latest(&self, base: &str) -> Result<BTreeMap<String, f64>, SourceError> {
        let base = base.trim().to_ascii_uppercase();
        let url = endpoint(&self.base_url, &["v4", "latest", &base])?;
        let latest: LatestRates = send_json(self.http.get(url)).await?;
        Ok(latest.rates)
    }

    /// Converts `amount` of `from` into `to`. `None` when upstream has no rate for `to`.
    pub async fn convert(
        &self,
        amount: f64,
        from: &str,
        to: &str,
    ) -> Result<Option<Conversion>, SourceError> {
        let rates = self.latest(from).await?;
        let to = to.trim().to_ascii_uppercase();
        Ok(rates.get(&to).map(|&rate| Conversion {
            amount,
            from: from.trim().to_ascii_uppercase(),
            to: to.clone(),
            rate,
            converted: amount * rate,
        }))
    }
}
