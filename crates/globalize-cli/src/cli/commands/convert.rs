//! Currency converter handler.

use anyhow::Result;
use globalize_core::config::Config;
use globalize_core::explorer::Explorer;
use globalize_core::sources::{RatesClient, RestCountriesClient};

pub async fn run(config: &Config, code: &str, amount: f64, to: &str) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        anyhow::bail!("Amount must be a non-negative number");
    }

    let explorer = Explorer::new(RestCountriesClient::from_config(config)?);
    let Some(country) = explorer.lookup(code).await else {
        println!("Country not found: {}", code.trim().to_uppercase());
        return Ok(());
    };
    let Some(from) = country.primary_currency() else {
        println!("{} has no currency listed.", country.common_name());
        return Ok(());
    };

    let rates = RatesClient::from_config(config)?;
    match rates.convert(amount, from, to).await {
        Ok(Some(conversion)) => println!(
            "{:.2} {} = {:.2} {} (rate {})",
            conversion.amount, conversion.from, conversion.converted, conversion.to, conversion.rate
        ),
        Ok(None) => println!("No exchange rate from {from} to {}.", to.trim().to_uppercase()),
        Err(err) => {
            tracing::warn!(error = %err, "exchange rate lookup failed");
            println!("Exchange rates are unavailable right now.");
        }
    }
    Ok(())
}
