//! Favorites handlers.

use anyhow::{Context, Result};
use globalize_core::auth::Authenticator;
use globalize_core::config::Config;
use globalize_core::explorer::Explorer;
use globalize_core::favorites::{Favorites, ToggleOutcome};
use globalize_core::sources::RestCountriesClient;

use super::{open_store, signed_in_session};

const LOGIN_HINT: &str = "Log in to use favorites (globalize login --email <EMAIL>).";

pub async fn list(config: &Config, json: bool) -> Result<()> {
    let mut store = open_store()?;
    let auth = signed_in_session(config, &mut store).await?;
    if !auth.is_authenticated() {
        eprintln!("{LOGIN_HINT}");
        return Ok(());
    }

    let favorites = Favorites::load(&store);
    if json {
        let json = serde_json::to_string_pretty(favorites.list()).context("encode favorites")?;
        println!("{json}");
        return Ok(());
    }
    if favorites.count() == 0 {
        println!("No favorites yet.");
        return Ok(());
    }
    for country in favorites.list() {
        println!("{:<4} {}", country.cca3, country.common_name());
    }
    println!();
    println!("{} favorite(s)", favorites.count());
    Ok(())
}

pub async fn toggle(config: &Config, code: &str) -> Result<()> {
    let mut store = open_store()?;
    let auth = signed_in_session(config, &mut store).await?;
    if !auth.is_authenticated() {
        eprintln!("{LOGIN_HINT}");
        return Ok(());
    }

    let mut favorites = Favorites::load(&store);
    // Removing needs no lookup; the saved record is enough.
    let saved = favorites
        .list()
        .iter()
        .find(|c| c.cca3.eq_ignore_ascii_case(code.trim()))
        .cloned();
    let country = match saved {
        Some(country) => country,
        None => {
            let explorer = Explorer::new(RestCountriesClient::from_config(config)?);
            match explorer.lookup(code).await {
                Some(country) => country,
                None => {
                    println!("Country not found: {}", code.trim().to_uppercase());
                    return Ok(());
                }
            }
        }
    };

    match favorites.toggle(&country, &auth, &mut store)? {
        ToggleOutcome::Added => println!(
            "Added {} to favorites ({} total)",
            country.common_name(),
            favorites.count()
        ),
        ToggleOutcome::Removed => println!(
            "Removed {} from favorites ({} total)",
            country.common_name(),
            favorites.count()
        ),
        ToggleOutcome::Refused => eprintln!("{LOGIN_HINT}"),
    }
    Ok(())
}

pub fn check(code: &str) -> Result<()> {
    let store = open_store()?;
    let code = code.trim().to_uppercase();
    if Favorites::load(&store).is_favorite(&code) {
        println!("{code} is a favorite");
    } else {
        println!("{code} is not a favorite");
    }
    Ok(())
}
