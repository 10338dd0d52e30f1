//! Country listing, detail and suggestion handlers.

use anyhow::{Context, Result};
use globalize_core::auth::Authenticator;
use globalize_core::config::Config;
use globalize_core::country::{Country, Region};
use globalize_core::explorer::{Explorer, SUGGESTION_LIMIT};
use globalize_core::favorites::Favorites;
use globalize_core::sources::{PhotoClient, RestCountriesClient, WikiClient};

use super::{open_store, signed_in_session};

pub struct ListOptions<'a> {
    pub search: Option<&'a str>,
    pub region: Option<&'a str>,
    pub page: usize,
    pub clear: bool,
    pub json: bool,
}

pub async fn list(config: &Config, options: ListOptions<'_>) -> Result<()> {
    let mut store = open_store()?;
    let source = RestCountriesClient::from_config(config)?;
    let mut explorer = Explorer::restore(source, &store);

    if options.clear {
        explorer.set_search("", &mut store)?;
        explorer.set_region(Region::All, &mut store)?;
    }
    if let Some(search) = options.search {
        explorer.set_search(search, &mut store)?;
    }
    if let Some(region) = options.region {
        let region: Region = region.parse()?;
        explorer.set_region(region, &mut store)?;
    }

    explorer.refresh().await;
    if options.page != 1 && !explorer.change_page(options.page) {
        eprintln!(
            "Page {} is out of range (1-{}); showing page 1.",
            options.page,
            explorer.total_pages().max(1)
        );
    }

    let view = explorer.current_page();
    if options.json {
        let json = serde_json::to_string_pretty(view.items).context("encode countries")?;
        println!("{json}");
        return Ok(());
    }

    print_filter(explorer.search(), explorer.region());
    if view.items.is_empty() {
        println!("No countries found.");
        return Ok(());
    }

    let favorites = Favorites::load(&store);
    for country in view.items {
        let marker = if favorites.is_favorite(&country.cca3) {
            "*"
        } else {
            " "
        };
        println!(
            "{marker} {:<4} {:<32} {:<10} {:>15}  {}",
            country.cca3,
            country.common_name(),
            country.region,
            format_count(country.population),
            country.primary_capital().unwrap_or("-"),
        );
    }
    println!();
    println!(
        "Showing {} to {} of {} countries (page {}/{})",
        view.first, view.last, view.total_items, view.page, view.total_pages
    );
    Ok(())
}

fn print_filter(search: &str, region: Region) {
    match (search.trim().is_empty(), region.is_all()) {
        (true, true) => {}
        (false, true) => println!("Search: \"{search}\""),
        (true, false) => println!("Region: {region}"),
        (false, false) => println!("Search: \"{search}\" in {region}"),
    }
}

pub async fn show(config: &Config, code: &str) -> Result<()> {
    let mut store = open_store()?;
    if config.details_require_sign_in {
        let auth = signed_in_session(config, &mut store).await?;
        if !auth.is_authenticated() {
            eprintln!("Log in to view country details (globalize login --email <EMAIL>).");
            return Ok(());
        }
    }

    let explorer = Explorer::new(RestCountriesClient::from_config(config)?);
    let Some(country) = explorer.lookup(code).await else {
        println!("Country not found: {}", code.trim().to_uppercase());
        return Ok(());
    };

    let favorites = Favorites::load(&store);
    print_details(&country, favorites.is_favorite(&country.cca3));

    let summary = WikiClient::from_config(config)?
        .summary_or_empty(country.common_name())
        .await;
    if let Some(summary) = summary {
        println!();
        println!("About:");
        println!("{summary}");
    }

    let photos = PhotoClient::from_config(config)?
        .search_or_empty(country.common_name())
        .await;
    if !photos.is_empty() {
        println!();
        println!("Photos:");
        for url in photos {
            println!("  {url}");
        }
    }
    Ok(())
}

fn print_details(country: &Country, favorite: bool) {
    let title = if favorite {
        format!("{} ({}) *", country.common_name(), country.cca3)
    } else {
        format!("{} ({})", country.common_name(), country.cca3)
    };
    println!("{title}");
    println!("{}", "=".repeat(title.chars().count()));

    let field = |label: &str, value: &str| println!("{label:<13} {value}");
    field("Official", &country.name.official);
    field(
        "Capital",
        &join_or_dash(country.capital.iter().map(String::as_str)),
    );
    field("Region", &country.region);
    field("Subregion", country.subregion.as_deref().unwrap_or("-"));
    field("Population", &format_count(country.population));
    if let Some(area) = country.area {
        field("Area", &format!("{} km²", format_count(area.round() as u64)));
    }
    field(
        "Languages",
        &join_or_dash(country.languages.values().map(String::as_str)),
    );
    let currencies: Vec<String> = country
        .currencies
        .iter()
        .map(|(code, currency)| match &currency.symbol {
            Some(symbol) => format!("{} ({code}, {symbol})", currency.name),
            None => format!("{} ({code})", currency.name),
        })
        .collect();
    field(
        "Currencies",
        &join_or_dash(currencies.iter().map(String::as_str)),
    );
    field(
        "Borders",
        &join_or_dash(country.borders.iter().map(String::as_str)),
    );
    if let Some(flag) = country.flag_url() {
        field("Flag", flag);
    }
}

pub async fn suggest(config: &Config, prefix: &str) -> Result<()> {
    let mut explorer = Explorer::new(RestCountriesClient::from_config(config)?);
    explorer.load_all().await;

    let suggestions = explorer.suggestions(prefix, SUGGESTION_LIMIT);
    if suggestions.is_empty() {
        println!("No suggestions.");
        return Ok(());
    }
    for country in suggestions {
        println!("{:<4} {}", country.cca3, country.common_name());
    }
    Ok(())
}

pub async fn popular(config: &Config, json: bool) -> Result<()> {
    let mut explorer = Explorer::new(RestCountriesClient::from_config(config)?);
    explorer.load_all().await;

    let popular = explorer.popular();
    if json {
        let json = serde_json::to_string_pretty(&popular).context("encode countries")?;
        println!("{json}");
        return Ok(());
    }
    if popular.is_empty() {
        println!("No popular countries available.");
        return Ok(());
    }
    println!("Popular countries:");
    for country in popular {
        println!(
            "  {:<4} {:<32} {}",
            country.cca3,
            country.common_name(),
            country.primary_capital().unwrap_or("-"),
        );
    }
    Ok(())
}

fn join_or_dash<'a>(values: impl Iterator<Item = &'a str>) -> String {
    let joined = values.collect::<Vec<_>>().join(", ");
    if joined.is_empty() {
        "-".to_string()
    } else {
        joined
    }
}

/// Formats with thousands separators (67391582 -> 67,391,582).
pub(crate) fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
