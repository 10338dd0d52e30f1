//! Search, region filter and pagination state over a country source.
//!
//! The explorer keeps the full dataset cached after the first load and derives
//! the filtered list from the active search term and region:
//!
//! | search   | region     | result                                   |
//! |----------|------------|------------------------------------------|
//! | empty    | `All`      | cached full list                         |
//! | empty    | other      | upstream query by region                 |
//! | non-empty| `All`      | upstream query by name                   |
//! | non-empty| other      | upstream query by name, then region match|
//!
//! Every refresh takes a generation ticket. Results are only applied when
//! their ticket is still the newest one issued, so a slow earlier query can
//! never overwrite a later one.

use anyhow::Result;

use crate::country::{Country, Region};
use crate::pagination::{PageView, Paginator};
use crate::sources::CountrySource;
use crate::storage::{LocalStore, keys};

/// Suggestions shown for a search prefix.
pub const SUGGESTION_LIMIT: usize = 5;

/// Codes featured as popular destinations.
pub const POPULAR_CODES: [&str; 6] = ["USA", "JPN", "GBR", "FRA", "AUS", "CAN"];

/// Snapshot of the filter a query was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTicket {
    generation: u64,
    search: String,
    region: Region,
}

pub struct Explorer<S> {
    source: S,
    all_countries: Vec<Country>,
    all_loaded: bool,
    search: String,
    region: Region,
    filtered: Vec<Country>,
    paginator: Paginator,
    generation: u64,
}

impl<S: CountrySource> Explorer<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            all_countries: Vec::new(),
            all_loaded: false,
            search: String::new(),
            region: Region::All,
            filtered: Vec::new(),
            paginator: Paginator::default(),
            generation: 0,
        }
    }

    /// Creates an explorer with the search term and region saved in `store`.
    pub fn restore(source: S, store: &LocalStore) -> Self {
        let mut explorer = Self::new(source);
        if let Some(term) = store.get(keys::SEARCH_TERM) {
            explorer.search = term.to_string();
        }
        if let Some(raw) = store.get(keys::REGION_FILTER) {
            match raw.parse() {
                Ok(region) => explorer.region = region,
                Err(err) => tracing::warn!(value = raw, error = %err, "ignoring stored region"),
            }
        }
        explorer
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// The cached full dataset (empty until [`load_all`](Self::load_all) succeeds).
    pub fn all_countries(&self) -> &[Country] {
        &self.all_countries
    }

    pub fn filtered(&self) -> &[Country] {
        &self.filtered
    }

    pub fn page(&self) -> usize {
        self.paginator.page()
    }

    pub fn total_pages(&self) -> usize {
        self.paginator.total_pages(self.filtered.len())
    }

    pub fn current_page(&self) -> PageView<'_, Country> {
        self.paginator.view(&self.filtered)
    }

    /// Moves to page `target`; out-of-range targets are ignored.
    pub fn change_page(&mut self, target: usize) -> bool {
        self.paginator.change_page(target, self.filtered.len())
    }

    /// Updates the search term and mirrors it to storage (removed when blank).
    pub fn set_search(&mut self, term: &str, store: &mut LocalStore) -> Result<()> {
        self.search = term.to_string();
        if term.is_empty() {
            store.remove(keys::SEARCH_TERM)
        } else {
            store.set(keys::SEARCH_TERM, term)
        }
    }

    /// Updates the region filter and mirrors it to storage.
    pub fn set_region(&mut self, region: Region, store: &mut LocalStore) -> Result<()> {
        self.region = region;
        store.set(keys::REGION_FILTER, region.as_str())
    }

    /// Fetches the full dataset once. Returns whether a cache is available.
    pub async fn load_all(&mut self) -> bool {
        if self.all_loaded {
            return true;
        }
        match self.source.all().await {
            Ok(countries) => {
                tracing::debug!(count = countries.len(), "cached all countries");
                self.all_countries = countries;
                self.all_loaded = true;
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load all countries");
                false
            }
        }
    }

    /// Issues a ticket for the current filter. Any earlier ticket becomes stale.
    pub fn begin_query(&mut self) -> QueryTicket {
        self.generation += 1;
        QueryTicket {
            generation: self.generation,
            search: self.search.clone(),
            region: self.region,
        }
    }

    /// Resolves the filtered list for `ticket`. Failures yield an empty list.
    pub async fn run_query(&self, ticket: &QueryTicket) -> Vec<Country> {
        let term = ticket.search.trim();

        if !term.is_empty() {
            let by_name = match self.source.by_name(term).await {
                Ok(list) => list,
                Err(err) => {
                    tracing::warn!(search = term, error = %err, "country search failed");
                    Vec::new()
                }
            };
            return by_name
                .into_iter()
                .filter(|c| c.in_region(ticket.region))
                .collect();
        }

        if ticket.region.is_all() {
            return self.all_countries.clone();
        }

        match self.source.by_region(ticket.region).await {
            Ok(list) => list,
            Err(err) => {
                tracing::warn!(region = %ticket.region, error = %err, "region query failed");
                Vec::new()
            }
        }
    }

    /// Applies results for `ticket` unless a newer ticket has been issued.
    ///
    /// Applying resets the page to 1.
    pub fn apply(&mut self, ticket: &QueryTicket, results: Vec<Country>) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(
                stale = ticket.generation,
                latest = self.generation,
                "discarding stale country results"
            );
            return false;
        }
        self.filtered = results;
        self.paginator.reset();
        true
    }

    /// Loads the cache if needed and recomputes the filtered list.
    ///
    /// When the initial full load fails the filtered list is left empty.
    pub async fn refresh(&mut self) -> &[Country] {
        let ticket = self.begin_query();
        if !self.load_all().await {
            self.apply(&ticket, Vec::new());
            return &self.filtered;
        }
        let results = self.run_query(&ticket).await;
        self.apply(&ticket, results);
        &self.filtered
    }

    /// Exact lookup by code. Failures are logged and read as "not found".
    pub async fn lookup(&self, code: &str) -> Option<Country> {
        let code = code.trim();
        if let Some(cached) = self
            .all_countries
            .iter()
            .find(|c| c.cca3.eq_ignore_ascii_case(code))
        {
            return Some(cached.clone());
        }
        match self.source.by_code(code).await {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!(code, error = %err, "country lookup failed");
                None
            }
        }
    }

    /// Up to `limit` cached countries whose common name starts with `prefix`.
    pub fn suggestions(&self, prefix: &str, limit: usize) -> Vec<&Country> {
        let prefix = prefix.trim().to_lowercase();
        if prefix.is_empty() {
            return Vec::new();
        }
        self.all_countries
            .iter()
            .filter(|c| c.common_name().to_lowercase().starts_with(&prefix))
            .take(limit)
            .collect()
    }

    /// Cached countries whose code is in [`POPULAR_CODES`], in dataset order.
    pub fn popular(&self) -> Vec<&Country> {
        self.all_countries
            .iter()
            .filter(|c| POPULAR_CODES.contains(&c.cca3.as_str()))
            .collect()
    }
}


#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::test_support::FakeSource;
    use super::*;
    use crate::country::test_support::country;

    fn world() -> Vec<Country> {
        vec![
            country("FRA", "France", "Europe"),
            country("DEU", "Germany", "Europe"),
            country("JPN", "Japan", "Asia"),
            country("USA", "United States", "Americas"),
            country("CAN", "Canada", "Americas"),
            country("FJI", "Fiji", "Oceania"),
            country("NGA", "Nigeria", "Africa"),
            country("ATA", "Antarctica", "Antarctic"),
            country("GUF", "French Guiana", "Americas"),
        ]
    }

    fn store() -> (tempfile::TempDir, LocalStore) {
        let dir = tempdir().unwrap();
        let store = LocalStore::open(&dir.path().join("storage.json")).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_no_filter_uses_cached_full_list() {
        let mut explorer = Explorer::new(FakeSource::new(world()));
        assert_eq!(explorer.refresh().await.len(), 9);
        explorer.refresh().await;

        let source = explorer.source();
        assert_eq!(source.all_calls.get(), 1);
        assert_eq!(source.name_calls.get(), 0);
        assert_eq!(source.region_calls.get(), 0);
    }

    #[tokio::test]
    async fn test_every_region_filters_to_matching_countries() {
        let (_dir, mut store) = store();
        let mut explorer = Explorer::new(FakeSource::new(world()));

        for region in Region::VALUES {
            explorer.set_region(region, &mut store).unwrap();
            let filtered = explorer.refresh().await.to_vec();
            if region.is_all() {
                assert_eq!(filtered.len(), world().len());
            } else {
                assert!(!filtered.is_empty(), "{region} should have countries");
                assert!(filtered.iter().all(|c| c.region == region.as_str()));
            }
        }
    }

    #[tokio::test]
    async fn test_search_with_all_region_queries_by_name() {
        let (_dir, mut store) = store();
        let mut explorer = Explorer::new(FakeSource::new(world()));
        explorer.set_search("Fra", &mut store).unwrap();

        let names: Vec<String> = explorer
            .refresh()
            .await
            .iter()
            .map(|c| c.common_name().to_string())
            .collect();
        assert!(names.contains(&"France".to_string()));
        assert_eq!(explorer.source().name_calls.get(), 1);
    }

    #[tokio::test]
    async fn test_search_and_region_filters_name_results_locally() {
        let (_dir, mut store) = store();
        let mut explorer = Explorer::new(FakeSource::new(world()));
        explorer.set_search("fren", &mut store).unwrap();
        explorer.set_region(Region::Americas, &mut store).unwrap();

        let filtered = explorer.refresh().await;
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].cca3, "GUF");
        assert_eq!(explorer.source().region_calls.get(), 0);
    }

    #[tokio::test]
    async fn test_blank_search_falls_back_to_cache() {
        let (_dir, mut store) = store();
        let mut explorer = Explorer::new(FakeSource::new(world()));
        explorer.set_search("   ", &mut store).unwrap();

        assert_eq!(explorer.refresh().await.len(), 9);
        assert_eq!(explorer.source().name_calls.get(), 0);
    }

    #[tokio::test]
    async fn test_failed_initial_load_leaves_list_empty() {
        let mut source = FakeSource::new(world());
        source.fail_all = true;
        let mut explorer = Explorer::new(source);

        assert!(explorer.refresh().await.is_empty());
        assert_eq!(explorer.total_pages(), 0);
    }

    #[tokio::test]
    async fn test_failed_query_yields_empty_list() {
        let (_dir, mut store) = store();
        let mut source = FakeSource::new(world());
        source.fail_queries = true;
        let mut explorer = Explorer::new(source);
        explorer.set_region(Region::Asia, &mut store).unwrap();

        assert!(explorer.refresh().await.is_empty());
    }

    #[tokio::test]
    async fn test_stale_results_are_discarded() {
        let (_dir, mut store) = store();
        let mut explorer = Explorer::new(FakeSource::new(world()));
        explorer.load_all().await;

        explorer.set_region(Region::Asia, &mut store).unwrap();
        let slow = explorer.begin_query();
        let slow_results = explorer.run_query(&slow).await;

        explorer.set_region(Region::Europe, &mut store).unwrap();
        let fast = explorer.begin_query();
        let fast_results = explorer.run_query(&fast).await;

        assert!(explorer.apply(&fast, fast_results));
        assert!(!explorer.apply(&slow, slow_results));
        assert!(explorer.filtered().iter().all(|c| c.region == "Europe"));
    }

    #[tokio::test]
    async fn test_refresh_resets_page() {
        let many: Vec<Country> = (0..45)
            .map(|i| country(&format!("C{i:02}"), &format!("Country {i}"), "Europe"))
            .collect();
        let (_dir, mut store) = store();
        let mut explorer = Explorer::new(FakeSource::new(many));
        explorer.refresh().await;

        assert_eq!(explorer.total_pages(), 3);
        assert!(explorer.change_page(3));
        assert_eq!(explorer.current_page().items.len(), 5);
        assert!(!explorer.change_page(4));
        assert_eq!(explorer.page(), 3);

        explorer.set_region(Region::Europe, &mut store).unwrap();
        explorer.refresh().await;
        assert_eq!(explorer.page(), 1);
    }

    #[tokio::test]
    async fn test_filters_are_mirrored_and_restored() {
        let (_dir, mut store) = store();
        let mut explorer = Explorer::new(FakeSource::new(world()));
        explorer.set_search("Ja", &mut store).unwrap();
        explorer.set_region(Region::Asia, &mut store).unwrap();

        let reopened = LocalStore::open(store.path()).unwrap();
        let restored = Explorer::restore(FakeSource::new(world()), &reopened);
        assert_eq!(restored.search(), "Ja");
        assert_eq!(restored.region(), Region::Asia);

        explorer.set_search("", &mut store).unwrap();
        let reopened = LocalStore::open(store.path()).unwrap();
        assert_eq!(reopened.get(keys::SEARCH_TERM), None);
        assert_eq!(reopened.get(keys::REGION_FILTER), Some("Asia"));
    }

    #[tokio::test]
    async fn test_restore_ignores_unknown_region() {
        let (_dir, mut store) = store();
        store.set(keys::REGION_FILTER, "Atlantis").unwrap();

        let explorer = Explorer::restore(FakeSource::new(world()), &store);
        assert_eq!(explorer.region(), Region::All);
    }

    #[tokio::test]
    async fn test_lookup_prefers_cache_then_source() {
        let mut explorer = Explorer::new(FakeSource::new(world()));
        assert_eq!(explorer.lookup("jpn").await.unwrap().cca3, "JPN");

        explorer.load_all().await;
        assert_eq!(explorer.lookup("CAN").await.unwrap().common_name(), "Canada");
        assert!(explorer.lookup("XXX").await.is_none());
    }

    #[tokio::test]
    async fn test_suggestions_match_prefix_and_limit() {
        let mut explorer = Explorer::new(FakeSource::new(world()));
        explorer.load_all().await;

        let names: Vec<&str> = explorer
            .suggestions("fr", SUGGESTION_LIMIT)
            .into_iter()
            .map(Country::common_name)
            .collect();
        assert_eq!(names, vec!["France", "French Guiana"]);
        assert_eq!(explorer.suggestions("", SUGGESTION_LIMIT).len(), 0);
        assert_eq!(explorer.suggestions("a", 1).len(), 1);
    }

    #[tokio::test]
    async fn test_popular_picks_featured_codes_from_cache() {
        let mut explorer = Explorer::new(FakeSource::new(world()));
        assert!(explorer.popular().is_empty());

        explorer.load_all().await;
        let codes: Vec<&str> = explorer.popular().iter().map(|c| c.cca3.as_str()).collect();
        assert_eq!(codes, vec!["FRA", "JPN", "USA", "CAN"]);
    }
}
