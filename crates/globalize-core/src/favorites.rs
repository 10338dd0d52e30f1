//! Favorite countries, persisted under the `favorites` storage key.

use anyhow::Result;

use crate::auth::Authenticator;
use crate::country::Country;
use crate::storage::{LocalStore, keys};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// Not signed in; nothing changed
    Refused,
}

/// Ordered set of country records, unique by `cca3`.
#[derive(Debug, Clone, Default)]
pub struct Favorites {
    items: Vec<Country>,
}

impl Favorites {
    /// Loads the saved favorites. Duplicate codes keep their first entry.
    pub fn load(store: &LocalStore) -> Self {
        let saved: Vec<Country> = store.get_json(keys::FAVORITES).unwrap_or_default();
        let mut favorites = Self::default();
        for country in saved {
            if !favorites.is_favorite(&country.cca3) {
                favorites.items.push(country);
            }
        }
        favorites
    }

    /// Adds or removes `country`. Refused unless `auth` reports a signed-in user.
    pub fn toggle<A: Authenticator>(
        &mut self,
        country: &Country,
        auth: &A,
        store: &mut LocalStore,
    ) -> Result<ToggleOutcome> {
        if !auth.is_authenticated() {
            return Ok(ToggleOutcome::Refused);
        }

        let outcome = match self.position(&country.cca3) {
            Some(index) => {
                self.items.remove(index);
                ToggleOutcome::Removed
            }
            None => {
                self.items.push(country.clone());
                ToggleOutcome::Added
            }
        };
        store.set_json(keys::FAVORITES, &self.items)?;
        tracing::debug!(code = %country.cca3, ?outcome, count = self.count(), "favorites updated");
        Ok(outcome)
    }

    pub fn is_favorite(&self, code: &str) -> bool {
        self.position(code).is_some()
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn list(&self) -> &[Country] {
        &self.items
    }

    fn position(&self, code: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|c| c.cca3.eq_ignore_ascii_case(code))
    }
}
