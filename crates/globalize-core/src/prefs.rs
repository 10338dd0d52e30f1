//! Display preferences.

use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};

use crate::storage::{LocalStore, keys};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// The saved theme; missing or unknown values read as light.
    pub fn load(store: &LocalStore) -> Self {
        store
            .get(keys::THEME)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default()
    }

    pub fn save(self, store: &mut LocalStore) -> Result<()> {
        store.set(keys::THEME, self.as_str())
    }

    /// Flips the saved theme and returns the new one.
    pub fn toggle(store: &mut LocalStore) -> Result<Self> {
        let next = Self::load(store).toggled();
        next.save(store)?;
        Ok(next)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => bail!("Unknown theme '{other}'. Expected 'light' or 'dark'."),
        }
    }
}
