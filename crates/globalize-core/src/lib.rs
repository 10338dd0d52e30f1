//! Core Globalize library (country data, explorer state, favorites, accounts, config).

pub mod auth;
pub mod config;
pub mod country;
pub mod explorer;
pub mod favorites;
pub mod logging;
pub mod pagination;
pub mod prefs;
pub mod sources;
pub mod storage;
