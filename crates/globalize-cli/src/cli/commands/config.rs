//! Config command handlers.

use anyhow::{Context, Result};
use globalize_core::config;

pub fn path() {
    println!("{}", config::paths::config_path().display());
}

pub fn init() -> Result<()> {
    let config_path = config::paths::config_path();
    config::Config::init(&config_path)
        .with_context(|| format!("init config at {}", config_path.display()))?;
    println!("Created config at {}", config_path.display());
    Ok(())
}

pub fn set_photo_key(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        anyhow::bail!("Photo key cannot be empty");
    }
    let config_path = config::paths::config_path();
    config::Config::save_photo_key_to(&config_path, key)
        .with_context(|| format!("save photo key to {}", config_path.display()))?;
    println!("Saved photo key to {}", config_path.display());
    Ok(())
}
