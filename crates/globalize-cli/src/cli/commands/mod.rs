//! CLI command handlers.

use anyhow::{Context, Result};
use globalize_core::auth::{AuthError, SessionAuth};
use globalize_core::config::Config;
use globalize_core::storage::LocalStore;

pub mod auth;
pub mod config;
pub mod convert;
pub mod countries;
pub mod favorites;
pub mod theme;

pub(crate) fn open_store() -> Result<LocalStore> {
    LocalStore::open_default().context("open local storage")
}

/// Builds the session client and resolves whether the cached session is valid.
pub(crate) async fn signed_in_session(
    config: &Config,
    store: &mut LocalStore,
) -> Result<SessionAuth> {
    let mut auth = SessionAuth::from_config(config).context("load session")?;
    auth.refresh(store).await?;
    Ok(auth)
}

/// Prints account-service failures and swallows them; anything else propagates.
pub(crate) fn report_auth_error(err: anyhow::Error, action: &str) -> Result<()> {
    match err.downcast_ref::<AuthError>() {
        Some(auth_err) => {
            eprintln!("{action} failed: {auth_err}");
            Ok(())
        }
        None => Err(err),
    }
}

/// Reads a password from the flag or, failing that, one line of stdin.
pub(crate) fn password_or_prompt(password: Option<String>) -> Result<String> {
    use std::io::{self, BufRead, Write};

    if let Some(password) = password {
        return Ok(password);
    }
    print!("Password: ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    let password = input.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        anyhow::bail!("Password cannot be empty");
    }
    Ok(password)
}
