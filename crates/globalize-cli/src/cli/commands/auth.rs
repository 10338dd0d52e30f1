//! Account command handlers.

use anyhow::{Context, Result};
use globalize_core::auth::{
    AuthState, Authenticator, Credentials, ProfileUpdate, SessionAuth, SessionCache,
};
use globalize_core::config::Config;

use super::{open_store, password_or_prompt, report_auth_error, signed_in_session};

pub struct ProfileEdits {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
}

impl ProfileEdits {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.address.is_none()
            && self.country.is_none()
    }
}

pub async fn login(config: &Config, email: &str, password: Option<String>) -> Result<()> {
    let credentials = Credentials {
        email: email.trim().to_string(),
        password: password_or_prompt(password)?,
    };
    let mut store = open_store()?;
    let mut auth = SessionAuth::from_config(config).context("load session")?;

    match auth.sign_in(&credentials, &mut store).await {
        Ok(profile) => {
            println!("✓ Logged in as {}", display_user(&profile.name, &profile.email));
            println!("  Session saved to: {}", SessionCache::cache_path().display());
            Ok(())
        }
        Err(err) => report_auth_error(err, "Login"),
    }
}

pub async fn register(
    config: &Config,
    name: &str,
    email: &str,
    password: Option<String>,
    remember_me: bool,
) -> Result<()> {
    let credentials = Credentials {
        email: email.trim().to_string(),
        password: password_or_prompt(password)?,
    };
    let auth = SessionAuth::from_config(config).context("load session")?;

    match auth.register(name.trim(), &credentials, remember_me).await {
        Ok(message) => {
            println!("✓ {}", message.as_deref().unwrap_or("Account created"));
            println!("  Log in with: globalize login --email {}", credentials.email);
            Ok(())
        }
        Err(err) => report_auth_error(err, "Registration"),
    }
}

pub async fn logout(config: &Config) -> Result<()> {
    let mut store = open_store()?;
    let mut auth = SessionAuth::from_config(config).context("load session")?;
    if !auth.has_cached_session() {
        println!("Not logged in.");
        return Ok(());
    }
    auth.sign_out(&mut store).await?;
    println!("✓ Logged out");
    Ok(())
}

pub async fn whoami(config: &Config) -> Result<()> {
    let mut store = open_store()?;
    let auth = signed_in_session(config, &mut store).await?;
    match auth.state() {
        AuthState::SignedIn(profile) => {
            println!("Logged in as {}", display_user(&profile.name, &profile.email));
        }
        _ => println!("Not logged in."),
    }
    Ok(())
}

pub async fn profile(config: &Config, edits: ProfileEdits) -> Result<()> {
    let mut store = open_store()?;
    let mut auth = signed_in_session(config, &mut store).await?;
    let Some(current) = auth.current_user().cloned() else {
        eprintln!("Log in to manage your profile (globalize login --email <EMAIL>).");
        return Ok(());
    };

    if edits.is_empty() {
        println!("Name:    {}", or_dash(&current.name));
        println!("Email:   {}", or_dash(&current.email));
        println!("Address: {}", or_dash(current.address.as_deref().unwrap_or_default()));
        println!("Country: {}", or_dash(current.country.as_deref().unwrap_or_default()));
        return Ok(());
    }

    let mut update = ProfileUpdate::from_profile(&current);
    if let Some(name) = edits.name {
        update.name = name;
    }
    if let Some(email) = edits.email {
        update.email = email;
    }
    if let Some(address) = edits.address {
        update.address = address;
    }
    if let Some(country) = edits.country {
        update.country = country;
    }

    match auth.update_profile(&update).await {
        Ok(updated) => {
            println!("✓ Profile updated for {}", display_user(&updated.name, &updated.email));
            Ok(())
        }
        Err(err) => report_auth_error(err, "Profile update"),
    }
}

fn display_user(name: &str, email: &str) -> String {
    match (name.trim().is_empty(), email.trim().is_empty()) {
        (false, false) => format!("{name} <{email}>"),
        (false, true) => name.to_string(),
        (true, _) => email.to_string(),
    }
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() { "-" } else { value }
}
