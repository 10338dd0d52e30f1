//! Configuration management for Globalize.
//!
//! Loads configuration from ${GLOBALIZE_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default config template with comments, embedded at compile time.
const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("default_config.toml");

pub mod paths {
    //! Path resolution for Globalize configuration and data files.
    //!
    //! GLOBALIZE_HOME resolution order:
    //! 1. GLOBALIZE_HOME environment variable (if set)
    //! 2. ~/.config/globalize (default)

    use std::path::PathBuf;

    /// Returns the Globalize home directory.
    pub fn globalize_home() -> PathBuf {
        if let Ok(home) = std::env::var("GLOBALIZE_HOME")
            && !home.trim().is_empty()
        {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("globalize"))
            .unwrap_or_else(|| PathBuf::from(".globalize"))
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        globalize_home().join("config.toml")
    }

    /// Returns the path to the persisted key/value store.
    pub fn storage_path() -> PathBuf {
        globalize_home().join("storage.json")
    }

    /// Returns the path to the cached session cookie.
    pub fn session_path() -> PathBuf {
        globalize_home().join("session.json")
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Country data API base URL
    pub countries_base_url: Option<String>,

    /// Photo search API base URL
    pub photos_base_url: Option<String>,

    /// Exchange rate API base URL
    pub rates_base_url: Option<String>,

    /// Session backend base URL
    pub auth_base_url: Option<String>,

    /// Encyclopedia API base URL for country summaries
    pub wiki_base_url: Option<String>,

    /// Unsplash access key (falls back to UNSPLASH_ACCESS_KEY)
    pub unsplash_access_key: Option<String>,

    /// Per-request HTTP timeout in seconds (0 disables)
    pub http_timeout_secs: u32,

    /// Require a signed-in session to view country details
    pub details_require_sign_in: bool,
}

impl Config {
    pub const DEFAULT_COUNTRIES_URL: &str = "https://restcountries.com/v3.1";
    pub const DEFAULT_PHOTOS_URL: &str = "https://api.unsplash.com";
    pub const DEFAULT_RATES_URL: &str = "https://api.exchangerate-api.com";
    pub const DEFAULT_AUTH_URL: &str = "http://localhost:4000";
    pub const DEFAULT_WIKI_URL: &str = "https://en.wikipedia.org";
    const DEFAULT_HTTP_TIMEOUT_SECS: u32 = 15;

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Saves only the Unsplash key to a specific config file path.
    ///
    /// Creates the file with default template if it doesn't exist.
    /// Preserves existing fields and comments using toml_edit.
    pub fn save_photo_key_to(path: &Path, key: &str) -> Result<()> {
        use toml_edit::{DocumentMut, value};

        let contents = if path.exists() {
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?
        } else {
            DEFAULT_CONFIG_TEMPLATE.to_string()
        };

        let mut doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        doc["unsplash_access_key"] = value(key.trim());

        Self::write_config(path, &doc.to_string())
    }

    pub fn countries_url(&self) -> Result<String> {
        resolve_url(
            env_value("GLOBALIZE_COUNTRIES_URL"),
            self.countries_base_url.as_deref(),
            Self::DEFAULT_COUNTRIES_URL,
        )
    }

    pub fn photos_url(&self) -> Result<String> {
        resolve_url(
            env_value("GLOBALIZE_PHOTOS_URL"),
            self.photos_base_url.as_deref(),
            Self::DEFAULT_PHOTOS_URL,
        )
    }

    pub fn rates_url(&self) -> Result<String> {
        resolve_url(
            env_value("GLOBALIZE_RATES_URL"),
            self.rates_base_url.as_deref(),
            Self::DEFAULT_RATES_URL,
        )
    }

    pub fn auth_url(&self) -> Result<String> {
        resolve_url(
            env_value("GLOBALIZE_AUTH_URL"),
            self.auth_base_url.as_deref(),
            Self::DEFAULT_AUTH_URL,
        )
    }

    pub fn wiki_url(&self) -> Result<String> {
        resolve_url(
            env_value("GLOBALIZE_WIKI_URL"),
            self.wiki_base_url.as_deref(),
            Self::DEFAULT_WIKI_URL,
        )
    }

    /// Returns the photo API key with precedence: config > env.
    /// Empty strings are treated as unset.
    pub fn photo_key(&self) -> Option<String> {
        self.unsplash_access_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .or_else(|| env_value("UNSPLASH_ACCESS_KEY"))
    }

    pub fn http_timeout(&self) -> Option<Duration> {
        if self.http_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(u64::from(self.http_timeout_secs)))
        }
    }

    /// Builds the shared HTTP client honoring the configured timeout.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.http_timeout() {
            builder = builder.timeout(timeout);
        }
        builder.build().context("Failed to build HTTP client")
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, DEFAULT_CONFIG_TEMPLATE)
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            countries_base_url: None,
            photos_base_url: None,
            rates_base_url: None,
            auth_base_url: None,
            wiki_base_url: None,
            unsplash_access_key: None,
            http_timeout_secs: Self::DEFAULT_HTTP_TIMEOUT_SECS,
            details_require_sign_in: true,
        }
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Picks env over config over default, skipping blank values.
/// Trailing slashes are dropped so paths can be appended with `/`.
fn resolve_url(env: Option<String>, config: Option<&str>, default: &str) -> Result<String> {
    let chosen = env
        .or_else(|| {
            config
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| default.to_string());

    url::Url::parse(&chosen).with_context(|| format!("Invalid base URL: {chosen}"))?;
    Ok(chosen.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nonexistent.toml");

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.http_timeout_secs, 15);
        assert!(config.details_require_sign_in);
        assert!(config.countries_base_url.is_none());
    }

    #[test]
    fn test_load_partial_config_merges_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(&config_path, "details_require_sign_in = false\n").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert!(!config.details_require_sign_in);
        assert_eq!(config.http_timeout_secs, 15);
    }

    #[test]
    fn test_default_template_parses_to_defaults() {
        let config: Config = toml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(
            config.countries_base_url.as_deref(),
            Some(Config::DEFAULT_COUNTRIES_URL)
        );
        assert_eq!(config.auth_base_url.as_deref(), Some(Config::DEFAULT_AUTH_URL));
        assert_eq!(config.wiki_base_url.as_deref(), Some(Config::DEFAULT_WIKI_URL));
        assert!(config.unsplash_access_key.is_none());
        assert!(config.details_require_sign_in);
    }

    #[test]
    fn test_init_creates_config_with_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("subdir").join("config.toml");

        Config::init(&config_path).unwrap();

        assert!(config_path.exists());
        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("restcountries.com"));
        assert!(contents.contains("http_timeout_secs"));
    }

    #[test]
    fn test_init_fails_if_exists() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(&config_path, "").unwrap();

        assert!(Config::init(&config_path).is_err());
    }

    #[test]
    fn test_timeout_zero_disables() {
        let config = Config {
            http_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.http_timeout(), None);
    }

    #[test]
    fn test_resolve_url_precedence() {
        let url = resolve_url(
            Some("http://env.example".to_string()),
            Some("http://config.example"),
            "http://default.example",
        )
        .unwrap();
        assert_eq!(url, "http://env.example");

        let url = resolve_url(None, Some("http://config.example/"), "http://default.example")
            .unwrap();
        assert_eq!(url, "http://config.example");

        let url = resolve_url(None, Some("   "), "http://default.example").unwrap();
        assert_eq!(url, "http://default.example");
    }

    #[test]
    fn test_resolve_url_rejects_garbage() {
        assert!(resolve_url(None, Some("not a url"), "http://default.example").is_err());
    }

    #[test]
    fn test_photo_key_from_config_ignores_blank() {
        let config = Config {
            unsplash_access_key: Some("  abc123  ".to_string()),
            ..Default::default()
        };
        assert_eq!(config.photo_key().as_deref(), Some("abc123"));
    }

    #[test]
    fn test_save_photo_key_creates_file_with_template() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        Config::save_photo_key_to(&config_path, "key-123").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.unsplash_access_key.as_deref(), Some("key-123"));

        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("# Globalize Configuration"));
    }

    #[test]
    fn test_save_photo_key_preserves_other_fields_and_comments() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(
            &config_path,
            r#"# My config
http_timeout_secs = 60
details_require_sign_in = false
"#,
        )
        .unwrap();

        Config::save_photo_key_to(&config_path, "new-key").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.unsplash_access_key.as_deref(), Some("new-key"));
        assert_eq!(config.http_timeout_secs, 60);
        assert!(!config.details_require_sign_in);
        assert!(fs::read_to_string(&config_path).unwrap().contains("# My config"));
    }
}
