//! Cookie-session authentication against the account backend.
//!
//! The session cookie is cached in `session.json` with restricted permissions
//! (0600). Cookies and passwords are never logged or displayed.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use reqwest::header::{COOKIE, HeaderMap, SET_COOKIE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::{Config, paths};
use crate::storage::{LocalStore, keys};

/// Capability interface for whoever decides if the user is signed in.
#[allow(async_fn_in_trait)]
pub trait Authenticator {
    fn is_authenticated(&self) -> bool;

    fn current_user(&self) -> Option<&UserProfile>;

    async fn sign_in(
        &mut self,
        credentials: &Credentials,
        store: &mut LocalStore,
    ) -> Result<UserProfile>;

    async fn sign_out(&mut self, store: &mut LocalStore) -> Result<()>;
}

/// Authentication failures reported to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The backend refused the request and said why
    Rejected(String),
    /// The operation needs a signed-in session
    NotSignedIn,
    /// The backend could not be reached
    Network(String),
    /// The backend answered with a server-side failure status
    Unavailable(StatusCode),
    /// The backend answered with something unreadable
    Parse(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Rejected(message) => write!(f, "{message}"),
            AuthError::NotSignedIn => write!(f, "Not signed in. Run `globalize login` first."),
            AuthError::Network(details) => {
                write!(f, "Could not reach account service: {details}")
            }
            AuthError::Unavailable(status) => {
                write!(f, "Account service unavailable (HTTP {status})")
            }
            AuthError::Parse(details) => {
                write!(f, "Unexpected account service response: {details}")
            }
        }
    }
}

impl std::error::Error for AuthError {}

#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Account details as returned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    #[serde(alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Editable profile fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    pub address: String,
    pub country: String,
}

impl ProfileUpdate {
    /// Starts from the current profile so unset fields keep their values.
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            name: profile.name.clone(),
            email: profile.email.clone(),
            address: profile.address.clone().unwrap_or_default(),
            country: profile.country.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum AuthState {
    /// No check against the backend has happened yet
    #[default]
    Unknown,
    SignedIn(UserProfile),
    SignedOut,
}

/// Session cookie cache persisted between runs.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SessionCache {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl SessionCache {
    pub fn cache_path() -> PathBuf {
        paths::session_path()
    }

    /// Loads the cache, or an empty one if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read session from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse session from {}", path.display()))
    }

    /// Saves the cache with restricted permissions (0600).
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(self).context("Failed to serialize session")?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options
            .open(path)
            .with_context(|| format!("Failed to open {} for writing", path.display()))?;
        file.write_all(contents.as_bytes())
            .with_context(|| format!("Failed to write to {}", path.display()))
    }

    pub fn clear(path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => {
                Err(err).with_context(|| format!("Failed to remove session {}", path.display()))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    #[serde(default)]
    success: bool,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    #[serde(default)]
    success: bool,
    message: Option<String>,
    user: Option<LoginUser>,
}

#[derive(Debug, Deserialize)]
struct LoginUser {
    #[serde(alias = "_id")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct UserDataBody {
    #[serde(default)]
    success: bool,
    message: Option<String>,
    #[serde(rename = "userData")]
    user_data: Option<UserProfile>,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
    #[serde(rename = "rememberMe")]
    remember_me: bool,
}

/// `Authenticator` backed by the cookie-session account service.
pub struct SessionAuth {
    base_url: String,
    http: reqwest::Client,
    cache_path: PathBuf,
    cache: SessionCache,
    state: AuthState,
}

impl SessionAuth {
    pub fn new(
        base_url: impl Into<String>,
        http: reqwest::Client,
        cache_path: PathBuf,
    ) -> Result<Self> {
        let cache = SessionCache::load_from(&cache_path)?;
        Ok(Self {
            base_url: base_url.into(),
            http,
            cache_path,
            cache,
            state: AuthState::Unknown,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.auth_url()?,
            config.http_client()?,
            SessionCache::cache_path(),
        )
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    /// Whether a session cookie is cached (not whether it is still valid).
    pub fn has_cached_session(&self) -> bool {
        self.cache.cookie.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn with_cookie(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.cache.cookie.as_deref() {
            Some(cookie) => request.header(COOKIE, cookie),
            None => request,
        }
    }

    /// Resolves the session state from the cached cookie.
    ///
    /// Only a 401 or a `success: false` answer clears the cached session. Any
    /// other failure reads as signed out for this run and keeps the cache.
    pub async fn refresh(&mut self, store: &mut LocalStore) -> Result<&AuthState> {
        if self.cache.cookie.is_none() {
            self.state = AuthState::SignedOut;
            return Ok(&self.state);
        }

        match self.fetch_profile().await {
            Ok(profile) => {
                self.state = AuthState::SignedIn(profile);
            }
            Err(err @ (AuthError::NotSignedIn | AuthError::Rejected(_))) => {
                tracing::debug!(error = %err, "cached session rejected");
                self.clear_local(store)?;
            }
            Err(err) => {
                tracing::warn!(error = %err, "could not verify cached session");
                self.state = AuthState::SignedOut;
            }
        }
        Ok(&self.state)
    }

    /// Creates an account. Does not sign in.
    pub async fn register(
        &self,
        name: &str,
        credentials: &Credentials,
        remember_me: bool,
    ) -> Result<Option<String>> {
        let request = RegisterRequest {
            name,
            email: &credentials.email,
            password: &credentials.password,
            remember_me,
        };
        let response = self
            .http
            .post(self.url("/api/auth/register"))
            .json(&request)
            .send()
            .await
            .map_err(network_error)?;

        let (_, body) = read_body::<StatusBody>(response).await?;
        if !body.success {
            return Err(rejected(body.message, "Registration failed").into());
        }
        Ok(body.message)
    }

    /// Saves profile changes and returns the updated profile.
    pub async fn update_profile(&mut self, update: &ProfileUpdate) -> Result<UserProfile> {
        let AuthState::SignedIn(current) = &self.state else {
            return Err(AuthError::NotSignedIn.into());
        };
        let current = current.clone();

        let response = self
            .with_cookie(self.http.put(self.url("/api/user/profile")))
            .json(update)
            .send()
            .await
            .map_err(network_error)?;

        let (status, body) = read_body::<UserDataBody>(response).await?;
        if status == StatusCode::UNAUTHORIZED {
            return Err(AuthError::NotSignedIn.into());
        }
        if !body.success {
            return Err(rejected(body.message, "Profile update failed").into());
        }

        let updated = body.user_data.unwrap_or_else(|| UserProfile {
            id: current.id.clone(),
            name: update.name.clone(),
            email: update.email.clone(),
            address: Some(update.address.clone()),
            country: Some(update.country.clone()),
        });
        self.state = AuthState::SignedIn(updated.clone());
        Ok(updated)
    }

    async fn fetch_profile(&self) -> Result<UserProfile, AuthError> {
        let response = self
            .with_cookie(self.http.get(self.url("/api/user/data")))
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(AuthError::NotSignedIn);
        }
        if !status.is_success() {
            return Err(AuthError::Unavailable(status));
        }
        let (_, body) = read_body::<UserDataBody>(response).await?;
        match (body.success, body.user_data) {
            (true, Some(profile)) => Ok(profile),
            (true, None) => Err(AuthError::Parse("missing userData".to_string())),
            (false, _) => Err(rejected(body.message, "Session rejected")),
        }
    }

    fn clear_local(&mut self, store: &mut LocalStore) -> Result<()> {
        self.cache = SessionCache::default();
        self.state = AuthState::SignedOut;
        SessionCache::clear(&self.cache_path)?;
        store.remove(keys::USER_ID)
    }
}

impl Authenticator for SessionAuth {
    fn is_authenticated(&self) -> bool {
        matches!(self.state, AuthState::SignedIn(_))
    }

    fn current_user(&self) -> Option<&UserProfile> {
        match &self.state {
            AuthState::SignedIn(profile) => Some(profile),
            _ => None,
        }
    }

    async fn sign_in(
        &mut self,
        credentials: &Credentials,
        store: &mut LocalStore,
    ) -> Result<UserProfile> {
        let response = self
            .http
            .post(self.url("/api/auth/login"))
            .json(credentials)
            .send()
            .await
            .map_err(network_error)?;

        let cookie = session_cookie(response.headers());
        let (_, body) = read_body::<LoginBody>(response).await?;
        if !body.success {
            return Err(rejected(body.message, "Login failed").into());
        }
        let Some(cookie) = cookie else {
            return Err(AuthError::Parse("login response set no session cookie".to_string()).into());
        };

        let user_id = body.user.map(|user| user.id);
        self.cache = SessionCache {
            cookie: Some(cookie),
            user_id: user_id.clone(),
        };
        self.cache.save_to(&self.cache_path)?;
        if let Some(id) = &user_id {
            store.set(keys::USER_ID, id.as_str())?;
        }

        let profile = match self.fetch_profile().await {
            Ok(profile) => profile,
            Err(err) => {
                tracing::warn!(error = %err, "signed in but failed to load profile");
                UserProfile {
                    id: user_id,
                    email: credentials.email.clone(),
                    ..UserProfile::default()
                }
            }
        };
        self.state = AuthState::SignedIn(profile.clone());
        Ok(profile)
    }

    async fn sign_out(&mut self, store: &mut LocalStore) -> Result<()> {
        if self.cache.cookie.is_some() {
            let result = self
                .with_cookie(self.http.post(self.url("/api/auth/logout")))
                .send()
                .await;
            match result {
                Ok(response) if !response.status().is_success() => {
                    tracing::warn!(status = %response.status(), "logout request failed");
                }
                Err(err) => tracing::warn!(error = %err, "logout request failed"),
                Ok(_) => {}
            }
        }
        self.clear_local(store)
    }
}

fn network_error(err: reqwest::Error) -> AuthError {
    AuthError::Network(err.to_string())
}

fn rejected(message: Option<String>, fallback: &str) -> AuthError {
    AuthError::Rejected(
        message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string()),
    )
}

/// Reads a JSON body regardless of status; non-2xx bodies still carry `message`.
async fn read_body<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<(StatusCode, T), AuthError> {
    let status = response.status();
    let text = response.text().await.map_err(network_error)?;
    match serde_json::from_str(&text) {
        Ok(body) => Ok((status, body)),
        Err(_) if !status.is_success() => Err(AuthError::Rejected(format!("HTTP {status}"))),
        Err(err) => Err(AuthError::Parse(err.to_string())),
    }
}

/// Joins the `name=value` pairs of every `Set-Cookie` header.
fn session_cookie(headers: &HeaderMap) -> Option<String> {
    let pairs: Vec<&str> = headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .map(str::trim)
        .filter(|pair| pair.contains('='))
        .collect();
    (!pairs.is_empty()).then(|| pairs.join("; "))
}
