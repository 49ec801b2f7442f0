//! Configuration management for spotauth.
//!
//! Settings come from environment variables. Before they are read,
//! [`load_env`] merges a `.env` file from the platform data directory into the
//! process environment; variables already set in the environment win.
//!
//! | Variable                | Default                                   |
//! |-------------------------|-------------------------------------------|
//! | `SPOTIFY_CLIENT_ID`     | required                                  |
//! | `SPOTIFY_CLIENT_SECRET` | required                                  |
//! | `SPOTIFY_REDIRECT_URI`  | `http://127.0.0.1:8000`                   |
//! | `SPOTIFY_SCOPE`         | unset                                     |
//! | `SPOTIFY_STATE`         | unset                                     |
//! | `SPOTIFY_SHOW_DIALOG`   | unset (`true` / `false`)                  |
//! | `SPOTIFY_AUTH_URL`      | `https://accounts.spotify.com/authorize/` |
//! | `SPOTIFY_TOKEN_URL`     | `https://accounts.spotify.com/api/token`  |
//! | `CALLBACK_ADDRESS`      | host and port of the redirect URI         |
//! | `TOKEN_CACHE_PATH`      | `oauth_token.json`                        |
//! | `HTTP_TIMEOUT_SECS`     | `30`                                      |

use std::{env, path::PathBuf, time::Duration};

use crate::{
    error::{AuthError, Result},
    management::{DEFAULT_CACHE_FILE, TokenCache},
    spotify::{
        DEFAULT_AUTHORIZE_URL, DEFAULT_TOKEN_URL, HttpTokenExchanger, OAuth2Client,
        token::DEFAULT_CONNECT_TIMEOUT, token::DEFAULT_REQUEST_TIMEOUT,
    },
    types::{AuthorizationRequest, Credentials},
};

pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8000";

/// Path of the `.env` file: `<data_local_dir>/spotauth/.env`.
///
/// - Linux: `~/.local/share/spotauth/.env`
/// - macOS: `~/Library/Application Support/spotauth/.env`
/// - Windows: `%LOCALAPPDATA%/spotauth/.env`
pub fn env_file_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spotauth/.env");
    path
}

/// Loads the `.env` file if there is one. A missing file is fine; a file that
/// cannot be parsed is a configuration error.
pub async fn load_env() -> Result<()> {
    let path = env_file_path();
    if !path.is_file() {
        return Ok(());
    }

    dotenv::from_path(&path)
        .map_err(|e| AuthError::Configuration(format!("cannot load {}: {}", path.display(), e)))
}

/// Everything needed to build an [`OAuth2Client`].
#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: Credentials,
    pub redirect_uri: String,
    pub scope: Option<String>,
    pub state: Option<String>,
    pub show_dialog: Option<bool>,
    pub authorize_url: String,
    pub token_url: String,
    pub callback_address: Option<String>,
    pub cache_path: PathBuf,
    pub request_timeout: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through `lookup`; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| get(key).ok_or_else(|| AuthError::missing(key));

        let show_dialog = match get("SPOTIFY_SHOW_DIALOG") {
            None => None,
            Some(v) => Some(parse_bool(&v).ok_or_else(|| {
                AuthError::Configuration(format!("SPOTIFY_SHOW_DIALOG must be true or false, got {v}"))
            })?),
        };

        let request_timeout = match get("HTTP_TIMEOUT_SECS") {
            None => DEFAULT_REQUEST_TIMEOUT,
            Some(v) => Duration::from_secs(v.trim().parse().map_err(|_| {
                AuthError::Configuration(format!("HTTP_TIMEOUT_SECS must be a number, got {v}"))
            })?),
        };

        Ok(Settings {
            credentials: Credentials::new(
                require("SPOTIFY_CLIENT_ID")?,
                require("SPOTIFY_CLIENT_SECRET")?,
            ),
            redirect_uri: get("SPOTIFY_REDIRECT_URI")
                .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string()),
            scope: get("SPOTIFY_SCOPE"),
            state: get("SPOTIFY_STATE"),
            show_dialog,
            authorize_url: get("SPOTIFY_AUTH_URL")
                .unwrap_or_else(|| DEFAULT_AUTHORIZE_URL.to_string()),
            token_url: get("SPOTIFY_TOKEN_URL").unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
            callback_address: get("CALLBACK_ADDRESS"),
            cache_path: cache_path(&lookup),
            request_timeout,
        })
    }

    pub fn authorization_request(&self) -> AuthorizationRequest {
        AuthorizationRequest {
            client_id: Some(self.credentials.client_id.clone()),
            redirect_uri: Some(self.redirect_uri.clone()),
            state: self.state.clone(),
            scope: self.scope.clone(),
            show_dialog: self.show_dialog,
            ..AuthorizationRequest::default()
        }
    }

    pub fn client(&self) -> Result<OAuth2Client> {
        let exchanger = HttpTokenExchanger::with_timeouts(
            &self.token_url,
            DEFAULT_CONNECT_TIMEOUT,
            self.request_timeout,
        )?;

        let client = OAuth2Client::new(
            self.authorization_request(),
            self.credentials.clone(),
            TokenCache::new(&self.cache_path),
        )?
        .with_exchanger(exchanger)
        .with_authorize_url(&self.authorize_url);

        Ok(match &self.callback_address {
            Some(addr) => client.with_callback_address(addr),
            None => client,
        })
    }
}

/// Token cache location from `TOKEN_CACHE_PATH`, falling back to
/// [`DEFAULT_CACHE_FILE`] when the variable is unset or blank.
pub fn cache_path<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    lookup("TOKEN_CACHE_PATH")
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_FILE))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
