//! Error types for the authentication core.
//!
//! Every failure the core can produce is a variant of [`AuthError`]. Only one
//! of them is ever recovered internally: a failed refresh exchange, which the
//! [`crate::spotify::OAuth2Client`] downgrades to a full browser authorization.
//! Everything else is surfaced to the caller untouched, and nothing is retried.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = AuthError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum AuthError {
    /// A required parameter or setting is missing or malformed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Network failure (including timeouts) while talking to the token endpoint.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The token endpoint answered with a non-2xx status or an unusable body.
    #[error("authorization server returned {status}: {body}")]
    AuthServer { status: u16, body: String },

    /// The callback listener used up its attempt budget without a code.
    #[error("authorization callback failed: {0}")]
    CallbackTimeout(String),

    /// Another flow (or program) already owns the loopback callback address.
    #[error("callback address {0} is already in use")]
    PortInUse(String),

    /// The listening socket itself failed.
    #[error("callback listener error: {0}")]
    Listener(#[source] std::io::Error),

    /// The cache file exists but does not hold a token bundle.
    #[error("token cache {path} is corrupt: {source}")]
    CacheCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The cache file could not be read, written or removed.
    #[error("token cache {path} is not accessible: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AuthError {
    pub(crate) fn missing(field: &str) -> Self {
        AuthError::Configuration(format!("{field} is required"))
    }

    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AuthError::Storage {
            path: path.into(),
            source,
        }
    }
}
