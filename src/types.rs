use std::fmt;

use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::error::{AuthError, Result};

/// Token set obtained from the token endpoint plus the local issuance time.
///
/// `issued_at` is a unix timestamp in seconds recorded when the response
/// was received; the server never supplies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBundle {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: String,
    pub issued_at: i64,
}

impl TokenBundle {
    /// Unix timestamp at which the access token stops being fresh.
    pub fn expires_at(&self) -> i64 {
        self.issued_at
            .saturating_add(i64::try_from(self.expires_in).unwrap_or(i64::MAX))
    }
}

/// Token endpoint JSON body as sent by the authorization server.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl TokenResponse {
    pub fn into_bundle(self, issued_at: i64) -> TokenBundle {
        TokenBundle {
            access_token: self.access_token,
            token_type: self.token_type,
            expires_in: self.expires_in,
            refresh_token: self.refresh_token,
            scope: self.scope,
            issued_at,
        }
    }
}

/// Parameters of the browser-facing authorization request.
///
/// The three required fields are optional here so that a half-configured
/// request can exist; turning it into a URL fails on whichever is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub client_id: Option<String>,
    pub response_type: Option<String>,
    pub redirect_uri: Option<String>,
    pub state: Option<String>,
    pub scope: Option<String>,
    pub show_dialog: Option<bool>,
}

impl AuthorizationRequest {
    pub fn new(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            client_id: Some(client_id.into()),
            redirect_uri: Some(redirect_uri.into()),
            ..Self::default()
        }
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_show_dialog(mut self, show_dialog: bool) -> Self {
        self.show_dialog = Some(show_dialog);
        self
    }
}

impl Default for AuthorizationRequest {
    fn default() -> Self {
        Self {
            client_id: None,
            response_type: Some("code".to_string()),
            redirect_uri: None,
            state: None,
            scope: None,
            show_dialog: None,
        }
    }
}

/// Outcome of the redirect callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationResult {
    Code(String),
    Error(String),
}

impl AuthorizationResult {
    /// Converts a failed callback into [`AuthError::CallbackTimeout`].
    pub fn into_code(self) -> Result<String> {
        match self {
            AuthorizationResult::Code(code) => Ok(code),
            AuthorizationResult::Error(reason) => Err(AuthError::CallbackTimeout(reason)),
        }
    }
}

/// Application credentials registered with the authorization server.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Tabled)]
pub struct TokenStatusRow {
    pub field: String,
    pub value: String,
}
