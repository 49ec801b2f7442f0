//! # Spotify Accounts Module
//!
//! OAuth2 authorization-code client for the Spotify accounts service.
//!
//! ```text
//! OAuth2Client (auth)
//!     ├── TokenCache          load / save / invalidate
//!     ├── TokenExchanger      code -> token, refresh -> token (token)
//!     ├── Browser             opens the authorization URL
//!     └── CallbackListener    catches the redirect (crate::server)
//! ```
//!
//! [`auth::OAuth2Client`] owns the decision between the cached token, a
//! refresh, and a full browser login. [`token::HttpTokenExchanger`] performs the
//! two POST exchanges against `/api/token`:
//!
//! - authorization code: `client_id` and `client_secret` in the form body
//! - refresh token: `Authorization: Basic base64(client_id:client_secret)`
//!
//! Neither exchange is retried. Non-2xx answers come back as
//! [`crate::error::AuthError::AuthServer`] with the status and body intact.

pub mod auth;
pub mod token;

pub use auth::{
    Browser, CachedToken, DEFAULT_AUTHORIZE_URL, MAX_CALLBACK_ATTEMPTS, OAuth2Client, ResolvedToken,
    SystemBrowser, TokenOrigin,
};
pub use token::{DEFAULT_TOKEN_URL, HttpTokenExchanger, TokenExchanger};
