use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;

use crate::{
    error::{AuthError, Result},
    types::{AuthorizationRequest, Credentials, TokenBundle},
};

/// Source of the current unix time in seconds.
pub trait Clock {
    fn now(&self) -> i64;
}

/// Wall clock backed by `chrono::Utc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        now_timestamp()
    }
}

impl<F: Fn() -> i64> Clock for F {
    fn now(&self) -> i64 {
        self()
    }
}

pub fn now_timestamp() -> i64 {
    Utc::now().timestamp()
}

/// A bundle is fresh strictly before `issued_at + expires_in`.
pub fn is_fresh(bundle: &TokenBundle, now: i64) -> bool {
    now < bundle.expires_at()
}

/// Builds the authorization URL with parameters in a fixed order:
/// `client_id`, `response_type`, `redirect_uri`, `state`, `scope`, `show_dialog`.
///
/// Absent optional parameters are left out entirely rather than sent empty.
pub fn build_authorize_url(base_url: &str, request: &AuthorizationRequest) -> Result<String> {
    let client_id = required(&request.client_id, "client_id")?;
    let response_type = required(&request.response_type, "response_type")?;
    let redirect_uri = required(&request.redirect_uri, "redirect_uri")?;

    let mut params: Vec<(&str, &str)> = vec![
        ("client_id", client_id),
        ("response_type", response_type),
        ("redirect_uri", redirect_uri),
    ];
    if let Some(state) = request.state.as_deref() {
        params.push(("state", state));
    }
    if let Some(scope) = request.scope.as_deref() {
        params.push(("scope", scope));
    }
    let show_dialog = request.show_dialog.map(|v| v.to_string());
    if let Some(show_dialog) = show_dialog.as_deref() {
        params.push(("show_dialog", show_dialog));
    }

    // Every value is encoded, not only redirect_uri and scope. Alphanumeric
    // client ids, states and show_dialog come out unchanged.
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let separator = if base_url.contains('?') { '&' } else { '?' };
    Ok(format!("{base_url}{separator}{query}"))
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str> {
    match value.as_deref() {
        Some(v) => Ok(v),
        None => Err(AuthError::missing(field)),
    }
}

/// `Authorization` header value for the refresh exchange.
pub fn basic_authorization(credentials: &Credentials) -> String {
    let raw = format!("{}:{}", credentials.client_id, credentials.client_secret);
    format!("Basic {}", STANDARD.encode(raw))
}

/// Shortens a token for display, keeping only its first characters.
pub fn mask_token(token: &str) -> String {
    let visible: String = token.chars().take(6).collect();
    if visible.len() == token.len() {
        "*".repeat(token.len())
    } else {
        format!("{visible}…")
    }
}

/// Loopback `host:port` the callback listener binds, taken from the redirect URI.
pub fn callback_address(redirect_uri: &str) -> Result<String> {
    let url = reqwest::Url::parse(redirect_uri)
        .map_err(|e| AuthError::Configuration(format!("invalid redirect_uri {redirect_uri}: {e}")))?;
    let host = url
        .host_str()
        .ok_or_else(|| AuthError::Configuration(format!("redirect_uri {redirect_uri} has no host")))?;
    let port = url.port_or_known_default().ok_or_else(|| {
        AuthError::Configuration(format!("redirect_uri {redirect_uri} has no port"))
    })?;
    Ok(format!("{host}:{port}"))
}
