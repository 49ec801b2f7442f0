use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    config::Settings,
    error, info,
    spotify::{CachedToken, TokenOrigin},
    success, warning,
};

/// Makes sure a usable token is cached, logging in through the browser if
/// needed. With `force` the cache is ignored and a new login always happens.
pub async fn auth(settings: &Settings, force: bool) {
    let client = match settings.client() {
        Ok(client) => client,
        Err(e) => error!("Cannot set up the OAuth client. Err: {}", e),
    };

    // The browser login prints its own prompts, so the spinner only covers
    // the cache check and refresh.
    let result = if force {
        client.login().await
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_message("Checking cached token...");
        if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
            pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        let cached = client.cached_token().await;
        pb.finish_and_clear();

        match cached {
            Ok(CachedToken::Ready(resolved)) => Ok(resolved),
            Ok(CachedToken::NeedsLogin(refresh_error)) => {
                if let Some(e) = refresh_error {
                    warning!("Token refresh failed, authorizing again: {}", e);
                }
                client.login().await
            }
            Err(e) => Err(e),
        }
    };

    match result {
        Ok(resolved) => {
            match resolved.origin {
                TokenOrigin::Cache => info!("Cached token is still valid."),
                TokenOrigin::Refreshed => info!("Token refreshed."),
                TokenOrigin::Authorized => info!("New token obtained."),
            }
            success!(
                "Authentication successful! Token cached in {}",
                client.cache().path().display()
            );
        }
        Err(e) => error!("Authentication failed. Err: {}", e),
    }
}

/// Prints the bare access token to stdout for use by other tools.
pub async fn token(settings: &Settings) {
    let client = match settings.client() {
        Ok(client) => client,
        Err(e) => error!("Cannot set up the OAuth client. Err: {}", e),
    };

    match client.access_token().await {
        Ok(token) => println!("{}", token),
        Err(e) => error!("Cannot obtain an access token. Err: {}", e),
    }
}

/// Prints the authorization URL without starting a login.
pub fn url(settings: &Settings) {
    match crate::utils::build_authorize_url(
        &settings.authorize_url,
        &settings.authorization_request(),
    ) {
        Ok(url) => println!("{}", url),
        Err(e) => error!("Cannot build the authorization URL. Err: {}", e),
    }
}
