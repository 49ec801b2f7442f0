use chrono::{DateTime, Utc};
use tabled::Table;

use crate::{
    error,
    management::TokenCache,
    success,
    types::TokenStatusRow,
    utils::{self, mask_token},
    warning,
};

/// Shows what the token cache currently holds. The access token is masked.
pub async fn status(cache: &TokenCache) {
    let bundle = match cache.load().await {
        Ok(Some(bundle)) => bundle,
        Ok(None) => {
            warning!(
                "No cached token at {}. Run spotauth auth.",
                cache.path().display()
            );
            return;
        }
        Err(e) => error!("Cannot read token cache. Err: {}", e),
    };

    let now = utils::now_timestamp();
    let fresh = utils::is_fresh(&bundle, now);
    let rows = vec![
        row("cache", cache.path().display().to_string()),
        row("access token", mask_token(&bundle.access_token)),
        row("token type", bundle.token_type.clone()),
        row("scope", bundle.scope.clone()),
        row("issued at", format_timestamp(bundle.issued_at)),
        row("expires at", format_timestamp(bundle.expires_at())),
        row(
            "state",
            if fresh {
                format!("valid ({}s left)", bundle.expires_at() - now)
            } else {
                "expired".to_string()
            },
        ),
        row(
            "refresh token",
            if bundle.refresh_token.is_some() {
                "present"
            } else {
                "absent"
            }
            .to_string(),
        ),
    ];

    println!("{}", Table::new(rows));
}

/// Removes the cached token so the next run logs in again.
pub async fn logout(cache: &TokenCache) {
    match cache.invalidate().await {
        Ok(()) => success!("Token cache {} cleared.", cache.path().display()),
        Err(e) => error!("Cannot clear token cache. Err: {}", e),
    }
}

fn row(field: &str, value: String) -> TokenStatusRow {
    TokenStatusRow {
        field: field.to_string(),
        value,
    }
}

fn format_timestamp(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| ts.to_string())
}
