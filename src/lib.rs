//! spotauth library
//!
//! OAuth2 Authorization Code login for the Spotify accounts service. The user's
//! browser is sent to the authorization page, a one-shot loopback listener
//! catches the redirect, the code is exchanged for tokens, and the tokens are
//! cached on disk so later runs can reuse or refresh them silently.
//!
//! # Modules
//!
//! - `api` - Handling of the single redirect request and its HTML reply
//! - `cli` - Command-line command implementations
//! - `config` - Environment and `.env` configuration
//! - `error` - Typed errors for every failure the core surfaces
//! - `management` - On-disk token cache
//! - `server` - Bounded loopback callback listener
//! - `spotify` - Token endpoint exchanges and the client orchestrator
//! - `types` - Token bundle, authorization request and credentials
//! - `utils` - URL construction, freshness and small helpers
//!
//! # Example
//!
//! ```
//! use spotauth::config;
//!
//! #[tokio::main]
//! async fn main() -> spotauth::error::Result<()> {
//!     config::load_env().await?;
//!     let client = config::Settings::from_env()?.client()?;
//!     let token = client.access_token().await?;
//!     // Attach `token` as a Bearer credential to API requests...
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

pub use error::{AuthError, Result};

/// Prints an informational message with a blue bullet point.
///
/// Status output goes to stderr so that stdout carries only data such as the
/// token printed by `spotauth token`.
///
/// # Example
///
/// ```
/// info!("Waiting for the authorization redirect on {}", addr);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Authentication successful!");
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Terminates with exit code 1 right after printing. Only the command-line
/// layer uses it; library code returns errors instead.
///
/// # Example
///
/// ```
/// error!("Cannot load environment. Err: {}", e);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable problems, e.g. a failed token refresh that falls back
/// to a browser login.
///
/// # Example
///
/// ```
/// warning!("Token refresh failed, authorizing again: {}", e);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
