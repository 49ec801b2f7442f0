//! # CLI Module
//!
//! Command implementations behind the `spotauth` binary. Each command reports
//! progress with the crate's status macros and exits the process on failure.
//!
//! - [`auth`] - Ensure a valid token is cached, logging in through the browser if needed
//! - [`token`] - Print the bare access token to stdout
//! - [`url`] - Print the authorization URL
//! - [`status`] - Show cached token metadata
//! - [`logout`] - Delete the cached token
//!
//! ```bash
//! spotauth auth                 # first login, opens the browser
//! spotauth token                # reuse or refresh silently
//! spotauth status               # inspect the cache
//! spotauth logout               # forget the token
//! ```

mod auth;
mod cache;

pub use auth::auth;
pub use auth::token;
pub use auth::url;
pub use cache::logout;
pub use cache::status;
