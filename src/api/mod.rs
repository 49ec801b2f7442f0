//! # API Module
//!
//! HTTP handling for the loopback redirect endpoint. The authorization server
//! sends the user's browser back to `redirect_uri` with either a `code` or an
//! `error` query parameter; [`callback`] reads that single request, answers it
//! with a small HTML page and reports what it found.
//!
//! The accept loop that drives it lives in [`crate::server`].

mod callback;

pub use callback::callback;
pub use callback::parse_callback;
