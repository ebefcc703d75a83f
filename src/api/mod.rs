//! # API Module
//!
//! HTTP handlers served by the short-lived local listener during
//! authorization.
//!
//! - [`callback`] - Receives the OAuth redirect, checks `state` and exchanges
//!   the authorization code for a token.
//! - [`health`] - Reports status and version.
//!
//! The handlers are wired up in [`crate::server::callback_router`].

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
