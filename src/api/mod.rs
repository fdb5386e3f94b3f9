//! # API Module
//!
//! HTTP endpoints served by the local callback listener.
//!
//! ## Endpoints
//!
//! - [`callback`] - `GET /callback?code=..&state=..`, the redirect target of the
//!   Spotify Authorization-Code flow. Validates `state` against the one
//!   pending login, exchanges the code for a token pair and hands the
//!   resulting session to the waiting [`AuthorizationCoordinator`].
//!
//!   | outcome | status | body |
//!   |---|---|---|
//!   | session delivered | 200 | `Login Completed! ...` |
//!   | no login pending / already consumed | 404 | `No login in progress.` |
//!   | state mismatch | 404 | `State mismatch.` |
//!   | consent denied | 403 | `Login was denied.` |
//!   | exchange failed | 403 | `Couldn't get token.` |
//!
//! - [`health`] - `GET /health`, returns status, version and whether a login
//!   is currently awaited.
//!
//! [`AuthorizationCoordinator`]: crate::management::AuthorizationCoordinator

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
