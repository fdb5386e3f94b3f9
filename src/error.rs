//! Error types shared by every layer of moodlist.
//!
//! Errors fall into four classes that decide how far a failure travels:
//!
//! - **Setup** errors (bad configuration, callback port already taken,
//!   unusable authorization URL) abort the process.
//! - **Authorization** errors fail the current login attempt only; the next
//!   call to [`ensure_authenticated`] starts over with a fresh link.
//! - **Resolution** failures never surface as an `Error`; they are recorded as
//!   [`UnmatchedReason`] values next to the song that failed.
//! - **Assembly** and the remaining transport errors fail the current playlist
//!   request and leave the interactive loop running.
//!
//! [`ensure_authenticated`]: crate::management::AuthorizationCoordinator::ensure_authenticated
//! [`UnmatchedReason`]: crate::types::UnmatchedReason

use std::{net::SocketAddr, time::Duration};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("cannot bind callback listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot build authorization URL: {0}")]
    AuthorizationUrl(#[from] url::ParseError),

    #[error("callback listener is not running, call listen() before requesting a login")]
    ListenerNotStarted,

    #[error(transparent)]
    Authorization(#[from] AuthError),

    #[error("playlist assembly failed: {0}")]
    Assembly(String),

    #[error("song generation failed: {0}")]
    Generator(String),

    #[error("Spotify API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reasons a single login attempt can fail.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("callback state did not match the pending login request")]
    StateMismatch,

    #[error("authorization was denied: {0}")]
    Denied(String),

    #[error("token exchange failed: {0}")]
    Exchange(String),

    #[error("timed out waiting for user login after {}s", .0.as_secs())]
    TimedOut(Duration),

    #[error("login was cancelled")]
    Cancelled,

    #[error("a login is already pending, finish it in the browser first")]
    AlreadyPending,

    #[error("callback listener dropped the pending login")]
    ListenerClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Setup,
    Authorization,
    Assembly,
    Other,
}

impl Error {
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::Config(_)
            | Error::Bind { .. }
            | Error::AuthorizationUrl(_)
            | Error::ListenerNotStarted => ErrorClass::Setup,
            Error::Authorization(_) => ErrorClass::Authorization,
            Error::Assembly(_) => ErrorClass::Assembly,
            _ => ErrorClass::Other,
        }
    }

    /// Only setup errors end the process.
    pub fn is_fatal(&self) -> bool {
        self.class() == ErrorClass::Setup
    }
}
