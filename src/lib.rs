//! moodlist library
//!
//! Turns a free-text mood into a Spotify playlist: a language model proposes
//! (song, artist) pairs, the catalog resolves them to tracks, and the tracks
//! are written to a new playlist on the user's account.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints of the local OAuth callback listener
//! - `cli` - Command-line workflows (interactive loop, auth)
//! - `config` - Configuration from environment variables and `.env`
//! - `error` - Error taxonomy
//! - `generator` - Language-model song suggestions and playlist naming
//! - `management` - Authorization coordinator, track resolver, playlist
//!   assembler, token cache
//! - `server` - Binding and serving the callback listener
//! - `spotify` - Spotify Web API client
//! - `types` - Data structures and wire types
//! - `utils` - State tokens, PKCE, URL building, formatting helpers

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

pub use error::{AuthError, Error, ErrorClass, Result};

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Waiting for login...");
/// info!("Playlist name: {}", name);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only for setup failures the process cannot continue after: bad
/// configuration, a callback port that cannot be bound. Everything else is
/// reported with [`warning!`] and the interactive loop carries on.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
