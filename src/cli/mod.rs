//! # CLI Module
//!
//! User-facing workflows of moodlist and the [`Context`] they share.
//!
//! ## Commands
//!
//! - [`create`] - interactive loop: describe a mood, choose a song count, get
//!   a playlist. With a prompt given on the command line it runs once.
//! - [`auth`] - log in to Spotify without creating anything, to check the
//!   setup or warm the token cache.
//!
//! ## Flow of one playlist request
//!
//! ```text
//! prompt ─► generator ─► songs ─► coordinator (login if needed)
//!                                     │
//!                                     ▼
//!        table ◄─ assembler ◄─ resolver (bounded fan-out, order kept)
//! ```
//!
//! Errors are reported by [`report`]: setup errors end the process, every
//! other error is printed as a warning and the loop asks for the next prompt.

mod auth;
mod create;
mod input;
mod prompt;

pub use auth::auth;
pub use create::create;
pub use create::make_playlist;
pub use create::next_request;
pub use input::InputLines;
pub use prompt::TerminalPrompt;

use std::{future::Future, sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    config::Settings,
    error::{Error, Result},
    generator::OpenAiClient,
    management::{AuthorizationCoordinator, PlaylistAssembler, TokenStore, TrackResolver},
    spotify::SpotifyClient,
    warning,
};

/// Long-lived components of one process run.
pub struct Context {
    pub coordinator: AuthorizationCoordinator,
    pub resolver: TrackResolver,
    pub assembler: PlaylistAssembler,
    pub generator: OpenAiClient,
}

impl Context {
    /// Wires up the components and starts the callback listener. Any error
    /// here is a setup error.
    pub async fn start(settings: Settings) -> Result<Context> {
        let spotify = Arc::new(SpotifyClient::new(settings.spotify.clone()));

        let mut coordinator = AuthorizationCoordinator::new(
            settings.auth.clone(),
            spotify.clone(),
            Arc::new(TerminalPrompt),
        );
        if settings.cache_token {
            coordinator = coordinator.with_store(TokenStore::default_location());
        }

        coordinator.listen().await?;
        coordinator.restore().await;

        Ok(Context {
            coordinator,
            resolver: TrackResolver::new(spotify.clone(), settings.matching.clone()),
            assembler: PlaylistAssembler::new(spotify),
            generator: OpenAiClient::new(settings.openai),
        })
    }
}

/// Prints `e`; exits for setup errors.
pub fn report(e: &Error) {
    if e.is_fatal() {
        crate::error!("{}", e);
    }
    warning!("{}", e);
}

/// Resolves once Ctrl-C is pressed.
pub async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

pub(crate) async fn with_spinner<F: Future>(message: &str, fut: F) -> F::Output {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    let output = fut.await;
    pb.finish_and_clear();
    output
}
