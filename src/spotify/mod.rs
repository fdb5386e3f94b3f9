//! # Spotify Integration Module
//!
//! Thin client for the parts of the Spotify Web API moodlist uses: the
//! Authorization-Code token endpoint, track search, and playlist creation.
//!
//! The rest of the crate never talks to [`SpotifyClient`] directly. It goes
//! through two traits so the authorization and matching logic can run against
//! in-memory fakes:
//!
//! - [`TokenExchange`] - code-for-token and refresh-token grants, used by the
//!   callback listener and the authorization coordinator
//! - [`Catalog`] - search, current user, create playlist, add tracks, used by
//!   the track resolver and playlist assembler
//!
//! ## Endpoints
//!
//! - `POST /api/token` - authorization code and refresh token grants
//! - `GET /search?type=track` - catalog search
//! - `GET /me` - current user id
//! - `POST /users/{user_id}/playlists` - create playlist
//! - `POST /playlists/{playlist_id}/tracks` - add tracks in one batch
//!
//! Non-success responses are turned into [`Error::Api`] carrying the status
//! and the message from Spotify's `{"error": {...}}` body.

pub mod auth;
pub mod playlist;
pub mod search;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Response};

use crate::{
    config::SpotifySettings,
    error::{Error, Result},
    types::{
        AddTrackToPlaylistResponse, ApiErrorResponse, AuthSession, CatalogTrack,
        CreatePlaylistRequest, CreatePlaylistResponse, Token,
    },
};

#[async_trait]
pub trait TokenExchange: Send + Sync {
    async fn exchange_code(&self, code: &str, code_verifier: &str) -> Result<Token>;

    async fn refresh(&self, refresh_token: &str) -> Result<Token>;
}

#[async_trait]
pub trait Catalog: Send + Sync {
    /// Returns hits in the catalog's ranking order.
    async fn search_tracks(
        &self,
        session: &AuthSession,
        query: &str,
        limit: u32,
    ) -> Result<Vec<CatalogTrack>>;

    async fn current_user_id(&self, session: &AuthSession) -> Result<String>;

    async fn create_playlist(
        &self,
        session: &AuthSession,
        user_id: &str,
        request: &CreatePlaylistRequest,
    ) -> Result<CreatePlaylistResponse>;

    async fn add_tracks(
        &self,
        session: &AuthSession,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<AddTrackToPlaylistResponse>;
}

#[derive(Clone)]
pub struct SpotifyClient {
    http: Client,
    settings: Arc<SpotifySettings>,
}

impl SpotifyClient {
    pub fn new(settings: SpotifySettings) -> Self {
        SpotifyClient {
            http: Client::new(),
            settings: Arc::new(settings),
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.settings.api_url, path)
    }
}

#[async_trait]
impl Catalog for SpotifyClient {
    async fn search_tracks(
        &self,
        session: &AuthSession,
        query: &str,
        limit: u32,
    ) -> Result<Vec<CatalogTrack>> {
        self.search(session, query, limit).await
    }

    async fn current_user_id(&self, session: &AuthSession) -> Result<String> {
        Ok(self.current_user(session).await?.id)
    }

    async fn create_playlist(
        &self,
        session: &AuthSession,
        user_id: &str,
        request: &CreatePlaylistRequest,
    ) -> Result<CreatePlaylistResponse> {
        self.create(session, user_id, request).await
    }

    async fn add_tracks(
        &self,
        session: &AuthSession,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<AddTrackToPlaylistResponse> {
        self.add(session, playlist_id, uris).await
    }
}

/// Passes successful responses through and turns everything else into
/// [`Error::Api`].
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorResponse>(&body)
        .ok()
        .and_then(|e| e.error.message)
        .unwrap_or_else(|| {
            if body.is_empty() {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            } else {
                body
            }
        });

    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}
