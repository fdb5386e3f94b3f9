#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, Response},
};
use chrono::{TimeDelta, Utc};
use moodlist::{
    Error,
    config::{AuthSettings, MatchPolicy, StatePolicy},
    management::{AuthorizationCoordinator, AuthorizationPrompt},
    spotify::{Catalog, TokenExchange},
    types::{
        AddTrackToPlaylistResponse, AuthSession, CatalogTrack, CreatePlaylistRequest,
        CreatePlaylistResponse, ExternalUrls, SimpleArtist, Song, Token,
    },
};
use tokio::sync::mpsc;
use tower::ServiceExt;

pub fn track(id: &str, name: &str, artist: &str, popularity: u32) -> CatalogTrack {
    CatalogTrack {
        id: id.to_string(),
        name: name.to_string(),
        uri: format!("spotify:track:{}", id),
        duration_ms: 185_000,
        popularity,
        preview_url: None,
        artists: vec![SimpleArtist {
            id: Some(format!("{}_artist", id)),
            name: artist.to_string(),
        }],
        external_urls: ExternalUrls {
            spotify: Some(format!("https://open.spotify.com/track/{}", id)),
        },
    }
}

pub fn free_text(song: &Song) -> String {
    format!("{} {}", song.title, song.artist)
}

pub fn session() -> AuthSession {
    AuthSession {
        access_token: "access".to_string(),
        refresh_token: Some("refresh".to_string()),
        scope: "playlist-modify-public".to_string(),
        expires_at: Utc::now() + TimeDelta::hours(1),
    }
}

pub fn policy(floor: u32, concurrency: usize, structured_query: bool) -> MatchPolicy {
    MatchPolicy {
        popularity_floor: floor,
        concurrency,
        structured_query,
        search_limit: 5,
    }
}

/// In-memory catalog keyed by exact query string. Unknown queries return no
/// hits.
#[derive(Default)]
pub struct FakeCatalog {
    hits: HashMap<String, Vec<CatalogTrack>>,
    errors: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    reject_add: bool,
    pub searches: Mutex<Vec<String>>,
    pub created: Mutex<Vec<(String, CreatePlaylistRequest)>>,
    pub added: Mutex<Vec<(String, Vec<String>)>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hits(mut self, query: &str, hits: Vec<CatalogTrack>) -> Self {
        self.hits.insert(query.to_string(), hits);
        self
    }

    pub fn with_error(mut self, query: &str, message: &str) -> Self {
        self.errors.insert(query.to_string(), message.to_string());
        self
    }

    pub fn with_delay(mut self, query: &str, delay: Duration) -> Self {
        self.delays.insert(query.to_string(), delay);
        self
    }

    pub fn rejecting_adds(mut self) -> Self {
        self.reject_add = true;
        self
    }

    pub fn search_log(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }

    pub fn added_batches(&self) -> Vec<Vec<String>> {
        self.added
            .lock()
            .unwrap()
            .iter()
            .map(|(_, uris)| uris.clone())
            .collect()
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn search_tracks(
        &self,
        _session: &AuthSession,
        query: &str,
        _limit: u32,
    ) -> moodlist::Result<Vec<CatalogTrack>> {
        self.searches.lock().unwrap().push(query.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(query) {
            tokio::time::sleep(*delay).await;
        } else {
            tokio::task::yield_now().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(message) = self.errors.get(query) {
            return Err(Error::Api {
                status: 503,
                message: message.clone(),
            });
        }
        Ok(self.hits.get(query).cloned().unwrap_or_default())
    }

    async fn current_user_id(&self, _session: &AuthSession) -> moodlist::Result<String> {
        Ok("listener".to_string())
    }

    async fn create_playlist(
        &self,
        _session: &AuthSession,
        user_id: &str,
        request: &CreatePlaylistRequest,
    ) -> moodlist::Result<CreatePlaylistResponse> {
        self.created
            .lock()
            .unwrap()
            .push((user_id.to_string(), request.clone()));
        Ok(CreatePlaylistResponse {
            id: "pl1".to_string(),
            name: request.name.clone(),
            external_urls: ExternalUrls {
                spotify: Some("https://open.spotify.com/playlist/pl1".to_string()),
            },
        })
    }

    async fn add_tracks(
        &self,
        _session: &AuthSession,
        playlist_id: &str,
        uris: &[String],
    ) -> moodlist::Result<AddTrackToPlaylistResponse> {
        if self.reject_add {
            return Err(Error::Api {
                status: 400,
                message: "Invalid track uri".to_string(),
            });
        }
        self.added
            .lock()
            .unwrap()
            .push((playlist_id.to_string(), uris.to_vec()));
        Ok(AddTrackToPlaylistResponse {
            snapshot_id: "snap1".to_string(),
        })
    }
}

/// Token endpoint stand-in. Access tokens are numbered by exchange count.
#[derive(Default)]
pub struct FakeExchanger {
    pub fail: AtomicBool,
    pub fail_refresh: AtomicBool,
    pub delay: Option<Duration>,
    pub exchanges: AtomicUsize,
    pub refreshes: AtomicUsize,
    pub verifiers: Mutex<Vec<String>>,
}

impl FakeExchanger {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        let exchanger = Self::default();
        exchanger.fail.store(true, Ordering::SeqCst);
        Arc::new(exchanger)
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay: Some(delay),
            ..Self::default()
        })
    }

    pub fn exchange_count(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }
}

fn token(access_token: String) -> Token {
    Token {
        access_token,
        refresh_token: Some("refresh".to_string()),
        scope: "playlist-modify-public".to_string(),
        expires_in: 3600,
        obtained_at: Utc::now().timestamp() as u64,
    }
}

#[async_trait]
impl TokenExchange for FakeExchanger {
    async fn exchange_code(&self, code: &str, code_verifier: &str) -> moodlist::Result<Token> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.verifiers
            .lock()
            .unwrap()
            .push(code_verifier.to_string());

        if self.fail.load(Ordering::SeqCst) || code == "bad" {
            return Err(moodlist::AuthError::Exchange("invalid_grant".to_string()).into());
        }
        let n = self.exchanges.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(token(format!("access-{}", n)))
    }

    async fn refresh(&self, _refresh_token: &str) -> moodlist::Result<Token> {
        if self.fail_refresh.load(Ordering::SeqCst) {
            return Err(moodlist::AuthError::Exchange("invalid refresh token".to_string()).into());
        }
        let n = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(token(format!("refreshed-{}", n)))
    }
}

/// Forwards every login link to the test.
pub struct ChannelPrompt(pub mpsc::UnboundedSender<String>);

impl AuthorizationPrompt for ChannelPrompt {
    fn present(&self, url: &str) {
        let _ = self.0.send(url.to_string());
    }
}

pub fn auth_settings(timeout: Duration) -> AuthSettings {
    AuthSettings {
        client_id: "client-123".to_string(),
        redirect_uri: "http://127.0.0.1:9999/callback".to_string(),
        scope: "playlist-modify-public".to_string(),
        authorize_url: "https://accounts.example.com/authorize".to_string(),
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        timeout,
        state_policy: StatePolicy::PerAttempt,
    }
}

pub fn unstarted_coordinator(
    settings: AuthSettings,
    exchanger: Arc<FakeExchanger>,
) -> (AuthorizationCoordinator, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let coordinator = AuthorizationCoordinator::new(settings, exchanger, Arc::new(ChannelPrompt(tx)));
    (coordinator, rx)
}

/// A coordinator with its listener bound to an ephemeral loopback port.
pub async fn coordinator(
    settings: AuthSettings,
    exchanger: Arc<FakeExchanger>,
) -> (Arc<AuthorizationCoordinator>, mpsc::UnboundedReceiver<String>) {
    let (coordinator, rx) = unstarted_coordinator(settings, exchanger);
    coordinator.listen().await.expect("listener should bind");
    (Arc::new(coordinator), rx)
}

pub fn state_of(url: &str) -> String {
    url::Url::parse(url)
        .unwrap()
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .expect("login link carries a state")
}

pub async fn get(coordinator: &AuthorizationCoordinator, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    coordinator.router().oneshot(request).await.unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    String::from_utf8(bytes.to_vec()).unwrap()
}
