use std::{fmt, time::Duration};

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Seconds before the real expiry at which a session is treated as expired.
pub const EXPIRY_MARGIN_SECS: i64 = 240;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

impl Token {
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt((self.obtained_at + self.expires_in) as i64, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub scope: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now + TimeDelta::seconds(EXPIRY_MARGIN_SECS) >= self.expires_at
    }
}

impl From<Token> for AuthSession {
    fn from(token: Token) -> Self {
        let expires_at = token.expires_at();
        AuthSession {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            scope: token.scope,
            expires_at,
        }
    }
}

/// A song proposed by the language model. The model calls the title `song`.
/// A missing field decodes as empty so one bad entry can be filtered out
/// instead of failing the whole list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Song {
    #[serde(rename = "song", alias = "title", default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
}

impl Song {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Song {
            title: title.into(),
            artist: artist.into(),
        }
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.title, self.artist)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedPlaylist {
    #[serde(default)]
    pub playlist: Vec<Song>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTrack {
    pub id: String,
    pub uri: String,
    pub name: String,
    pub primary_artist: String,
    pub duration: Duration,
    pub popularity: u32,
    pub preview_url: Option<String>,
    pub external_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnmatchedReason {
    NoMatch,
    LowPopularity { popularity: u32 },
    TransientError(String),
}

impl fmt::Display for UnmatchedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmatchedReason::NoMatch => write!(f, "no-match"),
            UnmatchedReason::LowPopularity { popularity } => {
                write!(f, "low-popularity ({})", popularity)
            }
            UnmatchedReason::TransientError(msg) => write!(f, "transient-error: {}", msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unmatched {
    pub song: Song,
    pub reason: UnmatchedReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    Resolved(ResolvedTrack),
    Unmatched(Unmatched),
}

impl MatchResult {
    pub fn resolved(&self) -> Option<&ResolvedTrack> {
        match self {
            MatchResult::Resolved(track) => Some(track),
            MatchResult::Unmatched(_) => None,
        }
    }

    pub fn unmatched(&self) -> Option<&Unmatched> {
        match self {
            MatchResult::Resolved(_) => None,
            MatchResult::Unmatched(miss) => Some(miss),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssembledPlaylist {
    pub id: String,
    pub name: String,
    pub url: Option<String>,
    pub snapshot_id: String,
    pub tracks: Vec<ResolvedTrack>,
}

impl AssembledPlaylist {
    pub fn resolved_track_count(&self) -> usize {
        self.tracks.len()
    }
}

#[derive(Tabled)]
pub struct TrackTableRow {
    #[tabled(rename = "No")]
    pub no: String,
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "Artist")]
    pub artist: String,
    #[tabled(rename = "Play time")]
    pub play_time: String,
    #[tabled(rename = "Popularity")]
    pub popularity: String,
    #[tabled(rename = "Preview URL")]
    pub preview_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub tracks: Option<TrackPage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackPage {
    pub items: Vec<CatalogTrack>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogTrack {
    pub id: String,
    pub name: String,
    pub uri: String,
    pub duration_ms: u64,
    #[serde(default)]
    pub popularity: u32,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub artists: Vec<SimpleArtist>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

impl From<CatalogTrack> for ResolvedTrack {
    fn from(track: CatalogTrack) -> Self {
        let primary_artist = track
            .artists
            .into_iter()
            .next()
            .map(|a| a.name)
            .unwrap_or_default();

        ResolvedTrack {
            id: track.id,
            uri: track.uri,
            name: track.name,
            primary_artist,
            duration: Duration::from_millis(track.duration_ms),
            popularity: track.popularity,
            preview_url: track.preview_url,
            external_url: track.external_urls.spotify,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleArtist {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
    pub collaborative: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistResponse {
    pub snapshot_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
}
