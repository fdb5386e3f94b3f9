use std::{collections::HashSet, time::Duration};

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Local};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
use url::Url;

use crate::types::{ResolvedTrack, TrackTableRow};

pub const STATE_LENGTH: usize = 10;
pub const CODE_VERIFIER_LENGTH: usize = 128;

fn random_alphanumeric(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Anti-forgery token echoed back by the provider on the callback.
pub fn generate_state() -> String {
    random_alphanumeric(STATE_LENGTH)
}

pub fn generate_code_verifier() -> String {
    random_alphanumeric(CODE_VERIFIER_LENGTH)
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

pub struct AuthorizeParams<'a> {
    pub client_id: &'a str,
    pub redirect_uri: &'a str,
    pub scope: &'a str,
    pub state: &'a str,
    pub code_challenge: &'a str,
}

pub fn build_authorize_url(base: &str, params: &AuthorizeParams<'_>) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base)?;
    url.query_pairs_mut()
        .append_pair("client_id", params.client_id)
        .append_pair("response_type", "code")
        .append_pair("redirect_uri", params.redirect_uri)
        .append_pair("scope", params.scope)
        .append_pair("state", params.state)
        .append_pair("code_challenge", params.code_challenge)
        .append_pair("code_challenge_method", "S256");
    Ok(url)
}

/// Keeps the first occurrence of every track id, in order.
pub fn remove_duplicate_tracks(tracks: &mut Vec<ResolvedTrack>) {
    let mut seen_ids = HashSet::new();
    tracks.retain(|track| seen_ids.insert(track.id.clone()));
}

pub fn format_playtime(playtime: Duration) -> String {
    let total = playtime.as_secs();
    format!("{}:{:02}", total / 60, total % 60)
}

pub fn playlist_description(now: DateTime<Local>) -> String {
    format!(
        "generated by moodlist on {}",
        now.format("%Y-%m-%d %H:%M:%S %Z")
    )
}

pub fn build_track_rows(tracks: &[ResolvedTrack]) -> Vec<TrackTableRow> {
    tracks
        .iter()
        .enumerate()
        .map(|(i, t)| TrackTableRow {
            no: format!("{:02}", i + 1),
            title: t.name.clone(),
            artist: t.primary_artist.clone(),
            play_time: format_playtime(t.duration),
            popularity: format!("{:02}", t.popularity),
            preview_url: t.preview_url.clone().unwrap_or_default(),
        })
        .collect()
}
