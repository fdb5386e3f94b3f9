//! # Generator Module
//!
//! Asks a language model (any OpenAI-compatible chat completions endpoint)
//! for songs matching a free-text mood, and for a name for the result.
//!
//! Song suggestions come back through a forced function call so the answer is
//! structured JSON (`{"playlist": [{"song": .., "artist": ..}]}`) rather than
//! prose. The model may return fewer songs than requested; extra songs are cut
//! off and entries with an empty title or artist are dropped.

mod openai;

pub use openai::OpenAiClient;
pub use openai::{clean_playlist_name, parse_playlist_arguments};

pub const MIN_SONGS: usize = 4;
pub const MAX_SONGS: usize = 20;
pub const DEFAULT_SONGS: usize = 10;

/// Parses a user-entered song count, accepting `MIN_SONGS..=MAX_SONGS`.
pub fn parse_song_count(input: &str) -> Result<usize, String> {
    let count: usize = input
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", input.trim()))?;

    if !(MIN_SONGS..=MAX_SONGS).contains(&count) {
        return Err(format!(
            "it should be a number from {} to {}",
            MIN_SONGS, MAX_SONGS
        ));
    }

    Ok(count)
}
