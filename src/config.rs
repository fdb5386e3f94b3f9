//! Configuration management for moodlist.
//!
//! Configuration comes from environment variables, optionally loaded from a
//! `.env` file in the local data directory. Everything is read once at startup
//! into a [`Settings`] value that is handed to the components that need it;
//! nothing below `main` reads the environment again.
//!
//! The lookup order is:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use url::Url;

use crate::error::{Error, Result};

pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:9999";
pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:9999/callback";
pub const DEFAULT_SCOPE: &str = "playlist-modify-public";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_POPULARITY_FLOOR: u32 = 20;
pub const DEFAULT_SEARCH_CONCURRENCY: usize = 4;
pub const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 300;

/// Loads environment variables from a `.env` file in the local data directory.
///
/// The file lives at `moodlist/.env` below the platform data directory:
/// - Linux: `~/.local/share/moodlist/.env`
/// - macOS: `~/Library/Application Support/moodlist/.env`
/// - Windows: `%LOCALAPPDATA%/moodlist/.env`
///
/// A missing file is not an error, the variables may come straight from the
/// shell. A file that exists but cannot be parsed is.
pub async fn load_env() -> std::result::Result<(), String> {
    let path = env_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if !path.is_file() {
        return Ok(());
    }

    dotenv::from_path(&path)
        .map(|_| ())
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))
}

pub fn env_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("moodlist/.env");
    path
}

/// Whether the state token is regenerated for every login attempt or drawn
/// once per process and reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatePolicy {
    #[default]
    PerAttempt,
    PerProcess,
}

impl FromStr for StatePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per-attempt" | "attempt" => Ok(StatePolicy::PerAttempt),
            "per-process" | "process" => Ok(StatePolicy::PerProcess),
            other => Err(format!(
                "unknown state policy '{}', expected per-attempt or per-process",
                other
            )),
        }
    }
}

/// Everything the authorization coordinator and callback listener need.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub client_id: String,
    pub redirect_uri: String,
    pub scope: String,
    pub authorize_url: String,
    pub listen_addr: SocketAddr,
    pub timeout: Duration,
    pub state_policy: StatePolicy,
}

#[derive(Debug, Clone)]
pub struct SpotifySettings {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub token_url: String,
    pub api_url: String,
}

/// Selection policy of the track resolver.
#[derive(Debug, Clone)]
pub struct MatchPolicy {
    /// Top hits below this popularity (0-100) are rejected as likely mismatches.
    pub popularity_floor: u32,
    /// Upper bound on concurrent catalog searches; 1 resolves sequentially.
    pub concurrency: usize,
    /// Try `track:"..." artist:"..."` before the plain free-text query.
    pub structured_query: bool,
    pub search_limit: u32,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        MatchPolicy {
            popularity_floor: DEFAULT_POPULARITY_FLOOR,
            concurrency: DEFAULT_SEARCH_CONCURRENCY,
            structured_query: true,
            search_limit: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub auth: AuthSettings,
    pub spotify: SpotifySettings,
    pub matching: MatchPolicy,
    pub openai: OpenAiSettings,
    pub cache_token: bool,
}

impl Settings {
    pub fn from_env() -> Result<Settings> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary key/value source. Empty values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Settings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());
        let require = |key: &str| {
            get(key).ok_or_else(|| Error::Config(format!("{} must be set", key)))
        };

        let client_id = require("SPOTIFY_API_AUTH_CLIENT_ID")?;
        let client_secret = get("SPOTIFY_API_AUTH_CLIENT_SECRET");
        let redirect_uri = or("SPOTIFY_API_REDIRECT_URI", DEFAULT_REDIRECT_URI);
        let listen_addr: SocketAddr = parse(
            "SERVER_ADDRESS",
            &or("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS),
        )?;
        check_redirect_matches_listener(&redirect_uri, listen_addr)?;

        let authorize_url = or("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL);
        Url::parse(&authorize_url)?;

        let timeout_secs: u64 = match get("MOODLIST_AUTH_TIMEOUT_SECS") {
            Some(v) => parse("MOODLIST_AUTH_TIMEOUT_SECS", &v)?,
            None => DEFAULT_AUTH_TIMEOUT_SECS,
        };
        let state_policy = match get("MOODLIST_STATE_POLICY") {
            Some(v) => v.parse::<StatePolicy>().map_err(Error::Config)?,
            None => StatePolicy::default(),
        };

        let popularity_floor: u32 = match get("MOODLIST_POPULARITY_FLOOR") {
            Some(v) => parse("MOODLIST_POPULARITY_FLOOR", &v)?,
            None => DEFAULT_POPULARITY_FLOOR,
        };
        if popularity_floor > 100 {
            return Err(Error::Config(format!(
                "MOODLIST_POPULARITY_FLOOR must be between 0 and 100, got {}",
                popularity_floor
            )));
        }
        let concurrency: usize = match get("MOODLIST_SEARCH_CONCURRENCY") {
            Some(v) => parse("MOODLIST_SEARCH_CONCURRENCY", &v)?,
            None => DEFAULT_SEARCH_CONCURRENCY,
        };
        let structured_query = match get("MOODLIST_STRUCTURED_QUERY") {
            Some(v) => parse_bool("MOODLIST_STRUCTURED_QUERY", &v)?,
            None => true,
        };
        let cache_token = match get("MOODLIST_CACHE_TOKEN") {
            Some(v) => parse_bool("MOODLIST_CACHE_TOKEN", &v)?,
            None => false,
        };

        Ok(Settings {
            auth: AuthSettings {
                client_id: client_id.clone(),
                redirect_uri: redirect_uri.clone(),
                scope: or("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE),
                authorize_url,
                listen_addr,
                timeout: Duration::from_secs(timeout_secs),
                state_policy,
            },
            spotify: SpotifySettings {
                client_id,
                client_secret,
                redirect_uri,
                token_url: or("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL),
                api_url: or("SPOTIFY_API_URL", DEFAULT_API_URL)
                    .trim_end_matches('/')
                    .to_string(),
            },
            matching: MatchPolicy {
                popularity_floor,
                concurrency: concurrency.max(1),
                structured_query,
                ..MatchPolicy::default()
            },
            openai: OpenAiSettings {
                api_key: require("OPENAI_API_KEY")?,
                api_url: or("OPENAI_API_URL", DEFAULT_OPENAI_URL)
                    .trim_end_matches('/')
                    .to_string(),
                model: or("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
            },
            cache_token,
        })
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| Error::Config(format!("{}: cannot parse '{}': {}", key, value, e)))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::Config(format!(
            "{}: expected a boolean, got '{}'",
            key, value
        ))),
    }
}

/// The provider redirects to a fixed address, so the listener has to bind
/// exactly the port the redirect URI names.
fn check_redirect_matches_listener(redirect_uri: &str, listen_addr: SocketAddr) -> Result<()> {
    let url = Url::parse(redirect_uri).map_err(|e| {
        Error::Config(format!(
            "SPOTIFY_API_REDIRECT_URI: cannot parse '{}': {}",
            redirect_uri, e
        ))
    })?;
    let port = url.port_or_known_default().ok_or_else(|| {
        Error::Config(format!("redirect URI {} has no port", redirect_uri))
    })?;

    if port != listen_addr.port() {
        return Err(Error::Config(format!(
            "redirect URI port {} does not match SERVER_ADDRESS port {}",
            port,
            listen_addr.port()
        )));
    }

    if url.path() != "/callback" {
        return Err(Error::Config(format!(
            "redirect URI must end in /callback, got {}",
            redirect_uri
        )));
    }

    Ok(())
}
