use std::{collections::HashMap, time::Duration};

use moodlist::{
    Error,
    config::{DEFAULT_POPULARITY_FLOOR, Settings, StatePolicy},
};

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    let mut map: HashMap<String, String> = [
        ("SPOTIFY_API_AUTH_CLIENT_ID", "client-123"),
        ("OPENAI_API_KEY", "sk-test"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    for (k, v) in pairs {
        map.insert(k.to_string(), v.to_string());
    }
    map
}

fn load(map: &HashMap<String, String>) -> moodlist::Result<Settings> {
    Settings::from_lookup(|key| map.get(key).cloned())
}

#[test]
fn test_defaults() {
    let settings = load(&env(&[])).unwrap();

    assert_eq!(settings.auth.listen_addr.to_string(), "127.0.0.1:9999");
    assert_eq!(settings.auth.redirect_uri, "http://127.0.0.1:9999/callback");
    assert_eq!(settings.auth.scope, "playlist-modify-public");
    assert_eq!(settings.auth.timeout, Duration::from_secs(300));
    assert_eq!(settings.auth.state_policy, StatePolicy::PerAttempt);
    assert_eq!(settings.spotify.client_secret, None);
    assert_eq!(settings.matching.popularity_floor, DEFAULT_POPULARITY_FLOOR);
    assert_eq!(settings.matching.concurrency, 4);
    assert!(settings.matching.structured_query);
    assert_eq!(settings.openai.model, "gpt-4o-mini");
    assert!(!settings.cache_token);
}

#[test]
fn test_overrides() {
    let settings = load(&env(&[
        ("SERVER_ADDRESS", "127.0.0.1:8888"),
        ("SPOTIFY_API_REDIRECT_URI", "http://localhost:8888/callback"),
        ("SPOTIFY_API_AUTH_CLIENT_SECRET", "secret"),
        ("SPOTIFY_API_URL", "http://localhost:3000/v1/"),
        ("MOODLIST_POPULARITY_FLOOR", "0"),
        ("MOODLIST_SEARCH_CONCURRENCY", "0"),
        ("MOODLIST_STRUCTURED_QUERY", "off"),
        ("MOODLIST_AUTH_TIMEOUT_SECS", "30"),
        ("MOODLIST_STATE_POLICY", "per-process"),
        ("MOODLIST_CACHE_TOKEN", "yes"),
    ]))
    .unwrap();

    assert_eq!(settings.auth.listen_addr.port(), 8888);
    assert_eq!(settings.spotify.client_secret.as_deref(), Some("secret"));
    assert_eq!(settings.spotify.api_url, "http://localhost:3000/v1");
    assert_eq!(settings.matching.popularity_floor, 0);
    // Zero would deadlock the resolver
    assert_eq!(settings.matching.concurrency, 1);
    assert!(!settings.matching.structured_query);
    assert_eq!(settings.auth.timeout, Duration::from_secs(30));
    assert_eq!(settings.auth.state_policy, StatePolicy::PerProcess);
    assert!(settings.cache_token);
}

#[test]
fn test_missing_required_keys() {
    let mut map = env(&[]);
    map.remove("SPOTIFY_API_AUTH_CLIENT_ID");
    match load(&map) {
        Err(Error::Config(msg)) => assert!(msg.contains("SPOTIFY_API_AUTH_CLIENT_ID")),
        other => panic!("expected config error, got {:?}", other.map(|_| ())),
    }

    let mut map = env(&[]);
    map.insert("OPENAI_API_KEY".to_string(), "   ".to_string());
    match load(&map) {
        Err(Error::Config(msg)) => assert!(msg.contains("OPENAI_API_KEY")),
        other => panic!("expected config error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_redirect_must_match_listener() {
    let result = load(&env(&[("SERVER_ADDRESS", "127.0.0.1:8080")]));
    assert!(matches!(result, Err(Error::Config(_))));

    let result = load(&env(&[(
        "SPOTIFY_API_REDIRECT_URI",
        "http://127.0.0.1:9999/auth",
    )]));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_malformed_redirect_uri_names_the_key() {
    match load(&env(&[("SPOTIFY_API_REDIRECT_URI", "127.0.0.1:9999/callback")])) {
        Err(Error::Config(msg)) => assert!(msg.contains("SPOTIFY_API_REDIRECT_URI")),
        other => panic!("expected config error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_invalid_values() {
    for (key, value) in [
        ("MOODLIST_POPULARITY_FLOOR", "101"),
        ("MOODLIST_POPULARITY_FLOOR", "-1"),
        ("MOODLIST_STRUCTURED_QUERY", "maybe"),
        ("MOODLIST_STATE_POLICY", "sometimes"),
        ("SERVER_ADDRESS", "nowhere"),
        ("MOODLIST_AUTH_TIMEOUT_SECS", "soon"),
    ] {
        let result = load(&env(&[(key, value)]));
        assert!(
            result.as_ref().is_err_and(|e| e.is_fatal()),
            "{}={} should be rejected",
            key,
            value
        );
    }
}

#[test]
fn test_state_policy_parsing() {
    assert_eq!("per-attempt".parse::<StatePolicy>(), Ok(StatePolicy::PerAttempt));
    assert_eq!(" Process ".parse::<StatePolicy>(), Ok(StatePolicy::PerProcess));
    assert!("never".parse::<StatePolicy>().is_err());
}
