use moodlist::{
    Error,
    generator::{MAX_SONGS, MIN_SONGS, clean_playlist_name, parse_playlist_arguments, parse_song_count},
    types::Song,
};

#[test]
fn test_parse_playlist_arguments() {
    let arguments = r#"{"playlist": [
        {"song": "Yesterday", "artist": "The Beatles"},
        {"song": "  Hurt ", "artist": "Johnny Cash"},
        {"song": "Creep", "artist": "Radiohead"}
    ]}"#;

    let songs = parse_playlist_arguments(arguments, 10).unwrap();

    assert_eq!(
        songs,
        vec![
            Song::new("Yesterday", "The Beatles"),
            Song::new("Hurt", "Johnny Cash"),
            Song::new("Creep", "Radiohead"),
        ]
    );
}

#[test]
fn test_parse_playlist_arguments_truncates_to_count() {
    let entries: Vec<String> = (0..8)
        .map(|i| format!(r#"{{"song": "Song {i}", "artist": "Artist {i}"}}"#))
        .collect();
    let arguments = format!(r#"{{"playlist": [{}]}}"#, entries.join(","));

    let songs = parse_playlist_arguments(&arguments, 5).unwrap();

    assert_eq!(songs.len(), 5);
    assert_eq!(songs[0].title, "Song 0");
    assert_eq!(songs[4].title, "Song 4");
}

#[test]
fn test_parse_playlist_arguments_drops_empty_entries() {
    let arguments = r#"{"playlist": [
        {"song": "", "artist": "Nobody"},
        {"song": "Heroes", "artist": "  "},
        {"song": "Heroes", "artist": "David Bowie"}
    ]}"#;

    let songs = parse_playlist_arguments(arguments, 10).unwrap();

    assert_eq!(songs, vec![Song::new("Heroes", "David Bowie")]);
}

#[test]
fn test_parse_playlist_arguments_entry_missing_field() {
    let arguments = r#"{"playlist":[{"song":"Yesterday","artist":"The Beatles"},{"song":"Hurt"},{"artist":"Nobody"},{"song":"Creep","artist":"Radiohead"}]}"#;

    let songs = parse_playlist_arguments(arguments, 10).unwrap();

    assert_eq!(
        songs,
        vec![
            Song::new("Yesterday", "The Beatles"),
            Song::new("Creep", "Radiohead"),
        ]
    );
}

#[test]
fn test_parse_playlist_arguments_invalid_json() {
    let result = parse_playlist_arguments("{\"playlist\": [", 10);
    assert!(matches!(result, Err(Error::Generator(_))));

    // Missing list means no songs, not an error
    assert!(parse_playlist_arguments("{}", 10).unwrap().is_empty());
}

#[test]
fn test_clean_playlist_name() {
    assert_eq!(
        clean_playlist_name("\"Rainy Sunday Blues\"\n").as_deref(),
        Some("Rainy Sunday Blues")
    );
    assert_eq!(clean_playlist_name("# Night Drive").as_deref(), Some("Night Drive"));
    assert_eq!(clean_playlist_name("  \"\"  "), None);

    let long = "one two three four five six seven eight nine ten eleven twelve";
    let cleaned = clean_playlist_name(long).unwrap();
    assert_eq!(cleaned.split_whitespace().count(), 10);
    assert!(cleaned.ends_with("ten"));
}

#[test]
fn test_parse_song_count() {
    assert_eq!(parse_song_count("10"), Ok(10));
    assert_eq!(parse_song_count(" 4 "), Ok(MIN_SONGS));
    assert_eq!(parse_song_count("20"), Ok(MAX_SONGS));

    assert!(parse_song_count("3").is_err());
    assert!(parse_song_count("21").is_err());
    assert!(parse_song_count("ten").is_err());
    assert!(parse_song_count("").is_err());
}

#[test]
fn test_song_wire_format() {
    let song: Song = serde_json::from_str(r#"{"song": "Hurt", "artist": "Johnny Cash"}"#).unwrap();
    assert_eq!(song, Song::new("Hurt", "Johnny Cash"));

    let aliased: Song = serde_json::from_str(r#"{"title": "Hurt", "artist": "Johnny Cash"}"#).unwrap();
    assert_eq!(aliased, song);

    assert_eq!(song.to_string(), "Hurt - Johnny Cash");
}
