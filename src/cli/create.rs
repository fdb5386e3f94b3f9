use chrono::Local;
use tabled::Table;

use crate::{
    error::{Error, Result},
    generator::{self, DEFAULT_SONGS, MAX_SONGS, MIN_SONGS},
    info, success,
    types::{AssembledPlaylist, MatchResult},
    utils, warning,
};

use super::{Context, InputLines, interrupted, prompt::hyperlink, report, with_spinner};

/// Runs one playlist request when `prompt` is given, otherwise the
/// interactive loop until the user types `exit`/`q`, closes input or presses
/// Ctrl-C at a prompt.
pub async fn create(
    ctx: &Context,
    prompt: Option<String>,
    count: Option<usize>,
    name: Option<String>,
) {
    if let Some(prompt) = prompt {
        let count = count.unwrap_or(DEFAULT_SONGS);
        if let Err(e) = make_playlist(ctx, &prompt, count, name).await {
            report(&e);
        }
        return;
    }

    let mut lines = InputLines::stdin();
    while let Some((prompt, count)) = next_request(&mut lines, count).await {
        if let Err(e) = make_playlist(ctx, &prompt, count, name.clone()).await {
            report(&e);
            warning!("Try again with another prompt.");
        }
    }

    success!("good bye");
}

/// Asks for the next mood and, unless `count` is fixed, a song count.
/// `None` means the user wants to leave.
pub async fn next_request(
    lines: &mut InputLines,
    count: Option<usize>,
) -> Option<(String, usize)> {
    loop {
        println!();
        info!("Let's make a playlist on Spotify!");
        println!("Describe the music you want to listen to (or exit, q):");
        let prompt = read_line(lines).await?;
        if is_exit(&prompt) {
            return None;
        }
        if prompt.is_empty() {
            continue;
        }

        let count = match count {
            Some(count) => count,
            None => ask_count(lines).await?,
        };
        return Some((prompt, count));
    }
}

/// Generates, resolves and assembles one playlist.
pub async fn make_playlist(
    ctx: &Context,
    prompt: &str,
    count: usize,
    name: Option<String>,
) -> Result<AssembledPlaylist> {
    let songs = with_spinner(
        &format!("Generating playlist of {} (or fewer) tracks...", count),
        ctx.generator.generate_songs(prompt, count),
    )
    .await?;
    if songs.is_empty() {
        return Err(Error::Generator(
            "the model suggested no songs".to_string(),
        ));
    }
    success!("Playlist of {} songs generated.", songs.len());

    let name = match name {
        Some(name) => name,
        None => {
            with_spinner(
                "Generating playlist name...",
                ctx.generator.generate_playlist_name(prompt, &songs),
            )
            .await
        }
    };
    info!("Playlist name: {}", name);

    let session = ctx
        .coordinator
        .ensure_authenticated_until(interrupted())
        .await?;

    let matches = with_spinner(
        "Searching Spotify for the songs...",
        ctx.resolver.resolve_all(&songs, &session),
    )
    .await;
    for miss in matches.iter().filter_map(MatchResult::unmatched) {
        warning!("Skipped {}: {}", miss.song, miss.reason);
    }

    let playlist = with_spinner(
        "Creating playlist...",
        ctx.assembler.assemble(
            &name,
            &utils::playlist_description(Local::now()),
            &matches,
            &session,
        ),
    )
    .await?;

    success!(
        "Successfully created on Spotify! {} of {} requested tracks were found.",
        playlist.resolved_track_count(),
        songs.len()
    );
    if let Some(url) = &playlist.url {
        println!("    {}", hyperlink(url, &playlist.name));
        println!("    {}", url);
    }
    println!("{}", Table::new(utils::build_track_rows(&playlist.tracks)));

    Ok(playlist)
}

async fn ask_count(lines: &mut InputLines) -> Option<usize> {
    loop {
        println!(
            "How many songs? ({} to {}, fewer may be generated):",
            MIN_SONGS, MAX_SONGS
        );
        let input = read_line(lines).await?;
        if is_exit(&input) {
            return None;
        }
        match generator::parse_song_count(&input) {
            Ok(count) => return Some(count),
            Err(msg) => warning!("try again, {}", msg),
        }
    }
}

async fn read_line(lines: &mut InputLines) -> Option<String> {
    tokio::select! {
        line = lines.next() => line,
        _ = interrupted() => None,
    }
}

fn is_exit(input: &str) -> bool {
    matches!(input, "exit" | "q")
}
