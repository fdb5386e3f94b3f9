use std::sync::Arc;

use tokio::{sync::Semaphore, task::JoinSet};

use crate::{
    config::MatchPolicy,
    spotify::Catalog,
    types::{AuthSession, CatalogTrack, MatchResult, ResolvedTrack, Song, Unmatched, UnmatchedReason},
};

/// Turns loosely specified (title, artist) pairs into catalog tracks.
#[derive(Clone)]
pub struct TrackResolver {
    catalog: Arc<dyn Catalog>,
    policy: MatchPolicy,
}

impl TrackResolver {
    pub fn new(catalog: Arc<dyn Catalog>, policy: MatchPolicy) -> Self {
        TrackResolver { catalog, policy }
    }

    /// Search queries for `song`, most specific first.
    pub fn queries(&self, song: &Song) -> Vec<String> {
        let free_text = format!("{} {}", song.title, song.artist);
        if self.policy.structured_query {
            let structured = format!(
                "track:\"{}\" artist:\"{}\"",
                song.title.replace('"', ""),
                song.artist.replace('"', "")
            );
            vec![structured, free_text]
        } else {
            vec![free_text]
        }
    }

    /// Resolves one song. Never fails: errors become
    /// [`UnmatchedReason::TransientError`].
    pub async fn resolve(&self, song: &Song, session: &AuthSession) -> MatchResult {
        let mut hits = Vec::new();
        for query in self.queries(song) {
            tracing::debug!(%query, "searching catalog");
            match self
                .catalog
                .search_tracks(session, &query, self.policy.search_limit)
                .await
            {
                Ok(found) if found.is_empty() => continue,
                Ok(found) => {
                    hits = found;
                    break;
                }
                Err(e) => {
                    tracing::warn!(song = %song, error = %e, "catalog search failed");
                    return unmatched(song, UnmatchedReason::TransientError(e.to_string()));
                }
            }
        }

        match select_track(hits, self.policy.popularity_floor) {
            Ok(track) => {
                tracing::debug!(song = %song, id = %track.id, popularity = track.popularity, "resolved");
                MatchResult::Resolved(track)
            }
            Err(reason) => {
                tracing::info!(song = %song, %reason, "unmatched");
                unmatched(song, reason)
            }
        }
    }

    /// Resolves every song with at most `policy.concurrency` searches in
    /// flight. The result at index `i` always belongs to `songs[i]`.
    pub async fn resolve_all(&self, songs: &[Song], session: &AuthSession) -> Vec<MatchResult> {
        let semaphore = Arc::new(Semaphore::new(self.policy.concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for (index, song) in songs.iter().cloned().enumerate() {
            let resolver = self.clone();
            let session = session.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                (index, resolver.resolve(&song, &session).await)
            });
        }

        let mut slots: Vec<Option<MatchResult>> = vec![None; songs.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => tracing::error!(error = %e, "resolver task failed"),
            }
        }

        slots
            .into_iter()
            .zip(songs)
            .map(|(result, song)| {
                result.unwrap_or_else(|| {
                    unmatched(
                        song,
                        UnmatchedReason::TransientError("resolver task failed".to_string()),
                    )
                })
            })
            .collect()
    }
}

/// Selection policy: take the top-ranked hit, reject it when its popularity
/// is below `popularity_floor`.
pub fn select_track(
    hits: Vec<CatalogTrack>,
    popularity_floor: u32,
) -> Result<ResolvedTrack, UnmatchedReason> {
    let Some(top) = hits.into_iter().next() else {
        return Err(UnmatchedReason::NoMatch);
    };

    if top.popularity < popularity_floor {
        return Err(UnmatchedReason::LowPopularity {
            popularity: top.popularity,
        });
    }

    Ok(ResolvedTrack::from(top))
}

fn unmatched(song: &Song, reason: UnmatchedReason) -> MatchResult {
    MatchResult::Unmatched(Unmatched {
        song: song.clone(),
        reason,
    })
}
