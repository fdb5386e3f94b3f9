use std::sync::Arc;

use crate::{
    error::{Error, Result},
    spotify::Catalog,
    types::{AssembledPlaylist, AuthSession, CreatePlaylistRequest, MatchResult, ResolvedTrack},
    utils,
};

pub const PLAYLIST_PUBLIC: bool = true;
pub const PLAYLIST_COLLABORATIVE: bool = false;

/// Creates the remote playlist from resolver output.
pub struct PlaylistAssembler {
    catalog: Arc<dyn Catalog>,
}

impl PlaylistAssembler {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        PlaylistAssembler { catalog }
    }

    pub async fn assemble(
        &self,
        name: &str,
        description: &str,
        matches: &[MatchResult],
        session: &AuthSession,
    ) -> Result<AssembledPlaylist> {
        let tracks = collect_tracks(matches);
        if tracks.is_empty() {
            return Err(Error::Assembly(
                "none of the requested songs were found in the catalog".to_string(),
            ));
        }

        let user_id = self
            .catalog
            .current_user_id(session)
            .await
            .map_err(assembly("cannot look up current user"))?;

        let request = CreatePlaylistRequest {
            name: name.to_string(),
            description: description.to_string(),
            public: PLAYLIST_PUBLIC,
            collaborative: PLAYLIST_COLLABORATIVE,
        };
        let created = self
            .catalog
            .create_playlist(session, &user_id, &request)
            .await
            .map_err(assembly("cannot create playlist"))?;
        tracing::debug!(id = %created.id, "playlist created");

        let uris: Vec<String> = tracks.iter().map(|t| t.uri.clone()).collect();
        let added = self
            .catalog
            .add_tracks(session, &created.id, &uris)
            .await
            .map_err(assembly("cannot add tracks"))?;
        tracing::debug!(snapshot_id = %added.snapshot_id, count = uris.len(), "tracks added");

        Ok(AssembledPlaylist {
            id: created.id,
            name: created.name,
            url: created.external_urls.spotify,
            snapshot_id: added.snapshot_id,
            tracks,
        })
    }
}

/// Resolved tracks in input order, first occurrence of each id only.
pub fn collect_tracks(matches: &[MatchResult]) -> Vec<ResolvedTrack> {
    let mut tracks: Vec<ResolvedTrack> = matches
        .iter()
        .filter_map(MatchResult::resolved)
        .cloned()
        .collect();
    utils::remove_duplicate_tracks(&mut tracks);
    tracks
}

fn assembly(stage: &'static str) -> impl FnOnce(Error) -> Error {
    move |e| Error::Assembly(format!("{}: {}", stage, e))
}
