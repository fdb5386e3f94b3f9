use crate::{
    error::Result,
    types::{
        AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, AuthSession,
        CreatePlaylistRequest, CreatePlaylistResponse, CurrentUser,
    },
};

use super::{SpotifyClient, check_status};

impl SpotifyClient {
    pub async fn current_user(&self, session: &AuthSession) -> Result<CurrentUser> {
        let response = self
            .http
            .get(self.api_url("/me"))
            .bearer_auth(&session.access_token)
            .send()
            .await?;

        Ok(check_status(response).await?.json::<CurrentUser>().await?)
    }

    pub async fn create(
        &self,
        session: &AuthSession,
        user_id: &str,
        request: &CreatePlaylistRequest,
    ) -> Result<CreatePlaylistResponse> {
        let response = self
            .http
            .post(self.api_url(&format!("/users/{}/playlists", user_id)))
            .bearer_auth(&session.access_token)
            .json(request)
            .send()
            .await?;

        Ok(check_status(response)
            .await?
            .json::<CreatePlaylistResponse>()
            .await?)
    }

    pub async fn add(
        &self,
        session: &AuthSession,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<AddTrackToPlaylistResponse> {
        let body = AddTrackToPlaylistRequest {
            uris: uris.to_vec(),
        };

        let response = self
            .http
            .post(self.api_url(&format!("/playlists/{}/tracks", playlist_id)))
            .bearer_auth(&session.access_token)
            .json(&body)
            .send()
            .await?;

        Ok(check_status(response)
            .await?
            .json::<AddTrackToPlaylistResponse>()
            .await?)
    }
}
