use crate::{
    error::Result,
    types::{AuthSession, CatalogTrack, SearchResponse},
};

use super::{SpotifyClient, check_status};

impl SpotifyClient {
    pub async fn search(
        &self,
        session: &AuthSession,
        query: &str,
        limit: u32,
    ) -> Result<Vec<CatalogTrack>> {
        let limit = limit.to_string();
        let response = self
            .http
            .get(self.api_url("/search"))
            .bearer_auth(&session.access_token)
            .query(&[("q", query), ("type", "track"), ("limit", limit.as_str())])
            .send()
            .await?;

        let res = check_status(response)
            .await?
            .json::<SearchResponse>()
            .await?;

        Ok(res.tracks.map(|page| page.items).unwrap_or_default())
    }
}
