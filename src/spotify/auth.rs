use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use crate::{
    error::{AuthError, Result},
    types::{Token, TokenResponse},
};

use super::{SpotifyClient, TokenExchange};

impl SpotifyClient {
    /// Posts a grant to the token endpoint.
    ///
    /// With a client secret configured the request authenticates as a
    /// confidential client (HTTP basic auth). Without one it is a public PKCE
    /// client and only the `client_id` travels in the form.
    async fn token_grant(&self, form: &[(&str, &str)]) -> std::result::Result<Token, String> {
        let mut fields: Vec<(&str, &str)> = form.to_vec();
        let mut request = self.http.post(&self.settings.token_url);
        match &self.settings.client_secret {
            Some(secret) => {
                request = request.basic_auth(&self.settings.client_id, Some(secret));
            }
            None => fields.push(("client_id", self.settings.client_id.as_str())),
        }

        let res = request
            .form(&fields)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = res.status();
        let body = res.text().await.map_err(|e| e.to_string())?;
        if !status.is_success() {
            // The accounts service answers {"error": "...", "error_description": "..."}
            let reason = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|json| {
                    json["error_description"]
                        .as_str()
                        .or_else(|| json["error"].as_str())
                        .map(str::to_string)
                })
                .unwrap_or(body);
            return Err(format!("{}: {}", status.as_u16(), reason));
        }

        let json: TokenResponse = serde_json::from_str(&body).map_err(|e| e.to_string())?;
        Ok(Token {
            access_token: json.access_token,
            refresh_token: json.refresh_token,
            scope: json.scope.unwrap_or_default(),
            expires_in: json.expires_in,
            obtained_at: Utc::now().timestamp() as u64,
        })
    }
}

#[async_trait]
impl TokenExchange for SpotifyClient {
    async fn exchange_code(&self, code: &str, code_verifier: &str) -> Result<Token> {
        let redirect_uri = self.settings.redirect_uri.as_str();
        let token = self
            .token_grant(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("code_verifier", code_verifier),
            ])
            .await
            .map_err(AuthError::Exchange)?;

        tracing::debug!(expires_in = token.expires_in, "authorization code exchanged");
        Ok(token)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Token> {
        let mut token = self
            .token_grant(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .await
            .map_err(AuthError::Exchange)?;

        // Spotify may or may not rotate the refresh token.
        if token.refresh_token.is_none() {
            token.refresh_token = Some(refresh_token.to_string());
        }

        Ok(token)
    }
}
