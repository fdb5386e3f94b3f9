use std::collections::HashMap;

use axum::{Extension, extract::Query, http::StatusCode};

use crate::{
    error::{AuthError, Error},
    management::AuthState,
    types::AuthSession,
};

pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(auth): Extension<AuthState>,
) -> (StatusCode, &'static str) {
    // Taking the pending login under the lock makes every later callback for
    // it fall into the "no login in progress" branch.
    let pending = {
        let mut slots = auth.slots.lock().await;
        let Some(pending) = slots.pending.take() else {
            tracing::warn!("callback received without a pending login");
            return (StatusCode::NOT_FOUND, "No login in progress.");
        };

        if params.get("state").map(String::as_str) != Some(pending.state.as_str()) {
            tracing::warn!("callback state mismatch, aborting login");
            pending.complete(Err(AuthError::StateMismatch));
            return (StatusCode::NOT_FOUND, "State mismatch.");
        }

        pending
    };

    if let Some(reason) = params.get("error") {
        tracing::warn!(%reason, "authorization denied by provider");
        pending.complete(Err(AuthError::Denied(reason.clone())));
        return (StatusCode::FORBIDDEN, "Login was denied.");
    }

    let Some(code) = params.get("code") else {
        pending.complete(Err(AuthError::Exchange(
            "callback carried no authorization code".to_string(),
        )));
        return (StatusCode::FORBIDDEN, "Couldn't get token.");
    };

    match auth.exchanger.exchange_code(code, &pending.code_verifier).await {
        Ok(token) => {
            let session = AuthSession::from(token);
            tracing::info!(expires_at = %session.expires_at, "token exchange succeeded");
            auth.slots.lock().await.session = Some(session.clone());
            auth.persist(&session).await;
            pending.complete(Ok(session));
            (
                StatusCode::OK,
                "Login Completed! You can close this window.",
            )
        }
        Err(e) => {
            tracing::warn!(error = %e, "token exchange failed");
            let reason = match e {
                Error::Authorization(AuthError::Exchange(reason)) => reason,
                other => other.to_string(),
            };
            pending.complete(Err(AuthError::Exchange(reason)));
            (StatusCode::FORBIDDEN, "Couldn't get token.")
        }
    }
}
