use std::net::SocketAddr;

use axum::{Extension, Router, routing::get};
use tokio::{net::TcpListener, task::JoinHandle};

use crate::{
    api,
    error::{Error, Result},
    management::AuthState,
};

pub fn router(state: AuthState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback))
        .layer(Extension(state))
}

/// Binds the callback port. The redirect URI is fixed, so there is no
/// fallback to another port.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| Error::Bind { addr, source })
}

pub fn spawn(listener: TcpListener, app: Router) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "callback listener stopped");
        }
    })
}
