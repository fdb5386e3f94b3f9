use axum::{Extension, response::Json};
use serde_json::{Value, json};

use crate::management::AuthState;

pub async fn health(Extension(auth): Extension<AuthState>) -> Json<Value> {
    let awaiting_login = auth.slots.lock().await.pending.is_some();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "awaiting_login": awaiting_login,
    }))
}
