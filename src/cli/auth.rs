use chrono::Local;

use crate::success;

use super::{Context, interrupted, report};

pub async fn auth(ctx: &Context) {
    match ctx.coordinator.ensure_authenticated_until(interrupted()).await {
        Ok(session) => success!(
            "Authentication successful! Token valid until {}.",
            session.expires_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        ),
        Err(e) => report(&e),
    }
}
