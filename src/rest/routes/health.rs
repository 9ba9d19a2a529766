// rest/routes/health.rs — liveness endpoint.

use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::AppContext;

pub async fn health(State(ctx): State<Arc<AppContext>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": ctx.started_at.elapsed().as_secs(),
        "checked_at": chrono::Utc::now().to_rfc3339(),
        "models": crate::dispatcher::MODEL_IDS,
    }))
}
