use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /api/health
/// Liveness only. `provider` summarizes the dispatch mode, never a per-request vendor.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let provider = match state.dispatcher.available_providers().len() {
        0 => "unconfigured",
        1 => "single",
        _ => "round-robin",
    };

    Json(json!({
        "status": "ok",
        "provider": provider
    }))
}
