use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::app::AppState;

/// GET /health: liveness probe, returns server metadata.
///
/// A stopped hub is reported as `degraded` with no member count rather than
/// failing the probe outright.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let (status, members) = match state.hub.members().await {
        Ok(members) => ("ok", Some(members.len())),
        Err(_) => ("degraded", None),
    };
    Json(json!({
        "status": status,
        "version": env!("CARGO_PKG_VERSION"),
        "members": members,
    }))
}
