//! Profile endpoints: POST /api/users and GET /api/me.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use onychat_core::OnychatError;
use onychat_users::{NewProfile, Profile};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::app::AppState;
use crate::auth::{extract_bearer, AuthError};
use crate::http::ApiError;

/// POST /api/users: register a profile for an identity.
///
/// 200 with the stored profile, 409 if the id is taken, 400 on a bad body.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewProfile>, JsonRejection>,
) -> Result<Json<Profile>, ApiError> {
    let Json(new) = body.map_err(|e| OnychatError::InvalidRequest(e.body_text()))?;
    let profile = state.profiles.create(new)?;
    info!(id = %profile.id, "profile registered over http");
    Ok(Json(profile))
}

/// GET /api/me: echo the identity behind a bearer token.
pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let token = extract_bearer(&headers).ok_or(AuthError::Missing)?;
    let uid = state.verifier.verify(token).await?;
    Ok(Json(json!({
        "message": "Welcome, authenticated user!",
        "uid": uid,
    })))
}
