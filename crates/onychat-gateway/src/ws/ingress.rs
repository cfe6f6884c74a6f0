use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, WebSocketUpgrade},
        Query, State,
    },
    response::{IntoResponse, Response},
};
use onychat_core::OnychatError;
use onychat_hub::Peer;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::app::AppState;
use crate::auth::AuthError;
use crate::http::ApiError;

#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub token: Option<String>,
}

/// GET /ws?token=...: authenticate, resolve the profile, then upgrade.
///
/// Credentials are checked before the upgrade so a rejected client gets a
/// plain HTTP status instead of a socket that closes immediately.
pub async fn ws_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<WsParams>,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let peer = match authorize(&state, params.token.as_deref()).await {
        Ok(peer) => peer,
        Err(e) => return e.into_response(),
    };
    let ws = match upgrade {
        Ok(ws) => ws,
        Err(rejection) => {
            warn!(identity = %peer.identity, "not a websocket upgrade request");
            return rejection.into_response();
        }
    };

    info!(identity = %peer.identity, "upgrading to websocket");
    ws.max_message_size(state.config.gateway.max_frame_bytes)
        .on_failed_upgrade(|e| warn!(error = %e, "websocket upgrade failed"))
        .on_upgrade(move |socket| crate::ws::transport::run_connection(socket, state, peer))
}

/// Token → identity → profile. 401 for bad credentials, 404 when the
/// identity is valid but has no profile.
pub async fn authorize(state: &AppState, token: Option<&str>) -> Result<Peer, ApiError> {
    let token = token.filter(|t| !t.is_empty()).ok_or(AuthError::Missing)?;
    let identity = state.verifier.verify(token).await.map_err(|e| {
        warn!(error = %e, "websocket token rejected");
        e
    })?;
    let profile = state
        .profiles
        .find(&identity)?
        .ok_or(OnychatError::UserNotFound { id: identity })?;
    Ok(Peer::new(
        profile.id.clone(),
        Some(profile.display_name().to_string()),
    ))
}
