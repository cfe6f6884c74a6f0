use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use onychat_core::config::{HubConfig, OnychatConfig};
use onychat_hub::{Hub, HubHandle, MessageStore};
use onychat_users::ProfileStore;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::auth::TokenVerifier;

/// Central shared state passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: OnychatConfig,
    /// Submitter side of the hub control loop. The membership set itself is
    /// never reachable from handlers.
    pub hub: HubHandle,
    pub profiles: ProfileStore,
    pub verifier: Arc<dyn TokenVerifier>,
}

impl AppState {
    pub fn new(
        config: OnychatConfig,
        hub: HubHandle,
        profiles: ProfileStore,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        Self {
            config,
            hub,
            profiles,
            verifier,
        }
    }
}

/// Start the hub control loop on the runtime. The task ends once every
/// `HubHandle` clone has been dropped.
pub fn spawn_hub(config: HubConfig, store: Arc<dyn MessageStore>) -> (HubHandle, JoinHandle<()>) {
    let (hub, handle) = Hub::new(store, config);
    let task = tokio::spawn(hub.run());
    (handle, task)
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.gateway.cors_origins);
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route("/api/users", post(crate::http::users::create_user))
        .route("/api/me", get(crate::http::users::me_handler))
        .route("/ws", get(crate::ws::ingress::ws_handler))
        .with_state(state)
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
