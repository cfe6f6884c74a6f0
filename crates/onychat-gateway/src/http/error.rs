use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use onychat_core::OnychatError;
use serde_json::json;
use tracing::warn;

/// HTTP face of [`OnychatError`]. Handlers return `Result<_, ApiError>` and
/// use `?` on any layer's error that converts into `OnychatError`.
#[derive(Debug)]
pub struct ApiError(pub OnychatError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            OnychatError::AuthFailed(_) => StatusCode::UNAUTHORIZED,
            OnychatError::UserNotFound { .. } => StatusCode::NOT_FOUND,
            OnychatError::UserExists { .. } => StatusCode::CONFLICT,
            OnychatError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<OnychatError> for ApiError {
    fn from(e: OnychatError) -> Self {
        ApiError(e)
    }
}

impl From<onychat_users::UserError> for ApiError {
    fn from(e: onychat_users::UserError) -> Self {
        ApiError(e.into())
    }
}

impl From<crate::auth::AuthError> for ApiError {
    fn from(e: crate::auth::AuthError) -> Self {
        ApiError(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // server-side detail stays in the log
        let message = if status.is_server_error() {
            warn!(code = self.0.code(), error = %self.0, "request failed");
            "internal error".to_string()
        } else {
            self.0.to_string()
        };
        let body = json!({ "error": message, "code": self.0.code() });
        (status, Json(body)).into_response()
    }
}
