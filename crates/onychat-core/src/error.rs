use thiserror::Error;

#[derive(Debug, Error)]
pub enum OnychatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("User not found: {id}")]
    UserNotFound { id: String },

    #[error("User already exists: {id}")]
    UserExists { id: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl OnychatError {
    /// Short error code string sent to clients in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            OnychatError::Config(_) => "CONFIG_ERROR",
            OnychatError::AuthFailed(_) => "AUTH_FAILED",
            OnychatError::UserNotFound { .. } => "USER_NOT_FOUND",
            OnychatError::UserExists { .. } => "USER_EXISTS",
            OnychatError::InvalidRequest(_) => "INVALID_REQUEST",
            OnychatError::Database(_) => "DATABASE_ERROR",
            OnychatError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, OnychatError>;
