use thiserror::Error;

#[derive(Debug, Error)]
pub enum HubError {
    /// Every event submitted after the control loop exits fails with this.
    #[error("hub control loop has stopped")]
    Stopped,
}

/// Failure reported by a [`crate::MessageStore`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store rejected message: {0}")]
    Rejected(String),
}

pub type Result<T> = std::result::Result<T, HubError>;
