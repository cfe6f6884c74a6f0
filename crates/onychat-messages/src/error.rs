use thiserror::Error;

#[derive(Debug, Error)]
pub enum MessageLogError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("message log lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, MessageLogError>;
