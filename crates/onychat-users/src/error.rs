use thiserror::Error;

/// All profile-layer errors. Kept separate from OnychatError so the gateway
/// can map them to HTTP statuses without coupling layers.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("User already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid profile: {0}")]
    Invalid(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// A previous holder of the connection lock panicked.
    #[error("Profile store lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, UserError>;

impl From<UserError> for onychat_core::OnychatError {
    fn from(e: UserError) -> Self {
        use onychat_core::OnychatError;
        match e {
            UserError::AlreadyExists(id) => OnychatError::UserExists { id },
            UserError::Invalid(reason) => OnychatError::InvalidRequest(reason),
            UserError::DatabaseError(e) => OnychatError::Database(e.to_string()),
            UserError::Poisoned => OnychatError::Internal("profile store lock poisoned".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onychat_core::OnychatError;

    #[test]
    fn every_variant_maps_to_a_client_facing_error() {
        assert!(matches!(
            OnychatError::from(UserError::AlreadyExists("u-1".into())),
            OnychatError::UserExists { id } if id == "u-1"
        ));
        assert!(matches!(
            OnychatError::from(UserError::Invalid("empty id".into())),
            OnychatError::InvalidRequest(_)
        ));
        assert!(matches!(
            OnychatError::from(UserError::DatabaseError(rusqlite::Error::QueryReturnedNoRows)),
            OnychatError::Database(_)
        ));
        assert!(matches!(
            OnychatError::from(UserError::Poisoned),
            OnychatError::Internal(_)
        ));
    }
}
