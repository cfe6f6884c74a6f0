use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, ErrorCode};
use tracing::{debug, info, instrument};

use crate::error::{Result, UserError};
use crate::types::{NewProfile, Profile};

/// Thread-safe access to the profiles table.
///
/// Wraps a single SQLite connection in a `Mutex`; lookups happen once per
/// connection attempt, not per message.
pub struct ProfileStore {
    db: Mutex<Connection>,
}

impl ProfileStore {
    /// Wrap an already-open (and `init_db`-initialised) connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Mutex::new(conn),
        }
    }

    /// Insert a new profile. Ids are chosen by the identity provider, so a
    /// second create for the same id is a conflict, not an update.
    #[instrument(skip(self, new), fields(id = %new.id))]
    pub fn create(&self, new: NewProfile) -> Result<Profile> {
        let id = new.id.trim();
        let email = new.email.trim();
        if id.is_empty() {
            return Err(UserError::Invalid("id must not be empty".to_string()));
        }
        if email.is_empty() {
            return Err(UserError::Invalid("email must not be empty".to_string()));
        }
        let display_name = new
            .display_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let profile = Profile {
            id: id.to_string(),
            email: email.to_string(),
            display_name,
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        let db = self.lock()?;
        let inserted = db.execute(
            "INSERT INTO profiles (id, email, display_name, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![profile.id, profile.email, profile.display_name, profile.created_at],
        );
        match inserted {
            Ok(_) => {
                info!("profile created");
                Ok(profile)
            }
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(UserError::AlreadyExists(profile.id))
            }
            Err(e) => Err(UserError::DatabaseError(e)),
        }
    }

    /// Load a profile by id. Returns None instead of an error when absent
    /// so callers decide whether missing is exceptional in their context.
    #[instrument(skip(self))]
    pub fn find(&self, id: &str) -> Result<Option<Profile>> {
        let db = self.lock()?;
        match db.query_row(
            "SELECT id, email, display_name, created_at FROM profiles WHERE id = ?1",
            params![id],
            crate::db::row_to_profile,
        ) {
            Ok(p) => Ok(Some(p)),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                debug!("profile not found");
                Ok(None)
            }
            Err(e) => Err(UserError::DatabaseError(e)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.db.lock().map_err(|_| UserError::Poisoned)
    }
}
