use rusqlite::{Connection, Result};

use crate::types::Profile;

/// Map a SELECT row (id, email, display_name, created_at) to a Profile.
pub(crate) fn row_to_profile(row: &rusqlite::Row<'_>) -> Result<Profile> {
    Ok(Profile {
        id: row.get(0)?,
        email: row.get(1)?,
        display_name: row.get(2)?,
        created_at: row.get(3)?,
    })
}

/// Initialise the profiles table. Safe to call on every startup.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS profiles (
            id            TEXT PRIMARY KEY NOT NULL,
            email         TEXT NOT NULL,
            display_name  TEXT,
            created_at    TEXT NOT NULL
        );",
    )
}
