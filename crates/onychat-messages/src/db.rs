use rusqlite::Connection;

use crate::error::Result;

/// Initialise the messages table and its index.
///
/// Safe to call on every startup; uses `IF NOT EXISTS` throughout.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS messages (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            sender_id           TEXT NOT NULL,
            sender_display_name TEXT,
            recipient_id        TEXT,
            content             TEXT NOT NULL,
            timestamp           TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_messages_sender
            ON messages(sender_id, timestamp);",
    )?;
    Ok(())
}
