use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use onychat_hub::{MessageStore, StoreError};
use onychat_protocol::Message;
use rusqlite::{params, Connection};
use tracing::{debug, instrument};

use crate::error::{MessageLogError, Result};

/// Append-only log of every broadcast message.
///
/// The connection sits behind `Arc<Mutex<_>>` so inserts can run on the
/// blocking pool while the hub's deadline runs on the async side.
#[derive(Clone)]
pub struct MessageLog {
    db: Arc<Mutex<Connection>>,
}

impl MessageLog {
    /// Wrap an already-open (and `init_db`-initialised) connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
        }
    }

    /// Insert one message, returning its row id.
    #[instrument(skip(self, message), fields(sender = message.sender_id()))]
    pub fn append(&self, message: &Message) -> Result<i64> {
        insert(&self.db, message)
    }

    /// Number of stored messages.
    pub fn count(&self) -> Result<u64> {
        let db = self.db.lock().map_err(|_| MessageLogError::Poisoned)?;
        let n: i64 = db.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))?;
        Ok(n as u64)
    }
}

fn insert(db: &Mutex<Connection>, message: &Message) -> Result<i64> {
    let db = db.lock().map_err(|_| MessageLogError::Poisoned)?;
    db.execute(
        "INSERT INTO messages
         (sender_id, sender_display_name, recipient_id, content, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            message.sender_id(),
            message.sender_display_name(),
            message.recipient_id(),
            message.content(),
            message.timestamp().to_rfc3339(),
        ],
    )?;
    let id = db.last_insert_rowid();
    debug!(id, "message stored");
    Ok(id)
}

#[async_trait]
impl MessageStore for MessageLog {
    async fn persist(&self, message: &Message) -> std::result::Result<(), StoreError> {
        let db = Arc::clone(&self.db);
        let message = message.clone();
        tokio::task::spawn_blocking(move || insert(&db, &message))
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
            .map(|_| ())
            .map_err(|e| match e {
                MessageLogError::Poisoned => StoreError::Unavailable(e.to_string()),
                MessageLogError::Database(_) => StoreError::Rejected(e.to_string()),
            })
    }
}
