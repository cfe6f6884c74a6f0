use async_trait::async_trait;
use onychat_protocol::Message;

use crate::error::StoreError;

/// Durable sink for broadcast messages.
///
/// The hub calls `persist` once per broadcast, under its own deadline.
/// Implementations doing blocking I/O should move it off the async
/// executor so the deadline can fire.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn persist(&self, message: &Message) -> Result<(), StoreError>;
}
