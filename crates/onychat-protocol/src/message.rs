use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Client → Server chat frame.
/// Wire: `{ "content": "hi", "recipientId": "u-2" }` (`recipientId` optional)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientFrame {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
}

impl ClientFrame {
    /// Parse one inbound text frame.
    ///
    /// An empty `recipientId` means "everyone" and is normalised to `None`.
    pub fn decode(text: &str) -> Result<Self> {
        let mut frame: ClientFrame = serde_json::from_str(text)?;
        if frame.recipient_id.as_deref().is_some_and(str::is_empty) {
            frame.recipient_id = None;
        }
        Ok(frame)
    }
}

/// A chat message as persisted and fanned out to every live connection.
/// Wire: `{ "senderId": "u-1", "senderDisplayName": "a@b.c", "content": "hi",
///          "timestamp": "2026-01-01T00:00:00Z" }`
///
/// Fields are read-only after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    sender_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sender_display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recipient_id: Option<String>,
    content: String,
    timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(
        sender_id: impl Into<String>,
        sender_display_name: Option<String>,
        recipient_id: Option<String>,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            sender_id: sender_id.into(),
            sender_display_name,
            recipient_id,
            content: content.into(),
            timestamp,
        }
    }

    /// Stamp a decoded client frame with the sender's identity and the current time.
    pub fn from_client(sender_id: &str, sender_display_name: Option<&str>, frame: ClientFrame) -> Self {
        Self::new(
            sender_id,
            sender_display_name.map(str::to_string),
            frame.recipient_id,
            frame.content,
            Utc::now(),
        )
    }

    pub fn sender_id(&self) -> &str {
        &self.sender_id
    }

    pub fn sender_display_name(&self) -> Option<&str> {
        self.sender_display_name.as_deref()
    }

    pub fn recipient_id(&self) -> Option<&str> {
        self.recipient_id.as_deref()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Serialize to the server → client JSON shape.
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
