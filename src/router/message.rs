//! Routed message types
//!
//! A [`Message`] is an immutable value. It is either addressed to a single
//! recipient or broadcast to everyone registered when the loop processes it.
//! Whether a direct recipient exists is only resolved at delivery time.

use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;

/// Delivery mode of a message
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// Deliver to exactly one recipient
    Direct(String),
    /// Deliver to every registered recipient
    Broadcast,
}

/// A message routed between users
///
/// Cheap to clone: the content is reference counted, so a broadcast shares
/// one allocation across all mailboxes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Sender id
    pub sender: String,
    /// Direct recipient or broadcast
    pub target: Target,
    /// Always valid UTF-8 (only ever built from a `String`)
    content: Bytes,
    /// Milliseconds since the UNIX epoch
    pub timestamp: i64,
}

impl Message {
    /// Create a message addressed to a single recipient
    pub fn direct(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::new(sender.into(), Target::Direct(recipient.into()), content.into())
    }

    /// Create a message for every registered recipient
    pub fn broadcast(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(sender.into(), Target::Broadcast, content.into())
    }

    fn new(sender: String, target: Target, content: String) -> Self {
        Self {
            sender,
            target,
            content: Bytes::from(content),
            timestamp: now_millis(),
        }
    }

    /// Override the timestamp (e.g. with a logical clock)
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Text payload
    pub fn content(&self) -> &str {
        std::str::from_utf8(&self.content).unwrap_or_default()
    }

    pub fn is_broadcast(&self) -> bool {
        self.target == Target::Broadcast
    }

    /// Recipient of a direct message; `None` for broadcasts
    pub fn recipient(&self) -> Option<&str> {
        match &self.target {
            Target::Direct(recipient) => Some(recipient),
            Target::Broadcast => None,
        }
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
