//! # Inbound Chat Events
//!
//! Transport-agnostic shape of an inbound message. The chat adapter fills
//! these in from its wire types; the workflow layer never sees the wire.

use chrono::{DateTime, Utc};

/// Identity of the account that sent a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sender {
    pub id: i64,
    /// True for bot/relay accounts, false for humans.
    pub is_automated: bool,
}

/// Metadata of the message an inbound message replies to.
#[derive(Debug, Clone)]
pub struct ReplyTarget {
    pub message_id: i64,
    pub posted_at: DateTime<Utc>,
    /// Set when the replied-to message originated from a channel.
    pub channel_id: Option<i64>,
    pub channel_title: Option<String>,
    /// Public handle of the originating channel, when it has one.
    pub channel_handle: Option<String>,
}

impl ReplyTarget {
    /// Whether the replied-to message is a relayed channel post.
    pub fn is_channel_post(&self) -> bool {
        self.channel_id.is_some()
    }
}

/// One inbound text message, as delivered by the transport adapter.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub chat_id: i64,
    pub message_id: i64,
    pub chat_title: Option<String>,
    pub sender: Sender,
    pub text: String,
    pub sent_at: DateTime<Utc>,
    pub reply_to: Option<ReplyTarget>,
}
