//! Shared fixtures for the workflow scenario tests: a recording chat
//! transport and builders for the inbound messages the scenarios replay.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use domains::{ChatMessage, ChatTransport, ReplyTarget, Sender, TransportError};

/// The relay account registrations arrive through.
pub const RELAY: Sender = Sender {
    id: 777,
    is_automated: true,
};

/// A plain human participant.
pub const HUMAN: Sender = Sender {
    id: 5,
    is_automated: false,
};

/// The channel most scenarios bind.
#[derive(Debug, Clone)]
pub struct Channel {
    pub id: i64,
    pub title: &'static str,
    pub handle: Option<&'static str>,
}

pub fn acme_channel() -> Channel {
    Channel {
        id: 42,
        title: "Acme",
        handle: Some("acme"),
    }
}

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 3, 12, 0, 0).unwrap()
}

fn channel_target(channel: &Channel, post_message_id: i64) -> ReplyTarget {
    ReplyTarget {
        message_id: post_message_id,
        posted_at: fixed_time(),
        channel_id: Some(channel.id),
        channel_title: Some(channel.title.to_string()),
        channel_handle: channel.handle.map(str::to_string),
    }
}

/// A registration trigger replying to the relayed channel post.
pub fn registration_trigger(
    chat_id: i64,
    message_id: i64,
    channel: &Channel,
    post_message_id: i64,
    sender: Sender,
) -> ChatMessage {
    ChatMessage {
        chat_id,
        message_id,
        chat_title: Some("Acme Chat".to_string()),
        sender,
        text: "/start".to_string(),
        sent_at: fixed_time(),
        reply_to: Some(channel_target(channel, post_message_id)),
    }
}

/// A conversation reply targeting `prompt_message_id` with a repository
/// locator.
pub fn repo_reply(
    chat_id: i64,
    message_id: i64,
    prompt_message_id: i64,
    text: &str,
    sender: Sender,
) -> ChatMessage {
    ChatMessage {
        chat_id,
        message_id,
        chat_title: Some("Acme Chat".to_string()),
        sender,
        text: text.to_string(),
        sent_at: fixed_time(),
        reply_to: Some(ReplyTarget {
            message_id: prompt_message_id,
            posted_at: fixed_time(),
            channel_id: None,
            channel_title: None,
            channel_handle: None,
        }),
    }
}

/// A `/report` command replying to the relayed channel post.
pub fn report_command(
    chat_id: i64,
    message_id: i64,
    channel: &Channel,
    post_message_id: i64,
    sender: Sender,
) -> ChatMessage {
    ChatMessage {
        chat_id,
        message_id,
        chat_title: Some("Acme Chat".to_string()),
        sender,
        text: "/report".to_string(),
        sent_at: fixed_time(),
        reply_to: Some(channel_target(channel, post_message_id)),
    }
}

/// A `/report` command that replies to nothing.
pub fn bare_report_command(chat_id: i64, message_id: i64, sender: Sender) -> ChatMessage {
    ChatMessage {
        chat_id,
        message_id,
        chat_title: Some("Acme Chat".to_string()),
        sender,
        text: "/report".to_string(),
        sent_at: fixed_time(),
        reply_to: None,
    }
}

/// One reply captured by [`RecordingTransport`].
#[derive(Debug, Clone)]
pub struct SentReply {
    pub chat_id: i64,
    pub reply_to: i64,
    pub message_id: i64,
    pub text: String,
}

/// Chat transport fake that records every outbound call and hands out
/// sequential message ids starting at 1000.
pub struct RecordingTransport {
    next_message_id: AtomicI64,
    sent: Mutex<Vec<SentReply>>,
    deleted: Mutex<Vec<(i64, i64)>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            next_message_id: AtomicI64::new(1000),
            sent: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<SentReply> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_sent(&self) -> Option<SentReply> {
        self.sent.lock().unwrap().last().cloned()
    }

    /// (chat_id, message_id) pairs deleted so far.
    pub fn deleted(&self) -> Vec<(i64, i64)> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_reply(
        &self,
        chat_id: i64,
        reply_to_message_id: i64,
        text: &str,
    ) -> Result<i64, TransportError> {
        let message_id = self.next_message_id.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(SentReply {
            chat_id,
            reply_to: reply_to_message_id,
            message_id,
            text: text.to_string(),
        });
        Ok(message_id)
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), TransportError> {
        self.deleted.lock().unwrap().push((chat_id, message_id));
        Ok(())
    }
}
