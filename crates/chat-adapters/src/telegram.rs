//! Long polling, outbound replies, and conversion into domain events.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use domains::{ChatMessage, ChatTransport, ReplyTarget, Sender, TransportError};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::wire;

/// One entry from `getUpdates`. `message` is `None` for updates the bot
/// does not consume (non-text payloads, service messages).
#[derive(Debug)]
pub struct InboundUpdate {
    pub update_id: i64,
    pub message: Option<ChatMessage>,
}

pub struct TelegramTransport {
    client: reqwest::Client,
    api_base: String,
    poll_timeout: Duration,
}

impl TelegramTransport {
    pub fn new(token: SecretString, poll_timeout: Duration) -> Result<Self, TransportError> {
        // Long-poll requests stay open for the full timeout; give the HTTP
        // client some slack on top of it.
        let client = reqwest::Client::builder()
            .timeout(poll_timeout + Duration::from_secs(10))
            .build()
            .map_err(remote)?;
        Ok(Self {
            client,
            api_base: format!("https://api.telegram.org/bot{}", token.expose_secret()),
            poll_timeout,
        })
    }

    /// Fetches the next batch of updates. `offset` must be one past the
    /// highest update id already handled.
    pub async fn fetch_updates(&self, offset: i64) -> Result<Vec<InboundUpdate>, TransportError> {
        let url = format!("{}/getUpdates", self.api_base);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", self.poll_timeout.as_secs().to_string()),
            ])
            .send()
            .await
            .map_err(remote)?;
        let payload: wire::ApiResponse<Vec<wire::Update>> =
            response.json().await.map_err(remote)?;
        let updates = unwrap_api(payload)?;
        Ok(updates
            .into_iter()
            .map(|update| InboundUpdate {
                update_id: update.update_id,
                message: update.message.and_then(into_chat_message),
            })
            .collect())
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_reply(
        &self,
        chat_id: i64,
        reply_to_message_id: i64,
        text: &str,
    ) -> Result<i64, TransportError> {
        let url = format!("{}/sendMessage", self.api_base);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "chat_id": chat_id,
                "text": text,
                "reply_to_message_id": reply_to_message_id,
            }))
            .send()
            .await
            .map_err(remote)?;
        let payload: wire::ApiResponse<wire::Message> = response.json().await.map_err(remote)?;
        Ok(unwrap_api(payload)?.message_id)
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), TransportError> {
        let url = format!("{}/deleteMessage", self.api_base);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "chat_id": chat_id,
                "message_id": message_id,
            }))
            .send()
            .await
            .map_err(remote)?;
        let payload: wire::ApiResponse<bool> = response.json().await.map_err(remote)?;
        unwrap_api(payload)?;
        Ok(())
    }
}

// reqwest error text can embed the request URL, which carries the bot
// token; strip it before the error reaches any log line.
fn remote(err: reqwest::Error) -> TransportError {
    TransportError::Remote(err.without_url().to_string())
}

fn unwrap_api<T>(payload: wire::ApiResponse<T>) -> Result<T, TransportError> {
    if !payload.ok {
        return Err(TransportError::Remote(
            payload
                .description
                .unwrap_or_else(|| "telegram api returned ok=false".to_string()),
        ));
    }
    payload
        .result
        .ok_or_else(|| TransportError::Remote("telegram api returned an empty result".to_string()))
}

/// Converts a wire message into the domain event shape. Non-text messages
/// and messages without a sender are dropped.
fn into_chat_message(message: wire::Message) -> Option<ChatMessage> {
    let text = message.text?;
    let from = message.from?;
    let sent_at = match Utc.timestamp_opt(message.date, 0).single() {
        Some(sent_at) => sent_at,
        None => {
            debug!(message_id = message.message_id, "dropping message with invalid date");
            return None;
        }
    };
    let reply_to = message.reply_to_message.map(|replied| {
        // Channel posts relayed into the discussion group carry the channel
        // as sender_chat.
        let channel = replied.sender_chat.filter(|chat| chat.kind == "channel");
        ReplyTarget {
            message_id: replied.message_id,
            posted_at: Utc
                .timestamp_opt(replied.date, 0)
                .single()
                .unwrap_or(sent_at),
            channel_id: channel.as_ref().map(|chat| chat.id),
            channel_title: channel.as_ref().and_then(|chat| chat.title.clone()),
            channel_handle: channel.and_then(|chat| chat.username),
        }
    });
    Some(ChatMessage {
        chat_id: message.chat.id,
        message_id: message.message_id,
        chat_title: message.chat.title,
        sender: Sender {
            id: from.id,
            is_automated: from.is_bot,
        },
        text,
        sent_at,
        reply_to,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const UPDATE_BATCH: &str = r#"{
        "ok": true,
        "result": [
            {
                "update_id": 9001,
                "message": {
                    "message_id": 55,
                    "from": {"id": 777, "is_bot": true, "first_name": "relay"},
                    "chat": {"id": -200, "type": "supergroup", "title": "Acme Chat"},
                    "date": 1714764000,
                    "text": "/start",
                    "reply_to_message": {
                        "message_id": 10,
                        "sender_chat": {
                            "id": -1001234567890,
                            "type": "channel",
                            "title": "Acme",
                            "username": "acme"
                        },
                        "chat": {"id": -200, "type": "supergroup"},
                        "date": 1714763000
                    }
                }
            },
            {
                "update_id": 9002,
                "message": {
                    "message_id": 56,
                    "from": {"id": 5, "is_bot": false},
                    "chat": {"id": -200, "type": "supergroup"},
                    "date": 1714764100,
                    "photo": []
                }
            }
        ]
    }"#;

    #[test]
    fn update_batch_deserializes_and_converts() {
        let payload: wire::ApiResponse<Vec<wire::Update>> =
            serde_json::from_str(UPDATE_BATCH).unwrap();
        let updates = unwrap_api(payload).unwrap();
        assert_eq!(updates.len(), 2);

        let message = updates
            .into_iter()
            .next()
            .and_then(|u| u.message)
            .and_then(into_chat_message)
            .expect("first update should convert");
        assert_eq!(message.chat_id, -200);
        assert_eq!(message.message_id, 55);
        assert_eq!(message.text, "/start");
        assert!(message.sender.is_automated);

        let target = message.reply_to.expect("reply target should be present");
        assert_eq!(target.message_id, 10);
        assert_eq!(target.channel_id, Some(-1001234567890));
        assert_eq!(target.channel_title.as_deref(), Some("Acme"));
        assert_eq!(target.channel_handle.as_deref(), Some("acme"));
    }

    #[test]
    fn non_text_messages_are_dropped() {
        let payload: wire::ApiResponse<Vec<wire::Update>> =
            serde_json::from_str(UPDATE_BATCH).unwrap();
        let updates = unwrap_api(payload).unwrap();
        let second = updates.into_iter().nth(1).unwrap();
        assert!(second.message.and_then(into_chat_message).is_none());
    }

    #[test]
    fn api_failure_surfaces_the_description() {
        let payload: wire::ApiResponse<bool> = serde_json::from_str(
            r#"{"ok": false, "description": "Bad Request: message to delete not found"}"#,
        )
        .unwrap();
        let err = unwrap_api(payload).unwrap_err();
        assert!(err.to_string().contains("message to delete not found"));
    }

    #[test]
    fn reply_from_a_plain_user_is_not_a_channel_post() {
        let raw = r#"{
            "message_id": 60,
            "from": {"id": 5, "is_bot": false},
            "chat": {"id": -200, "type": "supergroup"},
            "date": 1714764200,
            "text": "hello",
            "reply_to_message": {
                "message_id": 58,
                "from": {"id": 6, "is_bot": false},
                "chat": {"id": -200, "type": "supergroup"},
                "date": 1714764150
            }
        }"#;
        let message: wire::Message = serde_json::from_str(raw).unwrap();
        let message = into_chat_message(message).unwrap();
        let target = message.reply_to.unwrap();
        assert!(!target.is_channel_post());
    }
}
