//! Deferred deletion of transient messages.
//!
//! Error and confirmation replies are deleted shortly after being sent so
//! the discussion stays uncluttered. Deletion runs on a detached timer and
//! never blocks the workflow that scheduled it.

use std::sync::Arc;
use std::time::Duration;

use domains::ChatTransport;
use tracing::warn;

/// Deletes `message_ids` in `chat_id` after `delay`.
///
/// Fire and forget: failures are logged and dropped.
pub fn schedule_deletions(
    transport: Arc<dyn ChatTransport>,
    chat_id: i64,
    message_ids: Vec<i64>,
    delay: Duration,
) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        for message_id in message_ids {
            if let Err(err) = transport.delete_message(chat_id, message_id).await {
                warn!(chat_id, message_id, %err, "failed to delete transient message");
            }
        }
    });
}
