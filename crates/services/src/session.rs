//! Conversation state for in-flight registrations.
//!
//! Keyed by chat id so concurrent registrations in different chats never
//! see each other. Entries expire after a timeout; an abandoned
//! registration must not pin memory forever.

use std::time::{Duration, Instant};

use dashmap::DashMap;

/// State carried between the registration prompt and the repository reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRegistration {
    pub project_id: i64,
    /// Message id of the trigger command; deleted on completion.
    pub trigger_message_id: i64,
    /// Message id of the bot's own prompt; the correlation target.
    pub prompt_message_id: i64,
}

struct Entry {
    state: PendingRegistration,
    inserted_at: Instant,
}

/// Map from chat id to its pending registration, with expiry.
pub struct SessionMap {
    entries: DashMap<i64, Entry>,
    ttl: Duration,
}

impl SessionMap {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Starts (or restarts) a conversation for `chat_id`.
    pub fn insert(&self, chat_id: i64, state: PendingRegistration) {
        self.entries.insert(
            chat_id,
            Entry {
                state,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Returns the live entry for `chat_id`, evicting it first if expired.
    pub fn get(&self, chat_id: i64) -> Option<PendingRegistration> {
        let expired = match self.entries.get(&chat_id) {
            Some(entry) => {
                if entry.inserted_at.elapsed() <= self.ttl {
                    return Some(entry.state);
                }
                true
            }
            None => false,
        };
        if expired {
            self.entries.remove(&chat_id);
        }
        None
    }

    pub fn remove(&self, chat_id: i64) {
        self.entries.remove(&chat_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending() -> PendingRegistration {
        PendingRegistration {
            project_id: 1,
            trigger_message_id: 10,
            prompt_message_id: 11,
        }
    }

    #[test]
    fn live_entry_round_trips() {
        let sessions = SessionMap::new(Duration::from_secs(60));
        sessions.insert(7, pending());
        assert_eq!(sessions.get(7), Some(pending()));

        sessions.remove(7);
        assert_eq!(sessions.get(7), None);
    }

    #[test]
    fn expired_entry_is_evicted() {
        let sessions = SessionMap::new(Duration::ZERO);
        sessions.insert(7, pending());
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(sessions.get(7), None);
    }

    #[test]
    fn chats_do_not_share_state() {
        let sessions = SessionMap::new(Duration::from_secs(60));
        sessions.insert(7, pending());
        assert_eq!(sessions.get(8), None);
    }
}
