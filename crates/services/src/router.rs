//! Event classification.
//!
//! Which handler fires is an explicit function of the message text and the
//! chat's conversation state, expressed as a tagged event type.

use domains::ChatMessage;

const REGISTER_COMMAND: &str = "/start";
const REPORT_COMMAND: &str = "/report";

/// The kinds of inbound events the bot acts on.
#[derive(Debug)]
pub enum Event {
    /// Admin-initiated registration trigger on a channel post.
    RegistrationTrigger(ChatMessage),
    /// Reply inside a chat that has a registration conversation in flight.
    ConversationReply(ChatMessage),
    /// Request to turn the replied-to channel post into a tracker issue.
    ReportCommand(ChatMessage),
    /// Anything the bot has no business with.
    Ignored,
}

/// Routes a message by (command, conversation state).
pub fn classify(message: ChatMessage, has_pending_registration: bool) -> Event {
    match command(&message.text) {
        Some(REGISTER_COMMAND) => Event::RegistrationTrigger(message),
        Some(REPORT_COMMAND) => Event::ReportCommand(message),
        _ if has_pending_registration => Event::ConversationReply(message),
        _ => Event::Ignored,
    }
}

/// Extracts the leading bot command, dropping a trailing `@botname` suffix.
fn command(text: &str) -> Option<&str> {
    let first = text.split_whitespace().next()?;
    if !first.starts_with('/') {
        return None;
    }
    first.split('@').next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domains::Sender;

    fn message(text: &str) -> ChatMessage {
        ChatMessage {
            chat_id: 1,
            message_id: 2,
            chat_title: None,
            sender: Sender {
                id: 3,
                is_automated: false,
            },
            text: text.to_string(),
            sent_at: Utc::now(),
            reply_to: None,
        }
    }

    #[test]
    fn start_command_triggers_registration() {
        assert!(matches!(
            classify(message("/start"), false),
            Event::RegistrationTrigger(_)
        ));
        assert!(matches!(
            classify(message("/start@threadbridge_bot"), false),
            Event::RegistrationTrigger(_)
        ));
    }

    #[test]
    fn report_command_wins_over_pending_conversation() {
        assert!(matches!(
            classify(message("/report"), true),
            Event::ReportCommand(_)
        ));
    }

    #[test]
    fn plain_text_routes_by_conversation_state() {
        assert!(matches!(
            classify(message("https://github.com/acme/repo"), true),
            Event::ConversationReply(_)
        ));
        assert!(matches!(
            classify(message("https://github.com/acme/repo"), false),
            Event::Ignored
        ));
    }

    #[test]
    fn unknown_command_is_ignored() {
        assert!(matches!(classify(message("/help"), false), Event::Ignored));
    }
}
