//! # Dispatcher
//!
//! Owns the workflows and the conversation-state map, routes each inbound
//! message, and recovers every failure into a log line so no single event
//! can take the process down.

use std::sync::Arc;
use std::time::Duration;

use domains::{ChatMessage, ChatTransport, ProjectStore, RepositoryGateway};
use tracing::error;

use crate::registration::RegistrationWorkflow;
use crate::reporting::ReportingWorkflow;
use crate::router::{self, Event};
use crate::session::SessionMap;

/// Tunables the binary wires in from configuration.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Delay before transient replies (and the messages they answer) are
    /// deleted.
    pub cleanup_delay: Duration,
    /// Abandoned registration conversations expire after this long.
    pub session_ttl: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            cleanup_delay: Duration::from_millis(1800),
            session_ttl: Duration::from_secs(900),
        }
    }
}

pub struct Dispatcher {
    sessions: SessionMap,
    registration: RegistrationWorkflow,
    reporting: ReportingWorkflow,
}

impl Dispatcher {
    pub fn new(
        store: Arc<dyn ProjectStore>,
        gateway: Arc<dyn RepositoryGateway>,
        transport: Arc<dyn ChatTransport>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            sessions: SessionMap::new(config.session_ttl),
            registration: RegistrationWorkflow::new(
                store.clone(),
                gateway.clone(),
                transport.clone(),
                config.cleanup_delay,
            ),
            reporting: ReportingWorkflow::new(store, gateway, transport),
        }
    }

    /// Routes one inbound message to its workflow.
    pub async fn dispatch(&self, message: ChatMessage) {
        let chat_id = message.chat_id;
        let has_pending = self.sessions.get(chat_id).is_some();
        let outcome = match router::classify(message, has_pending) {
            Event::RegistrationTrigger(message) => {
                self.registration
                    .handle_trigger(&self.sessions, message)
                    .await
            }
            Event::ConversationReply(message) => {
                self.registration.handle_reply(&self.sessions, message).await
            }
            Event::ReportCommand(message) => self.reporting.handle_report(message).await,
            Event::Ignored => Ok(()),
        };
        if let Err(err) = outcome {
            error!(chat_id, %err, "event handling failed");
        }
    }
}
