//! # Registration Workflow
//!
//! Binds a chat channel to a repository over a two-step conversation:
//! `Idle -> AwaitingRepoUrl -> Completed`, or `Rejected` when the channel
//! is already bound. Conversation state lives in the [`SessionMap`] and is
//! discarded on completion.

use std::sync::Arc;
use std::time::Duration;

use domains::links;
use domains::{
    ChatMessage, ChatTransport, GatewayError, NewProject, ProjectStore, RepositoryGateway,
    StoreError,
};
use tracing::{debug, info, warn};

use crate::cleanup;
use crate::session::{PendingRegistration, SessionMap};

const PROMPT_TEXT: &str = "Reply GitHub/Project URL";

pub struct RegistrationWorkflow {
    store: Arc<dyn ProjectStore>,
    gateway: Arc<dyn RepositoryGateway>,
    transport: Arc<dyn ChatTransport>,
    cleanup_delay: Duration,
}

impl RegistrationWorkflow {
    pub fn new(
        store: Arc<dyn ProjectStore>,
        gateway: Arc<dyn RepositoryGateway>,
        transport: Arc<dyn ChatTransport>,
        cleanup_delay: Duration,
    ) -> Self {
        Self {
            store,
            gateway,
            transport,
            cleanup_delay,
        }
    }

    /// Entry step: a registration trigger replying to a channel post.
    ///
    /// Registrations arrive through the relay account; triggers from other
    /// senders, or triggers that do not reply to a channel post, are
    /// ignored without a reply. A bound channel is rejected; an unbound
    /// project row (a registration that never completed) is re-opened.
    pub async fn handle_trigger(
        &self,
        sessions: &SessionMap,
        message: ChatMessage,
    ) -> anyhow::Result<()> {
        if !message.sender.is_automated {
            debug!(
                chat_id = message.chat_id,
                sender_id = message.sender.id,
                "registration trigger from non-relay sender ignored"
            );
            return Ok(());
        }
        let Some(target) = message.reply_to.as_ref() else {
            debug!(
                chat_id = message.chat_id,
                "registration trigger does not reply to anything"
            );
            return Ok(());
        };
        let Some(channel_id) = target.channel_id else {
            debug!(
                chat_id = message.chat_id,
                "registration trigger does not reply to a channel post"
            );
            return Ok(());
        };

        let project_id = match self.store.find_project_by_channel(channel_id).await? {
            Some(project) if project.is_bound() => {
                self.transport
                    .send_reply(
                        message.chat_id,
                        message.message_id,
                        &format!("[!] Project already registered (id={})", project.id),
                    )
                    .await?;
                return Ok(());
            }
            // A row without a repository is a registration that never
            // completed (lost conversation state, restart); re-open it.
            Some(project) => project.id,
            None => {
                let post_ref = links::channel_post_url(
                    target.channel_handle.as_deref(),
                    channel_id,
                    target.message_id,
                );
                let new = NewProject {
                    channel_id,
                    channel_title: target.channel_title.clone().unwrap_or_default(),
                    post_ref,
                    post_at: target.posted_at,
                };
                match self.store.insert_project(new).await {
                    Ok(id) => id,
                    // Two triggers racing on the same channel: the unique
                    // constraint rejects the loser.
                    Err(StoreError::Conflict) => {
                        let text = match self.store.find_project_by_channel(channel_id).await? {
                            Some(project) => {
                                format!("[!] Project already registered (id={})", project.id)
                            }
                            None => "[!] Project already registered".to_string(),
                        };
                        self.transport
                            .send_reply(message.chat_id, message.message_id, &text)
                            .await?;
                        return Ok(());
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        };

        let prompt_message_id = self
            .transport
            .send_reply(message.chat_id, message.message_id, PROMPT_TEXT)
            .await?;
        sessions.insert(
            message.chat_id,
            PendingRegistration {
                project_id,
                trigger_message_id: message.message_id,
                prompt_message_id,
            },
        );
        info!(project_id, channel_id, "registration started");
        Ok(())
    }

    /// `AwaitingRepoUrl` step: the relayed reply carrying the repository
    /// locator.
    ///
    /// The reply must come from the relay account and target the workflow's
    /// own prompt message; everything else is ignored and the conversation
    /// stays open.
    pub async fn handle_reply(
        &self,
        sessions: &SessionMap,
        message: ChatMessage,
    ) -> anyhow::Result<()> {
        if !message.sender.is_automated {
            return Ok(());
        }
        let Some(pending) = sessions.get(message.chat_id) else {
            return Ok(());
        };
        if message.reply_to.as_ref().map(|t| t.message_id) != Some(pending.prompt_message_id) {
            return Ok(());
        }
        let locator = message.text.trim();
        if locator.is_empty() {
            return Ok(());
        }

        let handle = match self.gateway.resolve(locator).await {
            Ok(handle) => handle,
            Err(GatewayError::UnsupportedHost(host)) => {
                self.reject_attempt(&message, &format!("[?] Not supported: {}! Try again...", host))
                    .await?;
                return Ok(());
            }
            Err(GatewayError::NotFoundOrForbidden(name)) => {
                self.reject_attempt(
                    &message,
                    &format!("[?] Repository not found or inaccessible: {}! Try again...", name),
                )
                .await?;
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        match self
            .store
            .set_project_repository(pending.project_id, &handle.url, &handle.full_name)
            .await
        {
            Ok(()) => {}
            Err(StoreError::NotFound) => {
                warn!(
                    project_id = pending.project_id,
                    "project row disappeared before repository binding"
                );
                sessions.remove(message.chat_id);
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        }

        let confirmation_id = self
            .transport
            .send_reply(
                message.chat_id,
                message.message_id,
                &format!("[!] Created a Project(id={})", pending.project_id),
            )
            .await?;
        cleanup::schedule_deletions(
            self.transport.clone(),
            message.chat_id,
            vec![
                confirmation_id,
                message.message_id,
                pending.prompt_message_id,
                pending.trigger_message_id,
            ],
            self.cleanup_delay,
        );
        sessions.remove(message.chat_id);
        info!(
            project_id = pending.project_id,
            repo = %handle.full_name,
            "registration completed"
        );
        Ok(())
    }

    /// Rejects one locator attempt: transient error reply, then both the
    /// reply and the offending message are deleted. The conversation stays
    /// in `AwaitingRepoUrl`.
    async fn reject_attempt(&self, message: &ChatMessage, text: &str) -> anyhow::Result<()> {
        let error_message_id = self
            .transport
            .send_reply(message.chat_id, message.message_id, text)
            .await?;
        cleanup::schedule_deletions(
            self.transport.clone(),
            message.chat_id,
            vec![error_message_id, message.message_id],
            self.cleanup_delay,
        );
        Ok(())
    }
}
