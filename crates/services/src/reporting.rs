//! # Reporting Workflow
//!
//! Turns a discussion reply into a tracker issue, guaranteeing at most one
//! issue per reported channel post. Stateless per invocation.

use std::sync::Arc;

use domains::links;
use domains::{
    ChatMessage, ChatTransport, GatewayError, NewIssueLink, ProjectStore, RepositoryGateway,
    StoreError,
};
use tracing::{info, warn};

const MESSAGE_DT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct ReportingWorkflow {
    store: Arc<dyn ProjectStore>,
    gateway: Arc<dyn RepositoryGateway>,
    transport: Arc<dyn ChatTransport>,
}

impl ReportingWorkflow {
    pub fn new(
        store: Arc<dyn ProjectStore>,
        gateway: Arc<dyn RepositoryGateway>,
        transport: Arc<dyn ChatTransport>,
    ) -> Self {
        Self {
            store,
            gateway,
            transport,
        }
    }

    pub async fn handle_report(&self, message: ChatMessage) -> anyhow::Result<()> {
        let Some((target, channel_id)) = message
            .reply_to
            .as_ref()
            .and_then(|t| t.channel_id.map(|id| (t, id)))
        else {
            self.transport
                .send_reply(
                    message.chat_id,
                    message.message_id,
                    "[?] /report only works as a reply inside a channel discussion",
                )
                .await?;
            return Ok(());
        };
        let channel_title = target.channel_title.clone().unwrap_or_default();

        let Some(project) = self.store.find_project_by_channel(channel_id).await? else {
            self.transport
                .send_reply(
                    message.chat_id,
                    message.message_id,
                    &format!(
                        "[?] Project is not registered for the chat: {}\n[!] Bot/Admin only /start",
                        channel_title
                    ),
                )
                .await?;
            return Ok(());
        };
        let Some(repo_full_name) = project.repo_full_name.clone() else {
            self.transport
                .send_reply(
                    message.chat_id,
                    message.message_id,
                    &format!(
                        "[?] Project registration is not completed for the chat: {}\n[!] Bot/Admin only /start",
                        channel_title
                    ),
                )
                .await?;
            return Ok(());
        };

        let post_ref =
            links::channel_post_url(target.channel_handle.as_deref(), channel_id, target.message_id);
        if let Some(existing) = self.store.find_issue_link(project.id, &post_ref).await? {
            self.transport
                .send_reply(
                    message.chat_id,
                    message.message_id,
                    &format!(
                        "[!] An Issue already has been created at: {}",
                        existing.issue_url
                    ),
                )
                .await?;
            return Ok(());
        }

        let handle = match self.gateway.resolve(&repo_full_name).await {
            Ok(handle) => handle,
            Err(GatewayError::NotFoundOrForbidden(name))
            | Err(GatewayError::UnsupportedHost(name)) => {
                self.transport
                    .send_reply(
                        message.chat_id,
                        message.message_id,
                        &format!("[?] Repository is not accessible: {}", name),
                    )
                    .await?;
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        let comment_url = links::comment_url(&post_ref, message.message_id);
        let title = format!("{}/{}", project.channel_title, message.message_id);
        let body = format!(
            "[{}] - [{}] - [{}]\n//\n[ChatPostURL]({}) - [ChatPostCommentURL]({})",
            message.sent_at.format(MESSAGE_DT_FORMAT),
            message.sender.is_automated,
            message.sender.id,
            post_ref,
            comment_url,
        );
        let issue = match self.gateway.create_issue(&handle, &title, &body).await {
            Ok(issue) => issue,
            Err(err) => {
                warn!(project_id = project.id, %err, "remote issue creation failed");
                self.transport
                    .send_reply(
                        message.chat_id,
                        message.message_id,
                        "[?] Could not create the Issue, try again later",
                    )
                    .await?;
                return Ok(());
            }
        };

        // The remote issue exists from here on. A failed insert below leaves
        // an orphaned remote issue with no local record; accepted gap.
        let link = NewIssueLink {
            project_id: project.id,
            post_ref: post_ref.clone(),
            reporter_id: message.sender.id,
            reporter_is_automated: message.sender.is_automated,
            report_url: comment_url,
            reported_at: message.sent_at,
            issue_id: issue.id,
            issue_url: issue.url.clone(),
            issue_created_at: issue.created_at,
        };
        match self.store.insert_issue_link(link).await {
            Ok(_) => {}
            Err(StoreError::Conflict) => {
                warn!(
                    project_id = project.id,
                    post_ref = %post_ref,
                    "issue link already present after remote creation"
                );
            }
            Err(err) => return Err(err.into()),
        }

        self.transport
            .send_reply(
                message.chat_id,
                message.message_id,
                &format!("[!] Created an Issue at: {}", issue.url),
            )
            .await?;
        info!(
            project_id = project.id,
            issue_id = issue.id,
            "issue created for channel post"
        );
        Ok(())
    }
}
