//! # Core Ports
//!
//! Any adapter must implement these traits to be wired into the workflows.

use async_trait::async_trait;

use crate::error::{GatewayError, StoreError, TransportError};
use crate::models::{IssueLink, IssueRecord, NewIssueLink, NewProject, Project, RepositoryHandle};

/// Data persistence contract for projects and issue links.
///
/// Every method is a single atomic commit; there are no multi-row writes.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn find_project_by_channel(&self, channel_id: i64)
        -> Result<Option<Project>, StoreError>;

    /// Inserts a project and returns its generated id. Fails with
    /// [`StoreError::Conflict`] when the channel is already bound.
    async fn insert_project(&self, project: NewProject) -> Result<i64, StoreError>;

    /// Sets the repository fields of an existing project.
    async fn set_project_repository(
        &self,
        project_id: i64,
        repo_url: &str,
        repo_full_name: &str,
    ) -> Result<(), StoreError>;

    async fn find_issue_link(
        &self,
        project_id: i64,
        post_ref: &str,
    ) -> Result<Option<IssueLink>, StoreError>;

    /// Inserts an issue link and returns its generated id. Fails with
    /// [`StoreError::Conflict`] when the post is already linked.
    async fn insert_issue_link(&self, link: NewIssueLink) -> Result<i64, StoreError>;
}

/// Contract for the remote issue tracker.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait RepositoryGateway: Send + Sync {
    /// Resolves a user-supplied locator (browsable URL or "owner/name" path)
    /// to a confirmed, accessible repository.
    async fn resolve(&self, locator: &str) -> Result<RepositoryHandle, GatewayError>;

    /// Creates an issue in the repository behind `handle`.
    async fn create_issue(
        &self,
        handle: &RepositoryHandle,
        title: &str,
        body: &str,
    ) -> Result<IssueRecord, GatewayError>;
}

/// Outbound half of the chat transport.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Sends `text` as a reply to `reply_to_message_id` and returns the id
    /// of the sent message.
    async fn send_reply(
        &self,
        chat_id: i64,
        reply_to_message_id: i64,
        text: &str,
    ) -> Result<i64, TransportError>;

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), TransportError>;
}
