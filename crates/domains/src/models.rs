//! # Domain Models
//!
//! The two persisted entities of threadbridge: a `Project` binds one chat
//! channel to one remote repository, an `IssueLink` records that a tracker
//! issue exists for one channel post.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered binding between a chat channel and a remote repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    /// Identifier of the channel the discussion threads belong to.
    pub channel_id: i64,
    pub channel_title: String,
    /// Canonical URL of the channel post the registration was issued on.
    pub post_ref: String,
    pub post_at: DateTime<Utc>,
    /// Browsable URL of the bound repository. Unset until registration completes.
    pub repo_url: Option<String>,
    /// "owner/name" identifier of the bound repository.
    pub repo_full_name: Option<String>,
}

impl Project {
    /// A project only counts as bound once the repository fields are set.
    pub fn is_bound(&self) -> bool {
        self.repo_full_name.is_some()
    }
}

/// The durable record that a tracker issue exists for one channel post.
///
/// Never mutated or deleted after insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueLink {
    pub id: i64,
    pub project_id: i64,
    /// Canonical URL of the reported channel post. Deduplication key.
    pub post_ref: String,
    pub reporter_id: i64,
    /// Whether the reporting account is an automated one.
    pub reporter_is_automated: bool,
    /// URL of the discussion reply the report command was issued with.
    pub report_url: String,
    pub reported_at: DateTime<Utc>,
    /// Tracker-assigned id of the created issue.
    pub issue_id: i64,
    pub issue_url: String,
    pub issue_created_at: DateTime<Utc>,
}

/// Insert payload for a new `Project`. The id is generated by the store.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub channel_id: i64,
    pub channel_title: String,
    pub post_ref: String,
    pub post_at: DateTime<Utc>,
}

/// Insert payload for a new `IssueLink`.
#[derive(Debug, Clone)]
pub struct NewIssueLink {
    pub project_id: i64,
    pub post_ref: String,
    pub reporter_id: i64,
    pub reporter_is_automated: bool,
    pub report_url: String,
    pub reported_at: DateTime<Utc>,
    pub issue_id: i64,
    pub issue_url: String,
    pub issue_created_at: DateTime<Utc>,
}

/// A confirmed, accessible remote repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryHandle {
    /// "owner/name" identifier on the code host.
    pub full_name: String,
    /// Browsable URL of the repository.
    pub url: String,
}

/// The tracker's record of a freshly created issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRecord {
    pub id: i64,
    pub url: String,
    pub created_at: DateTime<Utc>,
}
