//! # SQLite Record Store
//!
//! Maps the relational rows onto the `domains` entities. Every write is a
//! single-statement commit; the UNIQUE constraints on the channel id and on
//! (project_id, post_ref) close the check-then-insert races at the store
//! level.

use std::path::Path;

use async_trait::async_trait;
use domains::{IssueLink, NewIssueLink, NewProject, Project, ProjectStore, StoreError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS projects (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    channel_id     BIGINT  NOT NULL UNIQUE,
    channel_title  TEXT    NOT NULL,
    post_ref       TEXT    NOT NULL,
    post_at        TEXT    NOT NULL,
    repo_url       TEXT,
    repo_full_name TEXT
);
CREATE TABLE IF NOT EXISTS issue_links (
    id                    INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id            INTEGER NOT NULL REFERENCES projects(id),
    post_ref              TEXT    NOT NULL,
    reporter_id           BIGINT  NOT NULL,
    reporter_is_automated BOOLEAN NOT NULL,
    report_url            TEXT    NOT NULL,
    reported_at           TEXT    NOT NULL,
    issue_id              BIGINT  NOT NULL,
    issue_url             TEXT    NOT NULL,
    issue_created_at      TEXT    NOT NULL,
    UNIQUE (project_id, post_ref)
);
"#;

pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Opens (creating if needed) the database at `path` and applies the
    /// schema. The parent directory is created on first start.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|err| StoreError::Unavailable(err.to_string()))?;
            }
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        Self::with_options(options).await
    }

    /// In-memory database, used by tests.
    pub async fn in_memory() -> Result<Self, StoreError> {
        Self::with_options(SqliteConnectOptions::new().in_memory(true)).await
    }

    async fn with_options(options: SqliteConnectOptions) -> Result<Self, StoreError> {
        // One connection is enough for the single-worker event loop, and it
        // keeps an in-memory database alive for the pool's whole lifetime.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(unavailable)?;
        sqlx::raw_sql(SCHEMA)
            .execute(&pool)
            .await
            .map_err(unavailable)?;
        Ok(Self { pool })
    }
}

fn unavailable(err: sqlx::Error) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

fn map_write_err(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict,
        _ => StoreError::Unavailable(err.to_string()),
    }
}

fn project_from_row(row: SqliteRow) -> Project {
    Project {
        id: row.get("id"),
        channel_id: row.get("channel_id"),
        channel_title: row.get("channel_title"),
        post_ref: row.get("post_ref"),
        post_at: row.get("post_at"),
        repo_url: row.get("repo_url"),
        repo_full_name: row.get("repo_full_name"),
    }
}

fn issue_link_from_row(row: SqliteRow) -> IssueLink {
    IssueLink {
        id: row.get("id"),
        project_id: row.get("project_id"),
        post_ref: row.get("post_ref"),
        reporter_id: row.get("reporter_id"),
        reporter_is_automated: row.get("reporter_is_automated"),
        report_url: row.get("report_url"),
        reported_at: row.get("reported_at"),
        issue_id: row.get("issue_id"),
        issue_url: row.get("issue_url"),
        issue_created_at: row.get("issue_created_at"),
    }
}

#[async_trait]
impl ProjectStore for SqliteRecordStore {
    async fn find_project_by_channel(
        &self,
        channel_id: i64,
    ) -> Result<Option<Project>, StoreError> {
        let row = sqlx::query(
            "SELECT id, channel_id, channel_title, post_ref, post_at, repo_url, repo_full_name \
             FROM projects WHERE channel_id = ?",
        )
        .bind(channel_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;
        Ok(row.map(project_from_row))
    }

    async fn insert_project(&self, project: NewProject) -> Result<i64, StoreError> {
        let result = sqlx::query(
            "INSERT INTO projects (channel_id, channel_title, post_ref, post_at) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(project.channel_id)
        .bind(&project.channel_title)
        .bind(&project.post_ref)
        .bind(project.post_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_err)?;
        Ok(result.last_insert_rowid())
    }

    async fn set_project_repository(
        &self,
        project_id: i64,
        repo_url: &str,
        repo_full_name: &str,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE projects SET repo_url = ?, repo_full_name = ? WHERE id = ?",
        )
        .bind(repo_url)
        .bind(repo_full_name)
        .bind(project_id)
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn find_issue_link(
        &self,
        project_id: i64,
        post_ref: &str,
    ) -> Result<Option<IssueLink>, StoreError> {
        let row = sqlx::query(
            "SELECT id, project_id, post_ref, reporter_id, reporter_is_automated, report_url, \
             reported_at, issue_id, issue_url, issue_created_at \
             FROM issue_links WHERE project_id = ? AND post_ref = ?",
        )
        .bind(project_id)
        .bind(post_ref)
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;
        Ok(row.map(issue_link_from_row))
    }

    async fn insert_issue_link(&self, link: NewIssueLink) -> Result<i64, StoreError> {
        let result = sqlx::query(
            "INSERT INTO issue_links (project_id, post_ref, reporter_id, reporter_is_automated, \
             report_url, reported_at, issue_id, issue_url, issue_created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(link.project_id)
        .bind(&link.post_ref)
        .bind(link.reporter_id)
        .bind(link.reporter_is_automated)
        .bind(&link.report_url)
        .bind(link.reported_at)
        .bind(link.issue_id)
        .bind(&link.issue_url)
        .bind(link.issue_created_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_err)?;
        Ok(result.last_insert_rowid())
    }
}
