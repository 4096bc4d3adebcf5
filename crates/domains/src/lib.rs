//! threadbridge/crates/domains/src/lib.rs
//!
//! The central domain types and port definitions for threadbridge.

pub mod error;
pub mod events;
pub mod links;
pub mod models;
pub mod ports;

// Re-exporting for easier access in other crates
pub use error::*;
pub use events::*;
pub use models::*;
pub use ports::*;

#[cfg(test)]
mod tests {
    use super::models::*;
    use chrono::Utc;

    #[test]
    fn test_project_bound_state() {
        let mut project = Project {
            id: 1,
            channel_id: -1001234567890,
            channel_title: "Acme".to_string(),
            post_ref: "https://t.me/acme/10".to_string(),
            post_at: Utc::now(),
            repo_url: None,
            repo_full_name: None,
        };
        assert!(!project.is_bound());

        project.repo_url = Some("https://github.com/acme/repo".to_string());
        project.repo_full_name = Some("acme/repo".to_string());
        assert!(project.is_bound());
    }
}
