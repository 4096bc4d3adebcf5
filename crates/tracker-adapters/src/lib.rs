//! # tracker-adapters
//!
//! GitHub implementation of the `RepositoryGateway` port.

pub mod github;
pub mod locator;

pub use github::GithubGateway;
