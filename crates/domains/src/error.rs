//! # Error Taxonomy
//!
//! Failures are split by port so each workflow can react per condition.
//! Every variant here is recovered locally into a chat reply or a log line;
//! none crash the process.

use thiserror::Error;

/// Record Store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced row does not exist.
    #[error("record not found")]
    NotFound,

    /// A uniqueness constraint rejected the write (already-bound channel,
    /// duplicate issue link).
    #[error("record conflicts with an existing row")]
    Conflict,

    /// The persistence layer cannot be reached or committed. Fatal to the
    /// current operation; the process keeps running.
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

/// Repository Gateway failures.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The locator's host is not the supported code host.
    #[error("unsupported code host: {0}")]
    UnsupportedHost(String),

    /// The remote repository does not exist or the credential cannot see it.
    /// Not transient; never retried.
    #[error("repository not found or forbidden: {0}")]
    NotFoundOrForbidden(String),

    /// Transport or tracker-side failure, including issue-creation failures.
    #[error("tracker request failed: {0}")]
    Remote(String),
}

/// Chat transport failures on outbound calls.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("chat transport request failed: {0}")]
    Remote(String),
}
