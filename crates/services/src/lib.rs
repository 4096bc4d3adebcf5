//! # services
//!
//! The workflow layer: event routing, conversation state, and the
//! registration and reporting workflows. Depends only on the domain ports,
//! never on a concrete adapter.

pub mod cleanup;
pub mod dispatch;
pub mod registration;
pub mod reporting;
pub mod router;
pub mod session;

pub use dispatch::{DispatchConfig, Dispatcher};
