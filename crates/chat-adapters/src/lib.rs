//! # chat-adapters
//!
//! Telegram Bot API implementation of the `ChatTransport` port, plus the
//! long-polling update source the binary drives.

pub mod telegram;
mod wire;

pub use telegram::{InboundUpdate, TelegramTransport};
