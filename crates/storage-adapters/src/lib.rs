//! # storage-adapters
//!
//! Concrete Record Store implementations. SQLite is the only backend; the
//! workflows only ever see the `ProjectStore` port.

pub mod sqlite;

pub use sqlite::SqliteRecordStore;
