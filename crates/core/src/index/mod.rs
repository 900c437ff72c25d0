//! SQLite-backed metadata index of per-URI snapshot history.
//!
//! The index records which digest is "latest" (or latest as of a point in
//! time) per URI. It never stores content and never stores paths; blobs
//! are addressed purely by digest. Async access goes through
//! tokio-rusqlite, which runs statements on a background thread.

pub mod connection;
pub mod history;
pub mod migrations;

pub use crate::Error;

pub use connection::IndexDb;
