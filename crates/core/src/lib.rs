//! Core types and shared functionality for snapvault.
//!
//! This crate provides:
//! - Content digests and the sharded blob store they address
//! - SQLite-backed metadata index of per-URI snapshot history
//! - Freshness policy evaluation and the fetch-through snapshot store
//! - Unified error types and configuration

pub mod blobs;
pub mod config;
pub mod digest;
pub mod error;
pub mod fetch;
pub mod index;
pub mod policy;
pub mod snapshot;
pub mod store;

pub use blobs::BlobStore;
pub use config::AppConfig;
pub use digest::ContentDigest;
pub use error::Error;
pub use fetch::{FetchedResponse, Fetcher, RequestOptions};
pub use index::IndexDb;
pub use policy::Policy;
pub use snapshot::{Snapshot, SnapshotMeta};
pub use store::{CacheRequest, SnapshotStore};
