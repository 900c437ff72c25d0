//! Snapshot value types.

use crate::digest::ContentDigest;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Metadata for one recorded version of a URI's content.
///
/// Created exactly once at write time and never mutated. `path` is a pure
/// function of the digest and the storage root; it is recomputed on every
/// lookup and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    /// Seconds since epoch at write time.
    pub timestamp: i64,
    /// Digest of the stored content.
    pub content_hash: ContentDigest,
    /// Blob location under the storage root.
    pub path: PathBuf,
}

/// A snapshot with materialized content.
///
/// `is_fresh` is true when the content was produced by a new fetch in the
/// current call rather than served from existing storage.
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    pub meta: SnapshotMeta,
    pub content: T,
    pub is_fresh: bool,
}
