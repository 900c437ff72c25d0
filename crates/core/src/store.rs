//! Snapshot store facade.
//!
//! Composes the metadata index, the blob store, and a caller-supplied
//! fetcher into the public operations: snapshot creation, historical
//! lookup, JSON decoding, and fetch-through caching.
//!
//! Writes flow content -> digest -> blob path -> index row; reads flow the
//! other way. The index row is always recorded after the blob write, so a
//! failed write can orphan an unindexed file but never dangle a row.

use crate::Error;
use crate::blobs::BlobStore;
use crate::config::AppConfig;
use crate::digest::ContentDigest;
use crate::fetch::{FetchedResponse, Fetcher, RequestOptions};
use crate::index::IndexDb;
use crate::policy::Policy;
use crate::snapshot::{Snapshot, SnapshotMeta};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::io::AsyncRead;

const INDEX_FILE: &str = "index.sqlite";

/// Rewrites a fetched response before it is stored and returned.
///
/// The returned response's body must still be unconsumed; a mutator that
/// needs to inspect the body should work on a clone and hand back a fresh
/// one. That contract is the mutator's responsibility, not enforced here.
pub type ResponseMutator = Box<dyn FnOnce(FetchedResponse) -> FetchedResponse + Send>;

/// Parameters for a fetch-through [`SnapshotStore::cache`] call.
#[derive(Default)]
pub struct CacheRequest {
    pub options: RequestOptions,
    pub mutator: Option<ResponseMutator>,
    pub policy: Policy,
}

/// Content-addressed snapshot store.
pub struct SnapshotStore {
    index: IndexDb,
    blobs: BlobStore,
}

impl SnapshotStore {
    /// Open a store rooted at `root`, with the index file at
    /// `root/index.sqlite`.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, Error> {
        let root = root.into();
        let db_path = root.join(INDEX_FILE);
        Self::open_with(root, db_path).await
    }

    /// Open with an explicit index location.
    pub async fn open_with(root: impl Into<PathBuf>, db_path: impl AsRef<Path>) -> Result<Self, Error> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        let index = IndexDb::open(db_path).await?;
        Ok(Self { index, blobs: BlobStore::new(root) })
    }

    /// Open from application configuration.
    pub async fn from_config(config: &AppConfig) -> Result<Self, Error> {
        Self::open_with(&config.root, config.index_path()).await
    }

    /// Open with an in-memory index. Blobs still land under `root`; used
    /// in tests.
    pub async fn open_in_memory(root: impl Into<PathBuf>) -> Result<Self, Error> {
        let index = IndexDb::open_in_memory().await?;
        Ok(Self { index, blobs: BlobStore::new(root) })
    }

    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    pub fn index(&self) -> &IndexDb {
        &self.index
    }

    /// Record a new snapshot of `uri`.
    ///
    /// Returns the metadata even when the blob write was deduplicated away
    /// by the `previous` hint.
    pub async fn create_snap(
        &self, uri: &str, content: &[u8], previous: Option<&ContentDigest>,
    ) -> Result<SnapshotMeta, Error> {
        let uri_id = self.index.upsert_uri(uri).await?;
        let meta = self.blobs.put(content, previous).await?;
        self.index.record_snap(uri_id, meta.timestamp, &meta.content_hash).await?;
        Ok(meta)
    }

    /// Record a new snapshot from a one-shot byte stream.
    pub async fn create_snap_from_reader<R: AsyncRead + Unpin>(
        &self, uri: &str, reader: R, previous: Option<&ContentDigest>,
    ) -> Result<SnapshotMeta, Error> {
        let uri_id = self.index.upsert_uri(uri).await?;
        let meta = self.blobs.put_reader(reader, previous).await?;
        self.index.record_snap(uri_id, meta.timestamp, &meta.content_hash).await?;
        Ok(meta)
    }

    /// Latest snapshot for `uri`, optionally as of a past instant.
    ///
    /// Index lookup plus path recomputation; does not touch the
    /// filesystem.
    pub async fn latest_snap(&self, uri: &str, max_timestamp: Option<i64>) -> Result<Option<SnapshotMeta>, Error> {
        Ok(self
            .index
            .latest_snap(uri, max_timestamp)
            .await?
            .map(|(timestamp, content_hash)| SnapshotMeta {
                timestamp,
                path: self.blobs.address_of(&content_hash),
                content_hash,
            }))
    }

    /// Latest snapshot for `uri` that satisfies `policy`.
    ///
    /// Returns `None` both when no snapshot exists and when the latest one
    /// fails the policy; callers needing the distinction can compose
    /// [`SnapshotStore::latest_snap`] with [`Policy::allows`].
    pub async fn get_snap(&self, uri: &str, policy: &Policy) -> Result<Option<SnapshotMeta>, Error> {
        let now = chrono::Utc::now().timestamp();
        Ok(self
            .latest_snap(uri, policy.max_timestamp)
            .await?
            .filter(|meta| policy.allows(meta.timestamp, now)))
    }

    /// Load and decode the latest qualifying snapshot as JSON.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when no snapshot qualifies; [`Error::Decode`]
    /// when the stored bytes are not valid JSON for `T`.
    pub async fn load_json<T: DeserializeOwned>(&self, uri: &str, policy: &Policy) -> Result<Snapshot<T>, Error> {
        let meta = self
            .get_snap(uri, policy)
            .await?
            .ok_or_else(|| Error::NotFound(uri.to_string()))?;
        let text = self.blobs.read_text(&meta.content_hash).await?;
        let content = serde_json::from_str(&text)?;
        Ok(Snapshot { meta, content, is_fresh: false })
    }

    /// Fetch-through lookup: serve the stored snapshot when it satisfies
    /// the policy, otherwise fetch fresh content, persist one copy, and
    /// hand the other back.
    ///
    /// A fetcher failure, non-success status, or empty body fails the whole
    /// call with [`Error::FetchFailed`] and records nothing.
    pub async fn cache<F>(&self, uri: &str, fetcher: &F, request: CacheRequest) -> Result<Snapshot<FetchedResponse>, Error>
    where
        F: Fetcher + ?Sized,
    {
        let now = chrono::Utc::now().timestamp();
        let prior = self.latest_snap(uri, request.policy.max_timestamp).await?;

        if let Some(meta) = &prior
            && request.policy.allows(meta.timestamp, now)
        {
            tracing::debug!(uri, digest = %meta.content_hash, "serving stored snapshot");
            let body = Bytes::from(self.blobs.read(&meta.content_hash).await?);
            let content = FetchedResponse { uri: uri.to_string(), status: 200, content_type: None, body };
            return Ok(Snapshot { meta: meta.clone(), content, is_fresh: false });
        }

        tracing::debug!(uri, "no usable snapshot, fetching");
        let response = fetcher.fetch(uri, &request.options).await?;
        if !response.ok() {
            let reason = format!("status {}", response.status);
            return Err(Error::FetchFailed { reason, response: Some(Box::new(response)) });
        }
        if response.body.is_empty() {
            return Err(Error::FetchFailed { reason: "empty body".to_string(), response: Some(Box::new(response)) });
        }

        let response = match request.mutator {
            Some(mutate) => mutate(response),
            None => response,
        };

        let previous = prior.map(|meta| meta.content_hash);
        let meta = self.create_snap(uri, &response.body, previous.as_ref()).await?;
        Ok(Snapshot { meta, content: response, is_fresh: true })
    }

    /// Release the index connection. Blob files need no teardown.
    pub async fn close(self) -> Result<(), Error> {
        self.index.close().await
    }
}
