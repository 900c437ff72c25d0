//! Content-addressed blob storage.
//!
//! Blobs live under `root/snaps/<2-char prefix>/<rest of digest>`, one
//! file per distinct digest. The two-level sharding keeps any single
//! directory from accumulating one entry per digest.
//!
//! Writes are idempotent: the same content always lands at the same path
//! with the same bytes, so concurrent duplicate writes are safe without
//! locking. A failed write may leave a truncated file behind; that file is
//! never referenced because the index row is only recorded after the write
//! succeeds.

use crate::Error;
use crate::digest::ContentDigest;
use crate::snapshot::SnapshotMeta;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use uuid::Uuid;

const SNAPS_DIR: &str = "snaps";
const STAGING_DIR: &str = "staging";

/// Chunk size for streamed writes.
const WRITE_CHUNK: usize = 64 * 1024;

/// Filesystem store mapping digests to blob files.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Compute the storage path for a digest.
    ///
    /// Pure; does not touch the filesystem.
    pub fn address_of(&self, digest: &ContentDigest) -> PathBuf {
        self.root.join(SNAPS_DIR).join(digest.prefix()).join(digest.rest())
    }

    /// Persist a content buffer, returning its metadata.
    ///
    /// When `previous` matches the new digest the write is skipped
    /// entirely: content identical to the most recent known snapshot for
    /// the caller's URI is already on disk. The skip is an optimization,
    /// not a correctness requirement.
    pub async fn put(&self, content: &[u8], previous: Option<&ContentDigest>) -> Result<SnapshotMeta, Error> {
        let digest = ContentDigest::from_bytes(content);
        let path = self.address_of(&digest);

        if previous == Some(&digest) {
            tracing::debug!(digest = %digest, "content unchanged, skipping blob write");
        } else {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::write(&path, content).await?;
            tracing::debug!(digest = %digest, bytes = content.len(), "wrote blob");
        }

        Ok(SnapshotMeta { timestamp: chrono::Utc::now().timestamp(), content_hash: digest, path })
    }

    /// Persist a one-shot byte stream.
    ///
    /// The stream is consumed exactly once: each chunk is hashed and
    /// appended to a staging file in the same pass, then the staging file
    /// is renamed into its content address. When the digest matches
    /// `previous`, or the blob already exists, the staging file is removed
    /// instead.
    pub async fn put_reader<R: AsyncRead + Unpin>(
        &self, mut reader: R, previous: Option<&ContentDigest>,
    ) -> Result<SnapshotMeta, Error> {
        let staging_dir = self.root.join(STAGING_DIR);
        fs::create_dir_all(&staging_dir).await?;
        let staging = staging_dir.join(Uuid::new_v4().to_string());

        let mut file = fs::File::create(&staging).await?;
        let mut hasher = Sha256::new();
        let mut buf = vec![0u8; WRITE_CHUNK];
        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
            file.write_all(&buf[..n]).await?;
        }
        file.flush().await?;
        drop(file);

        let digest = ContentDigest::from_raw(hasher.finalize());
        let path = self.address_of(&digest);

        if previous == Some(&digest) || fs::try_exists(&path).await? {
            tracing::debug!(digest = %digest, "duplicate content, discarding staging file");
            fs::remove_file(&staging).await?;
        } else {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::rename(&staging, &path).await?;
        }

        Ok(SnapshotMeta { timestamp: chrono::Utc::now().timestamp(), content_hash: digest, path })
    }

    /// Read a blob's bytes.
    pub async fn read(&self, digest: &ContentDigest) -> Result<Vec<u8>, Error> {
        Ok(fs::read(self.address_of(digest)).await?)
    }

    /// Read a blob as UTF-8 text.
    pub async fn read_text(&self, digest: &ContentDigest) -> Result<String, Error> {
        Ok(fs::read_to_string(self.address_of(digest)).await?)
    }
}
