//! Content digests: SHA-256 fingerprints used as storage addresses.
//!
//! A digest is 64 lowercase hex characters. Identical byte content always
//! produces the same digest whether it arrives as one buffer or as a
//! stream of chunks; the hash state is updated incrementally either way.

use crate::Error;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Length of a digest in hex characters (SHA-256, 32 bytes).
pub const DIGEST_HEX_LEN: usize = 64;

/// Chunk size for incremental hashing of streamed content.
const READ_CHUNK: usize = 64 * 1024;

/// A content digest - 256 bits of SHA-2 as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentDigest(String);

impl ContentDigest {
    /// Hash a content buffer.
    pub fn from_bytes(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content);
        Self(hex::encode(hasher.finalize()))
    }

    /// Hash a one-shot byte stream.
    ///
    /// The reader is consumed; read failures propagate unchanged as
    /// [`Error::Storage`].
    pub async fn from_reader<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Self, Error> {
        let mut hasher = Sha256::new();
        let mut buf = vec![0u8; READ_CHUNK];
        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Ok(Self(hex::encode(hasher.finalize())))
    }

    /// Adopt finalized hash output. Callers hash incrementally themselves
    /// when the bytes are consumed for something else in the same pass.
    pub(crate) fn from_raw(hash: impl AsRef<[u8]>) -> Self {
        Self(hex::encode(hash))
    }

    /// Validate and adopt an existing digest string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDigest`] when the length is not
    /// [`DIGEST_HEX_LEN`] or a character is not hex.
    pub fn parse(s: &str) -> Result<Self, Error> {
        if s.len() != DIGEST_HEX_LEN {
            return Err(Error::InvalidDigest(format!(
                "expected {DIGEST_HEX_LEN} hex chars, got {}",
                s.len()
            )));
        }
        if !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidDigest("non-hex character".to_string()));
        }
        Ok(Self(s.to_lowercase()))
    }

    /// First two hex characters, used as the shard directory name.
    pub fn prefix(&self) -> &str {
        &self.0[..2]
    }

    /// Remainder after the prefix, used as the blob file name.
    pub fn rest(&self) -> &str {
        &self.0[2..]
    }

    /// The full digest as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ContentDigest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ContentDigest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vector() {
        let digest = ContentDigest::from_bytes(b"hello");
        assert_eq!(
            digest.as_str(),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_empty_content() {
        let digest = ContentDigest::from_bytes(b"");
        assert_eq!(
            digest.as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_format() {
        let digest = ContentDigest::from_bytes(b"format check");
        assert_eq!(digest.as_str().len(), DIGEST_HEX_LEN);
        assert!(digest.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(ContentDigest::from_bytes(b"stable"), ContentDigest::from_bytes(b"stable"));
    }

    #[test]
    fn test_distinct_content_distinct_digest() {
        assert_ne!(ContentDigest::from_bytes(b"a"), ContentDigest::from_bytes(b"b"));
    }

    #[tokio::test]
    async fn test_reader_matches_buffer() {
        let content = b"streamed or buffered, same digest";
        let streamed = ContentDigest::from_reader(&mut &content[..]).await.unwrap();
        assert_eq!(streamed, ContentDigest::from_bytes(content));
    }

    #[tokio::test]
    async fn test_reader_large_content() {
        let content = vec![0x5a; 3 * 1024 * 1024];
        let streamed = ContentDigest::from_reader(&mut content.as_slice()).await.unwrap();
        assert_eq!(streamed, ContentDigest::from_bytes(&content));
    }

    #[test]
    fn test_parse_valid() {
        let text = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";
        let digest = ContentDigest::parse(text).unwrap();
        assert_eq!(digest.as_str(), text);
    }

    #[test]
    fn test_parse_uppercase_folds() {
        let digest = ContentDigest::parse(
            "2CF24DBA5FB0A30E26E83B2AC5B9E29E1B161E5C1FA7425E73043362938B9824",
        )
        .unwrap();
        assert_eq!(digest, ContentDigest::from_bytes(b"hello"));
    }

    #[test]
    fn test_parse_wrong_length() {
        let result = ContentDigest::parse("abc123");
        assert!(matches!(result, Err(Error::InvalidDigest(_))));
    }

    #[test]
    fn test_parse_non_hex() {
        let text = "z".repeat(DIGEST_HEX_LEN);
        let result = ContentDigest::parse(&text);
        assert!(matches!(result, Err(Error::InvalidDigest(_))));
    }

    #[test]
    fn test_prefix_and_rest() {
        let digest = ContentDigest::from_bytes(b"hello");
        assert_eq!(digest.prefix(), "2c");
        assert_eq!(digest.rest().len(), DIGEST_HEX_LEN - 2);
        assert_eq!(format!("{}{}", digest.prefix(), digest.rest()), digest.as_str());
    }

    #[test]
    fn test_serde_roundtrip() {
        let digest = ContentDigest::from_bytes(b"serde");
        let json = serde_json::to_string(&digest).unwrap();
        let restored: ContentDigest = serde_json::from_str(&json).unwrap();
        assert_eq!(digest, restored);
    }
}
