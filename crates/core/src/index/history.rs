//! Snapshot history operations.
//!
//! Three operations cover the whole index contract: resolve-or-create a
//! URI row, append an immutable snapshot row, and find the latest row not
//! exceeding a timestamp bound. Nothing here updates or deletes history.

use super::connection::IndexDb;
use crate::Error;
use crate::digest::ContentDigest;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

impl IndexDb {
    /// Resolve a URI string to its row id, creating the row if needed.
    ///
    /// Single-statement upsert; conflict resolution happens inside SQLite,
    /// never as a read-then-write sequence that could race.
    pub async fn upsert_uri(&self, value: &str) -> Result<i64, Error> {
        let value = value.to_string();
        self.conn
            .call(move |conn| -> Result<i64, Error> {
                let id = conn.query_row(
                    "INSERT INTO uris (value) VALUES (?1)
                     ON CONFLICT(value) DO UPDATE SET value = excluded.value
                     RETURNING id",
                    params![value],
                    |row| row.get(0),
                )?;
                Ok(id)
            })
            .await
            .map_err(Error::from)
    }

    /// Append one snapshot row. Rows are immutable once recorded.
    pub async fn record_snap(&self, uri_id: i64, timestamp: i64, digest: &ContentDigest) -> Result<(), Error> {
        let digest = digest.as_str().to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO snaps (uri_id, timestamp, content_hash) VALUES (?1, ?2, ?3)",
                    params![uri_id, timestamp, digest],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// The snapshot row for `uri` with the greatest timestamp not exceeding
    /// `max_timestamp` (default: now).
    ///
    /// Timestamp resolution is whole seconds, so same-second writes are
    /// order-undefined; ties break arbitrarily.
    pub async fn latest_snap(
        &self, uri: &str, max_timestamp: Option<i64>,
    ) -> Result<Option<(i64, ContentDigest)>, Error> {
        let uri = uri.to_string();
        let bound = max_timestamp.unwrap_or_else(|| chrono::Utc::now().timestamp());
        self.conn
            .call(move |conn| -> Result<Option<(i64, ContentDigest)>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT s.timestamp, s.content_hash
                     FROM snaps s JOIN uris u ON u.id = s.uri_id
                     WHERE u.value = ?1 AND s.timestamp <= ?2
                     ORDER BY s.timestamp DESC
                     LIMIT 1",
                )?;

                let result = stmt.query_row(params![uri, bound], |row| {
                    Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
                });

                match result {
                    Ok((timestamp, hash)) => Ok(Some((timestamp, ContentDigest::parse(&hash)?))),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }
}
