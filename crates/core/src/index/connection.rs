//! Index connection management with pragma configuration.
//!
//! This module handles opening the SQLite index, applying required pragmas
//! for performance and concurrency (WAL mode), and running migrations.

use super::migrations;
use crate::Error;
use std::path::Path;
use tokio_rusqlite::Connection;

/// Metadata index handle.
///
/// Wraps a long-lived tokio-rusqlite Connection owned by one snapshot
/// store. The owner releases it with [`IndexDb::close`]; leaving it open
/// leaks a file descriptor but is otherwise harmless.
#[derive(Clone, Debug)]
pub struct IndexDb {
    pub(crate) conn: Connection,
}

impl IndexDb {
    /// Open an index at the specified path.
    ///
    /// Creates the file if it doesn't exist, applies performance pragmas,
    /// and runs any pending migrations.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let conn = Connection::open(path).await.map_err(|e| Error::Index(e.into()))?;
        Self::init(conn).await
    }

    /// Open an in-memory index for testing.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Index(e.into()))?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, Error> {
        conn.call(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode=WAL;
                 PRAGMA synchronous=NORMAL;
                 PRAGMA temp_store=MEMORY;
                 PRAGMA foreign_keys=ON;",
            )?;
            Ok(())
        })
        .await
        .map_err(Error::Index)?;

        migrations::run(&conn).await?;

        Ok(Self { conn })
    }

    /// Release the connection.
    pub async fn close(self) -> Result<(), Error> {
        self.conn.close().await.map_err(Error::from)
    }
}
