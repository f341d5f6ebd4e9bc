//! SQLite connection management for persistent partitions.
//!
//! Opens the database, applies WAL and foreign-key pragmas (entries cascade
//! when their partition is deleted), and runs migrations.

use super::migrations;
use crate::Error;
use std::path::Path;
use tokio_rusqlite::Connection;

const PRAGMAS: &str = "PRAGMA journal_mode=WAL;
     PRAGMA synchronous=NORMAL;
     PRAGMA temp_store=MEMORY;
     PRAGMA foreign_keys=ON;";

/// Persistent partition storage.
///
/// Wraps a tokio-rusqlite Connection that runs statements on a background
/// thread, which also serializes access to the partitions.
#[derive(Clone, Debug)]
pub struct CacheDb {
    pub(crate) conn: Connection,
}

impl CacheDb {
    /// Open (or create) the database at `path` and bring its schema up to date.
    ///
    /// # Arguments
    ///
    /// * `path` - Location of the database file, created if absent.
    ///
    /// # Errors
    ///
    /// Returns `Error::Database` if the file cannot be opened or the pragmas
    /// fail, and `Error::MigrationFailed` if a schema migration fails.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        Self::prepare(conn).await
    }

    /// Open an in-memory database with the same configuration.
    ///
    /// # Errors
    ///
    /// Same as [`CacheDb::open`].
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;
        Self::prepare(conn).await
    }

    async fn prepare(conn: Connection) -> Result<Self, Error> {
        conn.call(|conn| conn.execute_batch(PRAGMAS))
            .await
            .map_err(Error::Database)?;

        migrations::run(&conn).await?;

        Ok(Self { conn })
    }
}
