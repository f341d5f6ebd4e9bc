//! Schema migrations for the partition database.

use super::Error;
use tokio_rusqlite::{Connection, params};

/// Applied in order; each batch uses CREATE ... IF NOT EXISTS.
const MIGRATIONS: &[(i64, &str)] = &[
    (1, include_str!("../../migrations/001_partitions.sql")),
    (2, include_str!("../../migrations/002_entries.sql")),
];

/// Latest schema version known to this build.
pub fn latest_version() -> i64 {
    MIGRATIONS.last().map(|(v, _)| *v).unwrap_or(0)
}

/// Run pending migrations inside one transaction, recording each version in `_migrations`.
///
/// # Errors
///
/// Returns `Error::MigrationFailed` naming the version whose SQL failed, or
/// `Error::Database` if the bookkeeping table cannot be read or written.
/// Nothing from a failed run is committed.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
        )?;

        let current: i64 =
            conn.query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |row| row.get(0))?;

        let tx = conn.transaction()?;
        for (version, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > current) {
            tx.execute_batch(sql)
                .map_err(|e| Error::MigrationFailed(format!("version {version}: {e}")))?;
            tx.execute(
                "INSERT INTO _migrations (version, applied_at) VALUES (?1, ?2)",
                params![version, chrono::Utc::now().to_rfc3339()],
            )?;
            tracing::debug!(version, "applied cache migration");
        }
        tx.commit()?;

        Ok(())
    })
    .await
    .map_err(Error::from)
}
