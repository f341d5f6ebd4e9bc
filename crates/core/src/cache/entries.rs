//! [`CacheStorage`] implementation for the SQLite backend.
//!
//! Partition order is the autoincrement id, so a recreated partition sorts
//! after every partition that survived.

use std::collections::BTreeMap;

use super::connection::CacheDb;
use super::{CacheStorage, PartitionInfo, request_key};
use crate::{Error, Request, Response};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

type EntryRow = (u16, String, String, Vec<u8>);

fn into_response((status, status_text, headers_json, body): EntryRow) -> Result<Response, Error> {
    let headers: BTreeMap<String, String> = serde_json::from_str(&headers_json)?;
    Ok(Response { status, status_text, headers, body: body.into() })
}

/// Owned column values for one entry, ready to move onto the connection thread.
struct EntryInsert {
    key: String,
    method: String,
    url: String,
    status: u16,
    status_text: String,
    headers_json: String,
    body: bytes::Bytes,
}

impl EntryInsert {
    fn new(request: &Request, response: &Response) -> Result<Self, Error> {
        Ok(Self {
            key: request_key(request),
            method: request.method.clone(),
            url: request.identity_url().to_string(),
            status: response.status,
            status_text: response.status_text.clone(),
            headers_json: serde_json::to_string(&response.headers)?,
            body: response.body.clone(),
        })
    }
}

fn upsert(conn: &rusqlite::Connection, partition_id: i64, row: &EntryInsert) -> Result<(), Error> {
    conn.execute(
        "INSERT INTO entries (
            partition_id, key, method, url, status, status_text, headers_json, body, stored_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(partition_id, key) DO UPDATE SET
            status = excluded.status,
            status_text = excluded.status_text,
            headers_json = excluded.headers_json,
            body = excluded.body,
            stored_at = excluded.stored_at",
        params![
            partition_id,
            row.key,
            row.method,
            row.url,
            row.status,
            row.status_text,
            row.headers_json,
            row.body.as_ref(),
            chrono::Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn ensure_partition(conn: &rusqlite::Connection, name: &str) -> Result<i64, Error> {
    conn.execute(
        "INSERT OR IGNORE INTO partitions (name, created_at) VALUES (?1, ?2)",
        params![name, chrono::Utc::now().to_rfc3339()],
    )?;
    let id = conn.query_row("SELECT id FROM partitions WHERE name = ?1", params![name], |row| row.get(0))?;
    Ok(id)
}

#[async_trait::async_trait]
impl CacheStorage for CacheDb {
    async fn open(&self, partition: &str) -> Result<(), Error> {
        let name = partition.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                ensure_partition(conn, &name)?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn has(&self, partition: &str) -> Result<bool, Error> {
        let name = partition.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM partitions WHERE name = ?1)",
                    params![name],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM partitions ORDER BY id ASC")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    async fn delete(&self, partition: &str) -> Result<bool, Error> {
        let name = partition.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM partitions WHERE name = ?1", params![name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    async fn lookup(&self, partition: &str, request: &Request) -> Result<Option<Response>, Error> {
        let name = partition.to_string();
        let key = request_key(request);
        self.conn
            .call(move |conn| -> Result<Option<Response>, Error> {
                let result: rusqlite::Result<EntryRow> = conn.query_row(
                    "SELECT e.status, e.status_text, e.headers_json, e.body
                     FROM entries e JOIN partitions p ON p.id = e.partition_id
                     WHERE p.name = ?1 AND e.key = ?2",
                    params![name, key],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
                );

                match result {
                    Ok(row) => into_response(row).map(Some),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    async fn lookup_any(&self, request: &Request) -> Result<Option<Response>, Error> {
        let key = request_key(request);
        self.conn
            .call(move |conn| -> Result<Option<Response>, Error> {
                let result: rusqlite::Result<EntryRow> = conn.query_row(
                    "SELECT status, status_text, headers_json, body
                     FROM entries WHERE key = ?1
                     ORDER BY partition_id ASC LIMIT 1",
                    params![key],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
                );

                match result {
                    Ok(row) => into_response(row).map(Some),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    async fn put(&self, partition: &str, request: &Request, response: &Response) -> Result<(), Error> {
        let name = partition.to_string();
        let row = EntryInsert::new(request, response)?;
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let partition_id = ensure_partition(conn, &name)?;
                upsert(conn, partition_id, &row)
            })
            .await
            .map_err(Error::from)
    }

    async fn put_all(&self, partition: &str, entries: &[(Request, Response)]) -> Result<(), Error> {
        let name = partition.to_string();
        let rows = entries
            .iter()
            .map(|(request, response)| EntryInsert::new(request, response))
            .collect::<Result<Vec<_>, _>>()?;
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                let partition_id = ensure_partition(&tx, &name)?;
                for row in &rows {
                    upsert(&tx, partition_id, row)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn describe(&self) -> Result<Vec<PartitionInfo>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<PartitionInfo>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT p.name, COUNT(e.key)
                     FROM partitions p LEFT JOIN entries e ON e.partition_id = p.id
                     GROUP BY p.id ORDER BY p.id ASC",
                )?;
                let rows = stmt
                    .query_map([], |row| {
                        Ok(PartitionInfo { name: row.get(0)?, entries: row.get::<_, i64>(1)? as u64 })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)
    }
}
