use std::path::Path;

use async_trait::async_trait;
use tokio_rusqlite::rusqlite::{self, Transaction};
use tokio_rusqlite::{Connection, params};

use super::{Persisted, RecordSink};
use crate::config::is_sql_identifier;
use crate::{Error, JobRecord};

/// Default table name for persisted job records.
pub const DEFAULT_TABLE: &str = "job_records";

/// Rewrites a single SQLite table with the record list.
///
/// Each call drops and recreates the table, then inserts every record in
/// one transaction. An insert failure rolls the whole batch back, is logged,
/// and comes back as [`Persisted::RolledBack`] rather than an error; only
/// failures to reach the database or recreate the table are `Err`.
#[derive(Clone, Debug)]
pub struct SqliteSink {
    conn: Connection,
    table: String,
}

impl SqliteSink {
    /// Open (or create) the database file at `path`.
    pub async fn open(path: impl AsRef<Path>, table: &str) -> Result<Self, Error> {
        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        Self::new(conn, table)
    }

    /// Use an existing connection.
    pub fn new(conn: Connection, table: &str) -> Result<Self, Error> {
        if !is_sql_identifier(table) {
            return Err(Error::InvalidInput(format!("invalid table name: {table:?}")));
        }
        Ok(Self { conn, table: table.to_string() })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

fn insert_all(tx: &Transaction<'_>, table: &str, records: &[JobRecord]) -> rusqlite::Result<usize> {
    let mut stmt = tx.prepare(&format!("INSERT INTO {table} (job_id, job_title, href) VALUES (?1, ?2, ?3)"))?;
    for record in records {
        stmt.execute(params![record.job_id, record.job_title, record.href])?;
    }
    Ok(records.len())
}

#[async_trait]
impl RecordSink for SqliteSink {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn persist(&self, records: &[JobRecord]) -> Result<Persisted, Error> {
        let records = records.to_vec();
        let table = self.table.clone();

        let outcome = self
            .conn
            .call(move |conn| -> Result<Persisted, Error> {
                conn.execute_batch(&format!(
                    "DROP TABLE IF EXISTS {table};
                     CREATE TABLE {table} (
                         id INTEGER PRIMARY KEY AUTOINCREMENT,
                         job_id TEXT,
                         job_title TEXT,
                         href TEXT
                     );"
                ))?;

                let tx = conn.transaction()?;
                let outcome = match insert_all(&tx, &table, &records) {
                    Ok(rows) => match tx.commit() {
                        Ok(()) => Persisted::Committed { rows },
                        Err(e) => Persisted::RolledBack { reason: e.to_string() },
                    },
                    Err(e) => {
                        let reason = e.to_string();
                        if let Err(rollback_err) = tx.rollback() {
                            tracing::warn!(error = %rollback_err, "explicit rollback failed");
                        }
                        Persisted::RolledBack { reason }
                    }
                };
                Ok(outcome)
            })
            .await
            .map_err(Error::from)?;

        match &outcome {
            Persisted::Committed { rows } => {
                tracing::info!(table = %self.table, rows, "job records saved to the database");
            }
            Persisted::RolledBack { reason } => {
                tracing::error!(table = %self.table, %reason, "saving job records failed; transaction rolled back");
            }
        }

        Ok(outcome)
    }
}
