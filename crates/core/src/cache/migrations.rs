//! Page store schema, versioned through SQLite's `user_version` pragma.

use tokio_rusqlite::Connection;

use crate::Error;

/// One schema step. `version` is what `user_version` reads after it runs.
struct Step {
    version: u32,
    sql: &'static str,
}

const STEPS: &[Step] = &[Step { version: 1, sql: include_str!("../../migrations/001_pages.sql") }];

/// Latest schema version this build knows about.
pub fn latest() -> u32 {
    STEPS.last().map_or(0, |s| s.version)
}

/// Bring the schema up to [`latest`], one transaction per step.
///
/// A database written by a newer build is refused rather than downgraded.
pub async fn run(conn: &Connection) -> Result<u32, Error> {
    conn.call(|conn| -> Result<u32, Error> {
        let from: u32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        if from > latest() {
            return Err(Error::MigrationFailed(format!(
                "page store is at schema {from}, newer than supported {}",
                latest()
            )));
        }

        let mut current = from;
        for step in STEPS.iter().filter(|s| s.version > from) {
            let tx = conn.transaction()?;
            tx.execute_batch(step.sql)
                .map_err(|e| Error::MigrationFailed(format!("step {}: {e}", step.version)))?;
            tx.pragma_update(None, "user_version", step.version)?;
            tx.commit()?;
            current = step.version;
            tracing::debug!(version = current, "page store schema upgraded");
        }

        Ok(current)
    })
    .await
    .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn user_version(conn: &Connection) -> u32 {
        conn.call(|conn| conn.query_row("PRAGMA user_version", [], |row| row.get::<_, u32>(0)))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_run_twice_is_noop() {
        let conn = Connection::open_in_memory().await.unwrap();
        assert_eq!(run(&conn).await.unwrap(), latest());
        assert_eq!(run(&conn).await.unwrap(), latest());
        assert_eq!(user_version(&conn).await, latest());

        let has_pages: bool = conn
            .call(|conn| {
                conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='pages')",
                    [],
                    |row| row.get(0),
                )
            })
            .await
            .unwrap();
        assert!(has_pages);
    }

    #[tokio::test]
    async fn test_upgrades_from_unversioned_database() {
        let conn = Connection::open_in_memory().await.unwrap();
        assert_eq!(user_version(&conn).await, 0);

        let version = run(&conn).await.unwrap();

        assert_eq!(version, latest());
        assert_eq!(user_version(&conn).await, latest());
    }

    #[tokio::test]
    async fn test_refuses_newer_schema() {
        let conn = Connection::open_in_memory().await.unwrap();
        conn.call(|conn| conn.pragma_update(None, "user_version", 99u32)).await.unwrap();

        assert!(matches!(run(&conn).await, Err(Error::MigrationFailed(_))));
    }
}
