//! SQLite-backed persistence of per-document view state.
//!
//! One row per distinct document path: last-viewed page, zoom factor,
//! colour inversion, and first/last access timestamps. The same table
//! feeds the Recent Documents menu. Rows are never deleted.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

/// Last-viewed state restored when a document is reopened.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub zoom: f64,
    pub page: i32,
    pub inverted: bool,
}

/// One entry of the recent-documents list, most recent first.
#[derive(Debug, Clone)]
pub struct RecentEntry {
    pub path: String,
    pub page: i32,
    pub last_accessed: i64,
}

pub struct SessionStore {
    conn: Connection,
}

impl SessionStore {
    /// Open or create the database at `$XDG_CONFIG_HOME/folio/sessions.sqlite`.
    pub fn open_default() -> Result<Self> {
        Self::open(&default_db_path()?)
    }

    /// Open or create the database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory {:?}", parent))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {:?}", path))?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;

            CREATE TABLE IF NOT EXISTS sessions (
                filename       TEXT PRIMARY KEY NOT NULL,
                zoom           REAL NOT NULL,
                page           INTEGER NOT NULL,
                invert         INTEGER NOT NULL,
                first_accessed INTEGER NOT NULL,
                last_accessed  INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_last_accessed
                ON sessions(last_accessed);
            ",
        )
        .context("Failed to create session table")?;

        log::info!("Opened session store at {}", path.display());
        Ok(Self { conn })
    }

    /// Look up the saved state for a path. Returns `None` if never seen.
    pub fn get(&self, path: &str) -> Result<Option<SessionRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT zoom, page, invert FROM sessions WHERE filename = ?1",
                params![path],
                |row| {
                    Ok(SessionRecord {
                        zoom: row.get(0)?,
                        page: row.get(1)?,
                        inverted: row.get::<_, i64>(2)? != 0,
                    })
                },
            )
            .optional()
            .context("Failed to query session record")?;

        Ok(record)
    }

    /// Insert or update the row for `path`. On first insert both timestamps
    /// are set to `now`; afterwards `first_accessed` is left unchanged.
    pub fn upsert(&self, path: &str, zoom: f64, page: i32, inverted: bool, now: i64) -> Result<()> {
        self.conn
            .execute(
                "
            INSERT INTO sessions (filename, zoom, page, invert, first_accessed, last_accessed)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            ON CONFLICT(filename) DO UPDATE SET
                zoom = excluded.zoom,
                page = excluded.page,
                invert = excluded.invert,
                last_accessed = excluded.last_accessed
            ",
                params![path, zoom, page, inverted as i64, now],
            )
            .context("Failed to upsert session record")?;

        Ok(())
    }

    /// The most recently accessed documents, newest first, capped at `limit`.
    pub fn recent(&self, limit: usize) -> Result<Vec<RecentEntry>> {
        let mut stmt = self.conn.prepare_cached(
            "
            SELECT filename, page, last_accessed
            FROM sessions
            ORDER BY last_accessed DESC
            LIMIT ?1
            ",
        )?;

        let entries = stmt
            .query_map(params![limit as i64], |row| {
                Ok(RecentEntry {
                    path: row.get(0)?,
                    page: row.get(1)?,
                    last_accessed: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query recent documents")?;

        Ok(entries)
    }

    /// Current Unix timestamp.
    pub fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

fn default_db_path() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .context("Failed to determine config directory")?
        .join("folio");
    Ok(dir.join("sessions.sqlite"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_store(dir: &tempfile::TempDir) -> SessionStore {
        SessionStore::open(&dir.path().join("test.sqlite")).unwrap()
    }

    #[test]
    fn test_get_unknown_path_is_none() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);

        assert!(store.get("/docs/never-seen.pdf").unwrap().is_none());
    }

    #[test]
    fn test_upsert_then_get_roundtrip() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);

        store.upsert("/docs/a.pdf", 1.5, 7, true, 1000).unwrap();

        let record = store.get("/docs/a.pdf").unwrap().unwrap();
        assert_eq!(
            record,
            SessionRecord {
                zoom: 1.5,
                page: 7,
                inverted: true,
            }
        );
    }

    #[test]
    fn test_upsert_preserves_first_accessed() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);

        store.upsert("/docs/a.pdf", 1.0, 0, false, 1000).unwrap();
        store.upsert("/docs/a.pdf", 2.0, 5, true, 2000).unwrap();

        let (first, last): (i64, i64) = store
            .conn
            .query_row(
                "SELECT first_accessed, last_accessed FROM sessions WHERE filename = ?1",
                params!["/docs/a.pdf"],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(first, 1000);
        assert_eq!(last, 2000);

        let record = store.get("/docs/a.pdf").unwrap().unwrap();
        assert_eq!(record.zoom, 2.0);
        assert_eq!(record.page, 5);
        assert!(record.inverted);
    }

    #[test]
    fn test_recent_orders_and_caps() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);

        store.upsert("/docs/a.pdf", 1.0, 1, false, 100).unwrap();
        store.upsert("/docs/b.pdf", 1.0, 2, false, 300).unwrap();
        store.upsert("/docs/c.pdf", 1.0, 3, false, 200).unwrap();

        let recents = store.recent(2).unwrap();
        assert_eq!(recents.len(), 2);
        assert_eq!(recents[0].path, "/docs/b.pdf");
        assert_eq!(recents[1].path, "/docs/c.pdf");
        assert!(recents[0].last_accessed > recents[1].last_accessed);
    }

    #[test]
    fn test_reopen_keeps_rows() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.sqlite");

        {
            let store = SessionStore::open(&db_path).unwrap();
            store.upsert("/docs/a.pdf", 1.25, 3, false, 1000).unwrap();
        }

        let store = SessionStore::open(&db_path).unwrap();
        let record = store.get("/docs/a.pdf").unwrap().unwrap();
        assert_eq!(record.page, 3);
        assert_eq!(record.zoom, 1.25);
    }
}
