//! SQLite-backed session store.
//!
//! One table, `sleep_sessions`. A connection is opened per call, so the store
//! is cheap to share across blocking tasks and holds no handle between calls.

use std::path::PathBuf;

use rusqlite::{Connection, OpenFlags, OptionalExtension, Row, params};
use tracing::debug;

use super::{SessionStore, StoreError, StoreResult};
use crate::quality::SleepQuality;
use crate::session::{NewSession, SessionId, SleepSession};

/// `quality` column value for "not rated".
const UNRATED: i64 = -1;

const SELECT_COLUMNS: &str = "SELECT id, start_time_millis, end_time_millis, quality FROM sleep_sessions";

pub struct SqliteStore {
    path: PathBuf,
}

/// Raw row before the quality column is validated.
struct SessionRow {
    id: SessionId,
    start_time_millis: i64,
    end_time_millis: i64,
    quality: i64,
}

impl SessionRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            start_time_millis: row.get(1)?,
            end_time_millis: row.get(2)?,
            quality: row.get(3)?,
        })
    }

    fn into_session(self) -> StoreResult<SleepSession> {
        Ok(SleepSession {
            id: self.id,
            start_time_millis: self.start_time_millis,
            end_time_millis: self.end_time_millis,
            quality: decode_quality(self.quality)?,
        })
    }
}

fn decode_quality(value: i64) -> StoreResult<Option<SleepQuality>> {
    if value == UNRATED {
        return Ok(None);
    }
    u8::try_from(value)
        .ok()
        .and_then(SleepQuality::from_value)
        .map(Some)
        .ok_or(StoreError::InvalidQuality(value))
}

fn encode_quality(quality: Option<SleepQuality>) -> i64 {
    quality.map_or(UNRATED, |q| i64::from(q.value()))
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `path`.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let store = Self { path: path.into() };
        store.init_schema()?;
        debug!(path = %store.path.display(), "Opened sleep session store");
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        self.with_connection(|conn| {
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS sleep_sessions (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    start_time_millis INTEGER NOT NULL,
                    end_time_millis INTEGER NOT NULL,
                    quality INTEGER NOT NULL DEFAULT -1
                 );
                 CREATE INDEX IF NOT EXISTS idx_sleep_sessions_start
                    ON sleep_sessions (start_time_millis);",
            )?;
            Ok(())
        })
    }

    fn with_connection<T>(
        &self,
        op: impl FnOnce(&mut Connection) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut conn = self.connect()?;
        op(&mut conn)
    }

    fn connect(&self) -> StoreResult<Connection> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
        let conn = Connection::open_with_flags(&self.path, flags)?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "busy_timeout", 5000)?;

        Ok(conn)
    }

    fn query_one(&self, sql: &str, id: Option<SessionId>) -> StoreResult<Option<SleepSession>> {
        self.with_connection(|conn| {
            let row = match id {
                Some(id) => conn
                    .query_row(sql, params![id], SessionRow::from_row)
                    .optional()?,
                None => conn.query_row(sql, [], SessionRow::from_row).optional()?,
            };
            row.map(SessionRow::into_session).transpose()
        })
    }
}

impl SessionStore for SqliteStore {
    fn insert(&self, session: &NewSession) -> StoreResult<SleepSession> {
        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO sleep_sessions (start_time_millis, end_time_millis, quality)
                 VALUES (?1, ?2, ?3)",
                params![
                    session.start_time_millis,
                    session.end_time_millis,
                    encode_quality(session.quality)
                ],
            )?;
            Ok(session.clone().into_session(conn.last_insert_rowid()))
        })
    }

    fn update(&self, session: &SleepSession) -> StoreResult<()> {
        let changed = self.with_connection(|conn| {
            Ok(conn.execute(
                "UPDATE sleep_sessions
                 SET start_time_millis = ?2, end_time_millis = ?3, quality = ?4
                 WHERE id = ?1",
                params![
                    session.id,
                    session.start_time_millis,
                    session.end_time_millis,
                    encode_quality(session.quality)
                ],
            )?)
        })?;

        if changed == 0 {
            return Err(StoreError::NotFound { id: session.id });
        }
        Ok(())
    }

    fn most_recent(&self) -> StoreResult<Option<SleepSession>> {
        self.query_one(
            &format!("{SELECT_COLUMNS} ORDER BY start_time_millis DESC, id DESC LIMIT 1"),
            None,
        )
    }

    fn clear(&self) -> StoreResult<()> {
        self.with_connection(|conn| {
            conn.execute("DELETE FROM sleep_sessions", [])?;
            Ok(())
        })
    }

    fn get(&self, id: SessionId) -> StoreResult<Option<SleepSession>> {
        self.query_one(&format!("{SELECT_COLUMNS} WHERE id = ?1"), Some(id))
    }

    fn all(&self) -> StoreResult<Vec<SleepSession>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS} ORDER BY start_time_millis DESC, id DESC"
            ))?;
            let rows = stmt.query_map([], SessionRow::from_row)?;

            let mut sessions = Vec::new();
            for row in rows {
                sessions.push(row?.into_session()?);
            }
            Ok(sessions)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, SqliteStore) {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let store = SqliteStore::open(temp_dir.path().join("data").join("sleep.db"))
            .expect("store init");
        (temp_dir, store)
    }

    #[test]
    fn insert_assigns_ids_and_reads_back() {
        let (_dir, store) = temp_store();

        let first = store.insert(&NewSession::open_at(1_000)).unwrap();
        let second = store.insert(&NewSession::open_at(2_000)).unwrap();
        assert!(second.id > first.id);

        assert_eq!(store.get(first.id).unwrap(), Some(first));
        assert_eq!(store.most_recent().unwrap(), Some(second));
    }

    #[test]
    fn update_persists_end_and_quality() {
        let (_dir, store) = temp_store();
        let session = store.insert(&NewSession::open_at(1_000)).unwrap();

        let rated = session
            .closed_at(5_000)
            .with_quality(SleepQuality::PrettyGood);
        store.update(&rated).unwrap();

        let loaded = store.get(session.id).unwrap().unwrap();
        assert_eq!(loaded.end_time_millis, 5_000);
        assert_eq!(loaded.quality, Some(SleepQuality::PrettyGood));
        assert!(!loaded.is_open());
    }

    #[test]
    fn update_missing_row_is_not_found() {
        let (_dir, store) = temp_store();
        let ghost = NewSession::open_at(1).into_session(99);

        assert!(matches!(
            store.update(&ghost),
            Err(StoreError::NotFound { id: 99 })
        ));
    }

    #[test]
    fn clear_removes_everything() {
        let (_dir, store) = temp_store();
        store.insert(&NewSession::open_at(1)).unwrap();
        store.insert(&NewSession::open_at(2)).unwrap();

        store.clear().unwrap();

        assert!(store.all().unwrap().is_empty());
        assert_eq!(store.most_recent().unwrap(), None);
    }

    #[test]
    fn all_is_newest_first() {
        let (_dir, store) = temp_store();
        store.insert(&NewSession::open_at(200)).unwrap();
        store.insert(&NewSession::open_at(300)).unwrap();
        store.insert(&NewSession::open_at(100)).unwrap();

        let starts: Vec<_> = store
            .all()
            .unwrap()
            .iter()
            .map(|s| s.start_time_millis)
            .collect();
        assert_eq!(starts, [300, 200, 100]);
    }

    #[test]
    fn data_survives_reopen() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let path = temp_dir.path().join("sleep.db");

        let session = {
            let store = SqliteStore::open(&path).unwrap();
            store.insert(&NewSession::open_at(42)).unwrap()
        };

        let reopened = SqliteStore::open(&path).unwrap();
        let recovered = super::super::open_session(&reopened).unwrap();
        assert_eq!(recovered, Some(session));
    }

    #[test]
    fn out_of_range_quality_is_rejected() {
        let (_dir, store) = temp_store();
        let session = store.insert(&NewSession::open_at(1)).unwrap();
        store
            .with_connection(|conn| {
                conn.execute(
                    "UPDATE sleep_sessions SET quality = 17 WHERE id = ?1",
                    params![session.id],
                )?;
                Ok(())
            })
            .unwrap();

        assert!(matches!(
            store.get(session.id),
            Err(StoreError::InvalidQuality(17))
        ));
    }
}
