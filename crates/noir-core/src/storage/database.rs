//! SQLite-based session log and key-value storage.
//!
//! Provides persistent storage for:
//! - Expired Focus/Rest sessions and the statistics derived from them
//! - Key-value store for the task and project collections

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{data_dir, KvStore};
use crate::error::StorageError;
use crate::task::TaskId;
use crate::timer::Mode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: i64,
    pub mode: Mode,
    pub task_id: Option<String>,
    pub duration_secs: u32,
    pub ended_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Stats {
    pub total_sessions: u64,
    pub focus_sessions: u64,
    pub focus_secs: u64,
    pub rest_secs: u64,
    pub today_focus_sessions: u64,
    pub today_focus_secs: u64,
}

/// SQLite database for the session log and collections.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/pomodoro-noir/noir.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        Self::open_at(&data_dir()?.join("noir.db"))
    }

    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                mode          TEXT NOT NULL,
                task_id       TEXT,
                duration_secs INTEGER NOT NULL,
                ended_at      TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_ended_at ON sessions(ended_at);
            CREATE INDEX IF NOT EXISTS idx_sessions_mode ON sessions(mode);",
        )?;
        Ok(())
    }

    /// Record an expired session.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_session(
        &self,
        mode: Mode,
        task_id: Option<&TaskId>,
        duration_secs: u32,
        ended_at: DateTime<Utc>,
    ) -> Result<i64, StorageError> {
        self.conn.execute(
            "INSERT INTO sessions (mode, task_id, duration_secs, ended_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                mode_str(mode),
                task_id.map(TaskId::as_str),
                duration_secs,
                ended_at.to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent sessions first.
    pub fn recent_sessions(&self, limit: usize) -> Result<Vec<SessionRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, mode, task_id, duration_secs, ended_at
             FROM sessions
             ORDER BY ended_at DESC, id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, u32>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, mode, task_id, duration_secs, ended_at) = row?;
            let Some(mode) = parse_mode(&mode) else {
                tracing::warn!(id, mode = %mode, "skipping session with unknown mode");
                continue;
            };
            let ended_at = DateTime::parse_from_rfc3339(&ended_at)
                .map_err(|e| StorageError::QueryFailed(e.to_string()))?
                .with_timezone(&Utc);
            records.push(SessionRecord {
                id,
                mode,
                task_id,
                duration_secs,
                ended_at,
            });
        }
        Ok(records)
    }

    pub fn stats_today(&self) -> Result<Stats, StorageError> {
        self.stats_since(Some(&today_start()))
    }

    pub fn stats_all(&self) -> Result<Stats, StorageError> {
        self.stats_since(None)
    }

    fn stats_since(&self, since: Option<&str>) -> Result<Stats, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT mode, COUNT(*), COALESCE(SUM(duration_secs), 0)
             FROM sessions
             WHERE ?1 IS NULL OR ended_at >= ?1
             GROUP BY mode",
        )?;
        let rows = stmt.query_map(params![since], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u64>(1)?,
                row.get::<_, u64>(2)?,
            ))
        })?;

        let mut stats = Stats::default();
        for row in rows {
            let (mode, count, secs) = row?;
            stats.total_sessions += count;
            match parse_mode(&mode) {
                Some(Mode::Focus) => {
                    stats.focus_sessions += count;
                    stats.focus_secs += secs;
                }
                Some(Mode::Rest) => stats.rest_secs += secs,
                None => {}
            }
        }

        let (today_sessions, today_secs) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(duration_secs), 0)
             FROM sessions
             WHERE mode = 'focus' AND ended_at >= ?1",
            params![today_start()],
            |row| Ok((row.get::<_, u64>(0)?, row.get::<_, u64>(1)?)),
        )?;
        stats.today_focus_sessions = today_sessions;
        stats.today_focus_secs = today_secs;

        Ok(stats)
    }
}

impl KvStore for Database {
    fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

fn mode_str(mode: Mode) -> &'static str {
    match mode {
        Mode::Focus => "focus",
        Mode::Rest => "rest",
    }
}

fn parse_mode(s: &str) -> Option<Mode> {
    match s {
        "focus" => Some(Mode::Focus),
        "rest" => Some(Mode::Rest),
        _ => None,
    }
}

fn today_start() -> String {
    let today = Utc::now().format("%Y-%m-%d").to_string();
    format!("{today}T00:00:00+00:00")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn record_and_query() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now();
        let task = TaskId::from("task-1");
        db.record_session(Mode::Focus, Some(&task), 1500, now).unwrap();
        db.record_session(Mode::Rest, None, 300, now).unwrap();

        let stats = db.stats_all().unwrap();
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.focus_sessions, 1);
        assert_eq!(stats.focus_secs, 1500);
        assert_eq!(stats.rest_secs, 300);
        assert_eq!(stats.today_focus_sessions, 1);
    }

    #[test]
    fn stats_today_excludes_older_sessions() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now();
        db.record_session(Mode::Focus, None, 1500, now - Duration::days(3))
            .unwrap();
        db.record_session(Mode::Focus, None, 1500, now).unwrap();

        assert_eq!(db.stats_all().unwrap().focus_sessions, 2);
        assert_eq!(db.stats_today().unwrap().focus_sessions, 1);
    }

    #[test]
    fn recent_sessions_newest_first() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now();
        db.record_session(Mode::Focus, Some(&TaskId::from("a")), 1500, now - Duration::minutes(30))
            .unwrap();
        db.record_session(Mode::Rest, None, 300, now).unwrap();

        let recent = db.recent_sessions(10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].mode, Mode::Rest);
        assert_eq!(recent[1].task_id.as_deref(), Some("a"));
        assert_eq!(db.recent_sessions(1).unwrap().len(), 1);
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_set("test", "again").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "again");
    }

    #[test]
    fn open_at_persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noir.db");
        Database::open_at(&path).unwrap().kv_set("k", "v").unwrap();
        let reopened = Database::open_at(&path).unwrap();
        assert_eq!(reopened.kv_get("k").unwrap().as_deref(), Some("v"));
    }
}
