//! Progress stored in SQLite, one row per `(user, word)`.
//!
//! Judgments are upserts, so repeating a judgment never adds rows and counts
//! are distinct-word counts.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction};

use super::models::{ProgressMap, ProgressState, Settings, UserId};
use super::store::{ProgressStore, Result, StorageError};
use crate::catalog::{Language, WordKey};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        user_id TEXT PRIMARY KEY,
        target_language TEXT,
        level INTEGER,
        resets INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS progress (
        user_id TEXT NOT NULL,
        english TEXT NOT NULL,
        language TEXT NOT NULL,
        level INTEGER NOT NULL,
        known INTEGER NOT NULL,
        updated_at TEXT NOT NULL,
        PRIMARY KEY (user_id, english, language, level),
        FOREIGN KEY (user_id) REFERENCES users(user_id) ON DELETE CASCADE
    );

    CREATE INDEX IF NOT EXISTS idx_progress_user_known ON progress(user_id, known);
"#;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at the given path
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::init(Connection::open(db_path)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }
}

fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StorageError::InvalidRecord(format!("bad timestamp '{}': {}", value, e)))
}

fn parse_language(value: &str) -> Result<Language> {
    value
        .parse()
        .map_err(|e| StorageError::InvalidRecord(format!("{}", e)))
}

fn read_user(conn: &Connection, user: &UserId) -> Result<Option<ProgressState>> {
    let row = conn
        .query_row(
            "SELECT target_language, level, resets, created_at, updated_at FROM users WHERE user_id = ?1",
            params![user.to_string()],
            |row| {
                Ok((
                    row.get::<_, Option<String>>(0)?,
                    row.get::<_, Option<u8>>(1)?,
                    row.get::<_, u32>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            },
        )
        .optional()?;

    let Some((language, level, resets, created_at, updated_at)) = row else {
        return Ok(None);
    };

    let settings = match (language, level) {
        (Some(language), Some(level)) => Some(Settings {
            target_language: parse_language(&language)?,
            level,
        }),
        _ => None,
    };

    let mut known = BTreeSet::new();
    let mut unknown = BTreeSet::new();
    let mut stmt = conn.prepare(
        "SELECT english, language, level, known FROM progress WHERE user_id = ?1",
    )?;
    let rows = stmt.query_map(params![user.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, u8>(2)?,
            row.get::<_, bool>(3)?,
        ))
    })?;
    for row in rows {
        let (english, language, level, is_known) = row?;
        let key = WordKey {
            english,
            language: parse_language(&language)?,
            level,
        };
        if is_known {
            known.insert(key);
        } else {
            unknown.insert(key);
        }
    }

    Ok(Some(ProgressState {
        known,
        unknown,
        settings,
        resets,
        created_at: parse_time(&created_at)?,
        updated_at: parse_time(&updated_at)?,
    }))
}

fn write_user(tx: &Transaction<'_>, user: &UserId, state: &ProgressState) -> Result<()> {
    let id = user.to_string();
    let (language, level) = match state.settings {
        Some(s) => (Some(s.target_language.as_str()), Some(s.level)),
        None => (None, None),
    };

    tx.execute(
        "INSERT INTO users (user_id, target_language, level, resets, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(user_id) DO UPDATE SET
            target_language = excluded.target_language,
            level = excluded.level,
            resets = excluded.resets,
            updated_at = excluded.updated_at",
        params![
            id,
            language,
            level,
            state.resets,
            state.created_at.to_rfc3339(),
            state.updated_at.to_rfc3339(),
        ],
    )?;

    tx.execute("DELETE FROM progress WHERE user_id = ?1", params![id])?;

    let mut insert = tx.prepare(
        "INSERT INTO progress (user_id, english, language, level, known, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    let updated_at = state.updated_at.to_rfc3339();
    for (key, known) in state
        .known
        .iter()
        .map(|k| (k, true))
        .chain(state.unknown.iter().map(|k| (k, false)))
    {
        insert.execute(params![
            id,
            key.english,
            key.language.as_str(),
            key.level,
            known,
            updated_at,
        ])?;
    }

    Ok(())
}

impl ProgressStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn load(&self) -> Result<ProgressMap> {
        let conn = self.conn()?;
        let ids: Vec<String> = {
            let mut stmt = conn.prepare("SELECT user_id FROM users ORDER BY user_id")?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };

        let mut progress = ProgressMap::new();
        for id in ids {
            let user: UserId = id
                .parse()
                .map_err(|e| StorageError::InvalidRecord(format!("{}", e)))?;
            if let Some(state) = read_user(&conn, &user)? {
                progress.insert(user, state);
            }
        }
        Ok(progress)
    }

    fn save(&self, progress: &ProgressMap) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM progress", [])?;
        tx.execute("DELETE FROM users", [])?;
        for (user, state) in progress {
            write_user(&tx, user, state)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn load_user(&self, user: &UserId) -> Result<Option<ProgressState>> {
        let conn = self.conn()?;
        read_user(&conn, user)
    }

    fn update_user(
        &self,
        user: &UserId,
        apply: &mut dyn FnMut(&mut ProgressState),
    ) -> Result<ProgressState> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut state = read_user(&tx, user)?.unwrap_or_default();
        apply(&mut state);
        write_user(&tx, user, &state)?;
        tx.commit()?;
        Ok(state)
    }

    fn remove_user(&self, user: &UserId) -> Result<bool> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM users WHERE user_id = ?1", params![user.to_string()])?;
        Ok(removed > 0)
    }

    fn record(&self, user: &UserId, word: &WordKey, known: bool) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();
        let id = user.to_string();

        tx.execute(
            "INSERT INTO users (user_id, created_at, updated_at) VALUES (?1, ?2, ?2)
             ON CONFLICT(user_id) DO UPDATE SET updated_at = excluded.updated_at",
            params![id, now],
        )?;
        tx.execute(
            "INSERT INTO progress (user_id, english, language, level, known, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(user_id, english, language, level) DO UPDATE SET
                known = excluded.known,
                updated_at = excluded.updated_at",
            params![id, word.english, word.language.as_str(), word.level, known, now],
        )?;
        tx.commit()?;
        Ok(())
    }
}
