mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;

use crate::models::SyncOutcome;
use crate::storage::KeyValueStore;

/// Durable key/value storage backed by SQLite.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

/// One recorded reconciliation pass.
#[derive(Debug, Clone, Serialize)]
pub struct SyncLogEntry {
    pub id: i64,
    pub outcome: String,
    pub merged: usize,
    pub added: usize,
    pub total: usize,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "quotebook")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Self::open(dirs.data_dir().join("quotebook.db"))
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Key/value operations
    // ============================================================

    pub fn get_value(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let value = conn
            .query_row("SELECT value FROM kv_store WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn set_value(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            (key, value, Utc::now().to_rfc3339()),
        )?;
        Ok(())
    }

    // ============================================================
    // Sync log operations
    // ============================================================

    /// Record a finished pass. Skipped passes are not worth keeping.
    pub fn record_sync(&self, outcome: &SyncOutcome) -> Result<()> {
        let (label, report) = match outcome {
            SyncOutcome::Completed(report) => ("completed", *report),
            SyncOutcome::Failed(_) => ("failed", Default::default()),
            SyncOutcome::Skipped => return Ok(()),
        };

        let conn = self.conn.lock().expect("database lock poisoned");
        conn.execute(
            "INSERT INTO sync_log (outcome, merged, added, total, message, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                label,
                report.merged as i64,
                report.added as i64,
                report.total as i64,
                outcome.message(),
                Utc::now().to_rfc3339(),
            ),
        )?;
        Ok(())
    }

    /// Most recent passes first.
    pub fn recent_syncs(&self, limit: usize) -> Result<Vec<SyncLogEntry>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, outcome, merged, added, total, message, created_at
             FROM sync_log ORDER BY id DESC LIMIT ?",
        )?;

        let entries = stmt
            .query_map([limit as i64], |row| {
                Ok(SyncLogEntry {
                    id: row.get(0)?,
                    outcome: row.get(1)?,
                    merged: row.get::<_, i64>(2)? as usize,
                    added: row.get::<_, i64>(3)? as usize,
                    total: row.get::<_, i64>(4)? as usize,
                    message: row.get(5)?,
                    created_at: parse_datetime(row.get::<_, String>(6)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.get_value(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.set_value(key, value)
    }
}

fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
