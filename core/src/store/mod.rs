//! SQLite persistence layer.
//!
//! RULE: Only the store module talks to the database.
//! Features call store methods — they never execute SQL directly.
//!
//! One connection sits behind a mutex. Every read-modify-write runs
//! as a single `BEGIN IMMEDIATE` transaction while the mutex is held,
//! so two requests for the same account can never interleave between
//! their read and their write.

use crate::{
    error::{BotError, BotResult},
    event::{LedgerEvent, LedgerEventEntry},
    types::UserId,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Transaction, TransactionBehavior};
use std::sync::{Mutex, MutexGuard};

mod account;
mod gem;
mod nickname;

pub(crate) use account::{fetch_account, write_account};
pub(crate) use gem::{fetch_gem_settings, insert_gemmed};
pub(crate) use nickname::{insert_number, used_numbers};

pub struct BotStore {
    conn: Mutex<Connection>,
    path: Option<String>, // None for :memory:, Some(path) for file
}

impl BotStore {
    pub fn open(path: &str) -> BotResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA busy_timeout=5000;")?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> BotResult<Self> {
        let conn = Connection::open(":memory:")?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    /// Reopen a new connection to the same database.
    /// For in-memory databases, this returns a new in-memory database (isolated).
    /// For file-based databases, this opens the same file.
    pub fn reopen(&self) -> BotResult<Self> {
        match &self.path {
            Some(p) => Self::open(p),
            None => Self::in_memory(),
        }
    }

    /// Apply all schema migrations in order. Safe to run on every start.
    pub fn migrate(&self) -> BotResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(include_str!("../../../migrations/001_accounts.sql"))?;
        conn.execute_batch(include_str!("../../../migrations/002_ledger_events.sql"))?;
        conn.execute_batch(include_str!("../../../migrations/003_gems.sql"))?;
        conn.execute_batch(include_str!("../../../migrations/004_nicknames.sql"))?;
        Ok(())
    }

    fn lock(&self) -> BotResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| BotError::StoreUnavailable)
    }

    /// Run `f` inside one IMMEDIATE transaction. Any error rolls back
    /// everything `f` wrote.
    pub(crate) fn transaction<T, F>(&self, f: F) -> BotResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> BotResult<T>,
    {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }

    /// Run a read-only query under the connection lock.
    pub(crate) fn read<T, F>(&self, f: F) -> BotResult<T>
    where
        F: FnOnce(&Connection) -> BotResult<T>,
    {
        let conn = self.lock()?;
        f(&conn)
    }

    // ── Ledger event log ───────────────────────────────────────

    pub fn events_for_user(&self, user_id: UserId) -> BotResult<Vec<LedgerEventEntry>> {
        self.read(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, event_type, payload, recorded_at
                 FROM ledger_event WHERE user_id = ?1
                 ORDER BY id ASC",
            )?;
            let entries = stmt
                .query_map(params![user_id as i64], |row| {
                    Ok(LedgerEventEntry {
                        id:          Some(row.get(0)?),
                        user_id:     row.get::<_, i64>(1)? as UserId,
                        event_type:  row.get(2)?,
                        payload:     row.get(3)?,
                        recorded_at: row.get(4)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(entries)
        })
    }

    pub fn event_count(&self) -> BotResult<i64> {
        self.read(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM ledger_event", [], |r| r.get(0))?;
            Ok(n)
        })
    }
}

/// Append one event inside the caller's transaction.
pub(crate) fn append_event(
    conn: &Connection,
    event: &LedgerEvent,
    at: DateTime<Utc>,
) -> BotResult<()> {
    conn.execute(
        "INSERT INTO ledger_event (user_id, event_type, payload, recorded_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            event.user_id() as i64,
            event.type_name(),
            serde_json::to_string(event)?,
            at,
        ],
    )?;
    Ok(())
}
