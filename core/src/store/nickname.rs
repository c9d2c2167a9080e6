use super::BotStore;
use crate::{error::BotResult, types::UserId};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::collections::BTreeSet;

pub(crate) fn used_numbers(conn: &Connection) -> BotResult<BTreeSet<u32>> {
    let mut stmt = conn.prepare("SELECT number FROM nickname_number")?;
    let rows = stmt.query_map([], |r| r.get::<_, u32>(0))?;
    rows.collect::<Result<BTreeSet<_>, _>>().map_err(Into::into)
}

pub(crate) fn insert_number(
    conn: &Connection,
    number: u32,
    user_id: UserId,
    at: DateTime<Utc>,
) -> BotResult<()> {
    conn.execute(
        "INSERT INTO nickname_number (number, user_id, assigned_at) VALUES (?1, ?2, ?3)",
        params![number, user_id as i64, at],
    )?;
    Ok(())
}

impl BotStore {
    // ── Nickname numbers ──────────────────────────────────────────

    /// Free a number held by `user_id`. Returns false when that user does
    /// not hold it.
    pub(crate) fn delete_number(&self, number: u32, user_id: UserId) -> BotResult<bool> {
        self.transaction(|tx| {
            let n = tx.execute(
                "DELETE FROM nickname_number WHERE number = ?1 AND user_id = ?2",
                params![number, user_id as i64],
            )?;
            Ok(n == 1)
        })
    }

    pub fn nickname_numbers_in_use(&self) -> BotResult<i64> {
        self.read(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM nickname_number", [], |r| r.get(0))?;
            Ok(n)
        })
    }
}
