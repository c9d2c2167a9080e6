use super::BotStore;
use crate::{
    account::Account,
    error::{BotError, BotResult},
    types::UserId,
};
use rusqlite::{params, Connection, OptionalExtension, Row};

const ACCOUNT_COLUMNS: &str =
    "user_id, wallet, bank, last_daily, last_monthly, last_beg, last_work, job, work_days";

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        user_id:      row.get::<_, i64>(0)? as UserId,
        wallet:       row.get(1)?,
        bank:         row.get(2)?,
        last_daily:   row.get(3)?,
        last_monthly: row.get(4)?,
        last_beg:     row.get(5)?,
        last_work:    row.get(6)?,
        job:          row.get(7)?,
        work_days:    row.get(8)?,
    })
}

/// Read one account. A missing row is the default account, not an error.
pub(crate) fn fetch_account(conn: &Connection, user_id: UserId) -> BotResult<Account> {
    let row = conn
        .query_row(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM account WHERE user_id = ?1"),
            params![user_id as i64],
            account_from_row,
        )
        .optional()?;
    Ok(row.unwrap_or_else(|| Account::new(user_id)))
}

/// Insert-or-update the full row.
pub(crate) fn write_account(conn: &Connection, a: &Account) -> BotResult<()> {
    for (field, value) in [("wallet", a.wallet), ("bank", a.bank)] {
        if value < 0 {
            return Err(BotError::NegativeBalance { user_id: a.user_id, field, value });
        }
    }
    conn.execute(
        &format!(
            "INSERT INTO account ({ACCOUNT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(user_id) DO UPDATE SET
                wallet       = excluded.wallet,
                bank         = excluded.bank,
                last_daily   = excluded.last_daily,
                last_monthly = excluded.last_monthly,
                last_beg     = excluded.last_beg,
                last_work    = excluded.last_work,
                job          = excluded.job,
                work_days    = excluded.work_days"
        ),
        params![
            a.user_id as i64,
            a.wallet,
            a.bank,
            a.last_daily,
            a.last_monthly,
            a.last_beg,
            a.last_work,
            a.job,
            a.work_days,
        ],
    )?;
    Ok(())
}

impl BotStore {
    // ── Account ───────────────────────────────────────────────────

    pub fn get_account(&self, user_id: UserId) -> BotResult<Account> {
        self.read(|conn| fetch_account(conn, user_id))
    }

    /// Every stored account, ordered by user id.
    pub fn all_accounts(&self) -> BotResult<Vec<Account>> {
        self.read(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ACCOUNT_COLUMNS} FROM account ORDER BY user_id ASC"
            ))?;
            let rows = stmt.query_map([], account_from_row)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
        })
    }

    pub fn account_count(&self) -> BotResult<i64> {
        self.read(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM account", [], |r| r.get(0))?;
            Ok(n)
        })
    }
}
