//! The ledger — owner of every account read and write.
//!
//! RULES:
//!   - Every operation that reads an account and then writes it does both
//!     inside one store transaction (see `BotStore::transaction`).
//!   - Rejections (cooldowns, insufficient funds, bad amounts) are outcomes,
//!     not errors, and leave the store untouched.
//!   - Errors are storage faults and are always returned to the caller.
//!
//! The economy operations live next to their rules:
//! `claim.rs`, `beg.rs`, `job.rs`, `banking.rs`, `leaderboard.rs`.

use crate::{
    account::{Account, AccountPatch},
    config::{BotConfig, EconomyConfig},
    error::BotResult,
    event::{LedgerEvent, LedgerEventEntry},
    store::{append_event, fetch_account, write_account, BotStore},
    types::UserId,
};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::sync::Arc;

pub struct Ledger {
    pub(crate) store:  Arc<BotStore>,
    pub(crate) config: EconomyConfig,
}

impl Ledger {
    pub fn new(store: Arc<BotStore>, config: EconomyConfig) -> Self {
        Self { store, config }
    }

    /// Fresh in-memory ledger with the test configuration.
    pub fn build_test() -> BotResult<Self> {
        let store = BotStore::in_memory()?;
        store.migrate()?;
        Ok(Self::new(Arc::new(store), BotConfig::default_test().economy))
    }

    pub fn store(&self) -> &BotStore {
        &self.store
    }

    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    /// Never fails for an unknown user: returns the default account.
    pub fn get_account(&self, user_id: UserId) -> BotResult<Account> {
        self.store.get_account(user_id)
    }

    /// Merge `patch` into the stored account and persist it atomically.
    /// Returns the account as written.
    pub fn update_account(
        &self,
        user_id: UserId,
        patch: &AccountPatch,
        now: DateTime<Utc>,
    ) -> BotResult<Account> {
        self.modify(user_id, now, |account| {
            if patch.is_empty() {
                return Ok((account.clone(), None));
            }
            patch.apply_to(account);
            Ok((account.clone(), Some(LedgerEvent::AccountUpdated { user_id })))
        })
    }

    /// All stored accounts, ordered by user id.
    pub fn list_accounts(&self) -> BotResult<Vec<Account>> {
        self.store.all_accounts()
    }

    pub fn history(&self, user_id: UserId) -> BotResult<Vec<LedgerEventEntry>> {
        self.store.events_for_user(user_id)
    }

    /// Read-modify-write one account in a single transaction.
    ///
    /// `f` mutates the account in place and returns the outcome plus the
    /// event to record. Returning no event means the change is discarded:
    /// nothing is written.
    pub(crate) fn modify<T, F>(&self, user_id: UserId, now: DateTime<Utc>, f: F) -> BotResult<T>
    where
        F: FnOnce(&mut Account) -> BotResult<(T, Option<LedgerEvent>)>,
    {
        self.store.transaction(|tx| {
            let mut account = fetch_account(tx, user_id)?;
            let (outcome, event) = f(&mut account)?;
            if let Some(event) = event {
                commit_change(tx, &account, &event, now)?;
            }
            Ok(outcome)
        })
    }
}

pub(crate) fn commit_change(
    conn: &Connection,
    account: &Account,
    event: &LedgerEvent,
    now: DateTime<Utc>,
) -> BotResult<()> {
    write_account(conn, account)?;
    append_event(conn, event, now)?;
    log::debug!("ledger: {} for user {}", event.type_name(), account.user_id);
    Ok(())
}
