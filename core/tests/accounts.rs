//! Account storage: defaults, partial updates, the non-negative balance
//! constraint, and persistence across a reopen.

use chrono::{DateTime, TimeZone, Utc};
use coinbot_core::{
    account::{AccountPatch, JobStatus},
    config::BotConfig,
    error::BotError,
    ledger::Ledger,
    store::BotStore,
};
use std::sync::Arc;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// An unknown user reads back as a zeroed account and nothing is written.
#[test]
fn unknown_user_gets_default_account() {
    let ledger = Ledger::build_test().unwrap();
    let account = ledger.get_account(77).unwrap();

    assert_eq!(account.user_id, 77);
    assert_eq!(account.wallet, 0);
    assert_eq!(account.bank, 0);
    assert!(account.last_daily.is_none() && account.last_work.is_none());
    assert_eq!(account.job_status(), JobStatus::Unemployed);
    assert_eq!(account.work_days, 0);
    assert_eq!(
        ledger.store().account_count().unwrap(),
        0,
        "reading a missing account must not create a row"
    );
}

/// Fields missing from a patch keep their stored value.
#[test]
fn partial_update_preserves_other_fields() {
    let ledger = Ledger::build_test().unwrap();
    ledger
        .update_account(1, &AccountPatch::default().wallet(500).bank(20), t0())
        .unwrap();
    let after = ledger
        .update_account(1, &AccountPatch::default().job(Some("Chef".into())), t0())
        .unwrap();

    assert_eq!(after.wallet, 500, "wallet must survive a job-only patch");
    assert_eq!(after.bank, 20);
    assert_eq!(after.job.as_deref(), Some("Chef"));
    assert_eq!(ledger.get_account(1).unwrap(), after);
}

/// Clearing a nullable column takes an explicit Some(None).
#[test]
fn patch_can_clear_nullable_fields() {
    let ledger = Ledger::build_test().unwrap();
    ledger
        .update_account(2, &AccountPatch::default().last_daily(Some(t0())), t0())
        .unwrap();
    let cleared = ledger
        .update_account(2, &AccountPatch::default().last_daily(None), t0())
        .unwrap();
    assert!(cleared.last_daily.is_none());
}

/// A patch that would drive a balance negative is refused and rolled back.
#[test]
fn negative_balance_is_rejected() {
    let ledger = Ledger::build_test().unwrap();
    ledger
        .update_account(3, &AccountPatch::default().wallet(100), t0())
        .unwrap();

    let err = ledger
        .update_account(3, &AccountPatch::default().wallet(-1), t0())
        .unwrap_err();
    assert!(
        matches!(err, BotError::NegativeBalance { user_id: 3, field: "wallet", value: -1 }),
        "unexpected error: {err}"
    );
    assert_eq!(ledger.get_account(3).unwrap().wallet, 100, "failed write must roll back");
}

/// An empty patch writes nothing and records no event.
#[test]
fn empty_patch_is_a_no_op() {
    let ledger = Ledger::build_test().unwrap();
    ledger.update_account(4, &AccountPatch::default(), t0()).unwrap();
    assert_eq!(ledger.store().account_count().unwrap(), 0);
    assert_eq!(ledger.store().event_count().unwrap(), 0);
}

/// Every successful update is logged once under the account.
#[test]
fn updates_are_recorded_in_history() {
    let ledger = Ledger::build_test().unwrap();
    ledger
        .update_account(5, &AccountPatch::default().wallet(1), t0())
        .unwrap();
    let history = ledger.history(5).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].event_type, "account_updated");
    assert_eq!(history[0].recorded_at, t0());
}

/// Accounts written through one connection are visible after reopening the file.
#[test]
fn accounts_survive_reopen() {
    let path = std::env::temp_dir().join(format!("coinbot-{}.db", uuid::Uuid::new_v4()));
    let path_str = path.to_string_lossy().to_string();

    let store = BotStore::open(&path_str).unwrap();
    store.migrate().unwrap();
    let ledger = Ledger::new(Arc::new(store), BotConfig::default_test().economy);
    ledger.claim_daily(9, t0()).unwrap();

    let second = ledger.store().reopen().unwrap();
    second.migrate().unwrap();
    let account = second.get_account(9).unwrap();
    assert_eq!(account.wallet, 10_000);
    assert_eq!(account.last_daily, Some(t0()));
    assert_eq!(second.events_for_user(9).unwrap().len(), 1);

    drop(ledger);
    drop(second);
    let _ = std::fs::remove_file(&path);
    let _ = std::fs::remove_file(path.with_extension("db-wal"));
    let _ = std::fs::remove_file(path.with_extension("db-shm"));
}
