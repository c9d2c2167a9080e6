//! Leaderboard ranking over stored accounts.

use chrono::{DateTime, TimeZone, Utc};
use coinbot_core::{account::AccountPatch, ledger::Ledger, types::UserId};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

fn set(ledger: &Ledger, user: UserId, wallet: i64, bank: i64) {
    ledger
        .update_account(user, &AccountPatch::default().wallet(wallet).bank(bank), t0())
        .unwrap();
}

/// Ranked by wallet + bank; equal wealth falls back to ascending user id.
#[test]
fn richest_first_ties_by_user_id() {
    let ledger = Ledger::build_test().unwrap();
    set(&ledger, 30, 100, 0); // C
    set(&ledger, 10, 0, 100); // A
    set(&ledger, 20, 200, 300); // B

    let board = ledger.leaderboard().unwrap();
    let ids: Vec<UserId> = board.iter().map(|e| e.user_id).collect();
    assert_eq!(ids, vec![20, 10, 30]);
    assert_eq!(board[0].wealth, 500);
    assert_eq!(board.iter().map(|e| e.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
}

#[test]
fn only_the_top_five_are_shown() {
    let ledger = Ledger::build_test().unwrap();
    for user in 1..=8 {
        set(&ledger, user, user as i64 * 10, 0);
    }
    let board = ledger.leaderboard().unwrap();
    assert_eq!(board.len(), 5);
    assert_eq!(board[0].user_id, 8);
    assert_eq!(board[4].user_id, 4);
}

#[test]
fn empty_store_gives_empty_board() {
    let ledger = Ledger::build_test().unwrap();
    assert!(ledger.leaderboard().unwrap().is_empty());
}
