//! Leaderboard: the richest accounts, ranked by wallet + bank.

use crate::{
    account::Account,
    error::BotResult,
    ledger::Ledger,
    types::{Coins, UserId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank:    usize,
    pub user_id: UserId,
    pub wealth:  Coins,
}

/// Top `k` accounts by wallet + bank, richest first. Equal wealth is
/// ordered by ascending user id.
pub fn rank_accounts(accounts: &[Account], k: usize) -> Vec<LeaderboardEntry> {
    let mut wealth: Vec<(UserId, Coins)> =
        accounts.iter().map(|a| (a.user_id, a.wealth())).collect();
    wealth.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    wealth
        .into_iter()
        .take(k)
        .enumerate()
        .map(|(i, (user_id, wealth))| LeaderboardEntry { rank: i + 1, user_id, wealth })
        .collect()
}

impl Ledger {
    pub fn leaderboard(&self) -> BotResult<Vec<LeaderboardEntry>> {
        let accounts = self.list_accounts()?;
        Ok(rank_accounts(&accounts, self.config.leaderboard_size))
    }
}
