//! Begging: a one-hour cooldown and a coin flip.
//!
//! Success pays a small random amount into the wallet. Failure loses a
//! random 1–15% of total wealth, taken from the wallet first and then
//! from the bank. `last_beg` is stamped either way.

use crate::{
    claim::{cooldown_remaining, duration_secs, ClaimKind},
    error::BotResult,
    event::LedgerEvent,
    ledger::Ledger,
    rng::GameRng,
    types::{Coins, UserId},
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BegOutcome {
    Gained {
        amount: Coins,
        wallet: Coins,
    },
    Robbed {
        loss:   Coins,
        wallet: Coins,
        bank:   Coins,
    },
    CoolingDown {
        #[serde(with = "duration_secs")]
        remaining: Duration,
    },
}

/// Take `loss` out of wallet first, then bank, never below zero.
/// Returns the new (wallet, bank).
pub fn deduct_wallet_first(wallet: Coins, bank: Coins, loss: Coins) -> (Coins, Coins) {
    if wallet >= loss {
        (wallet - loss, bank)
    } else {
        (0, (bank - (loss - wallet)).max(0))
    }
}

impl Ledger {
    pub fn beg(&self, user_id: UserId, rng: &mut GameRng, now: DateTime<Utc>) -> BotResult<BegOutcome> {
        let rule = self.config.beg.clone();
        self.modify(user_id, now, |account| {
            if let Some(remaining) =
                cooldown_remaining(ClaimKind::Beg.last_claimed(account), rule.cooldown(), now)
            {
                return Ok((BegOutcome::CoolingDown { remaining }, None));
            }
            account.last_beg = Some(now);

            if rng.chance(rule.success_chance) {
                let amount = rng.range_inclusive(rule.gain_min, rule.gain_max);
                account.wallet += amount;
                let event = LedgerEvent::Begged {
                    user_id,
                    success: true,
                    wallet_delta: amount,
                    bank_delta: 0,
                };
                return Ok((BegOutcome::Gained { amount, wallet: account.wallet }, Some(event)));
            }

            let loss_pct = rng.uniform(rule.loss_pct_min, rule.loss_pct_max);
            let loss = (account.wealth() as f64 * loss_pct).floor() as Coins;
            let (wallet, bank) = deduct_wallet_first(account.wallet, account.bank, loss);
            let event = LedgerEvent::Begged {
                user_id,
                success: false,
                wallet_delta: wallet - account.wallet,
                bank_delta: bank - account.bank,
            };
            account.wallet = wallet;
            account.bank = bank;
            Ok((BegOutcome::Robbed { loss, wallet, bank }, Some(event)))
        })
    }
}
