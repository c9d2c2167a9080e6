//! Moving coins: wallet ⇄ bank, and wallet → another user's wallet.

use crate::{
    error::{BotError, BotResult},
    event::LedgerEvent,
    ledger::{commit_change, Ledger},
    store::{fetch_account, write_account},
    types::{Coins, UserId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MoveOutcome {
    Moved {
        amount: Coins,
        wallet: Coins,
        bank:   Coins,
    },
    InsufficientFunds {
        requested: Coins,
        available: Coins,
    },
    InvalidAmount {
        amount: Coins,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ShareOutcome {
    Shared {
        amount:           Coins,
        sender_wallet:    Coins,
        recipient_wallet: Coins,
    },
    InsufficientFunds {
        requested: Coins,
        available: Coins,
    },
    InvalidAmount {
        amount: Coins,
    },
    SelfTransfer,
}

impl Ledger {
    /// Wallet → bank.
    pub fn deposit(&self, user_id: UserId, amount: Coins, now: DateTime<Utc>) -> BotResult<MoveOutcome> {
        if amount <= 0 {
            return Ok(MoveOutcome::InvalidAmount { amount });
        }
        self.modify(user_id, now, |account| {
            if amount > account.wallet {
                let available = account.wallet;
                return Ok((MoveOutcome::InsufficientFunds { requested: amount, available }, None));
            }
            account.wallet -= amount;
            account.bank += amount;
            Ok((
                MoveOutcome::Moved { amount, wallet: account.wallet, bank: account.bank },
                Some(LedgerEvent::Deposited { user_id, amount }),
            ))
        })
    }

    /// Bank → wallet.
    pub fn withdraw(&self, user_id: UserId, amount: Coins, now: DateTime<Utc>) -> BotResult<MoveOutcome> {
        if amount <= 0 {
            return Ok(MoveOutcome::InvalidAmount { amount });
        }
        self.modify(user_id, now, |account| {
            if amount > account.bank {
                let available = account.bank;
                return Ok((MoveOutcome::InsufficientFunds { requested: amount, available }, None));
            }
            account.bank -= amount;
            account.wallet += amount;
            Ok((
                MoveOutcome::Moved { amount, wallet: account.wallet, bank: account.bank },
                Some(LedgerEvent::Withdrew { user_id, amount }),
            ))
        })
    }

    /// Move `amount` from the sender's wallet to the recipient's wallet.
    ///
    /// Debit and credit share one transaction. A failed credit is logged,
    /// rolls the debit back, and comes back as `TransferAborted`.
    pub fn share(
        &self,
        from: UserId,
        to: UserId,
        amount: Coins,
        now: DateTime<Utc>,
    ) -> BotResult<ShareOutcome> {
        if amount <= 0 {
            return Ok(ShareOutcome::InvalidAmount { amount });
        }
        if from == to {
            return Ok(ShareOutcome::SelfTransfer);
        }
        self.store.transaction(|tx| {
            let mut sender = fetch_account(tx, from)?;
            if amount > sender.wallet {
                return Ok(ShareOutcome::InsufficientFunds {
                    requested: amount,
                    available: sender.wallet,
                });
            }
            let event = LedgerEvent::Shared { from, to, amount };
            sender.wallet -= amount;
            commit_change(tx, &sender, &event, now)?;

            let credit = fetch_account(tx, to).and_then(|mut recipient| {
                recipient.wallet += amount;
                write_account(tx, &recipient)?;
                Ok(recipient)
            });
            let recipient = match credit {
                Ok(r) => r,
                Err(e) => {
                    log::error!(
                        "share: credit of {amount} to {to} failed after debiting {from}, rolling back: {e}"
                    );
                    return Err(BotError::TransferAborted {
                        from,
                        to,
                        amount,
                        reason: e.to_string(),
                    });
                }
            };

            log::info!("share: {from} -> {to} amount {amount}");
            Ok(ShareOutcome::Shared {
                amount,
                sender_wallet: sender.wallet,
                recipient_wallet: recipient.wallet,
            })
        })
    }
}
