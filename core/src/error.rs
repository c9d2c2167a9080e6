use crate::types::{Coins, UserId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store unavailable: connection lock poisoned")]
    StoreUnavailable,

    #[error("Negative {field} for user {user_id}: {value}")]
    NegativeBalance {
        user_id: UserId,
        field:   &'static str,
        value:   Coins,
    },

    #[error("Transfer of {amount} from {from} to {to} aborted after debit: {reason}")]
    TransferAborted {
        from:   UserId,
        to:     UserId,
        amount: Coins,
        reason: String,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type BotResult<T> = Result<T, BotError>;
