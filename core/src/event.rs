//! Ledger audit events.
//!
//! RULE: Every successful ledger mutation appends exactly one event,
//! inside the same transaction as the mutation. Rejections append nothing.

use crate::{
    claim::ClaimKind,
    types::{Coins, UserId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Variants are appended over time — never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    AccountUpdated {
        user_id: UserId,
    },
    Claimed {
        user_id: UserId,
        kind:    ClaimKind,
        reward:  Coins,
    },
    Begged {
        user_id:      UserId,
        success:      bool,
        wallet_delta: Coins,
        bank_delta:   Coins,
    },
    Hired {
        user_id: UserId,
        job:     String,
    },
    Fired {
        user_id: UserId,
        job:     String,
        penalty: Coins,
    },
    Worked {
        user_id:  UserId,
        job:      String,
        earnings: Coins,
    },
    Deposited {
        user_id: UserId,
        amount:  Coins,
    },
    Withdrew {
        user_id: UserId,
        amount:  Coins,
    },
    Shared {
        from:   UserId,
        to:     UserId,
        amount: Coins,
    },
}

impl LedgerEvent {
    /// Stable name for the event_type column.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::AccountUpdated { .. } => "account_updated",
            Self::Claimed { .. }        => "claimed",
            Self::Begged { .. }         => "begged",
            Self::Hired { .. }          => "hired",
            Self::Fired { .. }          => "fired",
            Self::Worked { .. }         => "worked",
            Self::Deposited { .. }      => "deposited",
            Self::Withdrew { .. }       => "withdrew",
            Self::Shared { .. }         => "shared",
        }
    }

    /// The account the event is filed under. Shares are filed under the sender.
    pub fn user_id(&self) -> UserId {
        match self {
            Self::AccountUpdated { user_id }
            | Self::Claimed { user_id, .. }
            | Self::Begged { user_id, .. }
            | Self::Hired { user_id, .. }
            | Self::Fired { user_id, .. }
            | Self::Worked { user_id, .. }
            | Self::Deposited { user_id, .. }
            | Self::Withdrew { user_id, .. } => *user_id,
            Self::Shared { from, .. } => *from,
        }
    }
}

/// A row of the ledger_event table.
#[derive(Debug, Clone)]
pub struct LedgerEventEntry {
    pub id:          Option<i64>,
    pub user_id:     UserId,
    pub event_type:  String,
    pub payload:     String,
    pub recorded_at: DateTime<Utc>,
}

impl LedgerEventEntry {
    pub fn decode(&self) -> serde_json::Result<LedgerEvent> {
        serde_json::from_str(&self.payload)
    }
}
