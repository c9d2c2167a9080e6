//! Per-user economy state.

use crate::types::{Coins, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub user_id:      UserId,
    pub wallet:       Coins,
    pub bank:         Coins,
    pub last_daily:   Option<DateTime<Utc>>,
    pub last_monthly: Option<DateTime<Utc>>,
    pub last_beg:     Option<DateTime<Utc>>,
    pub last_work:    Option<DateTime<Utc>>,
    pub job:          Option<String>,
    /// 1 once the holder has worked in the current cycle, 0 otherwise.
    pub work_days:    i64,
}

impl Account {
    /// The state of a user who has never touched the economy.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            wallet: 0,
            bank: 0,
            last_daily: None,
            last_monthly: None,
            last_beg: None,
            last_work: None,
            job: None,
            work_days: 0,
        }
    }

    pub fn wealth(&self) -> Coins {
        self.wallet + self.bank
    }

    pub fn job_status(&self) -> JobStatus {
        match &self.job {
            Some(job) => JobStatus::Employed(job.clone()),
            None => JobStatus::Unemployed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "job", rename_all = "snake_case")]
pub enum JobStatus {
    Unemployed,
    Employed(String),
}

/// A partial update. Fields left as None keep their stored value.
/// Nullable columns take `Some(None)` to clear them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountPatch {
    pub wallet:       Option<Coins>,
    pub bank:         Option<Coins>,
    pub last_daily:   Option<Option<DateTime<Utc>>>,
    pub last_monthly: Option<Option<DateTime<Utc>>>,
    pub last_beg:     Option<Option<DateTime<Utc>>>,
    pub last_work:    Option<Option<DateTime<Utc>>>,
    pub job:          Option<Option<String>>,
    pub work_days:    Option<i64>,
}

impl AccountPatch {
    pub fn wallet(mut self, v: Coins) -> Self {
        self.wallet = Some(v);
        self
    }

    pub fn bank(mut self, v: Coins) -> Self {
        self.bank = Some(v);
        self
    }

    pub fn last_daily(mut self, v: Option<DateTime<Utc>>) -> Self {
        self.last_daily = Some(v);
        self
    }

    pub fn last_monthly(mut self, v: Option<DateTime<Utc>>) -> Self {
        self.last_monthly = Some(v);
        self
    }

    pub fn last_beg(mut self, v: Option<DateTime<Utc>>) -> Self {
        self.last_beg = Some(v);
        self
    }

    pub fn last_work(mut self, v: Option<DateTime<Utc>>) -> Self {
        self.last_work = Some(v);
        self
    }

    pub fn job(mut self, v: Option<String>) -> Self {
        self.job = Some(v);
        self
    }

    pub fn work_days(mut self, v: i64) -> Self {
        self.work_days = Some(v);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge the supplied fields into `account`.
    pub fn apply_to(&self, account: &mut Account) {
        if let Some(v) = self.wallet {
            account.wallet = v;
        }
        if let Some(v) = self.bank {
            account.bank = v;
        }
        if let Some(v) = self.last_daily {
            account.last_daily = v;
        }
        if let Some(v) = self.last_monthly {
            account.last_monthly = v;
        }
        if let Some(v) = self.last_beg {
            account.last_beg = v;
        }
        if let Some(v) = self.last_work {
            account.last_work = v;
        }
        if let Some(v) = &self.job {
            account.job = v.clone();
        }
        if let Some(v) = self.work_days {
            account.work_days = v;
        }
    }
}
