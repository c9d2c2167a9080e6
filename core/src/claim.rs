//! Cooldown-gated claims.
//!
//! A claim succeeds when its `last_X` stamp is null or at least the
//! cooldown has passed since it. A rejected claim reports how long is
//! left and changes nothing.

use crate::{
    account::Account,
    config::ClaimRule,
    error::BotResult,
    event::LedgerEvent,
    ledger::Ledger,
    types::{Coins, UserId},
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimKind {
    Daily,
    Monthly,
    Beg,
    Work,
}

impl ClaimKind {
    pub fn last_claimed(&self, account: &Account) -> Option<DateTime<Utc>> {
        match self {
            Self::Daily   => account.last_daily,
            Self::Monthly => account.last_monthly,
            Self::Beg     => account.last_beg,
            Self::Work    => account.last_work,
        }
    }

    fn stamp(&self, account: &mut Account, now: DateTime<Utc>) {
        let slot = match self {
            Self::Daily   => &mut account.last_daily,
            Self::Monthly => &mut account.last_monthly,
            Self::Beg     => &mut account.last_beg,
            Self::Work    => &mut account.last_work,
        };
        *slot = Some(now);
    }
}

/// Time left before a claim opens again. None when it is open now.
pub fn cooldown_remaining(
    last: Option<DateTime<Utc>>,
    cooldown: Duration,
    now: DateTime<Utc>,
) -> Option<Duration> {
    let next = last? + cooldown;
    (now < next).then(|| next - now)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ClaimOutcome {
    Claimed {
        reward: Coins,
        wallet: Coins,
    },
    CoolingDown {
        #[serde(with = "duration_secs")]
        remaining: Duration,
    },
}

/// Stamp the claim and credit the reward, or report the remaining wait.
pub(crate) fn try_claim(
    account: &mut Account,
    kind: ClaimKind,
    rule: &ClaimRule,
    now: DateTime<Utc>,
) -> (ClaimOutcome, Option<LedgerEvent>) {
    if let Some(remaining) = cooldown_remaining(kind.last_claimed(account), rule.cooldown(), now) {
        return (ClaimOutcome::CoolingDown { remaining }, None);
    }
    account.wallet += rule.reward;
    kind.stamp(account, now);
    let event = LedgerEvent::Claimed {
        user_id: account.user_id,
        kind,
        reward: rule.reward,
    };
    (
        ClaimOutcome::Claimed { reward: rule.reward, wallet: account.wallet },
        Some(event),
    )
}

impl Ledger {
    pub fn claim_daily(&self, user_id: UserId, now: DateTime<Utc>) -> BotResult<ClaimOutcome> {
        let rule = self.config.daily.clone();
        self.modify(user_id, now, |account| {
            Ok(try_claim(account, ClaimKind::Daily, &rule, now))
        })
    }

    pub fn claim_monthly(&self, user_id: UserId, now: DateTime<Utc>) -> BotResult<ClaimOutcome> {
        let rule = self.config.monthly.clone();
        self.modify(user_id, now, |account| {
            Ok(try_claim(account, ClaimKind::Monthly, &rule, now))
        })
    }
}

/// Serialize a chrono Duration as whole seconds.
pub(crate) mod duration_secs {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(d.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        i64::deserialize(d).map(Duration::seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn never_claimed_is_open() {
        assert_eq!(cooldown_remaining(None, Duration::hours(24), t0()), None);
    }

    #[test]
    fn remaining_counts_down_to_zero() {
        let last = Some(t0());
        let d = Duration::hours(24);
        assert_eq!(
            cooldown_remaining(last, d, t0() + Duration::hours(1)),
            Some(Duration::hours(23))
        );
        assert_eq!(cooldown_remaining(last, d, t0() + d), None, "boundary is inclusive");
    }

    #[test]
    fn rejected_claim_leaves_account_untouched() {
        let rule = ClaimRule { cooldown_secs: 60, reward: 5 };
        let mut a = Account::new(1);
        let (first, ev) = try_claim(&mut a, ClaimKind::Daily, &rule, t0());
        assert!(matches!(first, ClaimOutcome::Claimed { reward: 5, wallet: 5 }));
        assert!(ev.is_some());

        let before = a.clone();
        let (second, ev) = try_claim(&mut a, ClaimKind::Daily, &rule, t0() + Duration::seconds(1));
        assert_eq!(second, ClaimOutcome::CoolingDown { remaining: Duration::seconds(59) });
        assert!(ev.is_none());
        assert_eq!(a, before);
    }
}
