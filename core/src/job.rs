//! Job lifecycle: Unemployed → Employed via a job offer, then work
//! shifts behind a cooldown until a missed cycle gets the worker fired.
//!
//! Work cycle: when `WorkRule::cycle_secs` is set and a shift is attempted
//! at least one cycle after the previous shift of the current job,
//! `work_days` drops to 0 and the firing rule applies. Hiring clears
//! `last_work`, so the first shift of a job is always paid. With no cycle configured `work_days` stays at 1
//! after hiring and firing never happens.

use crate::{
    account::Account,
    claim::{cooldown_remaining, duration_secs, ClaimKind},
    config::WorkRule,
    error::BotResult,
    event::LedgerEvent,
    ledger::Ledger,
    rng::GameRng,
    types::{Coins, UserId},
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A random slate of jobs put in front of one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOffer {
    pub offer_id:   Uuid,
    pub user_id:    UserId,
    pub candidates: Vec<String>,
}

impl JobOffer {
    /// The canonical job name matching a reply, ignoring case and
    /// surrounding whitespace.
    pub fn matching(&self, reply: &str) -> Option<&str> {
        let reply = reply.trim();
        self.candidates
            .iter()
            .find(|c| c.eq_ignore_ascii_case(reply))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum HireOutcome {
    Hired { job: String },
    /// Someone else's request employed this account first.
    AlreadyEmployed { job: String },
    /// The reply did not name one of the offered jobs.
    NotOffered { reply: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WorkOutcome {
    /// No job yet: the caller should run a job selection.
    NeedsJob,
    CoolingDown {
        #[serde(with = "duration_secs")]
        remaining: Duration,
    },
    Fired {
        job:     String,
        penalty: Coins,
        wallet:  Coins,
    },
    Paid {
        job:      String,
        earnings: Coins,
        wallet:   Coins,
    },
}

/// Clear `work_days` when the last shift is a full cycle old.
fn roll_work_cycle(account: &mut Account, rule: &WorkRule, now: DateTime<Utc>) {
    if let (Some(cycle), Some(last)) = (rule.cycle(), account.last_work) {
        if now >= last + cycle {
            account.work_days = 0;
        }
    }
}

impl Ledger {
    /// Sample a slate of distinct jobs from the catalog.
    pub fn offer_jobs(&self, user_id: UserId, rng: &mut GameRng) -> JobOffer {
        JobOffer {
            offer_id: Uuid::new_v4(),
            user_id,
            candidates: rng.sample(&self.config.jobs, self.config.work.offer_size),
        }
    }

    /// Employ the user in the job their reply names.
    pub fn hire(
        &self,
        offer: &JobOffer,
        reply: &str,
        now: DateTime<Utc>,
    ) -> BotResult<HireOutcome> {
        let Some(job) = offer.matching(reply).map(str::to_owned) else {
            return Ok(HireOutcome::NotOffered { reply: reply.trim().to_owned() });
        };
        let user_id = offer.user_id;
        self.modify(user_id, now, |account| {
            if let Some(current) = &account.job {
                return Ok((HireOutcome::AlreadyEmployed { job: current.clone() }, None));
            }
            // A new job starts a new cycle.
            account.job = Some(job.clone());
            account.work_days = 1;
            account.last_work = None;
            log::info!("job: user {user_id} hired as {job} (offer {})", offer.offer_id);
            let event = LedgerEvent::Hired { user_id, job: job.clone() };
            Ok((HireOutcome::Hired { job }, Some(event)))
        })
    }

    /// Attempt one work shift.
    pub fn work_shift(
        &self,
        user_id: UserId,
        rng: &mut GameRng,
        now: DateTime<Utc>,
    ) -> BotResult<WorkOutcome> {
        let rule = self.config.work.clone();
        self.modify(user_id, now, |account| {
            let Some(job) = account.job.clone() else {
                return Ok((WorkOutcome::NeedsJob, None));
            };
            if let Some(remaining) =
                cooldown_remaining(ClaimKind::Work.last_claimed(account), rule.cooldown(), now)
            {
                return Ok((WorkOutcome::CoolingDown { remaining }, None));
            }

            roll_work_cycle(account, &rule, now);
            if account.work_days < 1 {
                let penalty = rule.fire_penalty.min(account.wallet);
                account.wallet -= penalty;
                account.job = None;
                account.work_days = 0;
                log::info!("job: user {user_id} fired from {job}, penalty {penalty}");
                let event = LedgerEvent::Fired { user_id, job: job.clone(), penalty };
                return Ok((
                    WorkOutcome::Fired { job, penalty, wallet: account.wallet },
                    Some(event),
                ));
            }

            let earnings = rng.range_inclusive(rule.earnings_min, rule.earnings_max);
            account.wallet += earnings;
            account.last_work = Some(now);
            account.work_days = 1;
            let event = LedgerEvent::Worked { user_id, job: job.clone(), earnings };
            Ok((WorkOutcome::Paid { job, earnings, wallet: account.wallet }, Some(event)))
        })
    }
}
