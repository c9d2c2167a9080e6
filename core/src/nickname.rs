//! Number nicknames for new members ("007", "512", ...).
//!
//! Each joining member gets a random number nobody else holds; the
//! number returns to the pool when a member carrying it leaves.

use crate::{
    config::NicknameConfig,
    error::BotResult,
    rng::GameRng,
    store::{insert_number, used_numbers, BotStore},
    types::UserId,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub struct NicknamePool {
    store:  Arc<BotStore>,
    config: NicknameConfig,
}

impl NicknamePool {
    pub fn new(store: Arc<BotStore>, config: NicknameConfig) -> Self {
        Self { store, config }
    }

    pub fn format(&self, number: u32) -> String {
        format!("{number:0width$}", width = self.config.width)
    }

    /// Reserve a free number for `user_id`. None when every number is taken.
    pub fn assign(
        &self,
        user_id: UserId,
        rng: &mut GameRng,
        now: DateTime<Utc>,
    ) -> BotResult<Option<String>> {
        let pool_size = self.config.pool_size;
        let number = self.store.transaction(|tx| {
            let used = used_numbers(tx)?;
            let free: Vec<u32> = (0..pool_size).filter(|n| !used.contains(n)).collect();
            let Some(&number) = rng.pick(&free) else {
                return Ok(None);
            };
            insert_number(tx, number, user_id, now)?;
            Ok(Some(number))
        })?;

        match number {
            Some(n) => {
                let nick = self.format(n);
                log::info!("nickname: assigned {nick} to {user_id}");
                Ok(Some(nick))
            }
            None => {
                log::warn!("nickname: pool of {pool_size} exhausted, {user_id} keeps their name");
                Ok(None)
            }
        }
    }

    /// Return a departing member's number to the pool. Nicknames that are
    /// not all digits, or numbers held by someone else, are ignored.
    /// Returns true if a number was freed.
    pub fn release(&self, user_id: UserId, nickname: &str) -> BotResult<bool> {
        if nickname.is_empty() || !nickname.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(false);
        }
        let Ok(number) = nickname.parse::<u32>() else {
            return Ok(false);
        };
        let freed = self.store.delete_number(number, user_id)?;
        if freed {
            log::info!("nickname: released {nickname} from {user_id}");
        }
        Ok(freed)
    }
}
