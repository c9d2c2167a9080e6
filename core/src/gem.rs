//! Gem archive — copy a message into a designated channel when someone
//! reacts to it with the gem emoji.
//!
//! A message is archived at most once. An `Archive` decision claims the
//! message; the platform layer copies it and, if the copy fails, hands it
//! back with `release` so a later reaction can try again. The archived set
//! and the settings are persisted, so a restart neither forgets the gem
//! channel nor re-posts old gems.

use crate::{
    config::GemConfig,
    error::BotResult,
    store::{fetch_gem_settings, insert_gemmed, BotStore},
    types::{ChannelId, MessageId, UserId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A reaction added to some message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionEvent {
    pub message_id:     MessageId,
    pub channel_id:     ChannelId,
    pub message_author: UserId,
    pub emoji:          String,
    pub reactor:        UserId,
    #[serde(default)]
    pub reactor_is_bot: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GemDecision {
    /// Copy the message into `gem_channel`. It is marked archived until
    /// released.
    Archive {
        message_id:  MessageId,
        gem_channel: ChannelId,
    },
    Ignore {
        reason: IgnoreReason,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    OtherEmoji,
    BotReactor,
    NoGemChannel,
    InGemChannel,
    AlreadyArchived,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GemSettings {
    pub channel_id: Option<ChannelId>,
    pub emoji:      String,
}

pub struct GemArchive {
    store:  Arc<BotStore>,
    config: GemConfig,
}

impl GemArchive {
    pub fn new(store: Arc<BotStore>, config: GemConfig) -> Self {
        Self { store, config }
    }

    pub fn settings(&self) -> BotResult<GemSettings> {
        Ok(match self.store.gem_settings()? {
            Some(row) => GemSettings { channel_id: row.channel_id, emoji: row.emoji },
            None => GemSettings { channel_id: None, emoji: self.config.default_emoji.clone() },
        })
    }

    pub fn set_channel(&self, channel_id: ChannelId) -> BotResult<()> {
        self.store.save_gem_channel(channel_id, &self.config.default_emoji)?;
        log::info!("gem: channel set to {channel_id}");
        Ok(())
    }

    /// Returns false (and changes nothing) for a blank emoji.
    pub fn set_emoji(&self, emoji: &str) -> BotResult<bool> {
        let emoji = emoji.trim();
        if emoji.is_empty() {
            return Ok(false);
        }
        self.store.save_gem_emoji(emoji)?;
        log::info!("gem: reaction emoji set to {emoji}");
        Ok(true)
    }

    /// Decide whether a reaction archives its message, and claim the
    /// message if so. Concurrent reactions on one message archive it once.
    pub fn on_reaction(&self, event: &ReactionEvent, now: DateTime<Utc>) -> BotResult<GemDecision> {
        let default_emoji = self.config.default_emoji.clone();
        let decision = self.store.transaction(|tx| {
            let settings = fetch_gem_settings(tx)?;
            let emoji = settings.as_ref().map_or(default_emoji.as_str(), |s| s.emoji.as_str());
            let ignore = |reason: IgnoreReason| -> BotResult<GemDecision> {
                Ok(GemDecision::Ignore { reason })
            };

            if event.emoji != emoji {
                return ignore(IgnoreReason::OtherEmoji);
            }
            if event.reactor_is_bot {
                return ignore(IgnoreReason::BotReactor);
            }
            let Some(gem_channel) = settings.as_ref().and_then(|s| s.channel_id) else {
                return ignore(IgnoreReason::NoGemChannel);
            };
            if event.channel_id == gem_channel {
                return ignore(IgnoreReason::InGemChannel);
            }
            if !insert_gemmed(tx, event.message_id, event.channel_id, gem_channel, now)? {
                return ignore(IgnoreReason::AlreadyArchived);
            }
            Ok(GemDecision::Archive { message_id: event.message_id, gem_channel })
        })?;

        match &decision {
            GemDecision::Archive { message_id, gem_channel } => {
                log::info!("gem: archiving message {message_id} into {gem_channel}");
            }
            GemDecision::Ignore { reason } => {
                log::debug!("gem: ignoring reaction on {}: {reason:?}", event.message_id);
            }
        }
        Ok(decision)
    }

    /// Undo an `Archive` whose copy never reached the gem channel.
    /// Returns false when the message was not marked archived.
    pub fn release(&self, message_id: MessageId) -> BotResult<bool> {
        let released = self.store.delete_gemmed(message_id)?;
        if released {
            log::warn!("gem: copy of message {message_id} failed, released for retry");
        }
        Ok(released)
    }
}
