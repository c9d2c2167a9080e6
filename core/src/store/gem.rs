use super::BotStore;
use crate::{
    error::BotResult,
    types::{ChannelId, MessageId},
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GemSettingsRow {
    pub channel_id: Option<ChannelId>,
    pub emoji:      String,
}

pub(crate) fn fetch_gem_settings(conn: &Connection) -> BotResult<Option<GemSettingsRow>> {
    let row = conn
        .query_row(
            "SELECT channel_id, emoji FROM gem_settings WHERE id = 1",
            [],
            |r| {
                Ok(GemSettingsRow {
                    channel_id: r.get::<_, Option<i64>>(0)?.map(|c| c as ChannelId),
                    emoji:      r.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(row)
}

impl BotStore {
    // ── Gem archive ───────────────────────────────────────────────

    pub(crate) fn gem_settings(&self) -> BotResult<Option<GemSettingsRow>> {
        self.read(fetch_gem_settings)
    }

    /// Set the gem channel. `default_emoji` is only used when no settings row exists yet.
    pub(crate) fn save_gem_channel(&self, channel_id: ChannelId, default_emoji: &str) -> BotResult<()> {
        self.transaction(|tx| {
            tx.execute(
                "INSERT INTO gem_settings (id, channel_id, emoji) VALUES (1, ?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET channel_id = excluded.channel_id",
                params![channel_id as i64, default_emoji],
            )?;
            Ok(())
        })
    }

    pub(crate) fn save_gem_emoji(&self, emoji: &str) -> BotResult<()> {
        self.transaction(|tx| {
            tx.execute(
                "INSERT INTO gem_settings (id, channel_id, emoji) VALUES (1, NULL, ?1)
                 ON CONFLICT(id) DO UPDATE SET emoji = excluded.emoji",
                params![emoji],
            )?;
            Ok(())
        })
    }

    pub fn is_gemmed(&self, message_id: MessageId) -> BotResult<bool> {
        self.read(|conn| {
            let n: i64 = conn.query_row(
                "SELECT COUNT(*) FROM gemmed_message WHERE message_id = ?1",
                params![message_id as i64],
                |r| r.get(0),
            )?;
            Ok(n > 0)
        })
    }

    /// Forget an archived message. Returns false when it was not archived.
    pub(crate) fn delete_gemmed(&self, message_id: MessageId) -> BotResult<bool> {
        self.transaction(|tx| {
            let n = tx.execute(
                "DELETE FROM gemmed_message WHERE message_id = ?1",
                params![message_id as i64],
            )?;
            Ok(n == 1)
        })
    }

    pub fn gemmed_count(&self) -> BotResult<i64> {
        self.read(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM gemmed_message", [], |r| r.get(0))?;
            Ok(n)
        })
    }
}

/// Record a message as archived. Returns false when it already was.
pub(crate) fn insert_gemmed(
    conn: &Connection,
    message_id: MessageId,
    source_channel_id: ChannelId,
    gem_channel_id: ChannelId,
    at: DateTime<Utc>,
) -> BotResult<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO gemmed_message (message_id, source_channel_id, gem_channel_id, archived_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![message_id as i64, source_channel_id as i64, gem_channel_id as i64, at],
    )?;
    Ok(inserted == 1)
}
