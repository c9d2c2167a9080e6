//! The dispatcher — one platform event in, one feature call, replies out.
//!
//! RULES:
//!   - The clock is read once per event, and once more after a job
//!     selection wait.
//!   - Replies are data. Turning them into embeds is the platform layer's job.
//!   - The only suspension point is the job selection wait, bounded by
//!     `WorkRule::selection_timeout`.

use crate::{
    banking::{MoveOutcome, ShareOutcome},
    beg::BegOutcome,
    claim::{ClaimKind, ClaimOutcome},
    clock::Clock,
    config::BotConfig,
    error::BotResult,
    gem::{GemArchive, GemDecision, ReactionEvent},
    intent::{classify, Intent, MessageText},
    job::{HireOutcome, WorkOutcome},
    leaderboard::LeaderboardEntry,
    ledger::Ledger,
    nickname::NicknamePool,
    rng::{GameRng, RngBank, RngSlot, RngStreams},
    store::BotStore,
    types::{ChannelId, Coins, MessageId, UserId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub message_id: MessageId,
    pub channel_id: ChannelId,
    pub author:     UserId,
    #[serde(default)]
    pub author_is_bot: bool,
    /// Whether the author may manage channels (needed for `setgem`).
    #[serde(default)]
    pub author_can_manage_channels: bool,
    pub content:    String,
    #[serde(default)]
    pub mentions:   Vec<UserId>,
    #[serde(default)]
    pub channel_mentions: Vec<ChannelId>,
}

/// The platform side of one exchange with a user.
pub trait Conversation {
    fn send(&mut self, reply: Reply) -> BotResult<()>;

    /// Block until `user` posts one of `candidates` in `channel`, or until
    /// `timeout` passes. Returns the raw reply text, None on timeout.
    fn wait_for_choice(
        &mut self,
        user: UserId,
        channel: ChannelId,
        candidates: &[String],
        timeout: Duration,
    ) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpEntry {
    pub usage:       String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reply", rename_all = "snake_case")]
pub enum Reply {
    Wallet { user_id: UserId, wallet: Coins },
    Balances { user_id: UserId, wallet: Coins, bank: Coins, own: bool },
    Claim { kind: ClaimKind, outcome: ClaimOutcome },
    Deposit { outcome: MoveOutcome },
    Withdraw { outcome: MoveOutcome },
    Share { recipient: UserId, outcome: ShareOutcome },
    MissingRecipient,
    InvalidAmount { command: String },
    Beg { outcome: BegOutcome },
    JobOffer { candidates: Vec<String>, timeout_secs: u64 },
    JobSelectionTimedOut,
    Hire { outcome: HireOutcome },
    Work { outcome: WorkOutcome },
    Leaderboard { entries: Vec<LeaderboardEntry> },

    GemChannelSet { channel_id: ChannelId },
    GemChannelRejected,
    GemChannel { channel_id: Option<ChannelId> },
    GemEmojiSet { emoji: String },
    GemEmojiMissing,

    Say { text: String, delete_message: MessageId },
    SayMissing,
    EightBall { answer: String },
    EightBallMissing,
    Help { commands: Vec<HelpEntry> },
}

pub struct Dispatcher {
    bot_id:     UserId,
    ledger:     Ledger,
    gems:       GemArchive,
    nicknames:  NicknamePool,
    eight_ball: Vec<String>,
    clock:      Box<dyn Clock>,
    rngs:       Mutex<RngStreams>,
}

impl Dispatcher {
    /// Wire every feature to one store. `master_seed` feeds all RNG streams.
    pub fn new(
        bot_id: UserId,
        store: Arc<BotStore>,
        config: BotConfig,
        master_seed: u64,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            bot_id,
            ledger: Ledger::new(Arc::clone(&store), config.economy),
            gems: GemArchive::new(Arc::clone(&store), config.gem),
            nicknames: NicknamePool::new(store, config.nickname),
            eight_ball: config.eight_ball,
            clock,
            rngs: Mutex::new(RngBank::new(master_seed).streams()),
        }
    }

    /// In-memory dispatcher with the test configuration and seed.
    pub fn build_test(bot_id: UserId, clock: Box<dyn Clock>) -> BotResult<Self> {
        let store = BotStore::in_memory()?;
        store.migrate()?;
        let config = BotConfig::default_test();
        let seed = config.seed.unwrap_or_default();
        Ok(Self::new(bot_id, Arc::new(store), config, seed, clock))
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn gems(&self) -> &GemArchive {
        &self.gems
    }

    /// A private RNG forked from one shared stream. The streams are locked
    /// only for the fork, never across a store transaction.
    fn draw(&self, slot: RngSlot) -> GameRng {
        // A panic mid-draw leaves the stream usable; keep going.
        let mut streams = self.rngs.lock().unwrap_or_else(|e| e.into_inner());
        streams.stream(slot).fork()
    }

    // ── Messages ──────────────────────────────────────────────

    pub fn handle_message(
        &self,
        msg: &IncomingMessage,
        conv: &mut dyn Conversation,
    ) -> BotResult<()> {
        if msg.author_is_bot || !msg.mentions.contains(&self.bot_id) {
            return Ok(());
        }
        let intent = classify(&MessageText {
            content: &msg.content,
            bot_id: self.bot_id,
            mentions: &msg.mentions,
            channel_mentions: &msg.channel_mentions,
        });
        log::debug!("dispatch: {} in {} -> {intent:?}", msg.author, msg.channel_id);
        self.run(intent, msg, conv)
    }

    fn run(&self, intent: Intent, msg: &IncomingMessage, conv: &mut dyn Conversation) -> BotResult<()> {
        let now = self.clock.now();
        let user = msg.author;

        let reply = match intent {
            Intent::Unknown => return Ok(()),

            Intent::SetGemChannel { channel } => match channel {
                Some(channel_id) if msg.author_can_manage_channels => {
                    self.gems.set_channel(channel_id)?;
                    Reply::GemChannelSet { channel_id }
                }
                _ => {
                    log::warn!("gem: {user} tried to set the gem channel without a channel or permission");
                    Reply::GemChannelRejected
                }
            },
            Intent::GetGemChannel => Reply::GemChannel { channel_id: self.gems.settings()?.channel_id },
            Intent::SetGemReaction { emoji } => {
                if self.gems.set_emoji(&emoji)? {
                    Reply::GemEmojiSet { emoji: emoji.trim().to_string() }
                } else {
                    Reply::GemEmojiMissing
                }
            }

            Intent::Say { text } if text.is_empty() => Reply::SayMissing,
            Intent::Say { text } => Reply::Say { text, delete_message: msg.message_id },
            Intent::Help => Reply::Help { commands: help_entries() },
            Intent::EightBall { question } if question.is_empty() => Reply::EightBallMissing,
            Intent::EightBall { .. } => {
                let answer = self.draw(RngSlot::EightBall).pick(&self.eight_ball).cloned();
                match answer {
                    Some(answer) => Reply::EightBall { answer },
                    None => Reply::EightBallMissing,
                }
            }

            Intent::Wallet => {
                let account = self.ledger.get_account(user)?;
                Reply::Wallet { user_id: user, wallet: account.wallet }
            }
            Intent::Bank { target } => {
                let target = target.unwrap_or(user);
                let account = self.ledger.get_account(target)?;
                Reply::Balances {
                    user_id: target,
                    wallet: account.wallet,
                    bank: account.bank,
                    own: target == user,
                }
            }
            Intent::Daily => Reply::Claim {
                kind: ClaimKind::Daily,
                outcome: self.ledger.claim_daily(user, now)?,
            },
            Intent::Monthly => Reply::Claim {
                kind: ClaimKind::Monthly,
                outcome: self.ledger.claim_monthly(user, now)?,
            },
            Intent::Deposit { amount: None } => Reply::InvalidAmount { command: "deposit".into() },
            Intent::Deposit { amount: Some(amount) } => Reply::Deposit {
                outcome: self.ledger.deposit(user, amount, now)?,
            },
            Intent::Withdraw { amount: None } => Reply::InvalidAmount { command: "withdraw".into() },
            Intent::Withdraw { amount: Some(amount) } => Reply::Withdraw {
                outcome: self.ledger.withdraw(user, amount, now)?,
            },
            Intent::Share { recipient: None, .. } => Reply::MissingRecipient,
            Intent::Share { amount: None, .. } => Reply::InvalidAmount { command: "share".into() },
            Intent::Share { amount: Some(amount), recipient: Some(recipient) } => Reply::Share {
                recipient,
                outcome: self.ledger.share(user, recipient, amount, now)?,
            },
            Intent::Beg => {
                let outcome = self.ledger.beg(user, &mut self.draw(RngSlot::Beg), now)?;
                Reply::Beg { outcome }
            }
            Intent::Work => return self.work(msg, now, conv),
            Intent::Leaderboard => Reply::Leaderboard { entries: self.ledger.leaderboard()? },
        };
        conv.send(reply)
    }

    /// Work a shift, or run a job selection for the unemployed.
    fn work(
        &self,
        msg: &IncomingMessage,
        now: DateTime<Utc>,
        conv: &mut dyn Conversation,
    ) -> BotResult<()> {
        let user = msg.author;
        let outcome = self.ledger.work_shift(user, &mut self.draw(RngSlot::Work), now)?;
        if outcome != WorkOutcome::NeedsJob {
            return conv.send(Reply::Work { outcome });
        }

        let offer = self.ledger.offer_jobs(user, &mut self.draw(RngSlot::JobBoard));
        let timeout = self.ledger.config().work.selection_timeout();
        conv.send(Reply::JobOffer {
            candidates: offer.candidates.clone(),
            timeout_secs: timeout.as_secs(),
        })?;

        let Some(choice) = conv.wait_for_choice(user, msg.channel_id, &offer.candidates, timeout)
        else {
            log::debug!("job: offer {} to {user} timed out", offer.offer_id);
            return conv.send(Reply::JobSelectionTimedOut);
        };
        let outcome = self.ledger.hire(&offer, &choice, self.clock.now())?;
        conv.send(Reply::Hire { outcome })
    }

    // ── Reactions and membership ──────────────────────────────

    pub fn handle_reaction(&self, event: &ReactionEvent) -> BotResult<GemDecision> {
        self.gems.on_reaction(event, self.clock.now())
    }

    /// The platform could not copy an archived message; let it be gemmed again.
    pub fn handle_gem_failed(&self, message_id: MessageId) -> BotResult<bool> {
        self.gems.release(message_id)
    }

    /// The nickname to give a new member, if any number is free.
    pub fn handle_member_join(&self, user: UserId) -> BotResult<Option<String>> {
        self.nicknames.assign(user, &mut self.draw(RngSlot::Nickname), self.clock.now())
    }

    /// Free the number a departing member carried.
    pub fn handle_member_leave(&self, user: UserId, nickname: Option<&str>) -> BotResult<bool> {
        match nickname {
            Some(nick) => self.nicknames.release(user, nick),
            None => Ok(false),
        }
    }
}

fn help_entries() -> Vec<HelpEntry> {
    [
        ("@bot say <message>", "Make the bot repeat your message."),
        ("@bot 8ball <question>", "Ask the magic 8-ball a question."),
        ("@bot wallet", "Check your wallet balance."),
        ("@bot bank [@user]", "View bank and wallet balances."),
        ("@bot daily", "Claim your daily coins (10,000)."),
        ("@bot monthly", "Claim your monthly coins (100,000)."),
        ("@bot deposit <amount>", "Move coins from your wallet into your bank."),
        ("@bot withdraw <amount>", "Move coins from your bank into your wallet."),
        ("@bot share <amount> @user", "Give coins from your wallet to another user."),
        ("@bot beg", "Beg for coins. It might go badly."),
        ("@bot work", "Choose a job, then work a shift every 16 hours."),
        ("@bot leaderboard", "Show the five richest users."),
        ("@bot setgem #channel", "Set the channel gem messages are copied to."),
        ("@bot getgemchannel", "Show the current gem channel."),
        ("@bot setgemreaction <emoji>", "Set the emoji that gems a message."),
    ]
    .into_iter()
    .map(|(usage, description)| HelpEntry {
        usage: usage.to_string(),
        description: description.to_string(),
    })
    .collect()
}
