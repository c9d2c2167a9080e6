//! bot-runner: headless line-oriented driver for the coinbot core.
//!
//! Reads one JSON platform event per line on stdin and writes one JSON
//! line per reply on stdout. A platform adapter (or a human with a
//! terminal) sits on the other side.
//!
//! Each message is handled on its own worker thread, so a user picking a
//! job never holds up anyone else. A message that answers a waiting job
//! selection goes to that selection instead of starting a new request.
//! Reactions and membership events are quick and run inline.
//!
//! Usage:
//!   bot-runner --bot-id 1000 --db bot.db --data-dir ./data
//!   bot-runner --bot-id 1000 --seed 12345

use anyhow::{Context, Result};
use coinbot_core::{
    clock::SystemClock,
    config::BotConfig,
    dispatch::{Conversation, Dispatcher, IncomingMessage, Reply},
    error::BotResult,
    gem::{GemDecision, ReactionEvent},
    store::BotStore,
    types::{ChannelId, MessageId, UserId},
};
use std::env;
use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

#[derive(Debug, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum InboundEvent {
    Message(IncomingMessage),
    Reaction(ReactionEvent),
    /// The adapter could not copy a message the bot asked it to archive.
    GemFailed { message_id: MessageId },
    MemberJoin { user_id: UserId },
    MemberLeave { user_id: UserId, nickname: Option<String> },
    Quit,
}

#[derive(serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Outbound<'a> {
    Reply { channel_id: ChannelId, reply: &'a Reply },
    Gem { decision: &'a GemDecision },
    GemReleased { message_id: MessageId, released: bool },
    Nickname { user_id: UserId, nickname: Option<&'a str> },
    NicknameReleased { user_id: UserId, nickname: Option<&'a str>, freed: bool },
    Error { error: String },
}

/// Shared line sink; one JSON object per line, whole lines only.
type Output = Arc<Mutex<Box<dyn Write + Send>>>;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let bot_id = parse_arg(&args, "--bot-id", 0u64);
    let db = string_arg(&args, "--db").unwrap_or("coinbot.db");
    let data_dir = string_arg(&args, "--data-dir").unwrap_or("./data");

    let config = BotConfig::load(data_dir)
        .with_context(|| format!("loading config from {data_dir}"))?;
    let seed = args
        .windows(2)
        .find(|w| w[0] == "--seed")
        .and_then(|w| w[1].parse().ok())
        .or(config.seed)
        .unwrap_or_else(wall_clock_seed);

    log::info!("bot-runner: bot_id={bot_id} db={db} data_dir={data_dir} seed={seed}");

    let store = BotStore::open(db)?;
    store.migrate()?;
    let dispatcher = Dispatcher::new(bot_id, Arc::new(store), config, seed, Box::new(SystemClock));

    let mut runner = Runner::new(Arc::new(dispatcher), Box::new(io::stdout()));
    for line in io::stdin().lock().lines() {
        let line = line.context("reading stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        if !runner.handle_line(&line)? {
            break;
        }
    }
    runner.finish();
    Ok(())
}

// ── Runner ─────────────────────────────────────────────────────────

struct Runner {
    dispatcher: Arc<Dispatcher>,
    waiters:    Arc<Waiters>,
    out:        Output,
    workers:    Vec<JoinHandle<()>>,
}

impl Runner {
    fn new(dispatcher: Arc<Dispatcher>, out: Box<dyn Write + Send>) -> Self {
        Self {
            dispatcher,
            waiters: Arc::new(Waiters::default()),
            out: Arc::new(Mutex::new(out)),
            workers: Vec::new(),
        }
    }

    /// Handle one input line. Returns false once the input asks to quit.
    fn handle_line(&mut self, line: &str) -> Result<bool> {
        match serde_json::from_str::<InboundEvent>(line) {
            Ok(event) => self.handle(event),
            Err(e) => {
                emit(&self.out, &Outbound::Error { error: e.to_string() })?;
                Ok(true)
            }
        }
    }

    fn handle(&mut self, event: InboundEvent) -> Result<bool> {
        let d = Arc::clone(&self.dispatcher);
        let out = &Arc::clone(&self.out);
        let result = match event {
            InboundEvent::Quit => return Ok(false),
            InboundEvent::Message(msg) => {
                if !self.waiters.answer(&msg) {
                    self.spawn_worker(msg);
                }
                Ok(())
            }
            InboundEvent::Reaction(reaction) => d
                .handle_reaction(&reaction)
                .and_then(|decision| write_json(out, &Outbound::Gem { decision: &decision })),
            InboundEvent::GemFailed { message_id } => d
                .handle_gem_failed(message_id)
                .and_then(|released| {
                    write_json(out, &Outbound::GemReleased { message_id, released })
                }),
            InboundEvent::MemberJoin { user_id } => d
                .handle_member_join(user_id)
                .and_then(|nick| {
                    write_json(out, &Outbound::Nickname { user_id, nickname: nick.as_deref() })
                }),
            InboundEvent::MemberLeave { user_id, nickname } => d
                .handle_member_leave(user_id, nickname.as_deref())
                .and_then(|freed| {
                    write_json(
                        out,
                        &Outbound::NicknameReleased { user_id, nickname: nickname.as_deref(), freed },
                    )
                }),
        };

        // A failed request is reported and the loop carries on.
        if let Err(e) = result {
            log::error!("bot-runner: request failed: {e}");
            emit(out, &Outbound::Error { error: e.to_string() })?;
        }
        Ok(true)
    }

    fn spawn_worker(&mut self, msg: IncomingMessage) {
        self.workers.retain(|w| !w.is_finished());
        let dispatcher = Arc::clone(&self.dispatcher);
        let mut conv = StdioConversation {
            channel_id: msg.channel_id,
            waiters: Arc::clone(&self.waiters),
            out: Arc::clone(&self.out),
        };
        self.workers.push(thread::spawn(move || {
            if let Err(e) = dispatcher.handle_message(&msg, &mut conv) {
                log::error!("bot-runner: message {} failed: {e}", msg.message_id);
                if let Err(e) = write_json(&conv.out, &Outbound::Error { error: e.to_string() }) {
                    log::error!("bot-runner: cannot report failure: {e}");
                }
            }
        }));
    }

    /// Wait for every in-flight message to finish.
    fn finish(self) {
        for worker in self.workers {
            if worker.join().is_err() {
                log::error!("bot-runner: worker panicked");
            }
        }
    }
}

// ── Job selections ─────────────────────────────────────────────────

/// Job selections waiting for their user's answer.
#[derive(Default)]
struct Waiters {
    next_id: AtomicU64,
    pending: Mutex<Vec<PendingChoice>>,
}

struct PendingChoice {
    id:         u64,
    user:       UserId,
    channel:    ChannelId,
    candidates: Vec<String>,
    tx:         Sender<String>,
}

impl Waiters {
    fn lock(&self) -> MutexGuard<'_, Vec<PendingChoice>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn register(
        &self,
        user: UserId,
        channel: ChannelId,
        candidates: &[String],
    ) -> (u64, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock().push(PendingChoice {
            id,
            user,
            channel,
            candidates: candidates.to_vec(),
            tx,
        });
        (id, rx)
    }

    fn cancel(&self, id: u64) {
        self.lock().retain(|p| p.id != id);
    }

    /// Hand `msg` to the oldest selection it answers. False when no
    /// selection is waiting for it.
    fn answer(&self, msg: &IncomingMessage) -> bool {
        let text = msg.content.trim();
        let mut pending = self.lock();
        let Some(i) = pending.iter().position(|p| {
            p.user == msg.author
                && p.channel == msg.channel_id
                && p.candidates.iter().any(|c| c.eq_ignore_ascii_case(text))
        }) else {
            return false;
        };
        let choice = pending.remove(i);
        choice.tx.send(msg.content.clone()).is_ok()
    }
}

struct StdioConversation {
    channel_id: ChannelId,
    waiters:    Arc<Waiters>,
    out:        Output,
}

impl Conversation for StdioConversation {
    fn send(&mut self, reply: Reply) -> BotResult<()> {
        write_json(&self.out, &Outbound::Reply { channel_id: self.channel_id, reply: &reply })
    }

    fn wait_for_choice(
        &mut self,
        user: UserId,
        channel: ChannelId,
        candidates: &[String],
        timeout: Duration,
    ) -> Option<String> {
        let (id, rx) = self.waiters.register(user, channel, candidates);
        let choice = rx.recv_timeout(timeout).ok();
        self.waiters.cancel(id);
        // An answer may land between the timeout and the cancel.
        choice.or_else(|| rx.try_recv().ok())
    }
}

// ── Output ─────────────────────────────────────────────────────────

fn write_json(out: &Output, value: &Outbound<'_>) -> BotResult<()> {
    let line = serde_json::to_string(value)?;
    let mut out = out.lock().unwrap_or_else(|e| e.into_inner());
    writeln!(out, "{line}").and_then(|_| out.flush()).map_err(anyhow::Error::from)?;
    Ok(())
}

fn emit(out: &Output, value: &Outbound<'_>) -> Result<()> {
    write_json(out, value).map_err(anyhow::Error::from)
}

// ── Args ───────────────────────────────────────────────────────────

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

fn wall_clock_seed() -> u64 {
    chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default() as u64
}
