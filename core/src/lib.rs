//! coinbot core: the economy ledger, gem archive, nickname pool and the
//! dispatcher that routes chat mentions to them.

pub mod account;
pub mod banking;
pub mod beg;
pub mod claim;
pub mod clock;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod gem;
pub mod intent;
pub mod job;
pub mod leaderboard;
pub mod ledger;
pub mod nickname;
pub mod rng;
pub mod store;
pub mod types;
