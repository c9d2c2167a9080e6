//! Shared primitive types used across the entire bot.

/// A platform user identifier (snowflake).
pub type UserId = u64;

/// A platform channel identifier.
pub type ChannelId = u64;

/// A platform message identifier.
pub type MessageId = u64;

/// An amount of in-game currency. Balances are never negative.
pub type Coins = i64;
