//! Turning a mention into an intent.
//!
//! Classification is substring based, in a fixed order:
//!   1. gem admin commands, matched on the first word
//!   2. novelty commands: say, help, 8ball
//!   3. economy commands: wallet, bank, daily, monthly, deposit,
//!      withdraw, share, beg, work, leaderboard
//! The first match wins. Matching is ASCII case-insensitive; arguments
//! are sliced from the message text so their case survives.

use crate::types::{ChannelId, Coins, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    SetGemChannel { channel: Option<ChannelId> },
    GetGemChannel,
    SetGemReaction { emoji: String },

    Say { text: String },
    Help,
    EightBall { question: String },

    Wallet,
    Bank { target: Option<UserId> },
    Daily,
    Monthly,
    /// None when the amount is missing, not a number, or not positive.
    Deposit { amount: Option<Coins> },
    Withdraw { amount: Option<Coins> },
    Share { amount: Option<Coins>, recipient: Option<UserId> },
    Beg,
    Work,
    Leaderboard,

    Unknown,
}

const ECONOMY_KEYWORDS: [&str; 10] = [
    "wallet", "bank", "daily", "monthly", "deposit", "withdraw", "share", "beg", "work",
    "leaderboard",
];

/// What the classifier needs to know about a message.
pub struct MessageText<'a> {
    pub content:          &'a str,
    pub bot_id:           UserId,
    pub mentions:         &'a [UserId],
    pub channel_mentions: &'a [ChannelId],
}

impl MessageText<'_> {
    /// The first mentioned user that is not the bot.
    fn other_user(&self) -> Option<UserId> {
        self.mentions.iter().copied().find(|&u| u != self.bot_id)
    }
}

pub fn classify(msg: &MessageText<'_>) -> Intent {
    let text = strip_mentions(msg.content);
    let lower = text.to_ascii_lowercase();

    match lower.split_whitespace().next() {
        Some("setgem") => {
            return Intent::SetGemChannel { channel: msg.channel_mentions.first().copied() }
        }
        Some("getgemchannel") => return Intent::GetGemChannel,
        Some("setgemreaction") => {
            return Intent::SetGemReaction { emoji: after(&text, &lower, "setgemreaction") }
        }
        _ => {}
    }

    if lower.contains("say") {
        return Intent::Say { text: after(&text, &lower, "say") };
    }
    if lower.contains("help") {
        return Intent::Help;
    }
    if lower.contains("8ball") {
        return Intent::EightBall { question: after(&text, &lower, "8ball") };
    }

    let Some(keyword) = ECONOMY_KEYWORDS.iter().find(|k| lower.contains(*k)) else {
        return Intent::Unknown;
    };
    match *keyword {
        "wallet" => Intent::Wallet,
        "bank" => Intent::Bank { target: msg.other_user() },
        "daily" => Intent::Daily,
        "monthly" => Intent::Monthly,
        "deposit" => Intent::Deposit { amount: parse_amount(&after(&text, &lower, "deposit")) },
        "withdraw" => Intent::Withdraw { amount: parse_amount(&after(&text, &lower, "withdraw")) },
        "share" => Intent::Share {
            amount: parse_amount(&after(&text, &lower, "share")),
            recipient: msg.other_user(),
        },
        "beg" => Intent::Beg,
        "work" => Intent::Work,
        _ => Intent::Leaderboard,
    }
}

/// Drop `<@id>`, `<@!id>` and `<#id>` tokens and normalise spacing.
pub fn strip_mentions(content: &str) -> String {
    content
        .split_whitespace()
        .filter(|tok| !is_mention_markup(tok))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_mention_markup(tok: &str) -> bool {
    let Some(inner) = tok.strip_prefix('<').and_then(|t| t.strip_suffix('>')) else {
        return false;
    };
    let id = inner
        .strip_prefix("@!")
        .or_else(|| inner.strip_prefix('@'))
        .or_else(|| inner.strip_prefix('#'));
    matches!(id, Some(id) if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()))
}

/// Text following the first occurrence of `keyword`, trimmed.
/// `lower` must be `text.to_ascii_lowercase()` so byte offsets agree.
fn after(text: &str, lower: &str, keyword: &str) -> String {
    match lower.find(keyword) {
        Some(i) => text[i + keyword.len()..].trim().to_string(),
        None => String::new(),
    }
}

/// First word as a strictly positive integer.
pub fn parse_amount(args: &str) -> Option<Coins> {
    args.split_whitespace()
        .next()
        .and_then(|w| w.parse::<Coins>().ok())
        .filter(|&n| n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOT: UserId = 999;

    fn classify_str(content: &str, mentions: &[UserId]) -> Intent {
        classify(&MessageText {
            content,
            bot_id: BOT,
            mentions,
            channel_mentions: &[],
        })
    }

    #[test]
    fn economy_keywords_in_order() {
        assert_eq!(classify_str("<@999> wallet", &[BOT]), Intent::Wallet);
        assert_eq!(classify_str("<@999> DAILY please", &[BOT]), Intent::Daily);
        assert_eq!(classify_str("<@999> monthly", &[BOT]), Intent::Monthly);
        assert_eq!(classify_str("<@999> beg", &[BOT]), Intent::Beg);
        assert_eq!(classify_str("<@999> work", &[BOT]), Intent::Work);
        assert_eq!(classify_str("<@999> leaderboard", &[BOT]), Intent::Leaderboard);
        // "wallet" is checked before "bank".
        assert_eq!(classify_str("<@999> bank wallet", &[BOT]), Intent::Wallet);
    }

    #[test]
    fn amounts_are_parsed_before_the_ledger() {
        assert_eq!(
            classify_str("<@!999> deposit 500", &[BOT]),
            Intent::Deposit { amount: Some(500) }
        );
        assert_eq!(
            classify_str("<@999> withdraw lots", &[BOT]),
            Intent::Withdraw { amount: None }
        );
        assert_eq!(
            classify_str("<@999> deposit -5", &[BOT]),
            Intent::Deposit { amount: None }
        );
        assert_eq!(classify_str("<@999> deposit", &[BOT]), Intent::Deposit { amount: None });
    }

    #[test]
    fn share_takes_amount_and_other_mention() {
        assert_eq!(
            classify_str("<@999> share 200 <@42>", &[BOT, 42]),
            Intent::Share { amount: Some(200), recipient: Some(42) }
        );
        assert_eq!(
            classify_str("<@999> share 200", &[BOT]),
            Intent::Share { amount: Some(200), recipient: None }
        );
    }

    #[test]
    fn bank_can_target_another_user() {
        assert_eq!(classify_str("<@999> bank <@7>", &[BOT, 7]), Intent::Bank { target: Some(7) });
        assert_eq!(classify_str("<@999> bank", &[BOT]), Intent::Bank { target: None });
    }

    #[test]
    fn novelty_commands_win_over_economy_words() {
        assert_eq!(
            classify_str("<@999> say I love my Work", &[BOT]),
            Intent::Say { text: "I love my Work".into() }
        );
        assert_eq!(
            classify_str("<@999> 8ball will I get rich from work?", &[BOT]),
            Intent::EightBall { question: "will I get rich from work?".into() }
        );
        assert_eq!(classify_str("<@999> help", &[BOT]), Intent::Help);
    }

    #[test]
    fn gem_commands_match_first_word_only() {
        let channels = [55];
        let intent = classify(&MessageText {
            content: "<@999> setgem <#55>",
            bot_id: BOT,
            mentions: &[BOT],
            channel_mentions: &channels,
        });
        assert_eq!(intent, Intent::SetGemChannel { channel: Some(55) });
        assert_eq!(classify_str("<@999> getgemchannel", &[BOT]), Intent::GetGemChannel);
        assert_eq!(
            classify_str("<@999> setgemreaction 🔥", &[BOT]),
            Intent::SetGemReaction { emoji: "🔥".into() }
        );
    }

    #[test]
    fn unrelated_text_is_unknown() {
        assert_eq!(classify_str("<@999> hello there", &[BOT]), Intent::Unknown);
    }

    #[test]
    fn mention_markup_detection() {
        assert!(is_mention_markup("<@123>"));
        assert!(is_mention_markup("<@!123>"));
        assert!(is_mention_markup("<#123>"));
        assert!(!is_mention_markup("<@>"));
        assert!(!is_mention_markup("<b>"));
        assert!(!is_mention_markup("hello"));
    }
}
