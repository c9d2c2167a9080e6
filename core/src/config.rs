use chrono::Duration;
use serde::{Deserialize, Serialize};

// ── Economy rules ──────────────────────────────────────────────────

/// A flat reward behind a cooldown (daily, monthly).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRule {
    pub cooldown_secs: i64,
    pub reward: i64,
}

impl ClaimRule {
    pub fn cooldown(&self) -> Duration {
        Duration::seconds(self.cooldown_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BegRule {
    pub cooldown_secs: i64,
    pub success_chance: f64,
    pub gain_min: i64,
    pub gain_max: i64,
    /// Fraction of total wealth lost on failure, drawn from [min, max).
    pub loss_pct_min: f64,
    pub loss_pct_max: f64,
}

impl BegRule {
    pub fn cooldown(&self) -> Duration {
        Duration::seconds(self.cooldown_secs)
    }
}

impl Default for BegRule {
    fn default() -> Self {
        Self {
            cooldown_secs: 3_600,
            success_chance: 0.5,
            gain_min: 50,
            gain_max: 300,
            loss_pct_min: 0.01,
            loss_pct_max: 0.15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkRule {
    pub cooldown_secs: i64,
    pub earnings_min: i64,
    pub earnings_max: i64,
    pub fire_penalty: i64,
    /// A shift must follow the previous one within this window or the
    /// worker is fired on their next attempt. None keeps the legacy rule
    /// where work_days never resets and firing never triggers.
    pub cycle_secs: Option<i64>,
    /// How many jobs a selection offers.
    pub offer_size: usize,
    pub selection_timeout_secs: u64,
}

impl WorkRule {
    pub fn cooldown(&self) -> Duration {
        Duration::seconds(self.cooldown_secs)
    }

    pub fn cycle(&self) -> Option<Duration> {
        self.cycle_secs.map(Duration::seconds)
    }

    pub fn selection_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.selection_timeout_secs)
    }
}

impl Default for WorkRule {
    fn default() -> Self {
        Self {
            cooldown_secs: 16 * 3_600,
            earnings_min: 1_500,
            earnings_max: 5_000,
            fire_penalty: 5_000,
            cycle_secs: Some(48 * 3_600),
            offer_size: 10,
            selection_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    pub daily: ClaimRule,
    pub monthly: ClaimRule,
    pub beg: BegRule,
    pub work: WorkRule,
    pub leaderboard_size: usize,
    /// The fixed job catalog. Loaded from jobs.json.
    #[serde(skip)]
    pub jobs: Vec<String>,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            daily: ClaimRule { cooldown_secs: 24 * 3_600, reward: 10_000 },
            monthly: ClaimRule { cooldown_secs: 30 * 24 * 3_600, reward: 100_000 },
            beg: BegRule::default(),
            work: WorkRule::default(),
            leaderboard_size: 5,
            jobs: default_jobs(),
        }
    }
}

// ── Gem archive ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GemConfig {
    /// Emoji used until an admin sets another one.
    pub default_emoji: String,
}

impl Default for GemConfig {
    fn default() -> Self {
        Self { default_emoji: "💎".into() }
    }
}

// ── Nicknames ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NicknameConfig {
    /// Numbers are drawn from [0, pool_size).
    pub pool_size: u32,
    /// Zero-padded width of the rendered nickname.
    pub width: usize,
}

impl Default for NicknameConfig {
    fn default() -> Self {
        Self { pool_size: 1_000, width: 3 }
    }
}

// ── Top level ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Master RNG seed. None derives one from the wall clock at startup.
    pub seed: Option<u64>,
    pub economy: EconomyConfig,
    pub gem: GemConfig,
    pub nickname: NicknameConfig,
    pub eight_ball: Vec<String>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            seed: None,
            economy: EconomyConfig::default(),
            gem: GemConfig::default(),
            nickname: NicknameConfig::default(),
            eight_ball: default_eight_ball(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct JobsFile {
    jobs: Vec<String>,
}

impl BotConfig {
    /// Load from the data/ directory.
    /// In tests, use BotConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/bot.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let mut config: BotConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;

        let jobs_path = format!("{data_dir}/jobs.json");
        let jobs_content = std::fs::read_to_string(&jobs_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {jobs_path}: {e}"))?;
        let jobs_file: JobsFile = serde_json::from_str(&jobs_content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {jobs_path}: {e}"))?;
        config.economy.jobs = jobs_file.jobs;

        config.validate()?;
        Ok(config)
    }

    /// Built-in configuration with a fixed seed, for tests.
    pub fn default_test() -> Self {
        Self {
            seed: Some(42),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let e = &self.economy;
        if e.jobs.is_empty() {
            anyhow::bail!("job catalog is empty");
        }
        if e.beg.gain_min > e.beg.gain_max {
            anyhow::bail!("beg gain range {}..={} is empty", e.beg.gain_min, e.beg.gain_max);
        }
        if e.work.earnings_min > e.work.earnings_max {
            anyhow::bail!(
                "work earnings range {}..={} is empty",
                e.work.earnings_min,
                e.work.earnings_max
            );
        }
        let unit = 0.0..=1.0;
        if !unit.contains(&e.beg.loss_pct_min)
            || !unit.contains(&e.beg.loss_pct_max)
            || e.beg.loss_pct_min > e.beg.loss_pct_max
        {
            anyhow::bail!(
                "beg loss range [{}, {}) is invalid",
                e.beg.loss_pct_min,
                e.beg.loss_pct_max
            );
        }
        if !unit.contains(&e.beg.success_chance) {
            anyhow::bail!("beg success chance {} is not a probability", e.beg.success_chance);
        }
        for (name, secs) in [
            ("daily", e.daily.cooldown_secs),
            ("monthly", e.monthly.cooldown_secs),
            ("beg", e.beg.cooldown_secs),
            ("work", e.work.cooldown_secs),
        ] {
            if secs < 0 {
                anyhow::bail!("{name} cooldown {secs}s is negative");
            }
        }
        for (name, coins) in [
            ("daily reward", e.daily.reward),
            ("monthly reward", e.monthly.reward),
            ("beg gain", e.beg.gain_min),
            ("work earnings", e.work.earnings_min),
            ("fire penalty", e.work.fire_penalty),
        ] {
            if coins < 0 {
                anyhow::bail!("{name} {coins} is negative");
            }
        }
        if let Some(cycle) = e.work.cycle_secs {
            if cycle <= 0 {
                anyhow::bail!("work cycle {cycle}s must be positive");
            }
        }
        if self.nickname.pool_size == 0 {
            anyhow::bail!("nickname pool is empty");
        }
        Ok(())
    }
}

fn default_jobs() -> Vec<String> {
    [
        "Miner", "Builder", "Chef", "Streamer", "Engineer", "Artist", "Musician",
        "Doctor", "Nurse", "Waiter", "Programmer", "Cashier", "Security", "Cleaner",
        "Scientist", "Mechanic", "Decorator", "Photographer", "Journalist", "Designer",
        "Researcher", "Dancer", "Salesperson", "Veterinarian", "Pilot", "Discord Mod",
        "Librarian", "Plumber", "Customer Service",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_eight_ball() -> Vec<String> {
    [
        "Yes.", "No.", "Maybe.", "Ask again later.", "Definitely.", "Absolutely not.",
        "I wouldn't count on it.", "It is certain.", "Don't hold your breath.", "Most likely.",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_rules() {
        let c = BotConfig::default_test();
        assert_eq!(c.economy.daily.reward, 10_000);
        assert_eq!(c.economy.daily.cooldown(), Duration::hours(24));
        assert_eq!(c.economy.monthly.reward, 100_000);
        assert_eq!(c.economy.monthly.cooldown(), Duration::days(30));
        assert_eq!(c.economy.beg.cooldown(), Duration::hours(1));
        assert_eq!(c.economy.work.cooldown(), Duration::hours(16));
        assert_eq!(c.economy.work.offer_size, 10);
        assert_eq!(c.economy.leaderboard_size, 5);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let c: BotConfig = serde_json::from_str(r#"{ "seed": 9, "nickname": { "width": 4 } }"#)
            .unwrap();
        assert_eq!(c.seed, Some(9));
        assert_eq!(c.nickname.width, 4);
        assert_eq!(c.nickname.pool_size, 1_000);
        assert_eq!(c.economy.daily.reward, 10_000);
    }

    #[test]
    fn shipped_data_dir_loads() {
        let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/../data");
        let c = BotConfig::load(dir).unwrap();
        assert_eq!(c.economy.jobs.len(), default_jobs().len());
        assert_eq!(c.economy.work.cycle_secs, Some(48 * 3_600));
        assert_eq!(c.gem.default_emoji, "💎");
    }

    #[test]
    fn empty_catalog_is_rejected() {
        let mut c = BotConfig::default_test();
        c.economy.jobs.clear();
        assert!(c.validate().is_err());
    }

    /// A loss above 100% would push a wallet negative.
    #[test]
    fn loss_above_whole_wallet_is_rejected() {
        let mut c = BotConfig::default_test();
        c.economy.beg.loss_pct_max = 1.5;
        let err = c.validate().unwrap_err().to_string();
        assert!(err.contains("beg loss range"), "got {err}");

        c.economy.beg.loss_pct_max = 1.0;
        assert!(c.validate().is_ok());
    }

    #[test]
    fn negative_durations_and_amounts_are_rejected() {
        let mut c = BotConfig::default_test();
        c.economy.beg.cooldown_secs = -1;
        assert!(c.validate().unwrap_err().to_string().contains("beg cooldown"));

        let mut c = BotConfig::default_test();
        c.economy.work.fire_penalty = -5_000;
        assert!(c.validate().unwrap_err().to_string().contains("fire penalty"));

        let mut c = BotConfig::default_test();
        c.economy.work.cycle_secs = Some(0);
        assert!(c.validate().is_err());

        let mut c = BotConfig::default_test();
        c.economy.beg.success_chance = 1.2;
        assert!(c.validate().is_err());
    }
}
