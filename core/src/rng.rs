//! Deterministic random number generation.
//!
//! RULE: Nothing in the bot may call any platform RNG.
//! All randomness flows through GameRng instances derived
//! from the single master seed in the bot config.
//!
//! Each feature gets its own RNG stream, seeded deterministically
//! from (master_seed XOR slot_index). This means:
//!   - Adding a new feature never changes existing features' streams.
//!   - Each feature's stream is fully reproducible in isolation.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for a single feature.
pub struct GameRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl GameRng {
    /// Create a feature RNG from the master seed and a stable
    /// slot index. The index must never change once assigned.
    pub fn new(master_seed: u64, slot_index: u64) -> Self {
        let derived_seed = master_seed ^ (slot_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::RngCore;
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Roll an integer in [lo, hi], both ends inclusive.
    pub fn range_inclusive(&mut self, lo: i64, hi: i64) -> i64 {
        assert!(lo <= hi, "empty range {lo}..={hi}");
        let span = (hi - lo) as u64 + 1;
        lo + self.next_u64_below(span) as i64
    }

    /// Roll a float in [lo, hi).
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Pick one element uniformly. None for an empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let i = self.next_u64_below(items.len() as u64) as usize;
        items.get(i)
    }

    /// Split off an independent stream seeded from this one's next draw.
    pub fn fork(&mut self) -> GameRng {
        use rand::RngCore;
        let seed = self.inner.next_u64();
        Self { name: self.name, inner: Pcg64Mcg::seed_from_u64(seed) }
    }

    /// Draw `k` distinct elements (partial Fisher–Yates).
    /// Returns every element, shuffled, when `k >= items.len()`.
    pub fn sample<T: Clone>(&mut self, items: &[T], k: usize) -> Vec<T> {
        let mut pool: Vec<T> = items.to_vec();
        let take = k.min(pool.len());
        for i in 0..take {
            let j = i + self.next_u64_below((pool.len() - i) as u64) as usize;
            pool.swap(i, j);
        }
        pool.truncate(take);
        pool
    }
}

/// Builds feature RNGs for a single bot process, indexed by stable slot.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_slot(&self, slot: RngSlot) -> GameRng {
        GameRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }

    /// One live stream per slot, owned by the dispatcher.
    pub fn streams(&self) -> RngStreams {
        RngStreams {
            beg:        self.for_slot(RngSlot::Beg),
            work:       self.for_slot(RngSlot::Work),
            job_board:  self.for_slot(RngSlot::JobBoard),
            nickname:   self.for_slot(RngSlot::Nickname),
            eight_ball: self.for_slot(RngSlot::EightBall),
        }
    }
}

/// Stable feature slot assignments.
/// NEVER reorder or remove entries — only append.
/// Reordering changes every feature's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum RngSlot {
    Beg = 0,
    Work = 1,
    JobBoard = 2,
    Nickname = 3,
    EightBall = 4,
}

impl RngSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Beg => "beg",
            Self::Work => "work",
            Self::JobBoard => "job_board",
            Self::Nickname => "nickname",
            Self::EightBall => "eight_ball",
        }
    }
}

pub struct RngStreams {
    pub beg:        GameRng,
    pub work:       GameRng,
    pub job_board:  GameRng,
    pub nickname:   GameRng,
    pub eight_ball: GameRng,
}

impl RngStreams {
    pub fn stream(&mut self, slot: RngSlot) -> &mut GameRng {
        match slot {
            RngSlot::Beg => &mut self.beg,
            RngSlot::Work => &mut self.work,
            RngSlot::JobBoard => &mut self.job_board,
            RngSlot::Nickname => &mut self.nickname,
            RngSlot::EightBall => &mut self.eight_ball,
        }
    }
}
