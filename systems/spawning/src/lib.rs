#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawn source deciding which cells start with a token.
//!
//! Every decision is a pure function of the cell coordinate, a purpose tag and
//! the configured seed. The hash is spelled out below so that independent
//! implementations agree bit for bit:
//!
//! 1. `salt = fnv1a_64(tag)` where `tag` is `"spawn"` or `"value"`.
//! 2. `packed = (i as u32 as u64) << 32 | (j as u32 as u64)`.
//! 3. `h = splitmix64(splitmix64(seed ^ salt) ^ packed)`.
//! 4. The unit sample is `(h >> 11) / 2^53`, which lies in `[0, 1)`.

use world_of_bits_core::{CellCoord, Token};

/// Default probability that a cell starts with a token.
pub const DEFAULT_SPAWN_PROBABILITY: f64 = 0.1;
/// Default number of value tiers; tokens spawn as `1, 2, 4, 8`.
pub const DEFAULT_VALUE_TIERS: u8 = 4;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;
const SPLITMIX_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;
const UNIT_SCALE: f64 = (1u64 << 53) as f64;

/// Purpose tag mixed into the hash so presence and value draw independent samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Purpose {
    /// Decides whether the cell holds a token.
    Presence,
    /// Decides the value of the token.
    Value,
}

impl Purpose {
    /// Textual tag hashed into the sample.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Presence => "spawn",
            Self::Value => "value",
        }
    }

    const fn salt(self) -> u64 {
        fnv1a(self.tag().as_bytes())
    }
}

/// Configuration parameters required to construct the spawn source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    seed: u64,
    spawn_probability: f64,
    value_tiers: u8,
}

impl Config {
    /// Creates a new configuration. Callers validate that the probability lies
    /// in `(0, 1]` and that `value_tiers` lies in `1..=64`.
    #[must_use]
    pub const fn new(seed: u64, spawn_probability: f64, value_tiers: u8) -> Self {
        Self {
            seed,
            spawn_probability,
            value_tiers,
        }
    }

    /// Seed mixed into every sample.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Probability that a cell starts with a token.
    #[must_use]
    pub const fn spawn_probability(&self) -> f64 {
        self.spawn_probability
    }

    /// Number of distinct spawn values.
    #[must_use]
    pub const fn value_tiers(&self) -> u8 {
        self.value_tiers
    }

    /// Maps a pair of unit samples to a spawn outcome.
    ///
    /// A token spawns when `presence < spawn_probability`; its value is
    /// `2 ^ floor(value * value_tiers)`.
    #[must_use]
    pub fn token_from_samples(&self, presence: f64, value: f64) -> Option<Token> {
        if presence < self.spawn_probability {
            Some(self.value_from_sample(value))
        } else {
            None
        }
    }

    fn value_from_sample(&self, sample: f64) -> Token {
        let tiers = self.value_tiers.clamp(1, Token::MAX_EXPONENT + 1);
        let scaled = (sample * f64::from(tiers)).floor();
        let exponent = if scaled.is_nan() || scaled < 0.0 {
            0
        } else {
            (scaled as u8).min(tiers - 1)
        };
        Token::from_exponent(exponent).unwrap_or(Token::ONE)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(0, DEFAULT_SPAWN_PROBABILITY, DEFAULT_VALUE_TIERS)
    }
}

/// Pure spawn source; cheap to copy and safe to query in any order.
#[derive(Clone, Copy, Debug, Default)]
pub struct Spawning {
    config: Config,
}

impl Spawning {
    /// Creates a new spawn source using the supplied configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Deterministic sample in `[0, 1)` for the cell and purpose.
    #[must_use]
    pub fn sample(&self, cell: CellCoord, purpose: Purpose) -> f64 {
        let hash = hash_cell(self.config.seed, cell, purpose);
        (hash >> 11) as f64 / UNIT_SCALE
    }

    /// Reports whether the cell starts with a token.
    #[must_use]
    pub fn presence(&self, cell: CellCoord) -> bool {
        self.sample(cell, Purpose::Presence) < self.config.spawn_probability
    }

    /// Value the cell's token takes when present.
    #[must_use]
    pub fn value(&self, cell: CellCoord) -> Token {
        self.config
            .value_from_sample(self.sample(cell, Purpose::Value))
    }

    /// Initial content of the cell.
    #[must_use]
    pub fn spawn(&self, cell: CellCoord) -> Option<Token> {
        self.config.token_from_samples(
            self.sample(cell, Purpose::Presence),
            self.sample(cell, Purpose::Value),
        )
    }
}

/// Raw 64-bit hash of `(seed, cell, purpose)`.
#[must_use]
pub fn hash_cell(seed: u64, cell: CellCoord, purpose: Purpose) -> u64 {
    let packed = (u64::from(cell.i() as u32) << 32) | u64::from(cell.j() as u32);
    splitmix64(splitmix64(seed ^ purpose.salt()) ^ packed)
}

/// SplitMix64 finalizer.
#[must_use]
pub const fn splitmix64(state: u64) -> u64 {
    let mut z = state.wrapping_add(SPLITMIX_GAMMA);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

const fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    let mut index = 0;
    while index < bytes.len() {
        hash ^= bytes[index] as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
        index += 1;
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fnv1a_matches_reference_vectors() {
        assert_eq!(fnv1a(b""), FNV_OFFSET_BASIS);
        assert_eq!(fnv1a(b"a"), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn splitmix_matches_reference_output() {
        // First output of the reference SplitMix64 stream seeded with zero.
        assert_eq!(splitmix64(0), 0xe220_a839_7b1d_cdaf);
    }

    #[test]
    fn purposes_use_distinct_salts() {
        assert_ne!(Purpose::Presence.salt(), Purpose::Value.salt());
    }

    #[test]
    fn value_sample_clamps_to_top_tier() {
        let config = Config::default();
        assert_eq!(config.value_from_sample(0.999_999_999).value(), 8);
        assert_eq!(config.value_from_sample(0.0).value(), 1);
        assert_eq!(config.value_from_sample(1.0).value(), 8);
    }
}
