//! Engine configuration and its validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use world_of_bits_core::{EvictionPolicy, GridProjection, LatLng, Token};
use world_of_bits_system_spawning::{DEFAULT_SPAWN_PROBABILITY, DEFAULT_VALUE_TIERS};
use world_of_bits_system_viewport::DEFAULT_MAX_SPAN;
use world_of_bits_system_win_condition::DEFAULT_WIN_THRESHOLD;
use world_of_bits_world::DEFAULT_NEIGHBORHOOD_SIZE;

/// Angular size of a cell edge in degrees.
pub const DEFAULT_TILE_DEGREES: f64 = 1e-4;

/// Location the player starts from unless configured otherwise.
pub const CLASSROOM: LatLng = LatLng::new(36.997936938057016, -122.05703507501151);

/// Session configuration, typically deserialized from a TOML file.
///
/// Every field has a default, so an empty document is a valid configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Seed mixed into every spawn decision.
    pub seed: u64,
    /// Probability that a cell starts with a token, in `(0, 1]`.
    pub spawn_probability: f64,
    /// Number of distinct spawn values; tokens spawn as `2^0 .. 2^(tiers-1)`.
    pub value_tiers: u8,
    /// Chebyshev radius within which the player may interact.
    pub neighborhood_size: u32,
    /// Crafting a token worth at least this much wins the session.
    pub win_threshold: u64,
    /// What happens to mutated cells when they leave the window.
    pub eviction_policy: EvictionPolicy,
    /// Angular size of a cell edge in degrees.
    pub tile_degrees: f64,
    /// Geographic anchor of cell `(0, 0)`.
    pub origin: LatLng,
    /// Geographic location of the player at the start of the session.
    pub start: LatLng,
    /// Largest materialization range, in cells per axis.
    pub max_window_span: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            spawn_probability: DEFAULT_SPAWN_PROBABILITY,
            value_tiers: DEFAULT_VALUE_TIERS,
            neighborhood_size: DEFAULT_NEIGHBORHOOD_SIZE,
            win_threshold: DEFAULT_WIN_THRESHOLD,
            eviction_policy: EvictionPolicy::default(),
            tile_degrees: DEFAULT_TILE_DEGREES,
            origin: LatLng::new(0.0, 0.0),
            start: CLASSROOM,
            max_window_span: DEFAULT_MAX_SPAN,
        }
    }
}

impl EngineConfig {
    /// Checks every field, reporting the first invalid one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let probability = self.spawn_probability;
        if !probability.is_finite() || probability <= 0.0 || probability > 1.0 {
            return Err(ConfigError::SpawnProbability(probability));
        }
        if self.value_tiers == 0 || self.value_tiers > Token::MAX_EXPONENT + 1 {
            return Err(ConfigError::ValueTiers(self.value_tiers));
        }
        if self.neighborhood_size == 0 {
            return Err(ConfigError::NeighborhoodSize);
        }
        if self.win_threshold == 0 {
            return Err(ConfigError::WinThreshold);
        }
        if !self.tile_degrees.is_finite() || self.tile_degrees <= 0.0 {
            return Err(ConfigError::TileDegrees(self.tile_degrees));
        }
        if !self.origin.is_finite() {
            return Err(ConfigError::NonFiniteLocation { field: "origin" });
        }
        if !self.start.is_finite() {
            return Err(ConfigError::NonFiniteLocation { field: "start" });
        }
        if self.max_window_span == 0 {
            return Err(ConfigError::WindowSpan);
        }
        Ok(())
    }

    /// Projection between geographic positions and cells.
    #[must_use]
    pub fn projection(&self) -> GridProjection {
        GridProjection::new(self.origin, self.tile_degrees)
    }
}

/// Reasons an [`EngineConfig`] is refused at construction.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The spawn probability is not a number in `(0, 1]`.
    #[error("spawn probability must lie in (0, 1], got {0}")]
    SpawnProbability(f64),
    /// The number of value tiers is zero or exceeds the largest token.
    #[error("value tiers must lie in 1..=64, got {0}")]
    ValueTiers(u8),
    /// The neighborhood radius is zero.
    #[error("neighborhood size must be positive")]
    NeighborhoodSize,
    /// The win threshold is zero.
    #[error("win threshold must be positive")]
    WinThreshold,
    /// The tile size is not a positive finite number of degrees.
    #[error("tile size must be a positive finite number of degrees, got {0}")]
    TileDegrees(f64),
    /// A geographic location contains NaN or infinity.
    #[error("{field} must be a finite latitude/longitude pair")]
    NonFiniteLocation {
        /// Name of the offending field.
        field: &'static str,
    },
    /// The window span is zero.
    #[error("max window span must be positive")]
    WindowSpan,
}
