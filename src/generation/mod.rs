//! # Generation Module
//!
//! Procedural generation for dungeon floors: room placement, the
//! connectivity planner, tunnel carvers, door finalization, and depth-scaled
//! entity population.

pub mod connect;
pub mod doors;
pub mod populate;
pub mod rooms;
pub mod tunnel;

pub use connect::*;
pub use doors::*;
pub use populate::*;
pub use rooms::*;
pub use tunnel::*;

use crate::{config, DelveError, DelveResult};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Configuration for floor generation.
///
/// Carries the seed and the room placement parameters. All randomness flows
/// from the seed, so equal configurations generate identical floors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Map width in tiles
    pub map_width: u32,
    /// Map height in tiles
    pub map_height: u32,
    /// Number of room placement attempts; rejected attempts are not retried,
    /// so a floor may end up with fewer rooms
    pub max_rooms: u32,
    /// Minimum room dimension, walls included (never below 3)
    pub room_min_size: u32,
    /// Maximum room dimension, walls included
    pub room_max_size: u32,
}

impl GenerationConfig {
    /// Creates a default generation configuration with the given seed.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(12345);
    /// assert!(config.room_min_size >= 3);
    /// assert!(config.room_max_size >= config.room_min_size);
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            map_width: config::DEFAULT_MAP_WIDTH,
            map_height: config::DEFAULT_MAP_HEIGHT,
            max_rooms: config::DEFAULT_MAX_ROOMS,
            room_min_size: config::DEFAULT_ROOM_MIN_SIZE,
            room_max_size: config::DEFAULT_ROOM_MAX_SIZE,
        }
    }

    /// Creates a configuration for testing with smaller, simpler floors.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed,
            map_width: 40,
            map_height: 25,
            max_rooms: 8,
            room_min_size: 3,
            room_max_size: 6,
        }
    }

    /// Checks the parameters against the geometric limits of generation.
    pub fn validate(&self) -> DelveResult<()> {
        if self.room_min_size < 3 {
            return Err(DelveError::GenerationFailed(format!(
                "room_min_size must be at least 3, got {}",
                self.room_min_size
            )));
        }
        if self.room_max_size < self.room_min_size {
            return Err(DelveError::GenerationFailed(format!(
                "room_max_size {} is below room_min_size {}",
                self.room_max_size, self.room_min_size
            )));
        }
        if self.map_width <= self.room_max_size + 1 || self.map_height <= self.room_max_size + 1 {
            return Err(DelveError::GenerationFailed(format!(
                "{}x{} map cannot fit rooms up to size {}",
                self.map_width, self.map_height, self.room_max_size
            )));
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Trait for procedural generators.
///
/// Generation runs once per floor transition, synchronously, to completion.
/// The random number generator is passed explicitly so tests can replay a
/// floor deterministically.
pub trait Generator<T> {
    /// Generates content using the provided configuration and rng.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> DelveResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> DelveResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions shared by generation algorithms.
pub mod utils {
    use super::*;
    use rand::SeedableRng;

    /// Creates a seeded random number generator from the config.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        StdRng::seed_from_u64(config.seed)
    }

    /// Euclidean distance between two grid cells.
    pub fn distance(x1: i32, y1: i32, x2: i32, y2: i32) -> f64 {
        let dx = (x1 - x2) as f64;
        let dy = (y1 - y2) as f64;
        (dx * dx + dy * dy).sqrt()
    }
}
