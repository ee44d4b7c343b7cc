//! # Delve
//!
//! Procedural dungeon generation for turn-based roguelikes.
//!
//! ## Architecture Overview
//!
//! Delve builds a connected, navigable level on a 2D tile grid and populates
//! it with entities. The crate is split into two layers:
//!
//! - **Game model**: the tile catalog, the map grid with its visibility and
//!   occupancy bookkeeping, and a minimal entity record used for spawning.
//! - **Generation system**: randomized room placement with collision
//!   rejection, a connectivity planner that spans the rooms with a minimum
//!   spanning tree plus extra links, two tunnel-carving strategies (L-shaped
//!   Bresenham lines and A* over diggable tiles), door validation, and
//!   depth-scaled weighted population tables.
//!
//! Everything randomized takes an explicit [`rand::rngs::StdRng`], so a fixed
//! seed reproduces a floor exactly.
//!
//! ```
//! use delve::{DungeonGenerator, GenerationConfig, Generator, generation::utils};
//!
//! let config = GenerationConfig::for_testing(12345);
//! let mut rng = utils::create_rng(&config);
//! let map = DungeonGenerator::new().generate(&config, &mut rng).unwrap();
//! assert!(!map.rooms.is_empty());
//! ```

pub mod game;
pub mod generation;

pub use game::*;
pub use generation::*;

/// Core error type for the Delve generation engine.
#[derive(thiserror::Error, Debug)]
pub enum DelveError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Room geometry is malformed
    #[error("Invalid room: {0}")]
    InvalidRoom(String),

    /// An internal invariant does not hold
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

/// Result type used throughout the Delve codebase.
pub type DelveResult<T> = Result<T, DelveError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Generation configuration constants.
pub mod config {
    /// Default dungeon width in tiles
    pub const DEFAULT_MAP_WIDTH: u32 = 80;

    /// Default dungeon height in tiles
    pub const DEFAULT_MAP_HEIGHT: u32 = 40;

    /// Default cap on placement attempts (and therefore rooms) per floor
    pub const DEFAULT_MAX_ROOMS: u32 = 20;

    /// Default minimum room dimension, walls included
    pub const DEFAULT_ROOM_MIN_SIZE: u32 = 4;

    /// Default maximum room dimension, walls included
    pub const DEFAULT_ROOM_MAX_SIZE: u32 = 10;

    /// Retry budget for the pathfinding tunnel fallback
    pub const DEFAULT_TUNNEL_RETRIES: u32 = 100;
}
