//! Dragon Flier - a side-scrolling cavern flier
//!
//! Core modules:
//! - `sim`: Deterministic simulation (motion, wall bounce, egg lifecycle, collisions)
//! - `level`: Egg spawn tables
//! - `settings`: Data-driven tuning and headless run options
//! - `error`: Crate error type

pub mod error;
pub mod level;
pub mod settings;
pub mod sim;

pub use error::{Result, SimError};
pub use level::{EggSpawn, Level};
pub use settings::{Settings, Tuning};

use glam::DVec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (the driver ticks every 5 ms)
    pub const TICK_MS: u64 = 5;

    /// Visible frame, the dragon is pinned to its centre
    pub const FRAME_WIDTH: u32 = 1200;
    pub const FRAME_HEIGHT: u32 = 900;

    /// Motion defaults shared by every entity
    pub const DEFAULT_ACCELERATION: f64 = 0.05;
    pub const DEFAULT_MAX_VELOCITY: f64 = 5.0;
    pub const DEFAULT_GRAVITY: f64 = 0.97;

    /// Stage bookkeeping for the blueness ripening process
    pub const MAX_BLUENESS: u8 = 255;
}

/// Euclidean pixel distance between two points.
///
/// Each axis delta is truncated to a whole pixel before squaring, so two
/// points less than a pixel apart on both axes are at distance zero.
#[inline]
pub fn pixel_distance(a: DVec2, b: DVec2) -> i64 {
    let dx = ((a.x - b.x) as i64).abs();
    let dy = ((a.y - b.y) as i64).abs();
    ((dx * dx + dy * dy) as f64).sqrt() as i64
}
