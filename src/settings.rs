//! Game tuning and headless run settings
//!
//! Loaded from JSON files; every field has a default so partial files work.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Result, SimError};

/// Pixel size of a sprite, used for feeler margins and reach distances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteSize {
    pub width: u32,
    pub height: u32,
}

impl SpriteSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Physics and gameplay constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Motion ===
    pub acceleration: f64,
    /// Dragon/background speed cap
    pub max_velocity: f64,
    pub gravity: f64,

    // === Projectile ===
    pub projectile_gravity: f64,
    pub fire_max_velocity: f64,
    pub smoke_max_velocity: f64,
    /// Launch velocity multiplier for a charged shot
    pub fire_speed_multiplier: f64,
    /// Launch velocity multiplier for a smoke puff (fired while recharging)
    pub smoke_speed_multiplier: f64,
    /// Horizontal velocity added toward the facing side at launch
    pub muzzle_kick: f64,
    /// Spawn distance from the dragon's centre toward the facing side
    pub muzzle_offset: f64,
    /// A shot slower than this on both axes is spent
    pub spent_speed: f64,
    pub recharge_seconds: f64,
    pub recharge_step_seconds: f64,

    // === Creatures ===
    /// Creature speed cap as a fraction of `max_velocity`
    pub creature_velocity_factor: f64,
    pub sense_radius: f64,
    pub creature_damage: f64,
    /// Life lost for eating an egg before it is ripe
    pub unripe_penalty: f64,
    pub hunger_cooldown_seconds: f64,
    pub kill_decay_seconds: f64,
    pub blueness_step: u8,

    // === Sprites ===
    pub dragon: SpriteSize,
    pub fireball: SpriteSize,
    pub creature: SpriteSize,

    // === Frame ===
    pub frame_width: u32,
    pub frame_height: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            acceleration: DEFAULT_ACCELERATION,
            max_velocity: DEFAULT_MAX_VELOCITY,
            gravity: DEFAULT_GRAVITY,

            projectile_gravity: 0.98,
            fire_max_velocity: 15.0,
            smoke_max_velocity: 10.0,
            fire_speed_multiplier: 2.0,
            smoke_speed_multiplier: 0.25,
            muzzle_kick: 10.0,
            muzzle_offset: 50.0,
            spent_speed: 0.05,
            recharge_seconds: 4.0,
            recharge_step_seconds: 0.1,

            creature_velocity_factor: 0.5,
            sense_radius: 600.0,
            creature_damage: 0.10,
            unripe_penalty: 0.10,
            hunger_cooldown_seconds: 1.0,
            kill_decay_seconds: 3.0,
            blueness_step: 5,

            dragon: SpriteSize::new(150, 120),
            fireball: SpriteSize::new(40, 40),
            creature: SpriteSize::new(60, 60),

            frame_width: FRAME_WIDTH,
            frame_height: FRAME_HEIGHT,
        }
    }
}

/// Whole milliseconds in `seconds`, truncated
#[inline]
pub fn seconds_to_ms(seconds: f64) -> u64 {
    (seconds * 1000.0) as u64
}

impl Tuning {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Reject values the integrator or timers cannot work with
    pub fn validate(&self) -> Result<()> {
        for (name, g) in [("gravity", self.gravity), ("projectile_gravity", self.projectile_gravity)] {
            if !(g > 0.0 && g <= 1.0) {
                return Err(SimError::InvalidTuning(format!("{name} must be in (0, 1], got {g}")));
            }
        }
        for (name, v) in [
            ("max_velocity", self.max_velocity),
            ("fire_max_velocity", self.fire_max_velocity),
            ("smoke_max_velocity", self.smoke_max_velocity),
            ("creature_velocity_factor", self.creature_velocity_factor),
            ("recharge_step_seconds", self.recharge_step_seconds),
        ] {
            if !(v > 0.0 && v.is_finite()) {
                return Err(SimError::InvalidTuning(format!("{name} must be positive, got {v}")));
            }
        }
        for (name, v) in [
            ("acceleration", self.acceleration),
            ("sense_radius", self.sense_radius),
            ("creature_damage", self.creature_damage),
            ("unripe_penalty", self.unripe_penalty),
            ("recharge_seconds", self.recharge_seconds),
            ("hunger_cooldown_seconds", self.hunger_cooldown_seconds),
            ("kill_decay_seconds", self.kill_decay_seconds),
        ] {
            if !(v >= 0.0 && v.is_finite()) {
                return Err(SimError::InvalidTuning(format!("{name} must be non-negative, got {v}")));
            }
        }
        if self.blueness_step == 0 {
            return Err(SimError::InvalidTuning("blueness_step must be at least 1".into()));
        }
        Ok(())
    }

    /// Creature speed cap
    pub fn creature_max_velocity(&self) -> f64 {
        self.max_velocity * self.creature_velocity_factor
    }

    /// Number of recharge steps between a shot and being ready again
    pub fn recharge_steps(&self) -> u32 {
        (self.recharge_seconds / self.recharge_step_seconds).round() as u32
    }
}

/// Options for a headless run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tuning: Tuning,
    /// Number of fixed ticks to simulate
    pub ticks: u64,
    /// Seed for the procedural cavern
    pub seed: u64,
    pub terrain_width: u32,
    pub terrain_height: u32,
    /// Egg table; the built-in level is used when absent
    pub level: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tuning: Tuning::default(),
            ticks: 30 * 1000 / TICK_MS,
            seed: 0x0D4A_60F1,
            terrain_width: 7000,
            terrain_height: 3200,
            level: None,
        }
    }
}

impl Settings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// The cavern generator needs a non-empty raster
    pub fn validate(&self) -> Result<()> {
        self.tuning.validate()?;
        if self.terrain_width == 0 || self.terrain_height == 0 {
            return Err(SimError::InvalidSettings(format!(
                "terrain must be at least 1x1, got {}x{}",
                self.terrain_width, self.terrain_height
            )));
        }
        Ok(())
    }

    /// Load from `path`, falling back to defaults on any failure
    pub fn load_or_default(path: Option<&Path>) -> Self {
        match path {
            Some(path) => match Self::load(path) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("Could not load settings from {}: {}", path.display(), e);
                    Self::default()
                }
            },
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }
}
