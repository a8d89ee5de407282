//! Egg spawn tables
//!
//! A level is a list of eggs with a terrain position and three delays:
//! until the egg appears, from appearing until it is ripe, and from ripe
//! until it hatches.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// One egg construction record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EggSpawn {
    pub x: f64,
    pub y: f64,
    /// Seconds until the egg appears
    pub appear_delay: f64,
    /// Seconds from appearing until it is ready to eat
    pub ripen_delay: f64,
    /// Seconds from ready until it hatches
    pub hatch_delay: f64,
}

impl EggSpawn {
    pub const fn new(x: f64, y: f64, appear_delay: f64, ripen_delay: f64, hatch_delay: f64) -> Self {
        Self {
            x,
            y,
            appear_delay,
            ripen_delay,
            hatch_delay,
        }
    }

    /// Fail fast on negative or non-finite values; `index` names the record
    pub fn validate(&self, index: usize) -> Result<()> {
        for (field, value) in [("x", self.x), ("y", self.y)] {
            if !value.is_finite() {
                return Err(SimError::InvalidEggConfig { index, field, value });
            }
        }
        for (field, value) in [
            ("appear_delay", self.appear_delay),
            ("ripen_delay", self.ripen_delay),
            ("hatch_delay", self.hatch_delay),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SimError::InvalidEggConfig { index, field, value });
            }
        }
        Ok(())
    }
}

/// Full egg table for a scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub eggs: Vec<EggSpawn>,
}

impl Level {
    pub fn new(eggs: Vec<EggSpawn>) -> Result<Self> {
        let level = Self { eggs };
        level.validate()?;
        Ok(level)
    }

    pub fn validate(&self) -> Result<()> {
        self.eggs.iter().enumerate().try_for_each(|(i, egg)| egg.validate(i))
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let level: Level = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let level = Self::from_json_str(&json)?;
        log::info!("Loaded {} eggs from {}", level.eggs.len(), path.display());
        Ok(level)
    }

    /// The cavern's built-in egg layout
    pub fn default_level() -> Self {
        Self {
            eggs: vec![
                EggSpawn::new(1500.0, 850.0, 0.0, 10.0, 5.0),
                EggSpawn::new(875.0, 2645.0, 0.0, 17.0, 5.0),
                EggSpawn::new(1800.0, 2893.0, 0.0, 23.0, 5.0),
                EggSpawn::new(2000.0, 2902.0, 0.0, 24.0, 5.0),
                EggSpawn::new(2500.0, 2893.0, 0.0, 25.0, 5.0),
                EggSpawn::new(2010.0, 2537.0, 0.0, 30.0, 5.0),
                EggSpawn::new(3400.0, 2031.0, 0.0, 44.0, 5.0),
                EggSpawn::new(1964.0, 2013.0, 0.0, 47.0, 5.0),
                EggSpawn::new(3840.0, 2335.0, 0.0, 60.0, 5.0),
                EggSpawn::new(4239.0, 2960.0, 0.0, 73.0, 5.0),
                EggSpawn::new(3225.0, 2705.0, 0.0, 81.0, 5.0),
                EggSpawn::new(6000.0, 3000.0, 0.0, 125.0, 10.0),
            ],
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::default_level()
    }
}
