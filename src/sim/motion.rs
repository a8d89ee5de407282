//! Velocity/acceleration integration shared by every moving entity
//!
//! Every body (scrolling background, projectile, hatched creature) advances
//! through the same per-axis rule: push by `acceleration` while an intent is
//! held, otherwise decay by `gravity`, clamp to `max_velocity`, then move.
//! What differs per body is only the edge policy applied afterwards.

use std::ops::BitOr;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::mask::CollisionMask;
use crate::consts::*;

/// Directional input as four independent flags.
///
/// Diagonals are valid (`UP | LEFT`). When both flags of one axis are held the
/// negative direction wins, matching how the keyboard handler resolved it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Intent(u8);

impl Intent {
    pub const NONE: Intent = Intent(0);
    pub const UP: Intent = Intent(1);
    pub const DOWN: Intent = Intent(1 << 1);
    pub const LEFT: Intent = Intent(1 << 2);
    pub const RIGHT: Intent = Intent(1 << 3);

    pub fn from_flags(up: bool, down: bool, left: bool, right: bool) -> Self {
        let mut intent = Intent::NONE;
        if up {
            intent = intent | Intent::UP;
        }
        if down {
            intent = intent | Intent::DOWN;
        }
        if left {
            intent = intent | Intent::LEFT;
        }
        if right {
            intent = intent | Intent::RIGHT;
        }
        intent
    }

    #[inline]
    pub fn contains(self, other: Intent) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Swap up/down and left/right.
    ///
    /// The background scrolls opposite to where the dragon is steered.
    pub fn mirrored(self) -> Self {
        Intent::from_flags(
            self.contains(Intent::DOWN),
            self.contains(Intent::UP),
            self.contains(Intent::RIGHT),
            self.contains(Intent::LEFT),
        )
    }

    pub fn x_axis(self) -> AxisIntent {
        if self.contains(Intent::LEFT) {
            AxisIntent::Negative
        } else if self.contains(Intent::RIGHT) {
            AxisIntent::Positive
        } else {
            AxisIntent::Idle
        }
    }

    pub fn y_axis(self) -> AxisIntent {
        if self.contains(Intent::UP) {
            AxisIntent::Negative
        } else if self.contains(Intent::DOWN) {
            AxisIntent::Positive
        } else {
            AxisIntent::Idle
        }
    }

    /// Intent that pushes a body at `from` toward `to` on both axes
    pub fn toward(from: DVec2, to: DVec2) -> Self {
        Intent::from_flags(to.y < from.y, from.y < to.y, to.x < from.x, from.x < to.x)
    }
}

impl BitOr for Intent {
    type Output = Intent;

    fn bitor(self, rhs: Intent) -> Intent {
        Intent(self.0 | rhs.0)
    }
}

/// Resolved push along a single axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisIntent {
    Negative,
    Positive,
    Idle,
}

/// What happens to a body that leaves the raster after integrating
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgePolicy {
    /// Position folds back into `(-size, size)` (scrolling background)
    Wrap { width: f64, height: f64 },
    /// Position is held inside `[0, size]`
    Clamp { width: f64, height: f64 },
    /// Held inside `[0, size - 1]`, reflecting velocity on the edge axis
    ClampBounce { width: f64, height: f64 },
}

/// Position/velocity record advanced once per tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionState {
    pub pos: DVec2,
    pub vel: DVec2,
    /// Velocity added per tick while an intent is held
    pub acceleration: f64,
    /// Per-axis speed cap
    pub max_velocity: f64,
    /// Decay factor in (0, 1] applied when no intent is held on an axis
    pub gravity: f64,
}

impl Default for MotionState {
    fn default() -> Self {
        Self {
            pos: DVec2::ZERO,
            vel: DVec2::ZERO,
            acceleration: DEFAULT_ACCELERATION,
            max_velocity: DEFAULT_MAX_VELOCITY,
            gravity: DEFAULT_GRAVITY,
        }
    }
}

impl MotionState {
    pub fn at(pos: DVec2) -> Self {
        Self {
            pos,
            ..Default::default()
        }
    }

    pub fn with_velocity(mut self, vel: DVec2) -> Self {
        self.vel = vel;
        self
    }

    pub fn with_max_velocity(mut self, max_velocity: f64) -> Self {
        self.max_velocity = max_velocity;
        self
    }

    pub fn with_gravity(mut self, gravity: f64) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_acceleration(mut self, acceleration: f64) -> Self {
        self.acceleration = acceleration;
        self
    }

    fn step_axis(&self, v: f64, push: AxisIntent) -> f64 {
        let v = match push {
            AxisIntent::Negative => v - self.acceleration,
            AxisIntent::Positive => v + self.acceleration,
            AxisIntent::Idle => v * self.gravity,
        };
        v.clamp(-self.max_velocity, self.max_velocity)
    }

    /// The state one tick from now, without touching `self`.
    ///
    /// Used both to advance and to look ahead for the bounce resolver.
    pub fn integrated(&self, intent: Intent, edges: EdgePolicy) -> MotionState {
        let mut next = *self;
        next.vel.x = self.step_axis(self.vel.x, intent.x_axis());
        next.vel.y = self.step_axis(self.vel.y, intent.y_axis());
        next.pos += next.vel;

        match edges {
            EdgePolicy::Wrap { width, height } => {
                next.pos.x = wrap(next.pos.x, width);
                next.pos.y = wrap(next.pos.y, height);
            }
            EdgePolicy::Clamp { width, height } => {
                next.pos.x = next.pos.x.clamp(0.0, width);
                next.pos.y = next.pos.y.clamp(0.0, height);
            }
            EdgePolicy::ClampBounce { width, height } => {
                (next.pos.x, next.vel.x) = clamp_bounce(next.pos.x, next.vel.x, width);
                (next.pos.y, next.vel.y) = clamp_bounce(next.pos.y, next.vel.y, height);
            }
        }
        next
    }

    /// Advance one tick in place
    pub fn advance(&mut self, intent: Intent, edges: EdgePolicy) {
        *self = self.integrated(intent, edges);
    }

    /// True when both velocity components are below `threshold` in magnitude
    pub fn is_slower_than(&self, threshold: f64) -> bool {
        self.vel.x.abs() < threshold && self.vel.y.abs() < threshold
    }
}

fn wrap(p: f64, size: f64) -> f64 {
    if p <= -size {
        p + size
    } else if p >= size {
        p - size
    } else {
        p
    }
}

fn clamp_bounce(p: f64, v: f64, size: f64) -> (f64, f64) {
    if p <= 0.0 {
        (0.0, -v)
    } else if p >= size {
        (size - 1.0, -v)
    } else {
        (p, v)
    }
}

/// Kinds of moving bodies in a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Scrolling terrain layer, moved opposite to the steering input
    Background,
    /// The dragon; pinned on screen, bounces by redirecting the background
    Protagonist,
    Projectile,
    Creature,
}

impl BodyKind {
    /// Edge policy for a body living on a `width x height` raster
    pub fn edge_policy(self, width: u32, height: u32) -> EdgePolicy {
        let (width, height) = (width as f64, height as f64);
        match self {
            BodyKind::Background | BodyKind::Protagonist => EdgePolicy::Wrap { width, height },
            BodyKind::Projectile => EdgePolicy::ClampBounce { width, height },
            BodyKind::Creature => EdgePolicy::Clamp { width, height },
        }
    }
}

/// A body that advances itself one tick against the terrain
pub trait Advance {
    fn kind(&self) -> BodyKind;

    /// Resolve terrain bounce and integrate; returns the new motion state
    fn advance(&mut self, intent: Intent, terrain: &CollisionMask) -> MotionState;
}
