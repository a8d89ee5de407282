//! The dragon's fireball
//!
//! A charged shot leaves in fire form and starts the recharge meter. Firing
//! again before the meter is full produces a slow puff of smoke, which is
//! harmless. Firing while a shot is in flight replaces it.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::bounce::{BounceProfile, BounceResolver};
use super::mask::CollisionMask;
use super::motion::{Advance, BodyKind, Intent, MotionState};
use super::schedule::{GameClock, TimerEvent, TimerId};
use crate::settings::{SpriteSize, Tuning, seconds_to_ms};

/// Active fire or spent smoke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectileForm {
    #[default]
    Fire,
    Smoke,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Launch {
    gravity: f64,
    fire_max_velocity: f64,
    smoke_max_velocity: f64,
    fire_speed_multiplier: f64,
    smoke_speed_multiplier: f64,
    muzzle_kick: f64,
    muzzle_offset: f64,
    spent_speed: f64,
    recharge_steps: u32,
    recharge_step_ms: u64,
}

#[derive(Debug, Clone)]
pub struct Projectile {
    motion: MotionState,
    fired: bool,
    form: ProjectileForm,
    ready: bool,
    steps_left: u32,
    recharge_timer: Option<TimerId>,
    size: SpriteSize,
    launch: Launch,
}

impl Projectile {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            motion: MotionState::default().with_gravity(tuning.projectile_gravity),
            fired: false,
            form: ProjectileForm::Fire,
            ready: true,
            steps_left: 0,
            recharge_timer: None,
            size: tuning.fireball,
            launch: Launch {
                gravity: tuning.projectile_gravity,
                fire_max_velocity: tuning.fire_max_velocity,
                smoke_max_velocity: tuning.smoke_max_velocity,
                fire_speed_multiplier: tuning.fire_speed_multiplier,
                smoke_speed_multiplier: tuning.smoke_speed_multiplier,
                muzzle_kick: tuning.muzzle_kick,
                muzzle_offset: tuning.muzzle_offset,
                spent_speed: tuning.spent_speed,
                recharge_steps: tuning.recharge_steps(),
                recharge_step_ms: seconds_to_ms(tuning.recharge_step_seconds),
            },
        }
    }

    /// Launch from the dragon.
    ///
    /// `origin` is the dragon's terrain position and `background_vel` the
    /// scroll velocity; the shot inherits the dragon's own motion, which is
    /// the opposite of the scroll.
    pub fn fire(&mut self, origin: DVec2, background_vel: DVec2, facing_right: bool, clock: &mut GameClock) {
        let side = if facing_right { 1.0 } else { -1.0 };
        let mut vel = -background_vel;
        vel.x += self.launch.muzzle_kick * side;
        let pos = DVec2::new(origin.x + self.launch.muzzle_offset * side, origin.y);

        let (form, multiplier, max_velocity) = if self.ready {
            (ProjectileForm::Fire, self.launch.fire_speed_multiplier, self.launch.fire_max_velocity)
        } else {
            (ProjectileForm::Smoke, self.launch.smoke_speed_multiplier, self.launch.smoke_max_velocity)
        };

        if self.fired {
            log::debug!("Replacing in-flight {:?} shot", self.form);
        }
        self.fired = true;
        self.form = form;
        self.motion = MotionState::at(pos)
            .with_velocity(vel * multiplier)
            .with_gravity(self.launch.gravity)
            .with_max_velocity(max_velocity);

        if self.ready && self.launch.recharge_steps > 0 {
            self.ready = false;
            self.steps_left = self.launch.recharge_steps;
            self.recharge_timer = Some(clock.schedule_every(self.launch.recharge_step_ms, TimerEvent::Recharge));
        }
    }

    /// One tick of the recharge meter
    pub fn on_recharge_step(&mut self, clock: &mut GameClock) {
        if self.ready {
            self.stop_recharge(clock);
            return;
        }
        self.steps_left = self.steps_left.saturating_sub(1);
        if self.steps_left == 0 {
            self.ready = true;
            self.fired = false;
            self.form = ProjectileForm::Fire;
            self.stop_recharge(clock);
        }
    }

    fn stop_recharge(&mut self, clock: &mut GameClock) {
        if let Some(id) = self.recharge_timer.take() {
            clock.cancel(id);
        }
    }

    /// Take the shot out of play (it hit something)
    pub fn deactivate(&mut self) {
        self.fired = false;
    }

    #[inline]
    pub fn is_fired(&self) -> bool {
        self.fired
    }

    /// In flight and still burning
    #[inline]
    pub fn is_hot(&self) -> bool {
        self.fired && self.form == ProjectileForm::Fire
    }

    pub fn form(&self) -> ProjectileForm {
        self.form
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn size(&self) -> SpriteSize {
        self.size
    }

    /// Terrain position
    #[inline]
    pub fn position(&self) -> DVec2 {
        self.motion.pos
    }

    pub fn motion(&self) -> &MotionState {
        &self.motion
    }

    /// Seconds left on the recharge meter
    pub fn seconds_until_ready(&self) -> f64 {
        if self.ready {
            0.0
        } else {
            self.steps_left as f64 * self.launch.recharge_step_ms as f64 / 1000.0
        }
    }

    /// Fill level of the recharge meter in [0, 1]
    pub fn recharge_fraction(&self) -> f64 {
        if self.ready || self.launch.recharge_steps == 0 {
            1.0
        } else {
            1.0 - self.steps_left as f64 / self.launch.recharge_steps as f64
        }
    }
}

impl Advance for Projectile {
    fn kind(&self) -> BodyKind {
        BodyKind::Projectile
    }

    fn advance(&mut self, intent: Intent, terrain: &CollisionMask) -> MotionState {
        if !self.fired {
            return self.motion;
        }
        let edges = self.kind().edge_policy(terrain.width(), terrain.height());
        if let Some(profile) = BounceProfile::for_body(self.kind(), self.size.width, self.size.height) {
            BounceResolver::new(terrain, profile).step(&mut self.motion, intent, edges);
        }
        if self.motion.is_slower_than(self.launch.spent_speed) {
            self.fired = false;
        }
        self.motion
    }
}
