//! The dragon and the scrolling cavern behind it
//!
//! The dragon never moves on screen. Steering input pushes the background
//! the opposite way, so the dragon's position in the cavern is its screen
//! position minus the background offset. Wall bounce is worked out in that
//! cavern frame and written back onto the background.

use glam::DVec2;

use super::bounce::{BounceProfile, BounceResolver};
use super::mask::CollisionMask;
use super::motion::{Advance, BodyKind, Intent, MotionState};
use crate::settings::{SpriteSize, Tuning};

#[derive(Debug, Clone)]
pub struct Protagonist {
    /// Fixed screen position (centre of the frame)
    screen_pos: DVec2,
    /// Background offset and scroll velocity
    background: MotionState,
    facing_right: bool,
    size: SpriteSize,
}

impl Protagonist {
    /// Dragon at the frame centre, with the bottom of a `terrain_height`
    /// cavern aligned to the bottom of the frame
    pub fn new(tuning: &Tuning, terrain_height: u32) -> Self {
        let screen_pos = DVec2::new(tuning.frame_width as f64 / 2.0, tuning.frame_height as f64 / 2.0);
        let start = DVec2::new(0.0, tuning.frame_height as f64 - terrain_height as f64);
        Self {
            screen_pos,
            background: MotionState::at(start)
                .with_acceleration(tuning.acceleration)
                .with_gravity(tuning.gravity)
                .with_max_velocity(tuning.max_velocity),
            facing_right: true,
            size: tuning.dragon,
        }
    }

    /// Turn toward the horizontal input, if any
    pub fn face(&mut self, intent: Intent) {
        if intent.contains(Intent::LEFT) {
            self.facing_right = false;
        } else if intent.contains(Intent::RIGHT) {
            self.facing_right = true;
        }
    }

    #[inline]
    pub fn facing_right(&self) -> bool {
        self.facing_right
    }

    #[inline]
    pub fn screen_position(&self) -> DVec2 {
        self.screen_pos
    }

    /// Translation from cavern coordinates to screen coordinates
    #[inline]
    pub fn background_offset(&self) -> DVec2 {
        self.background.pos
    }

    pub fn background(&self) -> &MotionState {
        &self.background
    }

    /// Where the dragon is in the cavern
    #[inline]
    pub fn map_position(&self) -> DVec2 {
        self.screen_pos - self.background.pos
    }

    /// The dragon's own velocity (the background scrolls the other way)
    pub fn velocity(&self) -> DVec2 {
        -self.background.vel
    }

    pub fn size(&self) -> SpriteSize {
        self.size
    }
}

impl Advance for Protagonist {
    fn kind(&self) -> BodyKind {
        BodyKind::Protagonist
    }

    fn advance(&mut self, intent: Intent, terrain: &CollisionMask) -> MotionState {
        let edges = BodyKind::Background.edge_policy(terrain.width(), terrain.height());

        if let Some(profile) = BounceProfile::for_body(self.kind(), self.size.width, self.size.height) {
            let mut heading = self.background;
            heading.pos = self.map_position();
            heading.vel = self.velocity();

            let bounce = BounceResolver::new(terrain, profile).resolve(&mut heading, intent, edges);
            self.background.vel = -heading.vel;
            self.background.pos -= bounce.nudge;
        }

        self.background.advance(intent.mirrored(), edges);
        self.background
    }
}
