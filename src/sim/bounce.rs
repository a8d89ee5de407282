//! Wall bounce against a pixel mask
//!
//! Heuristic, not continuous collision detection: a body may overlap rock
//! for at most one tick, but never tunnels through it.
//!
//! Per tick, in order:
//! 1. Sample the terrain at four feeler points around the body centre.
//! 2. Reflect each axis whose velocity heads into a solid feeler.
//! 3. If nothing reflected, look one integration step ahead; if that lands
//!    in rock, reflect both axes and back off the attempted step plus
//!    [`ESCAPE_MARGIN`] on each axis that moved.
//! 4. Independently, nudge one unit away from any solid feeler the steering
//!    intent is still pushing toward.

use glam::DVec2;

use super::mask::CollisionMask;
use super::motion::{BodyKind, EdgePolicy, Intent, MotionState};

/// Extra distance a look-ahead escape backs off beyond the attempted step
pub const ESCAPE_MARGIN: f64 = 5.0;

/// Speeds below this are lifted to [`BUMP_MIN_SPEED`] when a creature is bumped
pub const BUMP_SLOW_THRESHOLD: f64 = 2.0;
pub const BUMP_MIN_SPEED: f64 = 5.0;

/// Feeler offsets from the body centre
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feeler {
    pub dx: i32,
    pub dy: i32,
}

/// Which of the four feeler points hit rock
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Neighbours {
    pub left: bool,
    pub right: bool,
    pub above: bool,
    pub below: bool,
}

impl Neighbours {
    pub fn sample(terrain: &CollisionMask, center: DVec2, feeler: Feeler) -> Self {
        let (x, y) = (center.x as i32, center.y as i32);
        Self {
            left: terrain.is_solid_at(x - feeler.dx, y),
            right: terrain.is_solid_at(x + feeler.dx, y),
            above: terrain.is_solid_at(x, y - feeler.dy),
            below: terrain.is_solid_at(x, y + feeler.dy),
        }
    }
}

/// Per-body bounce behaviour
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BounceProfile {
    pub feeler: Feeler,
    /// Run the one-tick look-ahead when no feeler reflected
    pub look_ahead: bool,
    /// Velocity multiplier after a look-ahead escape
    pub escape_boost: f64,
    /// Reflections of speeds under [`BUMP_SLOW_THRESHOLD`] leave at [`BUMP_MIN_SPEED`]
    pub reflect_floor: bool,
    /// Nudge away from rock the intent pushes into
    pub creep_nudge: bool,
    /// Restore the pre-step position if the step still ends inside rock
    pub revert_on_penetration: bool,
}

impl BounceProfile {
    /// Profile for `kind` with a sprite of `width x height`; the background
    /// itself never bounces
    pub fn for_body(kind: BodyKind, width: u32, height: u32) -> Option<Self> {
        let (w, h) = (width as i32, height as i32);
        match kind {
            BodyKind::Background => None,
            BodyKind::Protagonist => Some(Self {
                feeler: Feeler { dx: w / 2, dy: h / 4 },
                look_ahead: false,
                escape_boost: 1.0,
                reflect_floor: false,
                creep_nudge: true,
                revert_on_penetration: false,
            }),
            BodyKind::Projectile => Some(Self {
                feeler: Feeler { dx: w / 2, dy: h / 2 },
                look_ahead: true,
                escape_boost: 1.0,
                reflect_floor: false,
                creep_nudge: false,
                revert_on_penetration: false,
            }),
            BodyKind::Creature => Some(Self {
                feeler: Feeler { dx: w / 4, dy: h / 4 },
                look_ahead: true,
                escape_boost: 3.0,
                reflect_floor: true,
                creep_nudge: false,
                revert_on_penetration: true,
            }),
        }
    }
}

/// What the resolver did this tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounce {
    pub x: bool,
    pub y: bool,
    /// The look-ahead escape fired
    pub escaped: bool,
    /// Position correction applied by the creep nudge
    pub nudge: DVec2,
}

impl Bounce {
    pub fn any(&self) -> bool {
        self.x || self.y || self.escaped
    }
}

/// Keeps one body out of solid terrain
pub struct BounceResolver<'a> {
    terrain: &'a CollisionMask,
    profile: BounceProfile,
}

impl<'a> BounceResolver<'a> {
    pub fn new(terrain: &'a CollisionMask, profile: BounceProfile) -> Self {
        Self { terrain, profile }
    }

    /// Correct `motion` before it is integrated.
    ///
    /// `motion` is in terrain coordinates with velocity pointing the way the
    /// body travels. `intent` and `edges` must be the ones the caller is
    /// about to integrate with, so the look-ahead matches the real step.
    pub fn resolve(&self, motion: &mut MotionState, intent: Intent, edges: EdgePolicy) -> Bounce {
        let n = Neighbours::sample(self.terrain, motion.pos, self.profile.feeler);
        let mut out = Bounce::default();

        if (n.left && motion.vel.x < 0.0) || (n.right && motion.vel.x > 0.0) {
            motion.vel.x = self.reflect(motion.vel.x);
            out.x = true;
        }
        if (n.above && motion.vel.y < 0.0) || (n.below && motion.vel.y > 0.0) {
            motion.vel.y = self.reflect(motion.vel.y);
            out.y = true;
        }

        if self.profile.look_ahead && !out.x && !out.y {
            let next = motion.integrated(intent, edges);
            if self.terrain.is_solid_at_f(next.pos.x, next.pos.y) {
                self.escape(motion, next.pos);
                out.escaped = true;
            }
        }

        if self.profile.creep_nudge {
            let mut d = DVec2::ZERO;
            if n.above && intent.contains(Intent::UP) {
                d.y += 1.0;
            }
            if n.below && intent.contains(Intent::DOWN) {
                d.y -= 1.0;
            }
            if n.left && intent.contains(Intent::LEFT) {
                d.x += 1.0;
            }
            if n.right && intent.contains(Intent::RIGHT) {
                d.x -= 1.0;
            }
            motion.pos += d;
            out.nudge = d;
        }

        out
    }

    /// Flip one velocity component, applying the profile's speed floor.
    /// A resting axis stays at rest.
    fn reflect(&self, v: f64) -> f64 {
        if self.profile.reflect_floor && v != 0.0 {
            reflect_with_floor(v)
        } else {
            -v
        }
    }

    fn escape(&self, motion: &mut MotionState, blocked: DVec2) {
        motion.vel.x = self.reflect(motion.vel.x);
        motion.vel.y = self.reflect(motion.vel.y);
        motion.pos.x = back_off(motion.pos.x, blocked.x.trunc());
        motion.pos.y = back_off(motion.pos.y, blocked.y.trunc());
        motion.vel *= self.profile.escape_boost;
    }

    /// Resolve, integrate, and undo a step that still ended inside rock
    pub fn step(&self, motion: &mut MotionState, intent: Intent, edges: EdgePolicy) -> Bounce {
        let bounce = self.resolve(motion, intent, edges);
        let safe = motion.pos;
        motion.advance(intent, edges);

        if self.profile.revert_on_penetration && self.terrain.is_solid_at_f(motion.pos.x, motion.pos.y) {
            motion.pos = safe;
            let max = motion.max_velocity;
            motion.vel = (motion.vel * self.profile.escape_boost).clamp(DVec2::splat(-max), DVec2::splat(max));
        }
        bounce
    }
}

/// Move `p` back past where it tried to go, by the attempted distance plus margin
fn back_off(p: f64, blocked: f64) -> f64 {
    if blocked < p {
        p + (p - blocked) + ESCAPE_MARGIN
    } else if p < blocked {
        p - (blocked - p) - ESCAPE_MARGIN
    } else {
        p
    }
}

/// Reflect a creature's velocity component after it bumps the dragon.
///
/// The sign always flips; a reflected speed under [`BUMP_SLOW_THRESHOLD`]
/// is raised to [`BUMP_MIN_SPEED`] so the recoil is visible.
pub fn reflect_with_floor(v: f64) -> f64 {
    let r = -v;
    if r.abs() < BUMP_SLOW_THRESHOLD {
        if r < 0.0 { -BUMP_MIN_SPEED } else { BUMP_MIN_SPEED }
    } else {
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::mask::OutOfBounds;

    fn open_terrain() -> CollisionMask {
        CollisionMask::empty(200, 200, OutOfBounds::Solid)
    }

    fn edges() -> EdgePolicy {
        BodyKind::Creature.edge_policy(200, 200)
    }

    fn creature() -> BounceProfile {
        BounceProfile::for_body(BodyKind::Creature, 40, 40).unwrap()
    }

    #[test]
    fn test_feeler_reflects_opposing_axis_only() {
        let mut terrain = open_terrain();
        // wall just left of the body
        terrain.fill_rect(80, 0, 5, 200);
        let resolver = BounceResolver::new(&terrain, creature());
        let mut m = MotionState::at(DVec2::new(90.0, 100.0)).with_velocity(DVec2::new(-1.5, 0.7));
        let b = resolver.resolve(&mut m, Intent::NONE, edges());
        assert!(b.x && !b.y && !b.escaped);
        // slow creature leaves the wall at the minimum bounce speed
        assert_eq!(m.vel, DVec2::new(BUMP_MIN_SPEED, 0.7));

        let mut fast = MotionState::at(DVec2::new(90.0, 100.0)).with_velocity(DVec2::new(-2.5, 0.0));
        resolver.resolve(&mut fast, Intent::NONE, edges());
        assert_eq!(fast.vel.x, 2.5);
    }

    #[test]
    fn test_projectile_reflection_has_no_floor() {
        let mut terrain = open_terrain();
        terrain.fill_rect(80, 0, 5, 200);
        let profile = BounceProfile::for_body(BodyKind::Projectile, 40, 40).unwrap();
        let resolver = BounceResolver::new(&terrain, profile);
        let mut m = MotionState::at(DVec2::new(100.0, 100.0)).with_velocity(DVec2::new(-1.5, 0.0));
        let b = resolver.resolve(&mut m, Intent::NONE, BodyKind::Projectile.edge_policy(200, 200));
        assert!(b.x);
        assert_eq!(m.vel.x, 1.5);
    }

    #[test]
    fn test_slow_look_ahead_escape_is_floored() {
        let mut terrain = open_terrain();
        terrain.fill_rect(101, 100, 1, 1);
        let resolver = BounceResolver::new(&terrain, creature());
        let mut m = MotionState::at(DVec2::new(100.0, 100.0))
            .with_velocity(DVec2::new(1.5, 0.0))
            .with_gravity(1.0);
        let b = resolver.resolve(&mut m, Intent::NONE, edges());
        assert!(b.escaped);
        // floored to 5, then the creature boost
        assert_eq!(m.vel, DVec2::new(-BUMP_MIN_SPEED * 3.0, 0.0));
    }

    #[test]
    fn test_feeler_ignores_wall_behind_motion() {
        let mut terrain = open_terrain();
        terrain.fill_rect(80, 0, 5, 200);
        let resolver = BounceResolver::new(&terrain, creature());
        let mut m = MotionState::at(DVec2::new(90.0, 100.0)).with_velocity(DVec2::new(1.5, 0.0));
        let b = resolver.resolve(&mut m, Intent::NONE, edges());
        assert!(!b.any());
        assert_eq!(m.vel.x, 1.5);
    }

    #[test]
    fn test_both_axes_can_reflect() {
        let mut terrain = open_terrain();
        terrain.fill_rect(109, 0, 91, 200); // right
        terrain.fill_rect(0, 109, 200, 91); // below
        let resolver = BounceResolver::new(&terrain, creature());
        let mut m = MotionState::at(DVec2::new(100.0, 100.0)).with_velocity(DVec2::new(2.0, 2.0));
        let b = resolver.resolve(&mut m, Intent::NONE, edges());
        assert!(b.x && b.y);
        assert_eq!(m.vel, DVec2::new(-2.0, -2.0));
    }

    #[test]
    fn test_look_ahead_escape_backs_off_and_boosts() {
        let mut terrain = open_terrain();
        // a single rock pixel diagonal to the body, invisible to the axis feelers
        terrain.fill_rect(102, 102, 1, 1);
        let resolver = BounceResolver::new(&terrain, creature());
        let mut m = MotionState::at(DVec2::new(100.0, 100.0))
            .with_velocity(DVec2::new(2.0, 2.0))
            .with_gravity(1.0);
        let b = resolver.resolve(&mut m, Intent::NONE, edges());
        assert!(b.escaped);
        assert!(m.vel.x < 0.0 && m.vel.y < 0.0);
        assert!((m.vel.x + 6.0).abs() < 1e-9);
        // backed off the attempted 2 px plus the margin
        assert!((m.pos.x - (100.0 - 2.0 - ESCAPE_MARGIN)).abs() < 1e-9);
        assert!((m.pos.y - (100.0 - 2.0 - ESCAPE_MARGIN)).abs() < 1e-9);
    }

    #[test]
    fn test_projectile_escape_is_not_boosted() {
        let mut terrain = open_terrain();
        terrain.fill_rect(104, 100, 1, 1);
        let profile = BounceProfile::for_body(BodyKind::Projectile, 4, 4).unwrap();
        let resolver = BounceResolver::new(&terrain, profile);
        let mut m = MotionState::at(DVec2::new(100.0, 100.0))
            .with_velocity(DVec2::new(4.0, 0.0))
            .with_gravity(1.0);
        // feeler dx = 2 sees nothing at x=102
        let b = resolver.resolve(&mut m, Intent::NONE, BodyKind::Projectile.edge_policy(200, 200));
        assert!(b.escaped);
        assert_eq!(m.vel.x, -4.0);
    }

    #[test]
    fn test_creep_nudge_away_from_held_wall() {
        let mut terrain = open_terrain();
        terrain.fill_rect(0, 0, 200, 80); // ceiling
        let profile = BounceProfile::for_body(BodyKind::Protagonist, 40, 40).unwrap();
        let resolver = BounceResolver::new(&terrain, profile);
        let mut m = MotionState::at(DVec2::new(100.0, 85.0));
        let b = resolver.resolve(&mut m, Intent::UP, BodyKind::Protagonist.edge_policy(200, 200));
        assert_eq!(b.nudge, DVec2::new(0.0, 1.0));
        assert_eq!(m.pos.y, 86.0);
        // no push, no nudge
        let b = resolver.resolve(&mut m, Intent::NONE, BodyKind::Protagonist.edge_policy(200, 200));
        assert_eq!(b.nudge, DVec2::ZERO);
    }

    #[test]
    fn test_step_reverts_when_landing_in_rock() {
        let mut terrain = open_terrain();
        terrain.fill_rect(102, 100, 1, 1);
        let mut profile = creature();
        profile.look_ahead = false;
        let resolver = BounceResolver::new(&terrain, profile);
        let mut m = MotionState::at(DVec2::new(100.0, 100.0))
            .with_velocity(DVec2::new(2.0, 0.0))
            .with_gravity(1.0)
            .with_max_velocity(2.5);
        resolver.step(&mut m, Intent::NONE, edges());
        assert_eq!(m.pos, DVec2::new(100.0, 100.0));
        assert!(m.vel.x.abs() <= 2.5);
    }

    #[test]
    fn test_reflect_with_floor() {
        assert_eq!(reflect_with_floor(3.0), -3.0);
        assert_eq!(reflect_with_floor(-4.5), 4.5);
        assert_eq!(reflect_with_floor(1.0), -5.0);
        assert_eq!(reflect_with_floor(-0.3), 5.0);
    }
}
