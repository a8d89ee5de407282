//! Egg → creature lifecycle
//!
//! ```text
//! NonExistent -appear-> NotReady -ripen-> Ready -hatch-> Hatched -shot-> Killed -3s-> NonExistent
//!                          \______________/
//!                            eaten() -> Eaten
//! ```
//!
//! `Eaten` and the `NonExistent` a killed creature decays into are terminal.
//! Every timer re-checks its stage when it fires; a stale timer cancels its
//! pre-hatch siblings and does nothing else.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::bounce::{BounceProfile, BounceResolver, reflect_with_floor};
use super::mask::CollisionMask;
use super::motion::{Advance, BodyKind, Intent, MotionState};
use super::schedule::{EggTimer, GameClock, TimerEvent};
use super::state::GameEvent;
use crate::consts::MAX_BLUENESS;
use crate::error::Result;
use crate::level::EggSpawn;
use crate::pixel_distance;
use crate::settings::{SpriteSize, Tuning, seconds_to_ms};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EggStage {
    NonExistent,
    NotReady,
    Ready,
    Hatched,
    Killed,
    Eaten,
}

/// Which sprite set a creature is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CreatureSprite {
    #[default]
    Normal,
    OnFire,
}

/// Per-egg durations, already converted to milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Timing {
    appear_ms: u64,
    ripen_ms: u64,
    hatch_ms: u64,
    hunger_ms: u64,
    vanish_ms: u64,
    blueness_step: u8,
}

#[derive(Debug, Clone)]
pub struct Egg {
    id: usize,
    stage: EggStage,
    blueness: u8,
    hungry: bool,
    /// Set once a killed creature has disappeared; no further changes
    retired: bool,
    sprite: CreatureSprite,
    timing: Timing,
    motion: MotionState,
    size: SpriteSize,
}

impl Egg {
    /// Build an egg from its spawn record; `id` is its index in the scene
    pub fn new(id: usize, spawn: &EggSpawn, tuning: &Tuning) -> Result<Self> {
        spawn.validate(id)?;
        Ok(Self {
            id,
            stage: EggStage::NonExistent,
            blueness: 0,
            hungry: true,
            retired: false,
            sprite: CreatureSprite::Normal,
            timing: Timing {
                appear_ms: seconds_to_ms(spawn.appear_delay),
                ripen_ms: seconds_to_ms(spawn.ripen_delay),
                hatch_ms: seconds_to_ms(spawn.hatch_delay),
                hunger_ms: seconds_to_ms(tuning.hunger_cooldown_seconds),
                vanish_ms: seconds_to_ms(tuning.kill_decay_seconds),
                blueness_step: tuning.blueness_step.max(1),
            },
            motion: MotionState::at(DVec2::new(spawn.x, spawn.y))
                .with_acceleration(tuning.acceleration)
                .with_gravity(tuning.gravity)
                .with_max_velocity(tuning.creature_max_velocity()),
            size: tuning.creature,
        })
    }

    /// Arm the appear timer. A zero delay appears immediately.
    pub fn start(&mut self, clock: &mut GameClock) {
        if self.timing.appear_ms == 0 {
            self.appear(clock);
        } else {
            self.schedule(clock, self.timing.appear_ms, EggTimer::Appear);
        }
    }

    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    #[inline]
    pub fn stage(&self) -> EggStage {
        self.stage
    }

    #[inline]
    pub fn blueness(&self) -> u8 {
        self.blueness
    }

    #[inline]
    pub fn is_hungry(&self) -> bool {
        self.hungry
    }

    pub fn sprite(&self) -> CreatureSprite {
        self.sprite
    }

    pub fn size(&self) -> SpriteSize {
        self.size
    }

    /// No further stage change can happen
    pub fn is_terminal(&self) -> bool {
        self.stage == EggStage::Eaten || self.retired
    }

    /// Egg tint: white fading to blue as it ripens
    pub fn color(&self) -> [u8; 3] {
        let c = MAX_BLUENESS - self.blueness;
        [c, c, MAX_BLUENESS]
    }

    /// Position in terrain coordinates
    #[inline]
    pub fn position(&self) -> DVec2 {
        self.motion.pos
    }

    /// Position on screen, given the background's scroll offset
    #[inline]
    pub fn world_position(&self, background_offset: DVec2) -> DVec2 {
        self.motion.pos + background_offset
    }

    pub fn motion(&self) -> &MotionState {
        &self.motion
    }

    pub fn motion_mut(&mut self) -> &mut MotionState {
        &mut self.motion
    }

    fn schedule(&self, clock: &mut GameClock, delay_ms: u64, timer: EggTimer) {
        clock.schedule_in(delay_ms, TimerEvent::Egg { egg: self.id, timer });
    }

    fn cancel(&self, clock: &mut GameClock, filter: impl Fn(EggTimer) -> bool) -> usize {
        let id = self.id;
        clock.cancel_where(|e| e.is_egg_timer(id, &filter))
    }

    fn cancel_pre_hatch(&self, clock: &mut GameClock) {
        let n = self.cancel(clock, EggTimer::is_pre_hatch);
        if n > 0 {
            log::debug!("egg {}: cancelled {} pre-hatch timers", self.id, n);
        }
    }

    fn appear(&mut self, clock: &mut GameClock) {
        self.stage = EggStage::NotReady;
        self.schedule(clock, self.timing.ripen_ms, EggTimer::Ripen);

        // Spread the colour steps so the last one lands as the egg ripens
        let steps = (MAX_BLUENESS / self.timing.blueness_step) as u64;
        let period = self.timing.ripen_ms / steps;
        if period == 0 {
            self.blueness = MAX_BLUENESS;
        } else {
            clock.schedule_every(period, TimerEvent::Egg { egg: self.id, timer: EggTimer::Blueness });
        }
    }

    /// Apply a fired timer. Returns an event for notable transitions.
    pub fn on_timer(&mut self, timer: EggTimer, clock: &mut GameClock) -> Option<GameEvent> {
        match timer {
            EggTimer::Appear => {
                if self.stage != EggStage::NonExistent || self.retired {
                    self.stale(timer, clock);
                    return None;
                }
                self.appear(clock);
                Some(GameEvent::EggAppeared { egg: self.id })
            }
            EggTimer::Blueness => {
                if self.stage != EggStage::NotReady {
                    self.stale(timer, clock);
                    return None;
                }
                self.blueness = self.blueness.saturating_add(self.timing.blueness_step);
                if self.blueness >= MAX_BLUENESS {
                    self.cancel(clock, |t| t == EggTimer::Blueness);
                }
                None
            }
            EggTimer::Ripen => {
                if self.stage != EggStage::NotReady {
                    self.stale(timer, clock);
                    return None;
                }
                self.cancel(clock, |t| t == EggTimer::Blueness);
                self.blueness = MAX_BLUENESS;
                self.stage = EggStage::Ready;
                self.schedule(clock, self.timing.hatch_ms, EggTimer::Hatch);
                Some(GameEvent::EggRipened { egg: self.id })
            }
            EggTimer::Hatch => {
                if self.stage != EggStage::Ready {
                    self.stale(timer, clock);
                    return None;
                }
                self.stage = EggStage::Hatched;
                self.hungry = true;
                log::info!("Egg {} has hatched!", self.id);
                Some(GameEvent::EggHatched { egg: self.id })
            }
            EggTimer::HungerRestored => {
                if self.stage == EggStage::Hatched {
                    self.hungry = true;
                }
                None
            }
            EggTimer::Vanish => {
                if self.stage != EggStage::Killed {
                    log::debug!("egg {}: vanish timer fired in {:?}", self.id, self.stage);
                    return None;
                }
                self.stage = EggStage::NonExistent;
                self.retired = true;
                Some(GameEvent::CreatureVanished { egg: self.id })
            }
        }
    }

    fn stale(&self, timer: EggTimer, clock: &mut GameClock) {
        log::debug!("egg {}: {:?} timer fired in {:?}, ignoring", self.id, timer, self.stage);
        self.cancel_pre_hatch(clock);
    }

    /// The dragon eats the egg.
    ///
    /// Valid from `NotReady` or `Ready`; cancels every pending pre-hatch
    /// timer. Anywhere else it is a logged no-op. Returns whether it applied.
    pub fn eaten(&mut self, clock: &mut GameClock) -> bool {
        match self.stage {
            EggStage::NotReady | EggStage::Ready => {
                self.cancel_pre_hatch(clock);
                self.stage = EggStage::Eaten;
                true
            }
            EggStage::NonExistent => false,
            EggStage::Hatched | EggStage::Killed | EggStage::Eaten => {
                log::warn!("eaten() called on egg {} while {:?}", self.id, self.stage);
                false
            }
        }
    }

    /// A fire-form projectile hit the hatched creature.
    ///
    /// Switches to the on-fire sprite and starts the disappearance timer.
    pub fn creature_shot(&mut self, clock: &mut GameClock) -> bool {
        if self.stage != EggStage::Hatched {
            log::warn!("creature_shot() called on egg {} while {:?}", self.id, self.stage);
            return false;
        }
        self.stage = EggStage::Killed;
        self.sprite = CreatureSprite::OnFire;
        self.cancel(clock, |t| t == EggTimer::HungerRestored);
        self.schedule(clock, self.timing.vanish_ms, EggTimer::Vanish);
        true
    }

    /// The creature bit the dragon; it is sated for the cooldown
    pub fn took_a_bite(&mut self, clock: &mut GameClock) {
        self.hungry = false;
        self.cancel(clock, |t| t == EggTimer::HungerRestored);
        self.schedule(clock, self.timing.hunger_ms, EggTimer::HungerRestored);
    }

    /// Bounce off the dragon: flip both axes, with a minimum recoil speed
    pub fn recoil(&mut self) {
        self.motion.vel.x = reflect_with_floor(self.motion.vel.x);
        self.motion.vel.y = reflect_with_floor(self.motion.vel.y);
    }

    /// Steering toward the dragon when hungry and within `sense_radius`
    pub fn chase_intent(&self, background_offset: DVec2, dragon: DVec2, sense_radius: f64) -> Intent {
        if self.stage != EggStage::Hatched || !self.hungry {
            return Intent::NONE;
        }
        let me = self.world_position(background_offset).trunc();
        let dragon = dragon.trunc();
        if (pixel_distance(dragon, me) as f64) < sense_radius {
            Intent::toward(me, dragon)
        } else {
            Intent::NONE
        }
    }

    /// Is the creature's own sprite opaque at terrain point `p`?
    ///
    /// The sprite is centred on the creature; points outside it never hit.
    pub fn sprite_solid_at(&self, sprite: &CollisionMask, p: DVec2) -> bool {
        let x = p.x as i32 - self.motion.pos.x as i32 + sprite.width() as i32 / 2;
        let y = p.y as i32 - self.motion.pos.y as i32 + sprite.height() as i32 / 2;
        sprite.is_solid_at(x, y)
    }
}

impl Advance for Egg {
    fn kind(&self) -> BodyKind {
        BodyKind::Creature
    }

    /// Only a hatched creature moves
    fn advance(&mut self, intent: Intent, terrain: &CollisionMask) -> MotionState {
        if self.stage != EggStage::Hatched {
            return self.motion;
        }
        let edges = self.kind().edge_policy(terrain.width(), terrain.height());
        if let Some(profile) = BounceProfile::for_body(self.kind(), self.size.width, self.size.height) {
            BounceResolver::new(terrain, profile).step(&mut self.motion, intent, edges);
        }
        self.motion
    }
}
