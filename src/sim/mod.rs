//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only, timers run on a virtual clock
//! - Stable iteration order (eggs by id)
//! - No rendering or platform dependencies

pub mod bounce;
pub mod collision;
pub mod egg;
pub mod mask;
pub mod motion;
pub mod projectile;
pub mod protagonist;
pub mod schedule;
pub mod state;
pub mod tick;

pub use bounce::{Bounce, BounceProfile, BounceResolver, reflect_with_floor};
pub use collision::{CollisionRules, check_collisions};
pub use egg::{CreatureSprite, Egg, EggStage};
pub use mask::{CollisionMask, OutOfBounds};
pub use motion::{Advance, BodyKind, EdgePolicy, Intent, MotionState};
pub use projectile::{Projectile, ProjectileForm};
pub use protagonist::Protagonist;
pub use schedule::{EggTimer, GameClock, Scheduler, TimerEvent, TimerId};
pub use state::{GameEvent, GameState, Scoreboard};
pub use tick::{TickInput, tick};
