//! Game state and core simulation types
//!
//! Everything one scene owns lives here: terrain, the dragon, its fireball,
//! the eggs, the score/life record and the virtual clock that drives every
//! timer.

use serde::{Deserialize, Serialize};

use super::egg::Egg;
use super::mask::CollisionMask;
use super::projectile::{Projectile, ProjectileForm};
use super::protagonist::Protagonist;
use super::schedule::{GameClock, TimerEvent};
use crate::consts::*;
use crate::error::Result;
use crate::level::Level;
use crate::settings::Tuning;

/// Notable things that happened during a tick, for a HUD or sound layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    EggAppeared { egg: usize },
    EggRipened { egg: usize },
    EggHatched { egg: usize },
    /// A killed creature finished burning
    CreatureVanished { egg: usize },
    /// Ripe egg eaten (+1)
    EggEaten { egg: usize },
    /// Unripe egg eaten (life penalty)
    UnripeEggEaten { egg: usize },
    /// A hungry creature bit the dragon
    CreatureBite { egg: usize },
    /// Creature bounced off the dragon
    CreatureRepelled { egg: usize },
    /// Fireball destroyed an unhatched egg (-1)
    EggBurned { egg: usize },
    CreatureKilled { egg: usize },
    ShotFired { form: ProjectileForm },
    ProjectileReady,
    GameOver,
}

/// Score and life, the only values shared between entities
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub score: i64,
    /// In [0, 1]
    pub life: f64,
}

impl Default for Scoreboard {
    fn default() -> Self {
        Self { score: 0, life: 1.0 }
    }
}

impl Scoreboard {
    /// Lose `amount` of life, never going below zero
    pub fn damage(&mut self, amount: f64) {
        self.life = (self.life - amount).max(0.0);
    }
}

/// Complete scene state (deterministic for a given terrain and input sequence)
#[derive(Debug, Clone)]
pub struct GameState {
    pub tuning: Tuning,
    /// Terrain raster; outside is rock
    pub terrain: CollisionMask,
    /// Creature sprite raster used for projectile hit-tests; outside is clear
    pub creature_mask: CollisionMask,
    pub level: Level,
    pub protagonist: Protagonist,
    pub projectile: Projectile,
    /// One per level record, indexed by egg id
    pub eggs: Vec<Egg>,
    pub board: Scoreboard,
    pub clock: GameClock,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub(crate) events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(tuning: Tuning, level: Level, terrain: CollisionMask, creature_mask: CollisionMask) -> Result<Self> {
        tuning.validate()?;
        level.validate()?;

        let mut clock = GameClock::new();
        let eggs = spawn_eggs(&level, &tuning, &mut clock)?;
        log::info!(
            "Scene ready: {} eggs on a {}x{} cavern",
            eggs.len(),
            terrain.width(),
            terrain.height()
        );

        Ok(Self {
            protagonist: Protagonist::new(&tuning, terrain.height()),
            projectile: Projectile::new(&tuning),
            eggs,
            board: Scoreboard::default(),
            clock,
            time_ticks: 0,
            events: Vec::new(),
            tuning,
            terrain,
            creature_mask,
            level,
        })
    }

    /// Start the scene over with the same terrain and level
    pub fn restart(&mut self) -> Result<()> {
        let mut clock = GameClock::new();
        self.eggs = spawn_eggs(&self.level, &self.tuning, &mut clock)?;
        self.clock = clock;
        self.protagonist = Protagonist::new(&self.tuning, self.terrain.height());
        self.projectile = Projectile::new(&self.tuning);
        self.board = Scoreboard::default();
        self.time_ticks = 0;
        self.events.clear();
        log::info!("Game restarted");
        Ok(())
    }

    /// Launch the fireball from the dragon
    pub fn fire(&mut self) {
        self.projectile.fire(
            self.protagonist.map_position(),
            self.protagonist.background().vel,
            self.protagonist.facing_right(),
            &mut self.clock,
        );
        self.events.push(GameEvent::ShotFired {
            form: self.projectile.form(),
        });
    }

    /// Hand every due timer to its owner
    pub fn fire_due_timers(&mut self) {
        while let Some((_, event)) = self.clock.pop_due() {
            match event {
                TimerEvent::Egg { egg, timer } => {
                    let Some(egg) = self.eggs.get_mut(egg) else {
                        log::debug!("timer {:?} for unknown egg", timer);
                        continue;
                    };
                    if let Some(e) = egg.on_timer(timer, &mut self.clock) {
                        self.events.push(e);
                    }
                }
                TimerEvent::Recharge => {
                    let was_ready = self.projectile.is_ready();
                    self.projectile.on_recharge_step(&mut self.clock);
                    if !was_ready && self.projectile.is_ready() {
                        self.events.push(GameEvent::ProjectileReady);
                    }
                }
            }
        }
    }

    /// Take the events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    #[inline]
    pub fn score(&self) -> i64 {
        self.board.score
    }

    #[inline]
    pub fn life(&self) -> f64 {
        self.board.life
    }

    pub fn is_dead(&self) -> bool {
        self.board.life <= 0.0
    }

    /// Simulated time since the scene started
    pub fn elapsed_seconds(&self) -> f64 {
        (self.time_ticks * TICK_MS) as f64 / 1000.0
    }

    /// Simulated time in milliseconds
    #[inline]
    pub fn elapsed_ms(&self) -> u64 {
        self.time_ticks * TICK_MS
    }
}

fn spawn_eggs(level: &Level, tuning: &Tuning, clock: &mut GameClock) -> Result<Vec<Egg>> {
    level
        .eggs
        .iter()
        .enumerate()
        .map(|(id, spawn)| {
            let mut egg = Egg::new(id, spawn, tuning)?;
            egg.start(clock);
            Ok(egg)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::EggSpawn;
    use crate::sim::egg::EggStage;
    use crate::sim::mask::OutOfBounds;

    fn scene(eggs: Vec<EggSpawn>) -> GameState {
        let tuning = Tuning::default();
        let terrain = CollisionMask::empty(2000, 1500, OutOfBounds::Solid);
        let sprite = CollisionMask::filled(tuning.creature.width, tuning.creature.height, OutOfBounds::Clear);
        GameState::new(tuning, Level::new(eggs).unwrap(), terrain, sprite).unwrap()
    }

    #[test]
    fn test_new_scene() {
        let state = scene(vec![
            EggSpawn::new(100.0, 100.0, 0.0, 10.0, 5.0),
            EggSpawn::new(200.0, 100.0, 2.0, 10.0, 5.0),
        ]);
        assert_eq!(state.score(), 0);
        assert_eq!(state.life(), 1.0);
        assert_eq!(state.eggs[0].stage(), EggStage::NotReady);
        assert_eq!(state.eggs[1].stage(), EggStage::NonExistent);
        assert!(!state.is_dead());
    }

    #[test]
    fn test_rejects_invalid_tuning() {
        let tuning = Tuning {
            gravity: 2.0,
            ..Default::default()
        };
        let terrain = CollisionMask::empty(10, 10, OutOfBounds::Solid);
        let sprite = CollisionMask::filled(4, 4, OutOfBounds::Clear);
        assert!(GameState::new(tuning, Level::default(), terrain, sprite).is_err());
    }

    #[test]
    fn test_timers_dispatch_to_eggs() {
        let mut state = scene(vec![EggSpawn::new(100.0, 100.0, 1.0, 1.0, 1.0)]);
        state.clock.advance_to(1_000);
        state.fire_due_timers();
        assert_eq!(state.eggs[0].stage(), EggStage::NotReady);
        assert_eq!(state.drain_events(), vec![GameEvent::EggAppeared { egg: 0 }]);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_recharge_reports_ready() {
        let mut state = scene(vec![]);
        state.fire();
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::ShotFired {
                form: ProjectileForm::Fire
            }]
        );
        state.clock.advance_to(4_000);
        state.fire_due_timers();
        assert!(state.projectile.is_ready());
        assert_eq!(state.drain_events(), vec![GameEvent::ProjectileReady]);
    }

    #[test]
    fn test_damage_floors_at_zero() {
        let mut board = Scoreboard::default();
        board.damage(0.75);
        board.damage(0.75);
        assert_eq!(board.life, 0.0);
    }

    #[test]
    fn test_restart_resets_scene() {
        let mut state = scene(vec![EggSpawn::new(100.0, 100.0, 0.0, 1.0, 1.0)]);
        state.board.score = 4;
        state.board.damage(0.5);
        state.time_ticks = 500;
        state.eggs[0].eaten(&mut state.clock);

        state.restart().unwrap();
        assert_eq!(state.score(), 0);
        assert_eq!(state.life(), 1.0);
        assert_eq!(state.elapsed_seconds(), 0.0);
        assert_eq!(state.eggs[0].stage(), EggStage::NotReady);
    }
}
