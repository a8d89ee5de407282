//! Dragon/egg and fireball/egg contact rules
//!
//! Each egg is checked on its own every tick, dragon rules first. Eating an
//! egg ends the check; a creature the dragon touched can still be hit by the
//! fireball in the same tick.
//!
//! | contact            | stage      | effect                                  |
//! |--------------------|------------|-----------------------------------------|
//! | dragon             | `Ready`    | +1 score, egg eaten                     |
//! | dragon             | `NotReady` | life penalty, egg eaten                 |
//! | dragon             | `Hatched`  | bite if hungry, creature recoils        |
//! | fireball (fire)    | unhatched  | -1 score, egg destroyed                 |
//! | fireball (fire)    | `Hatched`  | creature killed, fireball spent         |
//!
//! Dragon distance is measured on screen (egg plus background offset against
//! the pinned dragon); fireball distance in cavern coordinates.

use glam::DVec2;

use super::egg::{Egg, EggStage};
use super::mask::CollisionMask;
use super::projectile::Projectile;
use super::schedule::GameClock;
use super::state::{GameEvent, GameState, Scoreboard};
use crate::pixel_distance;
use crate::settings::Tuning;

/// Reach and damage values derived from sprite sizes and tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionRules {
    /// Dragon-to-egg distance that counts as contact
    pub dragon_reach: i64,
    /// Fireball-to-egg distance that burns an unhatched egg
    pub shot_reach: i64,
    /// Diagonal offsets of the four outer points of the fireball hit-test
    pub hit_offset: DVec2,
    pub creature_damage: f64,
    pub unripe_penalty: f64,
}

impl CollisionRules {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            dragon_reach: (tuning.dragon.width / 3) as i64,
            shot_reach: 2 * tuning.fireball.width as i64,
            hit_offset: DVec2::new((tuning.fireball.width / 4) as f64, (tuning.fireball.height / 4) as f64),
            creature_damage: tuning.creature_damage,
            unripe_penalty: tuning.unripe_penalty,
        }
    }

    /// Five-point overlap test of a fireball centred at `center` against the
    /// creature's sprite: the centre plus four diagonal corners
    pub fn shot_hits(&self, egg: &Egg, center: DVec2, sprite: &CollisionMask) -> bool {
        let DVec2 { x: dx, y: dy } = self.hit_offset;
        [
            center,
            center + DVec2::new(-dx, -dy),
            center + DVec2::new(dx, -dy),
            center + DVec2::new(-dx, dy),
            center + DVec2::new(dx, dy),
        ]
        .into_iter()
        .any(|p| egg.sprite_solid_at(sprite, p))
    }

    /// Apply the contact rules to one egg, recording each that fires
    fn check_egg(&self, egg: &mut Egg, cx: &mut Contacts<'_>) {
        let id = egg.id();
        let near_dragon = pixel_distance(cx.dragon, egg.world_position(cx.offset)) < self.dragon_reach;

        if near_dragon {
            match egg.stage() {
                EggStage::Ready => {
                    egg.eaten(cx.clock);
                    cx.board.score += 1;
                    cx.events.push(GameEvent::EggEaten { egg: id });
                    return;
                }
                EggStage::NotReady => {
                    egg.eaten(cx.clock);
                    cx.board.damage(self.unripe_penalty);
                    log::info!("Ate unripe egg {}, life {:.2}", id, cx.board.life);
                    cx.events.push(GameEvent::UnripeEggEaten { egg: id });
                    return;
                }
                EggStage::Hatched => {
                    let bite = egg.is_hungry();
                    if bite {
                        cx.board.damage(self.creature_damage);
                        egg.took_a_bite(cx.clock);
                    }
                    egg.recoil();
                    cx.events.push(if bite {
                        GameEvent::CreatureBite { egg: id }
                    } else {
                        GameEvent::CreatureRepelled { egg: id }
                    });
                    // still in reach of a fireball this tick
                }
                _ => {}
            }
        }

        if !cx.projectile.is_hot() {
            return;
        }
        let shot = cx.projectile.position();
        match egg.stage() {
            EggStage::NotReady | EggStage::Ready if pixel_distance(shot, egg.position()) < self.shot_reach => {
                egg.eaten(cx.clock);
                cx.board.score -= 1;
                log::info!("Fireball destroyed egg {} before it hatched", id);
                cx.events.push(GameEvent::EggBurned { egg: id });
            }
            EggStage::Hatched if self.shot_hits(egg, shot, cx.sprite) => {
                egg.creature_shot(cx.clock);
                cx.projectile.deactivate();
                log::info!("Creature {} killed", id);
                cx.events.push(GameEvent::CreatureKilled { egg: id });
            }
            _ => {}
        }
    }
}

/// Everything an egg can touch or change during a check
struct Contacts<'a> {
    /// Dragon's screen position
    dragon: DVec2,
    /// Background offset (cavern to screen)
    offset: DVec2,
    projectile: &'a mut Projectile,
    sprite: &'a CollisionMask,
    board: &'a mut Scoreboard,
    clock: &'a mut GameClock,
    events: &'a mut Vec<GameEvent>,
}

/// Run the contact rules for every egg; returns how many fired
pub fn check_collisions(state: &mut GameState) -> usize {
    let rules = CollisionRules::from_tuning(&state.tuning);
    let before = state.events.len();
    let mut cx = Contacts {
        dragon: state.protagonist.screen_position(),
        offset: state.protagonist.background_offset(),
        projectile: &mut state.projectile,
        sprite: &state.creature_mask,
        board: &mut state.board,
        clock: &mut state.clock,
        events: &mut state.events,
    };

    for egg in state.eggs.iter_mut() {
        rules.check_egg(egg, &mut cx);
    }
    state.events.len() - before
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{EggSpawn, Level};
    use crate::sim::mask::OutOfBounds;

    fn scene(spawn: EggSpawn) -> GameState {
        let tuning = Tuning::default();
        let terrain = CollisionMask::empty(2000, 1500, OutOfBounds::Solid);
        let sprite = CollisionMask::filled(tuning.creature.width, tuning.creature.height, OutOfBounds::Clear);
        GameState::new(tuning, Level::new(vec![spawn]).unwrap(), terrain, sprite).unwrap()
    }

    fn run_to(state: &mut GameState, t: u64) {
        state.clock.advance_to(t);
        state.fire_due_timers();
        state.drain_events();
    }

    /// Put egg 0 at a cavern position relative to the dragon
    fn place_near_dragon(state: &mut GameState, delta: DVec2) {
        let p = state.protagonist.map_position() + delta;
        state.eggs[0].motion_mut().pos = p;
    }

    fn far_away() -> EggSpawn {
        EggSpawn::new(1900.0, 100.0, 0.0, 10.0, 5.0)
    }

    #[test]
    fn test_rules_from_default_tuning() {
        let rules = CollisionRules::from_tuning(&Tuning::default());
        assert_eq!(rules.dragon_reach, 50);
        assert_eq!(rules.shot_reach, 80);
        assert_eq!(rules.hit_offset, DVec2::new(10.0, 10.0));
    }

    #[test]
    fn test_eating_ready_egg_scores_once() {
        let mut state = scene(far_away());
        run_to(&mut state, 10_000);
        assert_eq!(state.eggs[0].stage(), EggStage::Ready);

        place_near_dragon(&mut state, DVec2::new(20.0, -10.0));
        assert_eq!(check_collisions(&mut state), 1);
        assert_eq!(state.score(), 1);
        assert_eq!(state.eggs[0].stage(), EggStage::Eaten);

        assert_eq!(check_collisions(&mut state), 0);
        assert_eq!(state.score(), 1);
        assert_eq!(state.eggs[0].stage(), EggStage::Eaten);
    }

    #[test]
    fn test_eating_unripe_egg_costs_life() {
        let mut state = scene(far_away());
        place_near_dragon(&mut state, DVec2::ZERO);
        check_collisions(&mut state);
        assert_eq!(state.score(), 0);
        assert!((state.life() - 0.9).abs() < 1e-12);
        assert_eq!(state.eggs[0].stage(), EggStage::Eaten);
        assert_eq!(state.drain_events(), vec![GameEvent::UnripeEggEaten { egg: 0 }]);
    }

    #[test]
    fn test_egg_out_of_reach_is_untouched() {
        let mut state = scene(far_away());
        place_near_dragon(&mut state, DVec2::new(50.0, 0.0));
        assert_eq!(check_collisions(&mut state), 0);
        assert_eq!(state.eggs[0].stage(), EggStage::NotReady);
    }

    #[test]
    fn test_hungry_creature_bites_then_only_recoils() {
        let mut state = scene(EggSpawn::new(1900.0, 100.0, 0.0, 1.0, 1.0));
        run_to(&mut state, 2_000);
        assert_eq!(state.eggs[0].stage(), EggStage::Hatched);

        place_near_dragon(&mut state, DVec2::ZERO);
        state.eggs[0].motion_mut().vel = DVec2::new(1.0, -3.0);
        check_collisions(&mut state);
        assert!((state.life() - 0.9).abs() < 1e-12);
        assert!(!state.eggs[0].is_hungry());
        assert_eq!(state.eggs[0].motion().vel, DVec2::new(-5.0, 3.0));

        check_collisions(&mut state);
        assert!((state.life() - 0.9).abs() < 1e-12);
        assert_eq!(state.eggs[0].motion().vel, DVec2::new(5.0, -3.0));
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::CreatureBite { egg: 0 }, GameEvent::CreatureRepelled { egg: 0 }]
        );
        assert_eq!(state.eggs[0].stage(), EggStage::Hatched);
    }

    #[test]
    fn test_fire_burns_unhatched_egg_in_either_stage() {
        for ripen_first in [false, true] {
            let mut state = scene(far_away());
            if ripen_first {
                run_to(&mut state, 10_000);
            }
            let before = state.eggs[0].stage();
            state.fire();
            let shot = state.projectile.position();
            state.eggs[0].motion_mut().pos = shot + DVec2::new(30.0, 0.0);

            check_collisions(&mut state);
            assert_eq!(state.score(), -1, "from {before:?}");
            assert_eq!(state.eggs[0].stage(), EggStage::Eaten);
            // the fireball keeps flying
            assert!(state.projectile.is_fired());
        }
    }

    #[test]
    fn test_smoke_is_harmless() {
        let mut state = scene(far_away());
        state.fire();
        state.fire();
        assert!(!state.projectile.is_hot());
        let shot = state.projectile.position();
        state.eggs[0].motion_mut().pos = shot;
        assert_eq!(check_collisions(&mut state), 0);
        assert_eq!(state.eggs[0].stage(), EggStage::NotReady);
    }

    #[test]
    fn test_fire_kills_hatched_creature() {
        let mut state = scene(EggSpawn::new(1900.0, 100.0, 0.0, 1.0, 1.0));
        run_to(&mut state, 2_000);
        state.fire();
        let shot = state.projectile.position();
        state.eggs[0].motion_mut().pos = shot + DVec2::new(35.0, 35.0);

        check_collisions(&mut state);
        assert_eq!(state.eggs[0].stage(), EggStage::Killed);
        assert!(!state.projectile.is_fired());
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn test_creature_bitten_and_shot_in_one_tick() {
        let mut state = scene(EggSpawn::new(1900.0, 100.0, 0.0, 1.0, 1.0));
        run_to(&mut state, 2_000);
        state.fire();
        state.drain_events();
        // creature 25 px from the dragon, fireball 25 px beyond it
        place_near_dragon(&mut state, DVec2::new(25.0, 0.0));

        assert_eq!(check_collisions(&mut state), 2);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::CreatureBite { egg: 0 }, GameEvent::CreatureKilled { egg: 0 }]
        );
        assert!((state.life() - 0.9).abs() < 1e-12);
        assert_eq!(state.eggs[0].stage(), EggStage::Killed);
        assert!(!state.projectile.is_fired());
    }

    #[test]
    fn test_shot_hit_test_uses_sprite_bounds() {
        let state = scene(EggSpawn::new(500.0, 500.0, 0.0, 1.0, 1.0));
        let rules = CollisionRules::from_tuning(&state.tuning);
        let egg = &state.eggs[0];
        let sprite = &state.creature_mask;
        // only the upper-left diagonal point lands on the 60x60 sprite
        assert!(rules.shot_hits(egg, DVec2::new(535.0, 535.0), sprite));
        assert!(!rules.shot_hits(egg, DVec2::new(545.0, 545.0), sprite));
        assert!(rules.shot_hits(egg, DVec2::new(500.0, 500.0), sprite));
    }
}
