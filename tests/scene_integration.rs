//! Whole-scene integration tests driven through `tick`

use dragon_flier::consts::*;
use dragon_flier::sim::*;
use dragon_flier::{EggSpawn, Level, Tuning};
use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

fn open_scene(eggs: Vec<EggSpawn>) -> GameState {
    let tuning = Tuning::default();
    let terrain = CollisionMask::empty(2000, 1500, OutOfBounds::Solid);
    let sprite = CollisionMask::filled(tuning.creature.width, tuning.creature.height, OutOfBounds::Clear);
    GameState::new(tuning, Level::new(eggs).unwrap(), terrain, sprite).unwrap()
}

/// Tick with no input until the scene clock reads `seconds`
fn idle_until(state: &mut GameState, seconds: f64) {
    let target = (seconds * 1000.0) as u64 / TICK_MS;
    while state.time_ticks < target {
        tick(state, &TickInput::default());
    }
}

/// Move egg 0 on top of the dragon
fn egg_onto_dragon(state: &mut GameState) {
    let p = state.protagonist.map_position();
    state.eggs[0].motion_mut().pos = p;
}

fn far_egg() -> EggSpawn {
    EggSpawn::new(1900.0, 100.0, 0.0, 10.0, 5.0)
}

#[test]
fn test_egg_lifecycle_and_eating_scenario() {
    let mut state = open_scene(vec![far_egg()]);
    assert_eq!(state.eggs[0].stage(), EggStage::NotReady);

    idle_until(&mut state, 9.995);
    assert_eq!(state.eggs[0].stage(), EggStage::NotReady);
    idle_until(&mut state, 10.0);
    assert_eq!(state.eggs[0].stage(), EggStage::Ready);
    assert_eq!(state.eggs[0].blueness(), 255);

    idle_until(&mut state, 12.0);
    egg_onto_dragon(&mut state);
    tick(&mut state, &TickInput::default());
    assert_eq!(state.score(), 1);
    assert_eq!(state.eggs[0].stage(), EggStage::Eaten);
    assert!(state.drain_events().contains(&GameEvent::EggEaten { egg: 0 }));

    idle_until(&mut state, 16.0);
    egg_onto_dragon(&mut state);
    tick(&mut state, &TickInput::default());
    assert_eq!(state.score(), 1);
    assert_eq!(state.eggs[0].stage(), EggStage::Eaten);
}

#[test]
fn test_untouched_egg_hatches_on_time() {
    let mut state = open_scene(vec![far_egg()]);
    idle_until(&mut state, 14.995);
    assert_eq!(state.eggs[0].stage(), EggStage::Ready);
    idle_until(&mut state, 15.0);
    assert_eq!(state.eggs[0].stage(), EggStage::Hatched);
    assert!(state.eggs[0].is_hungry());

    let events = state.drain_events();
    let stages: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, GameEvent::EggRipened { .. } | GameEvent::EggHatched { .. }))
        .collect();
    assert_eq!(
        stages,
        vec![&GameEvent::EggRipened { egg: 0 }, &GameEvent::EggHatched { egg: 0 }]
    );
}

#[test]
fn test_fireball_burns_unhatched_egg() {
    for ripen_first in [false, true] {
        let mut state = open_scene(vec![far_egg()]);
        if ripen_first {
            idle_until(&mut state, 10.0);
            assert_eq!(state.eggs[0].stage(), EggStage::Ready);
        }

        tick(
            &mut state,
            &TickInput {
                fire: true,
                ..Default::default()
            },
        );
        let shot = state.projectile.position();
        state.eggs[0].motion_mut().pos = shot + DVec2::new(10.0, 0.0);
        tick(&mut state, &TickInput::default());

        assert_eq!(state.score(), -1);
        assert_eq!(state.eggs[0].stage(), EggStage::Eaten);
    }
}

#[test]
fn test_fireball_kills_creature_which_then_vanishes() {
    let mut state = open_scene(vec![EggSpawn::new(1900.0, 100.0, 0.0, 1.0, 1.0)]);
    idle_until(&mut state, 2.0);
    assert_eq!(state.eggs[0].stage(), EggStage::Hatched);

    tick(
        &mut state,
        &TickInput {
            fire: true,
            ..Default::default()
        },
    );
    let shot = state.projectile.position();
    state.eggs[0].motion_mut().pos = shot + DVec2::new(10.0, 0.0);
    tick(&mut state, &TickInput::default());

    assert_eq!(state.eggs[0].stage(), EggStage::Killed);
    assert_eq!(state.eggs[0].sprite(), CreatureSprite::OnFire);
    assert!(!state.projectile.is_fired());

    let vanish_at = state.time_ticks + 3_000 / TICK_MS;
    while state.time_ticks < vanish_at - 1 {
        tick(&mut state, &TickInput::default());
    }
    assert_eq!(state.eggs[0].stage(), EggStage::Killed);
    tick(&mut state, &TickInput::default());
    assert_eq!(state.eggs[0].stage(), EggStage::NonExistent);
    assert!(state.eggs[0].is_terminal());
}

#[test]
fn test_velocities_stay_bounded_in_cavern() {
    let tuning = Tuning::default();
    let mut terrain = CollisionMask::generate_cavern(3000, 2000, 42);
    terrain.clear_rect(450, 1430, 300, 240);
    let sprite = CollisionMask::filled(tuning.creature.width, tuning.creature.height, OutOfBounds::Clear);
    let mut state = GameState::new(tuning.clone(), Level::default_level(), terrain, sprite).unwrap();

    let mut rng = Pcg32::seed_from_u64(7);
    let mut input = TickInput::default();
    for t in 0..6_000u64 {
        if t % 100 == 0 {
            input.intent = Intent::from_flags(rng.random(), rng.random(), rng.random(), rng.random());
        }
        input.fire = t % 300 == 0;
        tick(&mut state, &input);

        let bg = state.protagonist.background();
        assert!(bg.vel.x.abs() <= tuning.max_velocity && bg.vel.y.abs() <= tuning.max_velocity);
        let shot = state.projectile.motion();
        assert!(shot.vel.x.abs() <= shot.max_velocity && shot.vel.y.abs() <= shot.max_velocity);
        assert!((0.0..=1.0).contains(&state.life()));
    }
}

#[test]
fn test_restart_through_tick_input() {
    let mut state = open_scene(vec![far_egg()]);
    egg_onto_dragon(&mut state);
    tick(&mut state, &TickInput::default());
    assert!(state.life() < 1.0);

    tick(
        &mut state,
        &TickInput {
            restart: true,
            ..Default::default()
        },
    );
    assert_eq!(state.life(), 1.0);
    assert_eq!(state.eggs[0].stage(), EggStage::NotReady);
    assert_eq!(state.eggs[0].position(), DVec2::new(1900.0, 100.0));
}
