//! Dragon Flier headless driver
//!
//! Builds a procedural cavern, flies the dragon along a scripted route for
//! the configured number of ticks and logs the outcome. Pass a settings JSON
//! path as the first argument; `RUST_LOG=info` shows game events.

#[cfg(not(target_arch = "wasm32"))]
use dragon_flier::consts::*;
#[cfg(not(target_arch = "wasm32"))]
use dragon_flier::sim::{CollisionMask, GameEvent, GameState, Intent, OutOfBounds, TickInput, tick};
#[cfg(not(target_arch = "wasm32"))]
use dragon_flier::{Level, Result, Settings};

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Dragon Flier (headless) starting...");

    let path = std::env::args().nth(1).map(std::path::PathBuf::from);
    let settings = Settings::load_or_default(path.as_deref());
    if let Err(e) = run(&settings) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is a library; there is no browser driver
}

/// Scripted input: each two-second leg steers a different way, with a
/// breath of fire every one and a half seconds
#[cfg(not(target_arch = "wasm32"))]
fn flight_plan(time_ticks: u64) -> TickInput {
    const LEGS: [Intent; 6] = [
        Intent::RIGHT,
        Intent::RIGHT,
        Intent::DOWN,
        Intent::LEFT,
        Intent::UP,
        Intent::NONE,
    ];
    let ms = time_ticks * TICK_MS;
    let leg = (ms / 2_000) as usize % LEGS.len();
    TickInput {
        intent: LEGS[leg],
        fire: ms % 1_500 == 0,
        restart: false,
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn run(settings: &Settings) -> Result<()> {
    let level = match &settings.level {
        Some(path) => Level::load(path)?,
        None => Level::default_level(),
    };
    let tuning = settings.tuning.clone();

    let mut terrain = CollisionMask::generate_cavern(settings.terrain_width, settings.terrain_height, settings.seed);
    // Open a pocket around the dragon's starting point
    let start_y = settings.terrain_height as i32 - tuning.frame_height as i32 / 2;
    let dragon = tuning.dragon;
    terrain.clear_rect(
        tuning.frame_width as i32 / 2 - dragon.width as i32,
        start_y - dragon.height as i32,
        dragon.width as i32 * 2,
        dragon.height as i32 * 2,
    );
    let creature_mask = CollisionMask::filled(tuning.creature.width, tuning.creature.height, OutOfBounds::Clear);

    let mut state = GameState::new(tuning, level, terrain, creature_mask)?;
    let mut hatched = 0;
    let mut killed = 0;

    for _ in 0..settings.ticks {
        let input = flight_plan(state.time_ticks);
        tick(&mut state, &input);

        for event in state.drain_events() {
            match event {
                GameEvent::EggHatched { .. } => hatched += 1,
                GameEvent::CreatureKilled { .. } => killed += 1,
                GameEvent::GameOver => log::warn!("The dragon ran out of life"),
                _ => {}
            }
        }

        if state.time_ticks % (1_000 / TICK_MS) == 0 {
            let pos = state.protagonist.map_position();
            log::info!(
                "t={:>5.1}s score={:>3} life={:.2} dragon=({:.0}, {:.0}) recharge={:.0}%",
                state.elapsed_seconds(),
                state.score(),
                state.life(),
                pos.x,
                pos.y,
                state.projectile.recharge_fraction() * 100.0
            );
        }
        if state.is_dead() {
            break;
        }
    }

    println!(
        "Flew {:.1}s: score {}, life {:.2}, {} hatched, {} killed",
        state.elapsed_seconds(),
        state.score(),
        state.life(),
        hatched,
        killed
    );
    Ok(())
}
