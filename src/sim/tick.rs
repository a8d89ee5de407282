//! Fixed timestep simulation tick
//!
//! One call advances the scene by [`TICK_MS`]: move every body, fire the
//! timers that fell due, then apply contact rules.

use super::collision::check_collisions;
use super::motion::{Advance, Intent};
use super::state::{GameEvent, GameState};
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Held direction keys; diagonals allowed
    pub intent: Intent,
    /// Breathe fire
    pub fire: bool,
    /// Start the scene over
    pub restart: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    if input.restart {
        if let Err(e) = state.restart() {
            log::error!("Restart failed: {}", e);
        }
        return;
    }

    // Nothing moves once the dragon is out of life
    if state.is_dead() {
        return;
    }

    state.protagonist.face(input.intent);
    if input.fire {
        state.fire();
    }

    // Movement
    state.protagonist.advance(input.intent, &state.terrain);
    state.projectile.advance(Intent::NONE, &state.terrain);

    let offset = state.protagonist.background_offset();
    let dragon = state.protagonist.screen_position();
    let sense_radius = state.tuning.sense_radius;
    for egg in state.eggs.iter_mut() {
        let chase = egg.chase_intent(offset, dragon, sense_radius);
        egg.advance(chase, &state.terrain);
    }

    // Timers
    state.clock.advance_to((state.time_ticks + 1) * TICK_MS);
    state.fire_due_timers();

    // Contacts
    check_collisions(state);

    state.time_ticks += 1;

    if state.is_dead() {
        log::info!(
            "Out of life after {:.1}s with score {}",
            state.elapsed_seconds(),
            state.score()
        );
        state.events.push(GameEvent::GameOver);
    }
}
