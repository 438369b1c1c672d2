//! Simulation tick
//!
//! Advances every component in a fixed order. The order matters: the player's
//! final position for the tick must be settled before collision and boundary
//! checks read it, and collision damage must land before boundary damage so
//! both see the same cooldown window.

use super::collision::CollisionSignal;
use super::state::SimulationState;
use super::{boundary, health, motion};
use crate::Time;
use crate::config::Config;

/// Input snapshot for a single tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    pub forward: bool,
    pub backward: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    /// Jump key currently held
    pub jump: bool,
    /// Crouch key currently held (no rule consumes it yet)
    pub crouch: bool,
    /// Horizontal mouse movement since the last tick
    pub look_delta: f32,
    /// Player overlapped an obstacle this tick
    pub colliding: bool,
    /// Start a new session before anything else runs
    pub restart: bool,
    /// Raw health adjustment (debug keys)
    pub debug_health_delta: f32,
}

impl TickInput {
    /// Any of the four locomotion keys is held
    pub fn has_movement_intent(&self) -> bool {
        self.forward || self.backward || self.turn_left || self.turn_right
    }
}

/// Advance the simulation by one step ending at `now`
pub fn tick(state: &mut SimulationState, config: &Config, input: &TickInput, now: Time, dt: f32) {
    state.events.clear();

    if input.restart {
        state.restart(config, now);
    }

    // Nothing moves once the session is over, obstacles included
    if !state.session.running {
        return;
    }

    if input.debug_health_delta != 0.0 {
        state.apply_delta(input.debug_health_delta, now);
        if !state.session.running {
            return;
        }
    }

    motion::update(state, config, input, now, dt);
    health::apply_collision(state, config, input.colliding, now);
    if state.session.running {
        boundary::update(state, config, now);
    }
    health::update(state, config, input, now);

    if state.session.running {
        let SimulationState { agents, rng, .. } = state;
        agents.update(&config.cube_movement, rng, now, dt);
    }
}

/// Sample `signal` for the current state, then tick with it
pub fn tick_with_signal<S: CollisionSignal + ?Sized>(
    state: &mut SimulationState,
    config: &Config,
    input: &TickInput,
    signal: &mut S,
    now: Time,
    dt: f32,
) {
    let mut input = input.clone();
    input.colliding = signal.player_overlaps(state, config);
    tick(state, config, &input, now, dt);
}
