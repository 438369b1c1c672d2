//! Health, damage gating and regeneration
//!
//! All health changes go through [`SimulationState::apply_delta`], which also
//! ends the session when health is depleted. Damage additionally respects the
//! three invincibility windows.

use super::state::{InvincibilityKind, InvincibilityWindow, SimEvent, SimulationState};
use super::tick::TickInput;
use crate::Time;
use crate::config::Config;

const WINDOW_KINDS: [InvincibilityKind; 3] = [
    InvincibilityKind::Spawn,
    InvincibilityKind::DamageCooldown,
    InvincibilityKind::Landing,
];

impl SimulationState {
    /// Add `amount` to health (negative for damage), clamped to `[0, max_health]`.
    /// Depleting health while running ends the session.
    pub fn apply_delta(&mut self, amount: f32, now: Time) {
        let from = self.health.health;
        let to = (from + amount).clamp(0.0, self.health.max_health);
        self.health.health = to;

        if to != from {
            self.events.push(SimEvent::HealthChanged { from, to });
        }
        if amount < 0.0 && to <= 0.0 && self.session.running {
            self.end_session(now);
        }
    }

    /// Take `amount` damage unless an invincibility window is active.
    /// Successful damage arms the damage cooldown. Returns whether it landed.
    pub fn apply_damage(&mut self, amount: f32, config: &Config, now: Time) -> bool {
        if !self.session.running || self.health.blocks_damage(now) {
            return false;
        }

        let cooldown = config.game_rules.damage.damage_cooldown;
        self.health.damage_cooldown = InvincibilityWindow::armed(now, cooldown);
        if cooldown > 0.0 {
            self.events.push(SimEvent::InvincibilityChanged {
                kind: InvincibilityKind::DamageCooldown,
                active: true,
            });
        }
        self.apply_delta(-amount, now);
        true
    }
}

/// Collision damage for a tick where the player overlaps an obstacle
pub fn apply_collision(state: &mut SimulationState, config: &Config, colliding: bool, now: Time) {
    if !colliding {
        return;
    }
    let damage = config.game_rules.damage.cube_collision;
    if state.apply_damage(damage, config, now) {
        log::debug!(
            "Obstacle hit for {} damage, health {}",
            damage,
            state.health.health
        );
    }
}

/// Close expired windows and regenerate health while standing still
pub fn update(state: &mut SimulationState, config: &Config, input: &TickInput, now: Time) {
    for kind in WINDOW_KINDS {
        if state.health.window_mut(kind).expire(now) {
            state.events.push(SimEvent::InvincibilityChanged {
                kind,
                active: false,
            });
        }
    }

    if !state.session.running {
        return;
    }

    let moving =
        input.has_movement_intent() || state.player.velocity.length() >= config.physics.min_speed;
    if moving {
        state.health.last_move_time = now;
        return;
    }

    let regen = &config.player_status.health_regen;
    let health = &state.health;
    if now - health.last_move_time >= regen.still_time
        && now - health.last_regen_time >= regen.interval
        && health.health < health.max_health
    {
        state.apply_delta(regen.amount, now);
        state.health.last_regen_time = now;
    }
}
