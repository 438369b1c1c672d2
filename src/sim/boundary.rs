//! Out-of-bounds escalation
//!
//! Leaving the arena starts a warning. Staying out for the whole warning time
//! records a violation and costs health, doubled once enough violations pile
//! up inside the counting window. Leaving again too soon after coming back is
//! fatal.

use super::state::{SimEvent, SimulationState};
use crate::Time;
use crate::config::Config;

/// Check the player's position against the arena bounds
pub fn update(state: &mut SimulationState, config: &Config, now: Time) {
    let rules = &config.game_rules;
    let position = state.player.position;
    let inside = rules.boundaries.contains(position.x, position.y);

    if inside {
        if !state.boundary.inside_bounds {
            state.boundary.last_return_time = Some(now);
            log::debug!("Returned inside bounds at {:.2}s", now);
        }
        state.boundary.inside_bounds = true;
        clear_warning(state);
        return;
    }
    state.boundary.inside_bounds = false;

    if !state.boundary.warning_active {
        let violation = &rules.boundaries.violation;
        if let Some(returned) = state.boundary.last_return_time {
            let since_return = now - returned;
            if since_return < violation.safe_return_time {
                log::warn!(
                    "Left bounds {:.1}s after returning (safe time {:.1}s): instant death",
                    since_return,
                    violation.safe_return_time
                );
                let max_health = state.health.max_health;
                state.apply_delta(-max_health, now);
                return;
            }
        }
        state.boundary.warning_active = true;
        state.boundary.warning_started_at = now;
        state
            .events
            .push(SimEvent::BoundaryWarningChanged { active: true });
        return;
    }

    if now - state.boundary.warning_started_at >= rules.damage.warning_time {
        record_violation(state, config, now);
        clear_warning(state);
    }
}

fn record_violation(state: &mut SimulationState, config: &Config, now: Time) {
    let rules = &config.game_rules;
    let count_time = rules.boundaries.violation.count_time;

    let violations = &mut state.boundary.violation_log;
    violations.push(now);
    violations.retain(|&t| now - t <= count_time);
    let count = violations.len();

    let escalated = count >= rules.boundaries.violation.max_violations;
    let damage = if escalated {
        state.boundary.violation_log.clear();
        rules.damage.out_of_bounds * 2.0
    } else {
        rules.damage.out_of_bounds
    };

    if escalated {
        log::info!(
            "{} violations within {:.0}s: double damage, violations reset",
            count,
            count_time
        );
    } else {
        log::info!("Out of bounds damage applied. Violations: {}", count);
    }
    state
        .events
        .push(SimEvent::ViolationRecorded { count, escalated });
    state.apply_damage(damage, config, now);
}

fn clear_warning(state: &mut SimulationState) {
    if state.boundary.warning_active {
        state.boundary.warning_active = false;
        state
            .events
            .push(SimEvent::BoundaryWarningChanged { active: false });
    }
}

/// Seconds left before the running warning turns into a violation
pub fn warning_remaining(state: &SimulationState, config: &Config, now: Time) -> Option<f32> {
    state.boundary.warning_active.then(|| {
        (config.game_rules.damage.warning_time - (now - state.boundary.warning_started_at)).max(0.0)
    })
}
