//! Read-only HUD snapshot
//!
//! Everything an overlay shows, derived from state at a given time. Nothing
//! here writes back into the simulation.

use serde::Serialize;

use super::boundary::warning_remaining;
use super::state::{InvincibilityKind, JumpPhase, SimulationState};
use crate::Time;
use crate::config::Config;

/// Health bar coloring band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthBand {
    /// Above 70%
    High,
    /// Above 30%
    Medium,
    Low,
}

impl HealthBand {
    pub fn for_ratio(ratio: f32) -> Self {
        if ratio > 0.7 {
            HealthBand::High
        } else if ratio > 0.3 {
            HealthBand::Medium
        } else {
            HealthBand::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DoubleJumpStatus {
    Ready,
    Used,
    NotReady,
}

/// Time since the player last came back inside the arena
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ReturnStatus {
    /// Leaving now would be fatal
    Unsafe { remaining: f32 },
    Safe { since: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudStatus {
    pub health: f32,
    pub max_health: f32,
    pub band: HealthBand,
    pub jump_cooldown_remaining: f32,
    /// The running cooldown is the longer one armed by a double-jump landing
    pub long_cooldown: bool,
    pub double_jump: DoubleJumpStatus,
    /// Highest priority active window and its remaining time
    pub invincibility: Option<(InvincibilityKind, f32)>,
    pub warning_remaining: Option<f32>,
    pub last_return: Option<ReturnStatus>,
    pub survival_seconds: u32,
    pub running: bool,
}

impl HudStatus {
    pub fn from_state(state: &SimulationState, config: &Config, now: Time) -> Self {
        let health = &state.health;
        let player = &state.player;

        let jump_cooldown_remaining = player
            .jump_ready_at
            .map_or(0.0, |ready| (ready - now).max(0.0));
        let double_jump = match player.jump {
            JumpPhase::FirstJumpAirborne {
                can_double_jump: true,
                ..
            } => DoubleJumpStatus::Ready,
            JumpPhase::DoubleJumpAirborne | JumpPhase::LandingInvincible { .. } => {
                DoubleJumpStatus::Used
            }
            _ => DoubleJumpStatus::NotReady,
        };

        let invincibility = [
            InvincibilityKind::Spawn,
            InvincibilityKind::Landing,
            InvincibilityKind::DamageCooldown,
        ]
        .into_iter()
        .find(|&kind| health.window(kind).is_active(now))
        .map(|kind| (kind, health.window(kind).remaining(now)));

        let safe_return_time = config.game_rules.boundaries.violation.safe_return_time;
        let last_return = state.boundary.last_return_time.map(|returned| {
            let since = now - returned;
            if since < safe_return_time {
                ReturnStatus::Unsafe {
                    remaining: safe_return_time - since,
                }
            } else {
                ReturnStatus::Safe { since }
            }
        });

        let ratio = if health.max_health > 0.0 {
            health.health / health.max_health
        } else {
            0.0
        };

        Self {
            health: health.health,
            max_health: health.max_health,
            band: HealthBand::for_ratio(ratio),
            jump_cooldown_remaining,
            long_cooldown: player.landing_cooldown_active && jump_cooldown_remaining > 0.0,
            double_jump,
            invincibility,
            warning_remaining: warning_remaining(state, config, now),
            last_return,
            survival_seconds: state.session.survival_seconds(now).floor() as u32,
            running: state.session.running,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::InvincibilityWindow;

    #[test]
    fn test_bands() {
        assert_eq!(HealthBand::for_ratio(1.0), HealthBand::High);
        assert_eq!(HealthBand::for_ratio(0.7), HealthBand::Medium);
        assert_eq!(HealthBand::for_ratio(0.31), HealthBand::Medium);
        assert_eq!(HealthBand::for_ratio(0.3), HealthBand::Low);
        assert_eq!(HealthBand::for_ratio(0.0), HealthBand::Low);
    }

    #[test]
    fn test_fresh_session_status() {
        let config = Config::default();
        let state = SimulationState::new(&config, 1, 0.0);
        let hud = HudStatus::from_state(&state, &config, 1.5);
        assert_eq!(hud.band, HealthBand::High);
        assert_eq!(hud.jump_cooldown_remaining, 0.0);
        assert!(!hud.long_cooldown);
        assert_eq!(hud.double_jump, DoubleJumpStatus::NotReady);
        assert_eq!(hud.invincibility, Some((InvincibilityKind::Spawn, 1.5)));
        assert_eq!(hud.warning_remaining, None);
        assert_eq!(hud.last_return, None);
        assert_eq!(hud.survival_seconds, 1);
        assert!(hud.running);
    }

    #[test]
    fn test_landing_status() {
        let config = Config::default();
        let mut state = SimulationState::new(&config, 1, 0.0);
        state.player.jump = JumpPhase::LandingInvincible { since: 10.0 };
        state.player.jump_ready_at = Some(12.0);
        state.player.landing_cooldown_active = true;
        state.health.landing = InvincibilityWindow::armed(10.0, 1.5);
        state.health.damage_cooldown = InvincibilityWindow::armed(10.0, 1.0);

        let hud = HudStatus::from_state(&state, &config, 10.5);
        assert_eq!(hud.double_jump, DoubleJumpStatus::Used);
        assert!(hud.long_cooldown);
        assert_eq!(hud.jump_cooldown_remaining, 1.5);
        assert_eq!(hud.invincibility, Some((InvincibilityKind::Landing, 1.0)));
    }

    #[test]
    fn test_return_status() {
        let config = Config::default();
        let mut state = SimulationState::new(&config, 1, 0.0);
        state.boundary.last_return_time = Some(10.0);
        let hud = HudStatus::from_state(&state, &config, 10.5);
        assert_eq!(hud.last_return, Some(ReturnStatus::Unsafe { remaining: 1.5 }));
        let hud = HudStatus::from_state(&state, &config, 13.0);
        assert_eq!(hud.last_return, Some(ReturnStatus::Safe { since: 3.0 }));
    }
}
