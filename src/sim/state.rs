//! Simulation state and core types
//!
//! Everything a tick reads or writes lives in [`SimulationState`]. Components
//! receive it by `&mut` and never hold state of their own.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::patrol::{self, PatrolArena};
use crate::Time;
use crate::config::Config;

/// Jump state machine. Exactly one phase is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum JumpPhase {
    /// Standing (or walking) on the ground
    Grounded,
    /// Airborne after a ground jump
    FirstJumpAirborne {
        can_double_jump: bool,
        /// The jump key went up at least once since the ground jump
        jump_key_released_since_use: bool,
    },
    /// Airborne after spending health on a second jump (reduced gravity)
    DoubleJumpAirborne,
    /// Landed from a double jump; jumping and damage are blocked until it expires
    LandingInvincible { since: Time },
}

impl JumpPhase {
    pub fn is_airborne(&self) -> bool {
        matches!(
            self,
            JumpPhase::FirstJumpAirborne { .. } | JumpPhase::DoubleJumpAirborne
        )
    }

    /// Same variant, ignoring payload
    pub fn same_phase(&self, other: &JumpPhase) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// Camera heading offset relative to the player (degrees)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraLook {
    pub target_offset: f32,
    pub offset: f32,
}

/// The controllable agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Degrees; wraps implicitly through trig
    pub heading: f32,
    /// Current vertical acceleration (negative)
    pub current_gravity: f32,
    pub jump: JumpPhase,
    /// Ground jumps are ignored until this time
    pub jump_ready_at: Option<Time>,
    /// Whether the running jump cooldown is the longer landing cooldown
    pub landing_cooldown_active: bool,
    /// Jump key state on the previous tick (for press edges)
    pub jump_was_held: bool,
    pub camera: CameraLook,
}

impl Player {
    pub fn new(config: &Config) -> Self {
        let [x, y, z] = config.player.initial_position;
        Self {
            position: Vec3::new(x, y, z),
            velocity: Vec3::ZERO,
            heading: config.player.initial_heading,
            current_gravity: config.physics.gravity,
            jump: JumpPhase::Grounded,
            jump_ready_at: None,
            landing_cooldown_active: false,
            jump_was_held: false,
            camera: CameraLook::default(),
        }
    }

    /// Height of the player's center above its standing position
    pub fn height_above_ground(&self, config: &Config) -> f32 {
        self.position.z - config.floor_z()
    }

    pub fn horizontal_speed(&self) -> f32 {
        self.velocity.truncate().length()
    }
}

/// Which of the three invincibility windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvincibilityKind {
    /// From session start or restart; blocks damage and jumping
    Spawn,
    /// From the last damage taken; blocks damage only
    DamageCooldown,
    /// From a double-jump landing; blocks damage and jumping
    Landing,
}

/// A timed window, active from arming until `expires_at`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InvincibilityWindow {
    /// Mirror of `is_active` as of the last bookkeeping pass
    pub active: bool,
    pub expires_at: Time,
}

impl InvincibilityWindow {
    /// A zero-length window is never armed
    pub fn armed(now: Time, duration: f32) -> Self {
        Self {
            active: duration > 0.0,
            expires_at: now + duration,
        }
    }

    pub fn is_active(&self, now: Time) -> bool {
        self.active && now < self.expires_at
    }

    pub fn remaining(&self, now: Time) -> f32 {
        if self.is_active(now) {
            self.expires_at - now
        } else {
            0.0
        }
    }

    /// Drop the flag once the window has run out. Returns true if it just closed.
    pub fn expire(&mut self, now: Time) -> bool {
        if self.active && now >= self.expires_at {
            self.active = false;
            true
        } else {
            false
        }
    }
}

/// Health value plus the windows that gate damage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthState {
    pub health: f32,
    pub max_health: f32,
    pub spawn: InvincibilityWindow,
    pub damage_cooldown: InvincibilityWindow,
    pub landing: InvincibilityWindow,
    /// Last tick with movement input or non-trivial speed
    pub last_move_time: Time,
    pub last_regen_time: Time,
}

impl HealthState {
    pub fn new(config: &Config, now: Time) -> Self {
        let status = &config.player_status;
        Self {
            health: status.initial_health.min(status.max_health),
            max_health: status.max_health,
            spawn: InvincibilityWindow::armed(now, config.game_rules.damage.invincible_time),
            damage_cooldown: InvincibilityWindow::default(),
            landing: InvincibilityWindow::default(),
            last_move_time: now,
            last_regen_time: now,
        }
    }

    pub fn window(&self, kind: InvincibilityKind) -> &InvincibilityWindow {
        match kind {
            InvincibilityKind::Spawn => &self.spawn,
            InvincibilityKind::DamageCooldown => &self.damage_cooldown,
            InvincibilityKind::Landing => &self.landing,
        }
    }

    pub fn window_mut(&mut self, kind: InvincibilityKind) -> &mut InvincibilityWindow {
        match kind {
            InvincibilityKind::Spawn => &mut self.spawn,
            InvincibilityKind::DamageCooldown => &mut self.damage_cooldown,
            InvincibilityKind::Landing => &mut self.landing,
        }
    }

    /// Spawn or landing invincibility, the two windows that also block jumping
    pub fn blocks_jumping(&self, now: Time) -> bool {
        self.spawn.is_active(now) || self.landing.is_active(now)
    }

    /// Any window that suppresses incoming damage
    pub fn blocks_damage(&self, now: Time) -> bool {
        self.blocks_jumping(now) || self.damage_cooldown.is_active(now)
    }
}

/// Arena exit tracking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryState {
    pub inside_bounds: bool,
    pub warning_active: bool,
    pub warning_started_at: Time,
    /// Violation timestamps, oldest first, pruned to the counting window
    pub violation_log: Vec<Time>,
    pub last_return_time: Option<Time>,
}

impl Default for BoundaryState {
    fn default() -> Self {
        Self {
            inside_bounds: true,
            warning_active: false,
            warning_started_at: 0.0,
            violation_log: Vec::new(),
            last_return_time: None,
        }
    }
}

/// Session lifecycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub running: bool,
    pub started_at: Time,
    /// Set once when the session ends
    pub ended_at: Option<Time>,
}

impl Session {
    pub fn new(now: Time) -> Self {
        Self {
            running: true,
            started_at: now,
            ended_at: None,
        }
    }

    /// Seconds survived; frozen once the session has ended
    pub fn survival_seconds(&self, now: Time) -> f32 {
        let end = self.ended_at.unwrap_or(now);
        (end - self.started_at).max(0.0)
    }
}

/// Changes the presentation layer may want to react to, collected per tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    HealthChanged { from: f32, to: f32 },
    JumpPhaseChanged { from: JumpPhase, to: JumpPhase },
    InvincibilityChanged { kind: InvincibilityKind, active: bool },
    BoundaryWarningChanged { active: bool },
    ViolationRecorded { count: usize, escalated: bool },
    SessionStarted { at: Time },
    SessionEnded { survival_seconds: f32 },
}

/// Complete simulation state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub session: Session,
    pub player: Player,
    pub health: HealthState,
    pub boundary: BoundaryState,
    /// Obstacles; survive restarts
    pub agents: PatrolArena,
    pub rng: Pcg32,
    /// Events raised during the most recent tick
    #[serde(skip)]
    pub events: Vec<SimEvent>,
}

impl SimulationState {
    /// Start a session at `now` and populate the arena with obstacles
    pub fn new(config: &Config, seed: u64, now: Time) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let agents = patrol::populate(config, &mut rng, now);
        log::info!(
            "Session started at {:.2}s with {} obstacles (seed {})",
            now,
            agents.len(),
            seed
        );
        let health = HealthState::new(config, now);
        let mut events = vec![SimEvent::SessionStarted { at: now }];
        if health.spawn.active {
            events.push(SimEvent::InvincibilityChanged {
                kind: InvincibilityKind::Spawn,
                active: true,
            });
        }
        Self {
            seed,
            session: Session::new(now),
            player: Player::new(config),
            health,
            boundary: BoundaryState::default(),
            agents,
            rng,
            events,
        }
    }

    /// Reset player, health, boundary and session together. Obstacles keep
    /// their state.
    pub fn restart(&mut self, config: &Config, now: Time) {
        let player = Player::new(config);
        let health = HealthState::new(config, now);
        let boundary = BoundaryState::default();
        let session = Session::new(now);

        let previous_phase = self.player.jump;
        let previous_health = self.health.clone();
        let was_warning = self.boundary.warning_active;
        self.player = player;
        self.health = health;
        self.boundary = boundary;
        self.session = session;

        if previous_health.health != self.health.health {
            self.events.push(SimEvent::HealthChanged {
                from: previous_health.health,
                to: self.health.health,
            });
        }
        if !previous_phase.same_phase(&self.player.jump) {
            self.events.push(SimEvent::JumpPhaseChanged {
                from: previous_phase,
                to: self.player.jump,
            });
        }
        for kind in [InvincibilityKind::DamageCooldown, InvincibilityKind::Landing] {
            if previous_health.window(kind).active {
                self.events.push(SimEvent::InvincibilityChanged {
                    kind,
                    active: false,
                });
            }
        }
        if self.health.spawn.active {
            self.events.push(SimEvent::InvincibilityChanged {
                kind: InvincibilityKind::Spawn,
                active: true,
            });
        } else if previous_health.spawn.active {
            self.events.push(SimEvent::InvincibilityChanged {
                kind: InvincibilityKind::Spawn,
                active: false,
            });
        }
        if was_warning {
            self.events.push(SimEvent::BoundaryWarningChanged { active: false });
        }
        self.events.push(SimEvent::SessionStarted { at: now });
        log::info!("Session restarted at {:.2}s", now);
    }

    /// Stop the session, freezing survival time
    pub fn end_session(&mut self, now: Time) {
        if !self.session.running {
            return;
        }
        self.session.running = false;
        self.session.ended_at = Some(now);
        let survival_seconds = self.session.survival_seconds(now);
        log::info!("Game over! Survival time: {:.0}s", survival_seconds);
        self.events.push(SimEvent::SessionEnded { survival_seconds });
    }

    /// Events raised since the last tick started
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_running_with_spawn_invincibility() {
        let config = Config::default();
        let state = SimulationState::new(&config, 7, 0.0);
        assert!(state.session.running);
        assert!(state.health.spawn.is_active(0.0));
        assert!(state.health.spawn.is_active(2.99));
        assert!(!state.health.spawn.is_active(3.0));
        assert_eq!(state.player.jump, JumpPhase::Grounded);
        assert_eq!(state.health.health, 100.0);
        assert!(!state.agents.is_empty());
    }

    #[test]
    fn test_window_expiry() {
        let mut window = InvincibilityWindow::armed(1.0, 0.5);
        assert!(window.is_active(1.2));
        assert!((window.remaining(1.2) - 0.3).abs() < 1e-6);
        assert!(!window.expire(1.4));
        assert!(window.expire(1.5));
        assert!(!window.active);
        assert_eq!(window.remaining(1.5), 0.0);
    }

    #[test]
    fn test_zero_length_window_never_active() {
        let window = InvincibilityWindow::armed(4.0, 0.0);
        assert!(!window.is_active(4.0));
    }

    #[test]
    fn test_survival_time_frozen_after_end() {
        let config = Config::default();
        let mut state = SimulationState::new(&config, 1, 2.0);
        state.end_session(12.0);
        assert!(!state.session.running);
        assert_eq!(state.session.survival_seconds(50.0), 10.0);
        assert!(matches!(
            state.events.last(),
            Some(SimEvent::SessionEnded { survival_seconds }) if *survival_seconds == 10.0
        ));
    }

    #[test]
    fn test_restart_reports_what_it_reset() {
        let config = Config::default();
        let mut state = SimulationState::new(&config, 3, 0.0);
        state.player.jump = JumpPhase::DoubleJumpAirborne;
        state.boundary.warning_active = true;
        state.health.landing = InvincibilityWindow::armed(0.5, 1.5);
        state.events.clear();

        state.restart(&config, 1.5);

        let events = state.events();
        assert!(events.contains(&SimEvent::JumpPhaseChanged {
            from: JumpPhase::DoubleJumpAirborne,
            to: JumpPhase::Grounded,
        }));
        assert!(events.contains(&SimEvent::BoundaryWarningChanged { active: false }));
        assert!(events.contains(&SimEvent::InvincibilityChanged {
            kind: InvincibilityKind::Landing,
            active: false,
        }));
        assert!(events.contains(&SimEvent::InvincibilityChanged {
            kind: InvincibilityKind::Spawn,
            active: true,
        }));
        assert_eq!(events.last(), Some(&SimEvent::SessionStarted { at: 1.5 }));
    }

    #[test]
    fn test_new_session_announces_spawn_window() {
        let config = Config::default();
        let state = SimulationState::new(&config, 3, 0.0);
        assert!(state.events().contains(&SimEvent::InvincibilityChanged {
            kind: InvincibilityKind::Spawn,
            active: true,
        }));

        let mut config = Config::default();
        config.game_rules.damage.invincible_time = 0.0;
        let state = SimulationState::new(&config, 3, 0.0);
        assert_eq!(state.events(), &[SimEvent::SessionStarted { at: 0.0 }]);
        assert!(!state.health.spawn.active);
    }

    #[test]
    fn test_json_round_trip() {
        use rand::Rng;

        let config = Config::default();
        let mut state = SimulationState::new(&config, 3, 0.0);
        state.boundary.violation_log = vec![1.0, 2.0];
        state.boundary.last_return_time = Some(2.5);

        let json = serde_json::to_string(&state).unwrap();
        let mut back: SimulationState = serde_json::from_str(&json).unwrap();

        assert_eq!(back.player, state.player);
        assert_eq!(back.health, state.health);
        assert_eq!(back.boundary, state.boundary);
        assert_eq!(back.session, state.session);
        assert_eq!(back.agents, state.agents);
        assert_eq!(back.seed, state.seed);
        assert!(back.events.is_empty());
        // RNG resumes from the same point
        assert_eq!(back.rng.random::<u32>(), state.rng.random::<u32>());
    }

    #[test]
    fn test_restart_keeps_agents() {
        let config = Config::default();
        let mut state = SimulationState::new(&config, 3, 0.0);
        let agents_before = state.agents.clone();
        state.health.health = 0.0;
        state.end_session(5.0);
        state.restart(&config, 6.0);
        assert!(state.session.running);
        assert_eq!(state.session.started_at, 6.0);
        assert_eq!(state.health.health, 100.0);
        assert_eq!(state.agents, agents_before);
    }
}
