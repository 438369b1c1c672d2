//! Player locomotion and the jump state machine
//!
//! Horizontal motion accelerates toward `max_speed` along the heading and
//! decays exponentially without input. Vertical motion integrates a gravity
//! that is weakened while falling from a double jump.

use glam::Vec3;

use super::state::{InvincibilityKind, InvincibilityWindow, JumpPhase, Player, SimEvent, SimulationState};
use super::tick::TickInput;
use crate::config::Config;
use crate::consts::GROUND_JUMP_TOLERANCE;
use crate::{Time, heading_to_forward, launch_speed_for_height};

/// Advance player motion and resolve jump transitions for one tick
pub fn update(state: &mut SimulationState, config: &Config, input: &TickInput, now: Time, dt: f32) {
    let previous_phase = state.player.jump;

    steer(&mut state.player, config, input, dt);
    accelerate(&mut state.player, config, input, dt);
    end_landing_invincibility(&mut state.player, config, now);
    try_jump(state, config, input, now);
    integrate(&mut state.player, dt);
    clamp_to_ground(state, config, now);

    state.player.jump_was_held = input.jump;

    if !previous_phase.same_phase(&state.player.jump) {
        log::debug!("Jump phase {:?} -> {:?}", previous_phase, state.player.jump);
        state.events.push(SimEvent::JumpPhaseChanged {
            from: previous_phase,
            to: state.player.jump,
        });
    }
}

/// Heading from turn intents, camera offset from look input
fn steer(player: &mut Player, config: &Config, input: &TickInput, dt: f32) {
    let camera = &config.camera;
    player.camera.target_offset = (player.camera.target_offset
        - input.look_delta * camera.mouse_sensitivity)
        .clamp(-camera.look_limit, camera.look_limit);

    let turn = config.physics.turn_speed * dt;
    if input.turn_left {
        player.heading += turn;
        player.camera.target_offset = 0.0;
    }
    if input.turn_right {
        player.heading -= turn;
        player.camera.target_offset = 0.0;
    }

    let diff = player.camera.target_offset - player.camera.offset;
    player.camera.offset += diff * (1.0 - camera.smooth);
}

fn accelerate(player: &mut Player, config: &Config, input: &TickInput, dt: f32) {
    let physics = &config.physics;
    let forward = heading_to_forward(player.heading);

    let mut direction = Vec3::ZERO;
    if input.forward {
        direction += forward;
    }
    if input.backward {
        direction -= forward;
    }

    if direction.length_squared() > 0.0 {
        let push = direction.normalize() * physics.acceleration * dt;
        player.velocity.x += push.x;
        player.velocity.y += push.y;

        let speed = player.horizontal_speed();
        if speed > physics.max_speed {
            let scale = physics.max_speed / speed;
            player.velocity.x *= scale;
            player.velocity.y *= scale;
        }
    } else {
        player.velocity.x *= physics.deceleration;
        player.velocity.y *= physics.deceleration;
    }
}

fn end_landing_invincibility(player: &mut Player, config: &Config, now: Time) {
    if let JumpPhase::LandingInvincible { since } = player.jump {
        if now - since >= config.physics.double_jump.landing_invincible_time {
            player.jump = JumpPhase::Grounded;
        }
    }
}

fn try_jump(state: &mut SimulationState, config: &Config, input: &TickInput, now: Time) {
    if let JumpPhase::FirstJumpAirborne {
        jump_key_released_since_use,
        ..
    } = &mut state.player.jump
    {
        if !input.jump {
            *jump_key_released_since_use = true;
        }
    }

    if state.health.blocks_jumping(now) {
        return;
    }

    let physics = &config.physics;
    let double_jump = &physics.double_jump;
    let height = state.player.height_above_ground(config);

    match state.player.jump {
        JumpPhase::Grounded => {
            let pressed = input.jump && !state.player.jump_was_held;
            let off_cooldown = state.player.jump_ready_at.is_none_or(|ready| now >= ready);
            if pressed && height <= GROUND_JUMP_TOLERANCE && off_cooldown {
                let player = &mut state.player;
                player.velocity.z = physics.jump_speed;
                player.jump_ready_at = Some(now + physics.jump_cooldown);
                player.landing_cooldown_active = false;
                player.jump = JumpPhase::FirstJumpAirborne {
                    can_double_jump: true,
                    jump_key_released_since_use: false,
                };
            }
        }
        JumpPhase::FirstJumpAirborne {
            can_double_jump,
            jump_key_released_since_use,
        } => {
            if input.jump
                && can_double_jump
                && jump_key_released_since_use
                && height >= double_jump.min_height
                && state.health.health > double_jump.health_cost
            {
                let player = &mut state.player;
                player.velocity.z = launch_speed_for_height(physics.gravity, double_jump.height);
                player.current_gravity = physics.gravity * double_jump.fall_speed_scale;
                player.jump = JumpPhase::DoubleJumpAirborne;
                log::debug!("Double jump at height {:.2}", height);
                state.apply_delta(-double_jump.health_cost, now);
            }
        }
        JumpPhase::DoubleJumpAirborne | JumpPhase::LandingInvincible { .. } => {}
    }
}

fn integrate(player: &mut Player, dt: f32) {
    player.velocity.z += player.current_gravity * dt;
    player.position += player.velocity * dt;
}

fn clamp_to_ground(state: &mut SimulationState, config: &Config, now: Time) {
    let floor = config.floor_z();
    let player = &mut state.player;
    if player.position.z > floor {
        return;
    }
    player.position.z = floor;
    player.velocity.z = 0.0;

    match player.jump {
        JumpPhase::FirstJumpAirborne { .. } => {
            player.jump = JumpPhase::Grounded;
        }
        JumpPhase::DoubleJumpAirborne => {
            let double_jump = &config.physics.double_jump;
            player.jump = JumpPhase::LandingInvincible { since: now };
            player.jump_ready_at = Some(now + double_jump.landing_cooldown);
            player.landing_cooldown_active = true;
            player.current_gravity = config.physics.gravity;

            state.health.landing = InvincibilityWindow::armed(now, double_jump.landing_invincible_time);
            state.events.push(SimEvent::InvincibilityChanged {
                kind: InvincibilityKind::Landing,
                active: true,
            });
        }
        JumpPhase::Grounded | JumpPhase::LandingInvincible { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 1000.0;

    fn setup() -> (Config, SimulationState) {
        let mut config = Config::default();
        config.game_rules.damage.invincible_time = 0.0;
        let state = SimulationState::new(&config, 1, 0.0);
        (config, state)
    }

    fn jump_input() -> TickInput {
        TickInput {
            jump: true,
            ..Default::default()
        }
    }

    /// Tick until `done` holds (or a step limit). Returns the time reached.
    fn run_until(
        state: &mut SimulationState,
        config: &Config,
        mut now: Time,
        input: &TickInput,
        done: impl Fn(&SimulationState) -> bool,
    ) -> Time {
        for _ in 0..20_000 {
            if done(state) {
                break;
            }
            now += DT;
            update(state, config, input, now, DT);
        }
        now
    }

    /// Ground jump, release, rise past the double-jump height threshold
    fn airborne_above_min_height(state: &mut SimulationState, config: &Config) -> Time {
        let mut now = DT;
        update(state, config, &jump_input(), now, DT);
        now += DT;
        update(state, config, &TickInput::default(), now, DT);
        let min = config.physics.double_jump.min_height;
        run_until(state, config, now, &TickInput::default(), |s| {
            s.player.height_above_ground(config) >= min
        })
    }

    #[test]
    fn test_jump_apex_matches_kinematics() {
        let (config, mut state) = setup();
        assert_eq!(config.physics.jump_speed, 10.0);
        assert_eq!(config.physics.gravity, -20.0);

        let mut now = 0.0;
        let mut peak = 0.0f32;
        let mut peak_time = 0.0;
        let mut quarter_height = None;
        for _ in 0..1000 {
            now += DT;
            update(&mut state, &config, &jump_input(), now, DT);
            let h = state.player.height_above_ground(&config);
            if h > peak {
                peak = h;
                peak_time = now;
            }
            if quarter_height.is_none() && now >= 0.25 {
                quarter_height = Some(h);
            }
        }
        assert!((peak - 2.5).abs() < 0.02, "peak {peak}");
        assert!((peak_time - 0.5).abs() < 0.01, "peak at {peak_time}");
        // h(t) = 10t - 10t²
        let q = quarter_height.unwrap();
        assert!((q - 1.875).abs() < 0.02, "h(0.25) = {q}");
        // Held key never triggered a second jump
        assert_ne!(state.player.jump, JumpPhase::DoubleJumpAirborne);
    }

    #[test]
    fn test_jump_lands_back_to_grounded() {
        let (config, mut state) = setup();
        update(&mut state, &config, &jump_input(), DT, DT);
        assert!(matches!(state.player.jump, JumpPhase::FirstJumpAirborne { .. }));
        run_until(&mut state, &config, DT, &TickInput::default(), |s| {
            s.player.jump == JumpPhase::Grounded
        });
        assert_eq!(state.player.jump, JumpPhase::Grounded);
        assert_eq!(state.player.position.z, config.floor_z());
        assert_eq!(state.player.velocity.z, 0.0);
    }

    #[test]
    fn test_ground_jump_needs_fresh_press() {
        let (config, mut state) = setup();
        update(&mut state, &config, &jump_input(), DT, DT);
        assert!(matches!(state.player.jump, JumpPhase::FirstJumpAirborne { .. }));

        // Keep holding through the landing and well past the cooldown
        let mut now = run_until(&mut state, &config, DT, &jump_input(), |s| {
            s.player.jump == JumpPhase::Grounded
        });
        for _ in 0..1000 {
            now += DT;
            update(&mut state, &config, &jump_input(), now, DT);
        }
        assert_eq!(state.player.jump, JumpPhase::Grounded);
        assert!(state.player.jump_ready_at.is_some_and(|ready| now >= ready));

        update(&mut state, &config, &TickInput::default(), now + DT, DT);
        update(&mut state, &config, &jump_input(), now + 2.0 * DT, DT);
        assert!(matches!(state.player.jump, JumpPhase::FirstJumpAirborne { .. }));
    }

    #[test]
    fn test_jump_cooldown_blocks_ground_jump() {
        let (mut config, mut state) = setup();
        config.physics.jump_cooldown = 5.0;
        update(&mut state, &config, &jump_input(), DT, DT);
        let now = run_until(&mut state, &config, DT, &TickInput::default(), |s| {
            s.player.jump == JumpPhase::Grounded
        });
        assert!(now < 5.0);
        update(&mut state, &config, &jump_input(), now + DT, DT);
        assert_eq!(state.player.jump, JumpPhase::Grounded);
        assert_eq!(state.player.velocity.z, 0.0);
    }

    #[test]
    fn test_spawn_invincibility_blocks_jump() {
        let config = Config::default();
        let mut state = SimulationState::new(&config, 1, 0.0);
        update(&mut state, &config, &jump_input(), 0.5, DT);
        assert_eq!(state.player.jump, JumpPhase::Grounded);
    }

    #[test]
    fn test_double_jump_fires_and_costs_health() {
        let (config, mut state) = setup();
        let now = airborne_above_min_height(&mut state, &config);
        update(&mut state, &config, &jump_input(), now + DT, DT);

        assert_eq!(state.player.jump, JumpPhase::DoubleJumpAirborne);
        assert_eq!(state.health.health, 90.0);
        assert_eq!(state.player.current_gravity, -10.0);
        let launch = launch_speed_for_height(-20.0, 3.0);
        assert!((state.player.velocity.z - (launch - 10.0 * DT)).abs() < 1e-3);
    }

    /// Velocity after one tick with and without a jump press from the same state
    fn vz_with_and_without_press(state: &SimulationState, config: &Config, now: Time) -> (f32, f32) {
        let mut pressed = state.clone();
        update(&mut pressed, config, &jump_input(), now + DT, DT);
        let mut idle = state.clone();
        update(&mut idle, config, &TickInput::default(), now + DT, DT);
        (pressed.player.velocity.z, idle.player.velocity.z)
    }

    #[test]
    fn test_double_jump_needs_key_release() {
        let (config, mut state) = setup();
        update(&mut state, &config, &jump_input(), DT, DT);
        let min = config.physics.double_jump.min_height;
        let now = run_until(&mut state, &config, DT, &jump_input(), |s| {
            s.player.height_above_ground(&config) >= min
        });
        let (pressed, idle) = vz_with_and_without_press(&state, &config, now);
        // Holding counts as not released, so the "pressed" run is the same as the first
        assert_eq!(pressed, idle);
    }

    #[test]
    fn test_double_jump_needs_min_height() {
        let (config, mut state) = setup();
        update(&mut state, &config, &jump_input(), DT, DT);
        update(&mut state, &config, &TickInput::default(), 2.0 * DT, DT);
        assert!(state.player.height_above_ground(&config) < config.physics.double_jump.min_height);
        let (pressed, idle) = vz_with_and_without_press(&state, &config, 2.0 * DT);
        assert_eq!(pressed, idle);
    }

    #[test]
    fn test_double_jump_needs_health_above_cost() {
        let (config, mut state) = setup();
        let now = airborne_above_min_height(&mut state, &config);
        state.health.health = config.physics.double_jump.health_cost;
        let (pressed, idle) = vz_with_and_without_press(&state, &config, now);
        assert_eq!(pressed, idle);
    }

    #[test]
    fn test_double_jump_needs_availability() {
        let (config, mut state) = setup();
        let now = airborne_above_min_height(&mut state, &config);
        state.player.jump = JumpPhase::FirstJumpAirborne {
            can_double_jump: false,
            jump_key_released_since_use: true,
        };
        let (pressed, idle) = vz_with_and_without_press(&state, &config, now);
        assert_eq!(pressed, idle);
    }

    #[test]
    fn test_double_jump_landing_is_invincible() {
        let (config, mut state) = setup();
        let now = airborne_above_min_height(&mut state, &config);
        update(&mut state, &config, &jump_input(), now + DT, DT);
        let landed = run_until(&mut state, &config, now + DT, &TickInput::default(), |s| {
            !s.player.jump.is_airborne()
        });

        assert_eq!(state.player.jump, JumpPhase::LandingInvincible { since: landed });
        assert!(state.health.landing.is_active(landed));
        assert!(state.player.landing_cooldown_active);
        assert_eq!(state.player.current_gravity, config.physics.gravity);
        let landing_cooldown = config.physics.double_jump.landing_cooldown;
        let ready = state.player.jump_ready_at.unwrap();
        assert!((ready - (landed + landing_cooldown)).abs() < 1e-4);

        // Jumping stays blocked during the landing window
        update(&mut state, &config, &TickInput::default(), landed + 0.5, DT);
        update(&mut state, &config, &jump_input(), landed + 0.6, DT);
        assert!(matches!(state.player.jump, JumpPhase::LandingInvincible { .. }));

        let invincible = config.physics.double_jump.landing_invincible_time;
        update(&mut state, &config, &TickInput::default(), landed + invincible + 0.01, DT);
        assert_eq!(state.player.jump, JumpPhase::Grounded);
    }

    #[test]
    fn test_forward_speed_is_clamped() {
        let (config, mut state) = setup();
        let input = TickInput {
            forward: true,
            ..Default::default()
        };
        let mut now = 0.0;
        for _ in 0..3000 {
            now += DT;
            update(&mut state, &config, &input, now, DT);
        }
        let speed = state.player.horizontal_speed();
        assert!((speed - config.physics.max_speed).abs() < 1e-3);
        // Heading 0 walks toward +Y
        assert!(state.player.position.y > 0.0);
        assert!(state.player.position.x.abs() < 1e-3);
    }

    #[test]
    fn test_deceleration_decays_but_never_zero() {
        let (config, mut state) = setup();
        state.player.velocity = Vec3::new(4.0, 0.0, 0.0);
        update(&mut state, &config, &TickInput::default(), DT, DT);
        assert!((state.player.velocity.x - 3.6).abs() < 1e-5);
        for i in 0..100 {
            update(&mut state, &config, &TickInput::default(), (i + 2) as f32 * DT, DT);
        }
        assert!(state.player.velocity.x > 0.0);
        assert!(state.player.horizontal_speed() < config.physics.min_speed);
    }

    #[test]
    fn test_turning_changes_heading_and_resets_look() {
        let (config, mut state) = setup();
        let look = TickInput {
            look_delta: -10.0,
            ..Default::default()
        };
        update(&mut state, &config, &look, DT, DT);
        assert_eq!(state.player.camera.target_offset, config.camera.look_limit);

        let turn = TickInput {
            turn_left: true,
            ..Default::default()
        };
        update(&mut state, &config, &turn, 2.0 * DT, DT);
        assert!((state.player.heading - config.physics.turn_speed * DT).abs() < 1e-5);
        assert_eq!(state.player.camera.target_offset, 0.0);
    }
}
