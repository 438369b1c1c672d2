//! Arena Survival - movement-and-survival simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (jump physics, health, boundaries, patrol AI)
//! - `config`: Tunable parameters loaded from JSON

pub mod config;
pub mod sim;

pub use config::{Config, ConfigError};

use glam::Vec3;

/// Simulation timing and fixed tolerances
pub mod consts {
    /// Fixed simulation timestep used by the headless driver (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// How far above the floor a player may be and still start a ground jump
    pub const GROUND_JUMP_TOLERANCE: f32 = 0.1;

    /// Upper bound of the first direction change for freshly populated obstacles (seconds)
    pub const INITIAL_DIRECTION_CHANGE_MAX: f32 = 2.0;
}

/// Seconds on the external clock
pub type Time = f32;

/// Unit vector in the XY plane a heading (degrees) faces.
///
/// Heading 0 faces +Y, positive headings turn counter-clockwise.
#[inline]
pub fn heading_to_forward(heading_deg: f32) -> Vec3 {
    let rad = heading_deg.to_radians();
    Vec3::new(-rad.sin(), rad.cos(), 0.0)
}

/// Heading (degrees, [-180, 180]) of an XY direction, measured from +X
#[inline]
pub fn direction_to_degrees(x: f32, y: f32) -> f32 {
    y.atan2(x).to_degrees()
}

/// Vertical launch speed that reaches exactly `height` under `gravity`
#[inline]
pub fn launch_speed_for_height(gravity: f32, height: f32) -> f32 {
    (2.0 * gravity.abs() * height).sqrt()
}

/// Apex height reached from a vertical launch speed under `gravity`
#[inline]
pub fn apex_height(launch_speed: f32, gravity: f32) -> f32 {
    launch_speed * launch_speed / (2.0 * gravity.abs())
}
