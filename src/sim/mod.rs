//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time comes in from the caller, never from a clock
//! - Seeded RNG only
//! - Stable iteration order (by agent ID)
//! - No rendering or platform dependencies

pub mod boundary;
pub mod collision;
pub mod health;
pub mod motion;
pub mod patrol;
pub mod state;
pub mod status;
pub mod tick;

pub use collision::{CollisionSignal, ObstacleOverlap};
pub use patrol::{AgentId, PatrolAgent, PatrolArena, populate};
pub use state::{
    BoundaryState, CameraLook, HealthState, InvincibilityKind, InvincibilityWindow, JumpPhase,
    Player, Session, SimEvent, SimulationState,
};
pub use status::{DoubleJumpStatus, HealthBand, HudStatus, ReturnStatus};
pub use tick::{TickInput, tick, tick_with_signal};
