//! Obstacle contact detection
//!
//! The simulation never asks how contact was detected; it only consumes one
//! boolean per tick. A presenter with a physics engine implements
//! [`CollisionSignal`] on top of it, headless runs use [`ObstacleOverlap`].

use glam::Vec3;

use super::state::SimulationState;
use crate::config::Config;

/// Source of the per-tick "player touches an obstacle" boolean
pub trait CollisionSignal {
    fn player_overlaps(&mut self, state: &SimulationState, config: &Config) -> bool;
}

/// Constant signal, for scripted runs and tests
impl CollisionSignal for bool {
    fn player_overlaps(&mut self, _state: &SimulationState, _config: &Config) -> bool {
        *self
    }
}

/// Axis-aligned box test between the player and every obstacle cube.
///
/// Rotation is ignored on both sides: the player box uses width/depth/height
/// as-is and each cube is a cube of edge `appearance.scale`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObstacleOverlap;

impl ObstacleOverlap {
    fn player_half_extents(config: &Config) -> Vec3 {
        let player = &config.player;
        Vec3::new(player.width, player.depth, player.height) * 0.5
    }
}

impl CollisionSignal for ObstacleOverlap {
    fn player_overlaps(&mut self, state: &SimulationState, config: &Config) -> bool {
        let player_half = Self::player_half_extents(config);
        let cube_half = Vec3::splat(config.reference_cubes.appearance.scale * 0.5);
        let reach = player_half + cube_half;
        let center = state.player.position;

        state.agents.iter().any(|agent| {
            let gap = (agent.position - center).abs();
            gap.x < reach.x && gap.y < reach.y && gap.z < reach.z
        })
    }
}
