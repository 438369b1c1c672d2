//! Wandering obstacle AI
//!
//! Each obstacle drifts around a fixed home point, picking a new random heading
//! on a randomized schedule. An obstacle found outside its patrol radius at a
//! direction change heads straight home at an elevated speed instead.

use std::collections::BTreeMap;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::Time;
use crate::config::{Config, CubeMovementConfig};
use crate::consts::INITIAL_DIRECTION_CHANGE_MAX;
use crate::direction_to_degrees;

/// Stable obstacle identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub u32);

/// Behaviour state of one obstacle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatrolAgent {
    pub id: AgentId,
    pub home: Vec3,
    pub position: Vec3,
    pub velocity: Vec3,
    pub next_direction_change_at: Time,
    /// Degrees from +X
    pub move_heading_deg: f32,
    pub move_speed: f32,
    pub patrol_radius: f32,
    /// Cosmetic rotation, no effect on movement
    pub spin_deg: f32,
}

impl PatrolAgent {
    /// Planar distance from home
    pub fn distance_from_home(&self) -> f32 {
        (self.home - self.position).truncate().length()
    }

    /// Advance one tick
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        movement: &CubeMovementConfig,
        rng: &mut R,
        now: Time,
        dt: f32,
    ) {
        if now >= self.next_direction_change_at {
            let to_home = (self.home - self.position).truncate();
            if to_home.length() > self.patrol_radius {
                self.move_heading_deg = direction_to_degrees(to_home.x, to_home.y);
                self.move_speed = movement.base_speed * movement.return_speed_scale;
            } else {
                self.move_heading_deg = rng.random_range(0.0..360.0);
                self.move_speed = movement.base_speed;
            }
            let interval = &movement.direction_change;
            self.next_direction_change_at =
                now + rng.random_range(interval.min_interval..=interval.max_interval);
        }

        let rad = self.move_heading_deg.to_radians();
        self.velocity = Vec3::new(rad.cos(), rad.sin(), 0.0) * self.move_speed;
        self.position += self.velocity * dt;
        self.position.z = self.home.z;

        let [spin_min, spin_max] = movement.rotation_speed;
        self.spin_deg = (self.spin_deg + rng.random_range(spin_min..=spin_max)).rem_euclid(360.0);
    }
}

/// All obstacles, keyed and iterated by id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatrolArena {
    agents: BTreeMap<AgentId, PatrolAgent>,
    next_id: u32,
}

impl PatrolArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a new obstacle at `home`, already moving along `heading_deg`
    pub fn spawn(
        &mut self,
        home: Vec3,
        heading_deg: f32,
        next_direction_change_at: Time,
        movement: &CubeMovementConfig,
    ) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id += 1;
        self.agents.insert(
            id,
            PatrolAgent {
                id,
                home,
                position: home,
                velocity: Vec3::ZERO,
                next_direction_change_at,
                move_heading_deg: heading_deg,
                move_speed: movement.base_speed,
                patrol_radius: movement.patrol_radius,
                spin_deg: 0.0,
            },
        );
        id
    }

    pub fn get(&self, id: AgentId) -> Option<&PatrolAgent> {
        self.agents.get(&id)
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut PatrolAgent> {
        self.agents.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PatrolAgent> {
        self.agents.values()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Advance every obstacle, in id order
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        movement: &CubeMovementConfig,
        rng: &mut R,
        now: Time,
        dt: f32,
    ) {
        for agent in self.agents.values_mut() {
            agent.step(movement, rng, now, dt);
        }
    }
}

/// Lay obstacles out on the reference grid, leaving the spawn area clear
pub fn populate<R: Rng + ?Sized>(config: &Config, rng: &mut R, now: Time) -> PatrolArena {
    let layout = &config.reference_cubes.layout;
    let height = config.reference_cubes.appearance.height;
    let spacing = layout.spacing.max(1) as usize;

    let mut arena = PatrolArena::new();
    for x in (layout.x[0]..=layout.x[1]).step_by(spacing) {
        for y in (layout.y[0]..=layout.y[1]).step_by(spacing) {
            if (x.abs() as f32) < layout.safe_zone && (y.abs() as f32) < layout.safe_zone {
                continue;
            }
            let next_change = now + rng.random_range(0.0..=INITIAL_DIRECTION_CHANGE_MAX);
            let heading = rng.random_range(0.0..360.0);
            arena.spawn(
                Vec3::new(x as f32, y as f32, height),
                heading,
                next_change,
                &config.cube_movement,
            );
        }
    }
    log::debug!("Populated {} obstacles", arena.len());
    arena
}
