//! Tunable game parameters
//!
//! Mirrors the layout of the game's config file. Every section falls back to
//! its defaults, so a file only needs the values it overrides. A config is
//! validated once at load time; the simulation assumes it is well formed.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating a config
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// An inclusive `[min, max]` range along one axis
pub type Range = [f32; 2];

/// RGBA color
pub type Color = [f32; 4];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Arena Survival".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub ambient_color: Color,
    pub directional_color: Color,
    /// Heading/pitch/roll of the directional light
    pub direction: [f32; 3],
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient_color: [0.3, 0.3, 0.3, 1.0],
            directional_color: [0.8, 0.8, 0.8, 1.0],
            direction: [45.0, -45.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub height: f32,
    pub width: f32,
    pub depth: f32,
    /// Degrees
    pub initial_heading: f32,
    pub initial_position: [f32; 3],
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            height: 2.0,
            width: 1.0,
            depth: 1.0,
            initial_heading: 0.0,
            initial_position: [0.0, 0.0, 1.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoubleJumpConfig {
    /// Height above ground required before the second jump unlocks
    pub min_height: f32,
    /// Health spent on each double jump
    pub health_cost: f32,
    /// Apex height the second jump is solved for
    pub height: f32,
    /// Gravity multiplier while falling from a double jump (0 < scale <= 1)
    pub fall_speed_scale: f32,
    pub landing_invincible_time: f32,
    /// Jump cooldown after landing from a double jump
    pub landing_cooldown: f32,
}

impl Default for DoubleJumpConfig {
    fn default() -> Self {
        Self {
            min_height: 1.0,
            health_cost: 10.0,
            height: 3.0,
            fall_speed_scale: 0.5,
            landing_invincible_time: 1.5,
            landing_cooldown: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub acceleration: f32,
    pub max_speed: f32,
    /// Per-tick horizontal velocity multiplier with no movement input
    pub deceleration: f32,
    /// Speed below which the player counts as standing still
    pub min_speed: f32,
    /// Negative: units/s²
    pub gravity: f32,
    pub ground_height: f32,
    pub jump_speed: f32,
    pub jump_cooldown: f32,
    /// Degrees per second
    pub turn_speed: f32,
    pub double_jump: DoubleJumpConfig,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            acceleration: 20.0,
            max_speed: 8.0,
            deceleration: 0.9,
            min_speed: 0.1,
            gravity: -20.0,
            ground_height: 0.0,
            jump_speed: 10.0,
            jump_cooldown: 0.5,
            turn_speed: 120.0,
            double_jump: DoubleJumpConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub distance: f32,
    pub height: f32,
    pub pitch: f32,
    /// Fraction of the remaining offset kept each tick (0 = snap)
    pub smooth: f32,
    pub mouse_sensitivity: f32,
    /// Maximum look offset either side of the player heading (degrees)
    pub look_limit: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 10.0,
            height: 5.0,
            pitch: -20.0,
            smooth: 0.9,
            mouse_sensitivity: 50.0,
            look_limit: 90.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaConfig {
    pub x: Range,
    pub y: Range,
}

impl Default for AreaConfig {
    fn default() -> Self {
        Self {
            x: [-20.0, 20.0],
            y: [-20.0, 20.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub size: AreaConfig,
    pub grid_size: f32,
    pub color: Color,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            size: AreaConfig {
                x: [-25.0, 25.0],
                y: [-25.0, 25.0],
            },
            grid_size: 1.0,
            color: [0.3, 0.6, 0.3, 1.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CubeLayoutConfig {
    pub x: [i32; 2],
    pub y: [i32; 2],
    pub spacing: i32,
    /// Grid points with |x| and |y| both below this stay empty
    pub safe_zone: f32,
}

impl Default for CubeLayoutConfig {
    fn default() -> Self {
        Self {
            x: [-20, 20],
            y: [-20, 20],
            spacing: 10,
            safe_zone: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CubeAppearanceConfig {
    /// Z of every obstacle's center
    pub height: f32,
    /// Edge length of an obstacle cube
    pub scale: f32,
    pub color_variation: bool,
}

impl Default for CubeAppearanceConfig {
    fn default() -> Self {
        Self {
            height: 1.0,
            scale: 1.0,
            color_variation: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceCubesConfig {
    pub layout: CubeLayoutConfig,
    pub appearance: CubeAppearanceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionChangeConfig {
    pub min_interval: f32,
    pub max_interval: f32,
}

impl Default for DirectionChangeConfig {
    fn default() -> Self {
        Self {
            min_interval: 1.0,
            max_interval: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CubeMovementConfig {
    pub patrol_radius: f32,
    pub base_speed: f32,
    /// Speed multiplier while heading back home
    pub return_speed_scale: f32,
    pub direction_change: DirectionChangeConfig,
    /// Cosmetic spin per tick, degrees `[min, max]`
    pub rotation_speed: Range,
}

impl Default for CubeMovementConfig {
    fn default() -> Self {
        Self {
            patrol_radius: 5.0,
            base_speed: 2.0,
            return_speed_scale: 1.5,
            direction_change: DirectionChangeConfig::default(),
            rotation_speed: [-2.0, 2.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthRegenConfig {
    /// Seconds without movement before regen starts
    pub still_time: f32,
    pub interval: f32,
    pub amount: f32,
}

impl Default for HealthRegenConfig {
    fn default() -> Self {
        Self {
            still_time: 3.0,
            interval: 1.0,
            amount: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthBarColors {
    pub fill: Color,
    pub background: Color,
}

impl Default for HealthBarColors {
    fn default() -> Self {
        Self {
            fill: [0.2, 0.8, 0.2, 1.0],
            background: [0.2, 0.2, 0.2, 0.8],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthBarConfig {
    pub position: [f32; 2],
    pub width: f32,
    pub height: f32,
    pub colors: HealthBarColors,
}

impl Default for HealthBarConfig {
    fn default() -> Self {
        Self {
            position: [-0.3, 0.9],
            width: 0.6,
            height: 0.05,
            colors: HealthBarColors::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStatusConfig {
    pub initial_health: f32,
    pub max_health: f32,
    pub health_regen: HealthRegenConfig,
    pub health_bar: HealthBarConfig,
}

impl Default for PlayerStatusConfig {
    fn default() -> Self {
        Self {
            initial_health: 100.0,
            max_health: 100.0,
            health_regen: HealthRegenConfig::default(),
            health_bar: HealthBarConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageConfig {
    pub cube_collision: f32,
    /// Base out-of-bounds damage; doubled on escalation
    pub out_of_bounds: f32,
    pub damage_cooldown: f32,
    /// Spawn invincibility duration
    pub invincible_time: f32,
    /// Time outside bounds before a violation is counted
    pub warning_time: f32,
}

impl Default for DamageConfig {
    fn default() -> Self {
        Self {
            cube_collision: 10.0,
            out_of_bounds: 20.0,
            damage_cooldown: 1.0,
            invincible_time: 3.0,
            warning_time: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViolationConfig {
    /// Leaving again sooner than this after returning is fatal
    pub safe_return_time: f32,
    /// Sliding window over which violations are counted
    pub count_time: f32,
    pub max_violations: usize,
}

impl Default for ViolationConfig {
    fn default() -> Self {
        Self {
            safe_return_time: 2.0,
            count_time: 30.0,
            max_violations: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundariesConfig {
    pub x: Range,
    pub y: Range,
    pub violation: ViolationConfig,
}

impl Default for BoundariesConfig {
    fn default() -> Self {
        let area = AreaConfig::default();
        Self {
            x: area.x,
            y: area.y,
            violation: ViolationConfig::default(),
        }
    }
}

impl BoundariesConfig {
    /// Whether an XY point lies inside the arena (edges count as inside)
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x[0] && x <= self.x[1] && y >= self.y[0] && y <= self.y[1]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarningConfig {
    pub text_scale: f32,
    pub text_color: Color,
}

impl Default for WarningConfig {
    fn default() -> Self {
        Self {
            text_scale: 0.2,
            text_color: [1.0, 0.0, 0.0, 1.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    pub position: [f32; 2],
    pub scale: f32,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            position: [1.3, 0.9],
            scale: 0.07,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameOverConfig {
    pub text_position: [f32; 2],
    pub text_scale: f32,
}

impl Default for GameOverConfig {
    fn default() -> Self {
        Self {
            text_position: [0.0, 0.0],
            text_scale: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRulesConfig {
    pub damage: DamageConfig,
    pub boundaries: BoundariesConfig,
    pub warning: WarningConfig,
    pub score: ScoreConfig,
    pub game_over: GameOverConfig,
}

/// Complete parameter set consumed by the simulation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub lighting: LightingConfig,
    pub player: PlayerConfig,
    pub physics: PhysicsConfig,
    pub camera: CameraConfig,
    pub terrain: TerrainConfig,
    pub reference_cubes: ReferenceCubesConfig,
    pub cube_movement: CubeMovementConfig,
    pub player_status: PlayerStatusConfig,
    pub game_rules: GameRulesConfig,
}

fn ensure(ok: bool, field: &'static str, reason: impl Into<String>) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: reason.into(),
        })
    }
}

fn ensure_non_negative(value: f32, field: &'static str) -> Result<(), ConfigError> {
    ensure(
        value.is_finite() && value >= 0.0,
        field,
        format!("must be a non-negative number, got {value}"),
    )
}

fn ensure_ordered(range: Range, field: &'static str) -> Result<(), ConfigError> {
    ensure(
        range[0] <= range[1],
        field,
        format!("min {} exceeds max {}", range[0], range[1]),
    )
}

impl Config {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let physics = &self.physics;
        ensure(
            physics.gravity.is_finite() && physics.gravity < 0.0,
            "physics.gravity",
            "must be negative",
        )?;
        ensure(
            (0.0..1.0).contains(&physics.deceleration),
            "physics.deceleration",
            "must be in [0, 1)",
        )?;
        ensure_non_negative(physics.acceleration, "physics.acceleration")?;
        ensure_non_negative(physics.max_speed, "physics.max_speed")?;
        ensure_non_negative(physics.min_speed, "physics.min_speed")?;
        ensure_non_negative(physics.jump_speed, "physics.jump_speed")?;
        ensure_non_negative(physics.jump_cooldown, "physics.jump_cooldown")?;
        ensure_non_negative(physics.turn_speed, "physics.turn_speed")?;

        let double_jump = &physics.double_jump;
        ensure_non_negative(double_jump.min_height, "physics.double_jump.min_height")?;
        ensure_non_negative(double_jump.health_cost, "physics.double_jump.health_cost")?;
        ensure_non_negative(double_jump.height, "physics.double_jump.height")?;
        ensure(
            double_jump.fall_speed_scale > 0.0 && double_jump.fall_speed_scale <= 1.0,
            "physics.double_jump.fall_speed_scale",
            "must be in (0, 1]",
        )?;
        ensure_non_negative(
            double_jump.landing_invincible_time,
            "physics.double_jump.landing_invincible_time",
        )?;
        ensure_non_negative(
            double_jump.landing_cooldown,
            "physics.double_jump.landing_cooldown",
        )?;

        ensure(self.player.height > 0.0, "player.height", "must be positive")?;
        ensure(
            (0.0..1.0).contains(&self.camera.smooth),
            "camera.smooth",
            "must be in [0, 1)",
        )?;
        ensure_non_negative(self.camera.look_limit, "camera.look_limit")?;

        let layout = &self.reference_cubes.layout;
        ensure(layout.spacing > 0, "reference_cubes.layout.spacing", "must be positive")?;
        ensure(
            layout.x[0] <= layout.x[1],
            "reference_cubes.layout.x",
            "min exceeds max",
        )?;
        ensure(
            layout.y[0] <= layout.y[1],
            "reference_cubes.layout.y",
            "min exceeds max",
        )?;

        let movement = &self.cube_movement;
        ensure_non_negative(movement.patrol_radius, "cube_movement.patrol_radius")?;
        ensure_non_negative(movement.base_speed, "cube_movement.base_speed")?;
        ensure_non_negative(movement.return_speed_scale, "cube_movement.return_speed_scale")?;
        ensure_non_negative(
            movement.direction_change.min_interval,
            "cube_movement.direction_change.min_interval",
        )?;
        ensure_ordered(
            [
                movement.direction_change.min_interval,
                movement.direction_change.max_interval,
            ],
            "cube_movement.direction_change",
        )?;
        ensure_ordered(movement.rotation_speed, "cube_movement.rotation_speed")?;

        let status = &self.player_status;
        ensure(
            status.max_health > 0.0,
            "player_status.max_health",
            "must be positive",
        )?;
        ensure(
            status.initial_health > 0.0 && status.initial_health <= status.max_health,
            "player_status.initial_health",
            "must be in (0, max_health]",
        )?;
        ensure_non_negative(
            status.health_regen.still_time,
            "player_status.health_regen.still_time",
        )?;
        ensure_non_negative(
            status.health_regen.interval,
            "player_status.health_regen.interval",
        )?;
        ensure_non_negative(status.health_regen.amount, "player_status.health_regen.amount")?;

        let damage = &self.game_rules.damage;
        ensure_non_negative(damage.cube_collision, "game_rules.damage.cube_collision")?;
        ensure_non_negative(damage.out_of_bounds, "game_rules.damage.out_of_bounds")?;
        ensure_non_negative(damage.damage_cooldown, "game_rules.damage.damage_cooldown")?;
        ensure_non_negative(damage.invincible_time, "game_rules.damage.invincible_time")?;
        ensure_non_negative(damage.warning_time, "game_rules.damage.warning_time")?;

        let boundaries = &self.game_rules.boundaries;
        ensure_ordered(boundaries.x, "game_rules.boundaries.x")?;
        ensure_ordered(boundaries.y, "game_rules.boundaries.y")?;
        ensure_non_negative(
            boundaries.violation.safe_return_time,
            "game_rules.boundaries.violation.safe_return_time",
        )?;
        ensure_non_negative(
            boundaries.violation.count_time,
            "game_rules.boundaries.violation.count_time",
        )?;
        ensure(
            boundaries.violation.max_violations >= 1,
            "game_rules.boundaries.violation.max_violations",
            "must be at least 1",
        )?;

        Ok(())
    }

    /// Z of the player's center when standing on the ground
    pub fn floor_z(&self) -> f32 {
        self.physics.ground_height + self.player.height / 2.0
    }
}
