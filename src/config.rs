// ================================
// src/config.rs - navigation parameters loaded from TOML
// ================================
use crate::error::{NavError, Result};
use serde::Deserialize;
use std::{env, fs, path::Path};

pub const DEFAULT_CONFIG_PATH: &str = "./nav_params.toml";

/// Closed index interval `[low, high]` into a range scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorRange {
    pub low: usize,
    pub high: usize,
}

impl SectorRange {
    pub fn new(low: usize, high: usize) -> Result<Self> {
        if low > high {
            return Err(NavError::InvalidSector { low, high });
        }
        Ok(Self { low, high })
    }
}

// Flat on-disk layout of [move_specs]. Every key is required.
#[derive(Deserialize, Debug, Clone)]
struct RawMoveSpecs {
    high_security_distance: f64,
    low_security_distance: f64,
    wall_follow_distance: f64,
    linear_velocity: f64,
    angular_velocity: f64,
    right_range_low_lim: usize,
    right_range_high_lim: usize,
    left_range_low_lim: usize,
    left_range_high_lim: usize,
    center_range_low_lim: usize,
    center_range_high_lim: usize,
}

/// Motion thresholds, velocities and scan sectors. Immutable after startup.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(try_from = "RawMoveSpecs")]
pub struct MoveSpecs {
    pub high_security_distance: f64,
    pub low_security_distance: f64,
    pub wall_follow_distance: f64,
    pub linear_velocity: f64,
    pub angular_velocity: f64,
    pub right_range: SectorRange,
    pub left_range: SectorRange,
    pub center_range: SectorRange,
}

impl TryFrom<RawMoveSpecs> for MoveSpecs {
    type Error = NavError;

    fn try_from(raw: RawMoveSpecs) -> Result<Self> {
        let scalars = [
            ("high_security_distance", raw.high_security_distance),
            ("low_security_distance", raw.low_security_distance),
            ("wall_follow_distance", raw.wall_follow_distance),
            ("linear_velocity", raw.linear_velocity),
            ("angular_velocity", raw.angular_velocity),
        ];
        for (name, value) in scalars {
            if !value.is_finite() || value < 0.0 {
                return Err(NavError::Config(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        Ok(Self {
            high_security_distance: raw.high_security_distance,
            low_security_distance: raw.low_security_distance,
            wall_follow_distance: raw.wall_follow_distance,
            linear_velocity: raw.linear_velocity,
            angular_velocity: raw.angular_velocity,
            right_range: SectorRange::new(raw.right_range_low_lim, raw.right_range_high_lim)?,
            left_range: SectorRange::new(raw.left_range_low_lim, raw.left_range_high_lim)?,
            center_range: SectorRange::new(raw.center_range_low_lim, raw.center_range_high_lim)?,
        })
    }
}

/// Fixed scan samples tied to the sensor mounting.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SensorGeometry {
    /// Wall reading checked by the target latch while turning right
    #[serde(default = "default_right_wall_index")]
    pub right_wall_index: usize,
    /// Wall reading checked by the target latch while turning left
    #[serde(default = "default_left_wall_index")]
    pub left_wall_index: usize,
    /// Forward sample used by the approach controller when turning right
    #[serde(default = "default_right_front_index")]
    pub right_front_index: usize,
    /// Forward sample used by the approach controller when turning left
    #[serde(default = "default_left_front_index")]
    pub left_front_index: usize,
}

impl Default for SensorGeometry {
    fn default() -> Self {
        Self {
            right_wall_index: default_right_wall_index(),
            left_wall_index: default_left_wall_index(),
            right_front_index: default_right_front_index(),
            left_front_index: default_left_front_index(),
        }
    }
}

/// Target latch window and approach control law.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ApproachParams {
    /// Heading error tolerated before correcting (meters)
    #[serde(default = "default_deadband")]
    pub deadband: f64,
    /// Angular offset between the front and back samples (degrees)
    #[serde(default = "default_beam_angle_deg")]
    pub beam_angle_deg: f64,
    /// Angular velocity is divided by this while correcting
    #[serde(default = "default_turn_divisor")]
    pub turn_divisor: f64,
    /// Candidate must satisfy |x| < lateral_window
    #[serde(default = "default_lateral_window")]
    pub lateral_window: f64,
    /// Candidate must satisfy y < max_forward
    #[serde(default = "default_max_forward")]
    pub max_forward: f64,
    /// Added to the squared candidate distance before comparing with the wall
    #[serde(default = "default_clearance_margin")]
    pub clearance_margin: f64,
    /// Wall reading assumed while no turn direction is set
    #[serde(default = "default_unset_wall_reading")]
    pub unset_wall_reading: f64,
}

impl Default for ApproachParams {
    fn default() -> Self {
        Self {
            deadband: default_deadband(),
            beam_angle_deg: default_beam_angle_deg(),
            turn_divisor: default_turn_divisor(),
            lateral_window: default_lateral_window(),
            max_forward: default_max_forward(),
            clearance_margin: default_clearance_margin(),
            unset_wall_reading: default_unset_wall_reading(),
        }
    }
}

/// Runtime options for the node loop.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct NodeParams {
    #[serde(default = "default_cycle_period_ms")]
    pub cycle_period_ms: u64,
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,
    /// Fixed seed for the wall side picker; OS entropy when absent
    #[serde(default)]
    pub rng_seed: Option<u64>,
    #[serde(default)]
    pub debug_mode: bool,
}

impl Default for NodeParams {
    fn default() -> Self {
        Self {
            cycle_period_ms: default_cycle_period_ms(),
            queue_depth: default_queue_depth(),
            rng_seed: None,
            debug_mode: false,
        }
    }
}

fn default_right_wall_index() -> usize {
    380
}
fn default_left_wall_index() -> usize {
    340
}
fn default_right_front_index() -> usize {
    90
}
fn default_left_front_index() -> usize {
    630
}
fn default_deadband() -> f64 {
    0.05
}
fn default_beam_angle_deg() -> f64 {
    60.0
}
fn default_turn_divisor() -> f64 {
    4.0
}
fn default_lateral_window() -> f64 {
    0.5
}
fn default_max_forward() -> f64 {
    1.0
}
fn default_clearance_margin() -> f64 {
    0.5
}
fn default_unset_wall_reading() -> f64 {
    1.0
}
fn default_cycle_period_ms() -> u64 {
    100
} // 10 Hz detector rate
fn default_queue_depth() -> usize {
    100
}

/// Complete parameter file.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct NavConfig {
    pub move_specs: MoveSpecs,
    #[serde(default)]
    pub geometry: SensorGeometry,
    #[serde(default)]
    pub approach: ApproachParams,
    #[serde(default)]
    pub node: NodeParams,
}

impl NavConfig {
    /// Path from `CONFIG_PATH`, falling back to `./nav_params.toml`.
    pub fn config_path() -> String {
        env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
    }

    /// Load parameters from the file named by `CONFIG_PATH`.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(&Self::config_path()))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path).map_err(|e| {
            NavError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&config_str)
    }

    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: NavConfig = toml::from_str(config_str)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let approach = &self.approach;
        if approach.turn_divisor <= 0.0 {
            return Err(NavError::Config("turn_divisor must be positive".into()));
        }
        if approach.deadband < 0.0 {
            return Err(NavError::Config("deadband must be non-negative".into()));
        }
        if self.node.queue_depth == 0 {
            return Err(NavError::Config("queue_depth must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
impl NavConfig {
    /// The sample parameter set with fixed sectors and default tables.
    pub(crate) fn for_tests() -> Self {
        NavConfig {
            move_specs: MoveSpecs {
                high_security_distance: 1.0,
                low_security_distance: 0.3,
                wall_follow_distance: 0.8,
                linear_velocity: 0.4,
                angular_velocity: 0.8,
                right_range: SectorRange {
                    low: 350,
                    high: 400,
                },
                left_range: SectorRange {
                    low: 300,
                    high: 340,
                },
                center_range: SectorRange {
                    low: 410,
                    high: 440,
                },
            },
            geometry: SensorGeometry::default(),
            approach: ApproachParams::default(),
            node: NodeParams::default(),
        }
    }
}
