// ================================
// src/target.rs - target candidates and the approach latch
// ================================
use crate::avoidance::TurnDirection;
use crate::config::{ApproachParams, NavConfig, SensorGeometry};
use crate::error::Result;
use crate::lidar::sample;

/// Robot-relative position of a detected circular target (meters).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetCandidate {
    pub x: f64,
    pub y: f64,
}

impl TargetCandidate {
    /// Sentinel published by the detector when nothing is visible.
    pub const NOT_DETECTED: Self = Self { x: -10.0, y: -10.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_detected(&self) -> bool {
        *self != Self::NOT_DETECTED
    }

    pub fn distance_sq(&self) -> f64 {
        self.x.powi(2) + self.y.powi(2)
    }
}

impl Default for TargetCandidate {
    fn default() -> Self {
        Self::NOT_DETECTED
    }
}

/// Decides when general navigation hands over to the target approach.
pub struct ModeLatch {
    geometry: SensorGeometry,
    params: ApproachParams,
}

impl ModeLatch {
    pub fn new(config: &NavConfig) -> Self {
        Self {
            geometry: config.geometry.clone(),
            params: config.approach.clone(),
        }
    }

    /// Range behind the candidate on the committed side.
    pub fn wall_reading(&self, ranges: &[f32], turn: TurnDirection) -> Result<f64> {
        match turn {
            TurnDirection::Right => sample(ranges, self.geometry.right_wall_index),
            TurnDirection::Left => sample(ranges, self.geometry.left_wall_index),
            TurnDirection::None => Ok(self.params.unset_wall_reading),
        }
    }

    /// Candidate centered, close, and with an unobstructed corridor behind it.
    pub fn is_reachable(&self, candidate: &TargetCandidate, wall: f64) -> bool {
        if !candidate.is_detected() {
            return false;
        }

        let threshold = candidate.distance_sq() + self.params.clearance_margin;
        wall.powi(2) > threshold
            && candidate.x.abs() < self.params.lateral_window
            && candidate.y < self.params.max_forward
    }

    pub fn should_lock(
        &self,
        ranges: &[f32],
        turn: TurnDirection,
        candidate: &TargetCandidate,
    ) -> Result<bool> {
        let wall = self.wall_reading(ranges, turn)?;
        Ok(self.is_reachable(candidate, wall))
    }
}
