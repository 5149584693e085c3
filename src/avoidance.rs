// ================================
// src/avoidance.rs - obstacle avoidance state
// ================================
use crate::config::MoveSpecs;
use crate::error::{NavError, Result};
use crate::lidar::SectorMinima;

/// Side the robot has committed to while following a wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnDirection {
    #[default]
    None,
    Left,
    Right,
}

impl TurnDirection {
    /// Signed multiplier used to mirror angular commands between sides.
    pub fn factor(self) -> f64 {
        match self {
            TurnDirection::None => 0.0,
            TurnDirection::Left => -1.0,
            TurnDirection::Right => 1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TurnDirection::None => "NONE",
            TurnDirection::Left => "LEFT",
            TurnDirection::Right => "RIGHT",
        }
    }
}

/// Flags refreshed once per scan in general navigation.
///
/// `is_close_to_wall` only carries meaning while `is_following_wall` is set
/// and keeps its last value otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveStatus {
    pub can_continue: bool,
    pub is_close_to_wall: bool,
    pub is_following_wall: bool,
}

impl Default for MoveStatus {
    fn default() -> Self {
        Self {
            can_continue: true,
            is_close_to_wall: false,
            is_following_wall: false,
        }
    }
}

impl MoveStatus {
    pub fn update(
        &mut self,
        minima: &SectorMinima,
        turn: TurnDirection,
        specs: &MoveSpecs,
    ) -> Result<()> {
        self.can_continue = can_continue(minima, turn, specs);
        if self.is_following_wall {
            self.is_close_to_wall = is_close_to_wall(minima, turn, specs)?;
        }
        Ok(())
    }
}

/// The side being turned toward must clear `high_security_distance`, the
/// other side only `low_security_distance`. Without a side every sector is
/// held to both.
pub fn can_continue(minima: &SectorMinima, turn: TurnDirection, specs: &MoveSpecs) -> bool {
    let (priority_min, secondary_min) = match turn {
        TurnDirection::Right => (minima.center.min(minima.right), minima.left),
        TurnDirection::Left => (minima.center.min(minima.left), minima.right),
        TurnDirection::None => {
            let overall = minima.overall();
            (overall, overall)
        }
    };

    priority_min > specs.high_security_distance && secondary_min > specs.low_security_distance
}

pub fn is_close_to_wall(
    minima: &SectorMinima,
    turn: TurnDirection,
    specs: &MoveSpecs,
) -> Result<bool> {
    let wall_min = match turn {
        TurnDirection::Right => minima.right,
        TurnDirection::Left => minima.left,
        TurnDirection::None => return Err(NavError::UndefinedWallSide),
    };
    Ok(wall_min < specs.wall_follow_distance)
}
