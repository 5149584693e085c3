// ================================
// src/control.rs - velocity commands, wall following and target approach
// ================================
use crate::avoidance::{MoveStatus, TurnDirection};
use crate::config::{ApproachParams, MoveSpecs, NavConfig, SensorGeometry};
use crate::error::Result;
use crate::lidar::sample;
use std::fmt;

/// Actuator command: forward speed and yaw rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityCommand {
    pub linear: f64,
    pub angular: f64,
}

impl VelocityCommand {
    pub fn new(linear: f64, angular: f64) -> Self {
        Self { linear, angular }
    }

    pub fn straight(linear: f64) -> Self {
        Self::new(linear, 0.0)
    }

    pub fn rotate(angular: f64) -> Self {
        Self::new(0.0, angular)
    }
}

impl fmt::Display for VelocityCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.linear, self.angular)
    }
}

/// Outcome of one wall-follow policy step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WallFollowAction {
    /// Blocked with no side chosen yet. The caller picks a side; nothing is
    /// published this cycle and the new side steers from the next scan on.
    EnterWallFollow,
    Drive(VelocityCommand),
}

/// General navigation policy over the avoidance flags.
pub fn wall_follow_step(
    status: &MoveStatus,
    turn: TurnDirection,
    specs: &MoveSpecs,
) -> WallFollowAction {
    let turn_rate = turn.factor() * specs.angular_velocity;
    let straight = VelocityCommand::straight(specs.linear_velocity);

    match (
        status.can_continue,
        status.is_following_wall,
        status.is_close_to_wall,
    ) {
        (false, false, _) => WallFollowAction::EnterWallFollow,
        (true, false, _) => WallFollowAction::Drive(straight),
        // Clear ahead and still tracking the wall
        (true, true, true) => WallFollowAction::Drive(straight),
        // Blocked: turn toward the committed side
        (false, true, _) => WallFollowAction::Drive(VelocityCommand::rotate(turn_rate)),
        // Drifted away from the wall: swing back
        (true, true, false) => WallFollowAction::Drive(VelocityCommand::rotate(-turn_rate)),
    }
}

/// Bang-bang heading corrector used once a target is locked.
///
/// Compares a forward sample against a sample at the edge of the followed
/// sector. On a straight corridor the forward reading equals the back reading
/// scaled by the sine of the angle between the two beams.
pub struct TargetApproachController {
    specs: MoveSpecs,
    geometry: SensorGeometry,
    params: ApproachParams,
    beam_sin: f64,
}

impl TargetApproachController {
    pub fn new(config: &NavConfig) -> Self {
        Self {
            specs: config.move_specs.clone(),
            geometry: config.geometry.clone(),
            params: config.approach.clone(),
            beam_sin: config.approach.beam_angle_deg.to_radians().sin(),
        }
    }

    /// `front - sin(beam_angle) * back` for the committed side, or `None`
    /// without one.
    pub fn heading_error(&self, ranges: &[f32], turn: TurnDirection) -> Result<Option<f64>> {
        let (back_index, front_index) = match turn {
            TurnDirection::Right => (self.specs.right_range.low, self.geometry.right_front_index),
            TurnDirection::Left => (self.specs.left_range.high, self.geometry.left_front_index),
            TurnDirection::None => return Ok(None),
        };

        let back = sample(ranges, back_index)?;
        let front = sample(ranges, front_index)?;
        Ok(Some(front - self.beam_sin * back))
    }

    pub fn correction(&self, diff: f64, turn: TurnDirection) -> VelocityCommand {
        let turn_rate = turn.factor() * self.specs.angular_velocity / self.params.turn_divisor;

        if diff.abs() <= self.params.deadband {
            VelocityCommand::straight(self.specs.linear_velocity)
        } else if diff > 0.0 {
            VelocityCommand::rotate(-turn_rate)
        } else {
            VelocityCommand::rotate(turn_rate)
        }
    }

    pub fn command(&self, ranges: &[f32], turn: TurnDirection) -> Result<Option<VelocityCommand>> {
        Ok(self
            .heading_error(ranges, turn)?
            .map(|diff| self.correction(diff, turn)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn config() -> NavConfig {
        NavConfig::for_tests()
    }

    fn status(can_continue: bool, is_following_wall: bool, is_close_to_wall: bool) -> MoveStatus {
        MoveStatus {
            can_continue,
            is_close_to_wall,
            is_following_wall,
        }
    }

    fn step(status: MoveStatus, turn: TurnDirection) -> WallFollowAction {
        wall_follow_step(&status, turn, &config().move_specs)
    }

    fn drive(cmd: VelocityCommand) -> WallFollowAction {
        WallFollowAction::Drive(cmd)
    }

    #[test]
    fn test_blocked_without_wall_enters_wall_follow() {
        for close in [false, true] {
            let action = step(status(false, false, close), TurnDirection::None);
            assert_eq!(action, WallFollowAction::EnterWallFollow);
        }
    }

    #[test]
    fn test_clear_path_drives_straight() {
        let expected = drive(VelocityCommand::straight(0.4));
        let unset = status(true, false, false);
        assert_eq!(step(unset, TurnDirection::None), expected);
        let close = status(true, true, true);
        assert_eq!(step(close, TurnDirection::Left), expected);
    }

    #[test]
    fn test_blocked_while_following_turns_toward_side() {
        assert_eq!(
            step(status(false, true, true), TurnDirection::Right),
            drive(VelocityCommand::rotate(0.8))
        );
        assert_eq!(
            step(status(false, true, false), TurnDirection::Left),
            drive(VelocityCommand::rotate(-0.8))
        );
    }

    #[test]
    fn test_lost_wall_swings_back() {
        for turn in [TurnDirection::Left, TurnDirection::Right] {
            let WallFollowAction::Drive(cmd) = step(status(true, true, false), turn) else {
                panic!("expected a drive command");
            };
            assert_eq!(cmd.linear, 0.0);
            assert_eq!(cmd.angular, -turn.factor() * 0.8);
        }
    }

    #[test]
    fn test_every_flag_combination_has_one_action() {
        let enter = WallFollowAction::EnterWallFollow;
        let straight = drive(VelocityCommand::straight(0.4));
        let toward = drive(VelocityCommand::rotate(0.8));
        let away = drive(VelocityCommand::rotate(-0.8));

        // (can_continue, is_following_wall, is_close_to_wall) -> action
        let table = [
            ((false, false, false), enter),
            ((false, false, true), enter),
            ((true, false, false), straight),
            ((true, false, true), straight),
            ((true, true, true), straight),
            ((false, true, false), toward),
            ((false, true, true), toward),
            ((true, true, false), away),
        ];
        for ((cont, follow, close), expected) in table {
            let action = step(status(cont, follow, close), TurnDirection::Right);
            assert_eq!(action, expected, "flags {:?}", (cont, follow, close));
        }
    }

    fn scan_with(back_index: usize, back: f32, front_index: usize, front: f32) -> Vec<f32> {
        let mut ranges = vec![3.0; 720];
        ranges[back_index] = back;
        ranges[front_index] = front;
        ranges
    }

    #[test]
    fn test_heading_error_right() {
        let controller = TargetApproachController::new(&config());
        let ranges = scan_with(350, 1.2, 90, 1.0);
        let diff = controller
            .heading_error(&ranges, TurnDirection::Right)
            .unwrap()
            .unwrap();
        assert_relative_eq!(diff, 1.0 - 1.2 * 3f64.sqrt() / 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_inside_deadband_drives_straight() {
        let controller = TargetApproachController::new(&config());
        let ranges = scan_with(350, 1.2, 90, 1.0);
        let cmd = controller.command(&ranges, TurnDirection::Right).unwrap().unwrap();
        assert_eq!(cmd, VelocityCommand::straight(0.4));

        for diff in [-0.05, -0.01, 0.0, 0.03, 0.05] {
            for turn in [TurnDirection::Left, TurnDirection::Right] {
                let cmd = controller.correction(diff, turn);
                assert_eq!(cmd.angular, 0.0);
                assert_eq!(cmd.linear, 0.4);
            }
        }
    }

    #[test]
    fn test_outside_deadband_rotates_at_quarter_rate() {
        let controller = TargetApproachController::new(&config());
        assert_eq!(
            controller.correction(0.2, TurnDirection::Right),
            VelocityCommand::rotate(-0.2)
        );
        assert_eq!(
            controller.correction(-0.2, TurnDirection::Right),
            VelocityCommand::rotate(0.2)
        );
        assert_eq!(
            controller.correction(0.2, TurnDirection::Left),
            VelocityCommand::rotate(0.2)
        );
        assert_eq!(
            controller.correction(-0.2, TurnDirection::Left),
            VelocityCommand::rotate(-0.2)
        );
    }

    #[test]
    fn test_left_uses_sector_high_edge_and_left_front() {
        let controller = TargetApproachController::new(&config());
        let ranges = scan_with(340, 2.0, 630, 1.0);
        let diff = controller
            .heading_error(&ranges, TurnDirection::Left)
            .unwrap()
            .unwrap();
        assert!(diff < -0.05);
        let cmd = controller.command(&ranges, TurnDirection::Left).unwrap().unwrap();
        assert_eq!(cmd, VelocityCommand::rotate(-0.2));
    }

    #[test]
    fn test_no_direction_yields_no_command() {
        let controller = TargetApproachController::new(&config());
        let ranges = vec![1.0; 720];
        let cmd = controller.command(&ranges, TurnDirection::None).unwrap();
        assert_eq!(cmd, None);
    }

    #[test]
    fn test_short_scan_fails() {
        let controller = TargetApproachController::new(&config());
        let ranges = vec![1.0; 200];
        assert!(controller.command(&ranges, TurnDirection::Right).is_err());
    }
}
