// ================================
// src/navigator.rs - per-scan navigation state machine
// ================================
use crate::avoidance::{MoveStatus, TurnDirection};
use crate::config::{MoveSpecs, NavConfig};
use crate::control::{
    wall_follow_step, TargetApproachController, VelocityCommand, WallFollowAction,
};
use crate::error::Result;
use crate::lidar::SectorMinima;
use crate::target::{ModeLatch, TargetCandidate};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavMode {
    GeneralNavigation,
    /// Terminal. Nothing in this controller leaves it.
    TargetApproach,
}

impl NavMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NavMode::GeneralNavigation => "GENERAL_NAVIGATION",
            NavMode::TargetApproach => "TARGET_APPROACH",
        }
    }
}

/// Owns every piece of mutable controller state. One scan in, at most one
/// command out.
pub struct Navigator {
    specs: MoveSpecs,
    latch: ModeLatch,
    approach: TargetApproachController,
    status: MoveStatus,
    turn: TurnDirection,
    mode: NavMode,
    rng: StdRng,
    cycles: u64,
    warned_unset_side: bool,
}

impl Navigator {
    /// Seeds the side picker from `node.rng_seed`, or once from the OS.
    pub fn new(config: &NavConfig) -> Self {
        let rng = match config.node.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(config, rng)
    }

    pub fn with_rng(config: &NavConfig, rng: StdRng) -> Self {
        Self {
            specs: config.move_specs.clone(),
            latch: ModeLatch::new(config),
            approach: TargetApproachController::new(config),
            status: MoveStatus::default(),
            turn: TurnDirection::None,
            mode: NavMode::GeneralNavigation,
            rng,
            cycles: 0,
            warned_unset_side: false,
        }
    }

    pub fn status(&self) -> &MoveStatus {
        &self.status
    }

    pub fn turn(&self) -> TurnDirection {
        self.turn
    }

    pub fn mode(&self) -> NavMode {
        self.mode
    }

    pub fn is_locked(&self) -> bool {
        self.mode == NavMode::TargetApproach
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Runs one controller pass over `ranges`.
    ///
    /// Errors are fatal: a sector or sample outside the scan, or wall
    /// following without a committed side.
    pub fn cycle(
        &mut self,
        ranges: &[f32],
        candidate: &TargetCandidate,
    ) -> Result<Option<VelocityCommand>> {
        self.cycles += 1;
        match self.mode {
            NavMode::GeneralNavigation => self.general_navigation(ranges, candidate),
            NavMode::TargetApproach => self.target_approach(ranges),
        }
    }

    fn general_navigation(
        &mut self,
        ranges: &[f32],
        candidate: &TargetCandidate,
    ) -> Result<Option<VelocityCommand>> {
        // The lock takes effect from the next scan; this one still runs the
        // wall-follow policy.
        if self.latch.should_lock(ranges, self.turn, candidate)? {
            info!(
                "Target locked at ({:.3}, {:.3}) turning {}: {} -> {}",
                candidate.x,
                candidate.y,
                self.turn.as_str(),
                self.mode.as_str(),
                NavMode::TargetApproach.as_str()
            );
            self.mode = NavMode::TargetApproach;
        }

        let minima = SectorMinima::from_scan(ranges, &self.specs)?;
        self.status.update(&minima, self.turn, &self.specs)?;

        debug!(
            cycle = self.cycles,
            right = minima.right,
            left = minima.left,
            center = minima.center,
            can_continue = self.status.can_continue,
            following = self.status.is_following_wall,
            close = self.status.is_close_to_wall,
            "Sector minima"
        );

        match wall_follow_step(&self.status, self.turn, &self.specs) {
            WallFollowAction::EnterWallFollow => {
                self.turn = self.pick_side();
                self.status.is_following_wall = true;
                info!(
                    "Obstacle ahead, following wall on the {} side",
                    self.turn.as_str()
                );
                Ok(None)
            }
            WallFollowAction::Drive(cmd) => Ok(Some(cmd)),
        }
    }

    fn target_approach(&mut self, ranges: &[f32]) -> Result<Option<VelocityCommand>> {
        let cmd = self.approach.command(ranges, self.turn)?;
        if cmd.is_none() && !self.warned_unset_side {
            warn!("Target approach has no committed side, holding commands");
            self.warned_unset_side = true;
        }
        Ok(cmd)
    }

    fn pick_side(&mut self) -> TurnDirection {
        if self.rng.random_bool(0.5) {
            TurnDirection::Right
        } else {
            TurnDirection::Left
        }
    }
}
