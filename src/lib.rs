// ================================
// src/lib.rs
// ================================
pub mod avoidance; // obstacle avoidance flags and turn direction
pub mod bridge; // line transport used by the binary
pub mod config;
pub mod control; // wall following and target approach control laws
pub mod error;
pub mod lidar; // sector analysis
pub mod navigator;
pub mod node;
pub mod target;

pub use config::NavConfig;
pub use control::VelocityCommand;
pub use error::{NavError, Result};
pub use navigator::{NavMode, Navigator};
pub use node::{CommandSink, NavigationNode, ScanFrame};
pub use target::TargetCandidate;
