// ================================
// src/node.rs - scan queue and command publishing
// ================================
use crate::config::NavConfig;
use crate::control::VelocityCommand;
use crate::error::Result;
use crate::navigator::{NavMode, Navigator};
use crate::target::TargetCandidate;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

/// One scan bundled with the latest detector output.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanFrame {
    pub ranges: Vec<f32>,
    pub target: TargetCandidate,
}

impl ScanFrame {
    pub fn new(ranges: Vec<f32>, target: TargetCandidate) -> Self {
        Self { ranges, target }
    }
}

/// Actuator side of the transport.
pub trait CommandSink {
    fn publish(&mut self, cmd: VelocityCommand) -> Result<()>;
}

/// Collects commands in memory.
impl CommandSink for Vec<VelocityCommand> {
    fn publish(&mut self, cmd: VelocityCommand) -> Result<()> {
        self.push(cmd);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub commands: u64,
    pub overruns: u64,
    pub mode: NavMode,
}

/// Bounded scan queue sized from `node.queue_depth`. Producers await
/// capacity, so frames are never dropped.
pub fn scan_channel(config: &NavConfig) -> (mpsc::Sender<ScanFrame>, mpsc::Receiver<ScanFrame>) {
    mpsc::channel(config.node.queue_depth)
}

pub struct NavigationNode<S: CommandSink> {
    navigator: Navigator,
    scan_receiver: mpsc::Receiver<ScanFrame>,
    sink: S,
    cycle_period: Duration,
    debug_mode: bool,
    commands: u64,
    overruns: u64,
}

impl<S: CommandSink> NavigationNode<S> {
    pub fn new(
        config: &NavConfig,
        navigator: Navigator,
        scan_receiver: mpsc::Receiver<ScanFrame>,
        sink: S,
    ) -> Self {
        Self {
            navigator,
            scan_receiver,
            sink,
            cycle_period: Duration::from_millis(config.node.cycle_period_ms),
            debug_mode: config.node.debug_mode,
            commands: 0,
            overruns: 0,
        }
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            cycles: self.navigator.cycles(),
            commands: self.commands,
            overruns: self.overruns,
            mode: self.navigator.mode(),
        }
    }

    /// Processes frames in arrival order until the queue closes or shutdown
    /// is signalled. A fatal cycle error stops the loop and is returned.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<RunSummary> {
        info!(
            "Navigation node running, cycle period {} ms",
            self.cycle_period.as_millis()
        );

        loop {
            tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Shutdown requested");
                        break;
                    }
                }
                frame = self.scan_receiver.recv() => match frame {
                    Some(frame) => {
                        self.process_frame(&frame)?;
                    }
                    None => {
                        info!("Scan stream closed");
                        break;
                    }
                },
            }
        }

        Ok(self.summary())
    }

    /// One full controller pass plus publishing.
    pub fn process_frame(&mut self, frame: &ScanFrame) -> Result<Option<VelocityCommand>> {
        let started = Instant::now();

        let cmd = match self.navigator.cycle(&frame.ranges, &frame.target) {
            Ok(cmd) => cmd,
            Err(e) => {
                error!("Halting after cycle {}: {}", self.navigator.cycles(), e);
                return Err(e);
            }
        };

        if let Some(cmd) = cmd {
            self.sink.publish(cmd)?;
            self.commands += 1;
            if self.debug_mode {
                info!(
                    "[{}] linear: {:.3}, angular: {:.3}",
                    self.navigator.mode().as_str(),
                    cmd.linear,
                    cmd.angular
                );
            } else {
                debug!(linear = cmd.linear, angular = cmd.angular, "Command");
            }
        }

        let elapsed = started.elapsed();
        if elapsed > self.cycle_period {
            self.overruns += 1;
            warn!(
                "Cycle {} took {:?}, longer than the {:?} period",
                self.navigator.cycles(),
                elapsed,
                self.cycle_period
            );
        }

        Ok(cmd)
    }
}
