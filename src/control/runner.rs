//! # Control Loop Module
//!
//! Feeds control frames to the drive and arm controllers.
//!
//! The loop is the single owner of the actuation sink and of the arm state:
//! frames arrive over a channel and are processed one at a time. After every
//! arm update the loop waits out the arm update interval before taking the
//! next frame, which paces the servos at roughly 20 Hz. The wait is not
//! cancelled by shutdown.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::arm::{ArmController, ArmState};
use super::drive::DriveController;
use super::frame::ControlFrame;
use crate::actuator::ActuationSink;
use crate::config::Config;
use crate::error::Result;

/// Which pipelines each frame feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    /// Wheels only
    Drive,
    /// Arm only
    Arm,
    /// Wheels, then arm
    #[default]
    Both,
}

impl ControlMode {
    #[must_use]
    pub fn uses_drive(self) -> bool {
        matches!(self, ControlMode::Drive | ControlMode::Both)
    }

    #[must_use]
    pub fn uses_arm(self) -> bool {
        matches!(self, ControlMode::Arm | ControlMode::Both)
    }
}

/// Owns the sink and both controllers for the lifetime of a control session.
#[derive(Debug)]
pub struct ControlLoop<S> {
    sink: S,
    drive: DriveController,
    arm: ArmController,
    mode: ControlMode,
    arm_interval: Duration,
    log_interval_frames: u64,
    frames: u64,
}

impl<S: ActuationSink> ControlLoop<S> {
    /// Builds a loop from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration fails [`Config::validate`].
    pub fn new(sink: S, config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            sink,
            drive: DriveController::new(config.drive.limits()),
            arm: ArmController::new(config.arm.limits()),
            mode: config.control.mode,
            arm_interval: config.arm.update_interval(),
            log_interval_frames: config.control.log_interval_frames,
            frames: 0,
        })
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    #[must_use]
    pub fn into_sink(self) -> S {
        self.sink
    }

    #[must_use]
    pub fn arm_state(&self) -> &ArmState {
        self.arm.state()
    }

    /// Frames handled since the loop was built.
    #[must_use]
    pub fn frames_processed(&self) -> u64 {
        self.frames
    }

    /// Starts the PWM channels of every enabled subsystem.
    pub fn start(&mut self) -> Result<()> {
        if self.mode.uses_drive() {
            self.drive.init(&mut self.sink)?;
        }
        if self.mode.uses_arm() {
            self.arm.init(&mut self.sink)?;
        }
        info!("Control loop started ({:?} mode)", self.mode);
        Ok(())
    }

    /// Parks every enabled subsystem and stops its PWM channels.
    pub fn terminate(&mut self) -> Result<()> {
        if self.mode.uses_drive() {
            self.drive.terminate(&mut self.sink)?;
        }
        if self.mode.uses_arm() {
            self.arm.terminate(&mut self.sink)?;
        }
        info!("Control loop stopped after {} frames", self.frames);
        Ok(())
    }

    /// Applies one frame to the enabled controllers.
    ///
    /// Returns only after the arm update interval has elapsed when the arm
    /// was moved.
    pub async fn handle_frame(&mut self, frame: &ControlFrame) -> Result<()> {
        if self.mode.uses_drive() {
            self.drive.apply(frame, &mut self.sink)?;
        }

        if self.mode.uses_arm() {
            self.arm.apply(frame, &mut self.sink)?;
            tokio::time::sleep(self.arm_interval).await;
        }

        self.frames += 1;
        if self.frames % self.log_interval_frames == 0 {
            info!("Processed {} frames (last {})", self.frames, frame);
        }
        Ok(())
    }

    /// Runs the loop until the frame channel closes or `shutdown` resolves.
    ///
    /// Starts the subsystems first and always terminates them on the way out,
    /// including after a sink error during start-up or frame handling. The
    /// first error is the one returned.
    ///
    /// # Returns
    ///
    /// Total number of frames processed.
    pub async fn run<F>(&mut self, rx: &mut mpsc::Receiver<ControlFrame>, shutdown: F) -> Result<u64>
    where
        F: Future<Output = ()>,
    {
        let outcome = match self.start() {
            Ok(()) => self.process_frames(rx, shutdown).await,
            Err(e) => Err(e),
        };
        if let Err(e) = &outcome {
            warn!("Control loop aborted: {}", e);
        }

        let stopped = self.terminate();
        outcome?;
        stopped?;
        Ok(self.frames)
    }

    async fn process_frames<F>(&mut self, rx: &mut mpsc::Receiver<ControlFrame>, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    return Ok(());
                }

                received = rx.recv() => match received {
                    Some(frame) => self.handle_frame(&frame).await?,
                    None => {
                        debug!("Frame source closed");
                        return Ok(());
                    }
                },
            }
        }
    }
}
