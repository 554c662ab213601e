//! Gyro heading maneuvers
//!
//! Three layered maneuvers over [`GyroDriveSubsystem`]:
//! drive-on-heading, drive-on-heading-for-distance, and rotate-to-heading.
//! Each layer wraps the previous one and ORs in one more finishing
//! condition on top of the base cancel/timeout predicate.

use crate::commands::{Command, SafeCommand};
use crate::oi::OperatorInput;
use crate::subsystem::GyroDriveSubsystem;
use std::sync::Arc;

/// Drive at a fixed speed while steering onto a target heading.
///
/// Finishes when the heading error is within tolerance, on timeout, or on
/// operator cancel. A target heading outside [0, 360) is a caller error:
/// the command logs and finishes immediately as a no-op.
pub struct DriveOnHeadingCommand {
    safe: SafeCommand,
    heading_deg: f64,
    speed: f64,
    tolerance_deg: f64,
    brake_when_finished: bool,
}

impl DriveOnHeadingCommand {
    pub fn new(
        heading_deg: f64,
        speed: f64,
        tolerance_deg: f64,
        timeout_ticks: Option<u32>,
        brake_when_finished: bool,
        oi: Arc<dyn OperatorInput>,
    ) -> Self {
        Self {
            safe: SafeCommand::new(timeout_ticks, oi),
            heading_deg,
            speed,
            tolerance_deg,
            brake_when_finished,
        }
    }

    /// Retarget a running command without restarting it
    pub fn set_heading(&mut self, drive: &mut GyroDriveSubsystem, heading_deg: f64) {
        self.heading_deg = heading_deg;
        if !self.safe.state().finished() {
            drive.drive_on_heading(self.speed, heading_deg);
        }
    }
}

impl Command<GyroDriveSubsystem> for DriveOnHeadingCommand {
    fn on_start(&mut self, drive: &mut GyroDriveSubsystem) {
        if !(0.0..360.0).contains(&self.heading_deg) {
            log::error!(
                "DriveOnHeading: target heading {} out of range [0, 360), command abandoned",
                self.heading_deg
            );
            self.safe.state_mut().mark_finished();
            return;
        }

        log::info!(
            "DriveOnHeading: heading {:.1} deg at speed {:.2}",
            self.heading_deg,
            self.speed
        );
        drive.drive_on_heading(self.speed, self.heading_deg);
    }

    fn on_tick(&mut self, _drive: &mut GyroDriveSubsystem) {
        self.safe.advance();
    }

    fn is_done(&mut self, drive: &mut GyroDriveSubsystem) -> bool {
        if self.safe.base_done() {
            return true;
        }

        if drive.heading_error().abs() <= self.tolerance_deg {
            self.safe.state_mut().mark_finished();
            return true;
        }

        false
    }

    fn on_end(&mut self, drive: &mut GyroDriveSubsystem, was_cancelled: bool) {
        drive.end_heading_hold();
        if self.brake_when_finished {
            drive.drive_mut().set_speed(0.0, 0.0);
        }
        log::debug!(
            "DriveOnHeading: ended after {} ticks, cancelled={}",
            self.safe.state().elapsed_ticks(),
            was_cancelled
        );
    }
}

/// Drive on a heading for a given distance.
///
/// Resets the encoders on start and finishes once the distance travelled
/// reaches the target, in addition to every condition of
/// [`DriveOnHeadingCommand`]. The distance is in inches, or raw encoder
/// counts when the counts-per-inch scale is unset.
pub struct DriveOnHeadingDistanceCommand {
    inner: DriveOnHeadingCommand,
    distance: f64,
}

impl DriveOnHeadingDistanceCommand {
    pub fn new(
        distance: f64,
        heading_deg: f64,
        speed: f64,
        tolerance_deg: f64,
        timeout_ticks: Option<u32>,
        brake_when_finished: bool,
        oi: Arc<dyn OperatorInput>,
    ) -> Self {
        Self {
            inner: DriveOnHeadingCommand::new(
                heading_deg,
                speed,
                tolerance_deg,
                timeout_ticks,
                brake_when_finished,
                oi,
            ),
            distance,
        }
    }
}

impl Command<GyroDriveSubsystem> for DriveOnHeadingDistanceCommand {
    fn on_start(&mut self, drive: &mut GyroDriveSubsystem) {
        self.inner.on_start(drive);
        drive.drive_mut().reset_encoders();
    }

    fn on_tick(&mut self, drive: &mut GyroDriveSubsystem) {
        self.inner.on_tick(drive);
    }

    fn is_done(&mut self, drive: &mut GyroDriveSubsystem) -> bool {
        if self.inner.is_done(drive) {
            return true;
        }

        if drive.drive().distance_inches() >= self.distance {
            self.inner.safe.state_mut().mark_finished();
            return true;
        }

        false
    }

    fn on_end(&mut self, drive: &mut GyroDriveSubsystem, was_cancelled: bool) {
        self.inner.on_end(drive, was_cancelled);
    }
}

/// Rotate in place onto a target heading: a drive-on-heading with the
/// speed fixed at zero and braking on finish.
pub struct RotateToHeadingCommand {
    inner: DriveOnHeadingCommand,
}

impl RotateToHeadingCommand {
    pub fn new(
        heading_deg: f64,
        tolerance_deg: f64,
        timeout_ticks: Option<u32>,
        oi: Arc<dyn OperatorInput>,
    ) -> Self {
        Self {
            inner: DriveOnHeadingCommand::new(heading_deg, 0.0, tolerance_deg, timeout_ticks, true, oi),
        }
    }
}

impl Command<GyroDriveSubsystem> for RotateToHeadingCommand {
    fn on_start(&mut self, drive: &mut GyroDriveSubsystem) {
        self.inner.on_start(drive);
    }

    fn on_tick(&mut self, drive: &mut GyroDriveSubsystem) {
        self.inner.on_tick(drive);
    }

    fn is_done(&mut self, drive: &mut GyroDriveSubsystem) -> bool {
        self.inner.is_done(drive)
    }

    fn on_end(&mut self, drive: &mut GyroDriveSubsystem, was_cancelled: bool) {
        self.inner.on_end(drive, was_cancelled);
    }
}
