//! Default operator drive command
//!
//! The command the scheduler falls back to when no maneuver is running. It
//! never finishes on its own: each tick it services the standard operator
//! controls and maps the sticks onto wheel speeds.

use crate::commands::{Command, CommandDispatch, RotateToHeadingCommand};
use crate::config::DriveConfig;
use crate::kinematics::DifferentialDrive;
use crate::oi::OperatorInput;
use crate::subsystem::GyroDriveSubsystem;
use std::sync::Arc;

/// Operator control scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveStyle {
    /// Left stick speed, right stick rotation
    Arcade,
    /// Each stick drives its own side
    Tank,
}

/// Default driver-control command.
///
/// Per tick, in order: reset signal (encoders and gyro reference), speed
/// PID toggle, rotate-to-heading request (dispatched as a follow-up
/// command through the [`CommandDispatch`] handle), then stick input
/// through the kinematics mapper onto the wheels.
pub struct DefaultDriveCommand<D> {
    oi: Arc<dyn OperatorInput>,
    mapper: DifferentialDrive,
    style: DriveStyle,
    dispatch: D,
    config: DriveConfig,
}

impl<D> DefaultDriveCommand<D>
where
    D: CommandDispatch<GyroDriveSubsystem>,
{
    pub fn new(
        oi: Arc<dyn OperatorInput>,
        style: DriveStyle,
        dispatch: D,
        config: DriveConfig,
    ) -> Self {
        Self {
            mapper: DifferentialDrive::from_config(&config),
            oi,
            style,
            dispatch,
            config,
        }
    }
}

impl<D> Command<GyroDriveSubsystem> for DefaultDriveCommand<D>
where
    D: CommandDispatch<GyroDriveSubsystem>,
{
    fn on_start(&mut self, _drive: &mut GyroDriveSubsystem) {}

    fn on_tick(&mut self, drive: &mut GyroDriveSubsystem) {
        // Service the standard driver buttons before driving

        if self.oi.reset() {
            drive.drive_mut().reset_encoders();
            drive.reset_gyro_angle();
        }

        if self.oi.speed_pids_on() {
            drive.drive_mut().enable_speed_pids();
        } else {
            drive.drive_mut().disable_speed_pids();
        }

        if let Some(heading) = self.oi.heading_request() {
            self.dispatch.schedule(Box::new(RotateToHeadingCommand::new(
                heading,
                self.config.heading_tolerance_deg,
                Some(self.config.default_timeout_ticks),
                Arc::clone(&self.oi),
            )));
            // The rotate command preempts this one; leave the wheel
            // speeds to it.
            return;
        }

        let speeds = match self.style {
            DriveStyle::Arcade => self
                .mapper
                .arcade_from_sticks(self.oi.left_stick(), self.oi.right_stick()),
            DriveStyle::Tank => self
                .mapper
                .tank_drive(self.oi.left_stick(), self.oi.right_stick()),
        };

        drive.drive_mut().set_motor_speeds(speeds);
    }

    fn is_done(&mut self, _drive: &mut GyroDriveSubsystem) -> bool {
        false
    }

    fn on_end(&mut self, _drive: &mut GyroDriveSubsystem, _was_cancelled: bool) {}
}
