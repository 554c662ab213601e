//! Drive subsystems
//!
//! [`DriveSubsystem`](drive::DriveSubsystem) owns the wheel actuators,
//! optional encoders and the per-wheel speed PIDs.
//! [`GyroDriveSubsystem`](gyro::GyroDriveSubsystem) layers a gyro heading
//! hold on top of it.

pub mod drive;
pub mod gyro;

pub use drive::DriveSubsystem;
pub use gyro::GyroDriveSubsystem;
