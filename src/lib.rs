//! YantraDrive - Control core for a differential-drive mobile robot
//!
//! This library converts operator stick input into wheel commands, holds
//! wheel speed and heading to setpoints with PID feedback, and sequences
//! multi-step driving maneuvers as cancellable, timeout-bounded commands.
//!
//! ## Architecture
//!
//! The core is single-threaded and driven by an external periodic scheduler
//! (typically 20ms). Within one tick, operator input is processed first,
//! then drive kinematics, then the PID update, then actuator writes, so the
//! same tick's input affects that tick's output.
//!
//! Hardware is reached only through the narrow traits in [`devices`]:
//! actuators, encoders, and a gyro. Mock implementations for hardware-free
//! testing live in [`devices::mock`].

pub mod commands;
pub mod config;
pub mod devices;
pub mod error;
pub mod kinematics;
pub mod oi;
pub mod pid;
pub mod subsystem;

// Re-export commonly used types
pub use config::DriveConfig;
pub use error::{Error, Result};
