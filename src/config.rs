//! Configuration for the drive control core
//!
//! Loads configuration from a TOML file. The configuration value is built
//! once by the caller and passed into each component that needs it; there
//! is no global robot-identifier switch.

use crate::error::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Drive control configuration
///
/// Defaults carry the calibration constants of the reference test robot.
#[derive(Debug, Clone, Deserialize)]
pub struct DriveConfig {
    /// Stick input deadband, valid range 0..=0.25
    #[serde(default = "default_input_deadband")]
    pub input_deadband: f64,

    /// Motor output deadband, valid range 0..=0.25
    #[serde(default = "default_motor_deadband")]
    pub motor_deadband: f64,

    /// Proportional gain for the per-wheel speed PIDs
    #[serde(default = "default_speed_kp")]
    pub speed_kp: f64,

    /// Proportional gain for the heading PID, per unit of normalized
    /// heading error (error in degrees / 180). The default corresponds to
    /// 0.05 per degree.
    #[serde(default = "default_gyro_kp")]
    pub gyro_kp: f64,

    /// Integral gain for the heading PID
    #[serde(default)]
    pub gyro_ki: f64,

    /// Maximum magnitude of the heading correction blended into wheel speeds
    #[serde(default = "default_max_rotation_output")]
    pub max_rotation_output: f64,

    /// Encoder rate at full output under load, in counts/second.
    /// Used to normalize PID feedback.
    #[serde(default = "default_max_encoder_speed")]
    pub max_encoder_speed: f64,

    /// Encoder counts per inch of travel. 0 means distance queries report
    /// raw counts.
    #[serde(default = "default_encoder_counts_per_inch")]
    pub encoder_counts_per_inch: f64,

    /// Heading tolerance in degrees for heading commands to finish
    #[serde(default = "default_heading_tolerance")]
    pub heading_tolerance_deg: f64,

    /// Default command timeout in scheduler ticks (150 ticks = 3s at 20ms)
    #[serde(default = "default_timeout_ticks")]
    pub default_timeout_ticks: u32,
}

fn default_input_deadband() -> f64 {
    0.08
}

fn default_motor_deadband() -> f64 {
    0.05
}

fn default_speed_kp() -> f64 {
    0.3
}

fn default_gyro_kp() -> f64 {
    9.0
}

fn default_max_rotation_output() -> f64 {
    0.6
}

fn default_max_encoder_speed() -> f64 {
    580.0
}

fn default_encoder_counts_per_inch() -> f64 {
    55.6
}

fn default_heading_tolerance() -> f64 {
    5.0
}

fn default_timeout_ticks() -> u32 {
    150
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            input_deadband: default_input_deadband(),
            motor_deadband: default_motor_deadband(),
            speed_kp: default_speed_kp(),
            gyro_kp: default_gyro_kp(),
            gyro_ki: 0.0,
            max_rotation_output: default_max_rotation_output(),
            max_encoder_speed: default_max_encoder_speed(),
            encoder_counts_per_inch: default_encoder_counts_per_inch(),
            heading_tolerance_deg: default_heading_tolerance(),
            default_timeout_ticks: default_timeout_ticks(),
        }
    }
}

impl DriveConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: DriveConfig = toml::from_str(&contents)?;
        Ok(config)
    }
}
