//! Scripted maneuver run against mock hardware
//!
//! Stands in for the robot's periodic scheduler: builds a gyro drive from
//! mock devices, runs a rotate-to-heading followed by a
//! drive-on-heading-for-distance, and logs progress. A crude kinematic
//! model feeds actuator outputs back into the mock sensors each tick.

use std::env;
use std::sync::Arc;

use yantra_drive::commands::{
    Command, DriveOnHeadingDistanceCommand, RotateToHeadingCommand,
};
use yantra_drive::config::DriveConfig;
use yantra_drive::devices::mock::{MockActuator, MockEncoder, MockGyro};
use yantra_drive::devices::Actuator;
use yantra_drive::oi::{OperatorInput, StickPosition};
use yantra_drive::subsystem::{DriveSubsystem, GyroDriveSubsystem};
use yantra_drive::Result;

/// Operator input that never signals anything
struct IdleInput;

impl OperatorInput for IdleInput {
    fn cancel(&self) -> bool {
        false
    }
    fn reset(&self) -> bool {
        false
    }
    fn speed_pids_on(&self) -> bool {
        false
    }
    fn heading_request(&self) -> Option<f64> {
        None
    }
    fn left_stick(&self) -> StickPosition {
        StickPosition::default()
    }
    fn right_stick(&self) -> StickPosition {
        StickPosition::default()
    }
}

/// Crude plant model: wheel outputs move the mock gyro and encoders
struct Plant {
    left_motor: MockActuator,
    right_motor: MockActuator,
    left_encoder: MockEncoder,
    right_encoder: MockEncoder,
    gyro: MockGyro,
    heading: f64,
    left_counts: f64,
    right_counts: f64,
}

impl Plant {
    /// Advance the model by one 20ms tick
    fn step(&mut self, max_encoder_speed: f64) {
        const TICK_S: f64 = 0.02;
        // Full output turns the robot at ~180 deg/s
        const TURN_RATE: f64 = 180.0;

        let left = self.left_motor.last_output();
        let right = self.right_motor.last_output();

        self.heading += (left - right) / 2.0 * TURN_RATE * TICK_S;
        self.left_counts += left * max_encoder_speed * TICK_S;
        self.right_counts += right * max_encoder_speed * TICK_S;

        self.gyro.set_angle(self.heading);
        self.left_encoder.set_position(self.left_counts as i64);
        self.right_encoder.set_position(self.right_counts as i64);
        self.left_encoder.set_rate(left * max_encoder_speed);
        self.right_encoder.set_rate(right * max_encoder_speed);
    }
}

fn run_command(
    name: &str,
    command: &mut dyn Command<GyroDriveSubsystem>,
    drive: &mut GyroDriveSubsystem,
    plant: &mut Plant,
    max_encoder_speed: f64,
) {
    log::info!("Starting {name}");
    command.on_start(drive);

    let mut ticks = 0u32;
    loop {
        command.on_tick(drive);
        drive.tick();
        plant.step(max_encoder_speed);
        ticks += 1;

        if command.is_done(drive) {
            break;
        }
        if ticks % 25 == 0 {
            log::info!(
                "{name}: tick {ticks}, heading {:.1} deg, distance {:.1} in",
                drive.current_heading(),
                drive.drive().distance_inches()
            );
        }
    }
    command.on_end(drive, false);
    log::info!(
        "{name}: done after {ticks} ticks, heading {:.1} deg, distance {:.1} in",
        drive.current_heading(),
        drive.drive().distance_inches()
    );
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match env::args().nth(1) {
        Some(path) => {
            log::info!("Using config: {path}");
            DriveConfig::from_file(path)?
        }
        None => DriveConfig::default(),
    };

    let mut plant = Plant {
        left_motor: MockActuator::new(),
        right_motor: MockActuator::new(),
        left_encoder: MockEncoder::new(),
        right_encoder: MockEncoder::new(),
        gyro: MockGyro::new(),
        heading: 0.0,
        left_counts: 0.0,
        right_counts: 0.0,
    };

    let base = DriveSubsystem::with_encoders(
        Box::new(plant.left_motor.clone()),
        Box::new(plant.right_motor.clone()),
        Some(Box::new(plant.left_encoder.clone())),
        Some(Box::new(plant.right_encoder.clone())),
        config.encoder_counts_per_inch,
        config.speed_kp,
        config.max_encoder_speed,
    );
    let mut drive = GyroDriveSubsystem::new(
        base,
        Box::new(plant.gyro.clone()),
        config.gyro_kp,
        config.gyro_ki,
        config.max_rotation_output,
    );

    let oi: Arc<dyn OperatorInput> = Arc::new(IdleInput);

    let mut rotate = RotateToHeadingCommand::new(
        90.0,
        config.heading_tolerance_deg,
        Some(config.default_timeout_ticks),
        Arc::clone(&oi),
    );
    run_command(
        "rotate-to-heading 90",
        &mut rotate,
        &mut drive,
        &mut plant,
        config.max_encoder_speed,
    );

    // Zero heading tolerance so the distance condition ends this leg;
    // the heading is already converged from the rotate.
    let mut drive_distance = DriveOnHeadingDistanceCommand::new(
        24.0,
        90.0,
        0.5,
        0.0,
        Some(config.default_timeout_ticks * 4),
        true,
        Arc::clone(&oi),
    );
    run_command(
        "drive-on-heading 90 for 24in",
        &mut drive_distance,
        &mut drive,
        &mut plant,
        config.max_encoder_speed,
    );

    Ok(())
}
