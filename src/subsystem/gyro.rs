//! Gyro drive subsystem
//!
//! Layers a heading hold on top of [`DriveSubsystem`]: while a hold is
//! active, a heading PID turns the shortest signed angular error into a
//! rotation correction that is blended additively into the wheel speeds
//! each tick.

use crate::devices::Gyro;
use crate::pid::NormalizedPid;
use crate::subsystem::DriveSubsystem;

/// Wrap an angular difference in degrees to the shortest signed
/// equivalent in (-180.0, 180.0]
pub fn wrap_heading_error(degrees: f64) -> f64 {
    let mut a = degrees % 360.0;
    if a > 180.0 {
        a -= 360.0;
    }
    if a <= -180.0 {
        a += 360.0;
    }
    a
}

/// Differential drive with a gyro heading hold
pub struct GyroDriveSubsystem {
    drive: DriveSubsystem,

    gyro: Box<dyn Gyro>,
    heading_pid: NormalizedPid,

    /// Clamp on the rotation correction magnitude
    max_rotation_output: f64,

    /// Active heading hold target in [0, 360), if any
    heading_target: Option<f64>,

    /// Forward speed commanded while the hold is active
    cruise_speed: f64,
}

impl GyroDriveSubsystem {
    /// Create a gyro drive subsystem wrapping an existing drive.
    pub fn new(
        drive: DriveSubsystem,
        gyro: Box<dyn Gyro>,
        gyro_kp: f64,
        gyro_ki: f64,
        max_rotation_output: f64,
    ) -> Self {
        Self {
            drive,
            gyro,
            heading_pid: NormalizedPid::with_gains(gyro_kp, gyro_ki, 0.0),
            max_rotation_output,
            heading_target: None,
            cruise_speed: 0.0,
        }
    }

    /// The wrapped drive subsystem
    pub fn drive(&self) -> &DriveSubsystem {
        &self.drive
    }

    /// The wrapped drive subsystem, mutably
    pub fn drive_mut(&mut self) -> &mut DriveSubsystem {
        &mut self.drive
    }

    /// Current heading in degrees, wrapped to [0, 360)
    pub fn current_heading(&self) -> f64 {
        self.gyro.heading_degrees().rem_euclid(360.0)
    }

    /// Shortest signed error in degrees from the current heading to the
    /// hold target, or 0 when no hold is active. Positive means the target
    /// is clockwise of the current heading.
    pub fn heading_error(&self) -> f64 {
        match self.heading_target {
            Some(target) => wrap_heading_error(target - self.current_heading()),
            None => 0.0,
        }
    }

    /// Whether a heading hold is active
    pub fn heading_hold_active(&self) -> bool {
        self.heading_target.is_some()
    }

    /// Engage a heading hold: drive at the given speed while steering onto
    /// the target heading. The caller validates the heading range.
    pub fn drive_on_heading(&mut self, speed: f64, heading_deg: f64) {
        self.heading_target = Some(heading_deg);
        self.cruise_speed = speed;
        self.heading_pid.enable();
    }

    /// Engage a heading hold that rotates in place
    pub fn rotate_to_heading(&mut self, heading_deg: f64) {
        self.drive_on_heading(0.0, heading_deg);
    }

    /// Update the cruise speed of an active hold
    pub fn set_cruise_speed(&mut self, speed: f64) {
        self.cruise_speed = speed;
    }

    /// Disengage the heading hold. The wheels keep their last commanded
    /// speeds; callers brake explicitly if they want a stop.
    pub fn end_heading_hold(&mut self) {
        self.heading_target = None;
        self.cruise_speed = 0.0;
        self.heading_pid.disable();
    }

    /// Zero the gyro reference heading. Any active hold is ended, since
    /// its target is meaningless against the new reference.
    pub fn reset_gyro_angle(&mut self) {
        self.gyro.reset_heading();
        self.end_heading_hold();
    }

    /// Set the clamp on the rotation correction magnitude
    pub fn set_max_rotation_output(&mut self, max_rotation_output: f64) {
        self.max_rotation_output = max_rotation_output;
    }

    /// Update the heading PID proportional gain
    pub fn set_gyro_pid_gain(&mut self, kp: f64) {
        self.heading_pid.set_gain(kp);
    }

    /// Run one control tick.
    ///
    /// While a hold is active the heading correction is computed first and
    /// blended into the wheel speeds, then the wrapped drive ticks so its
    /// speed PIDs see this tick's setpoints.
    pub fn tick(&mut self) {
        if self.heading_target.is_some() {
            let error = self.heading_error() / 180.0;
            // Setpoint is 0; feed the negated normalized error so the PID
            // error term equals the normalized heading error.
            let correction = self
                .heading_pid
                .calculate(-error)
                .clamp(-self.max_rotation_output, self.max_rotation_output);

            // Positive error: target is clockwise, so speed up the left
            // wheel and slow the right.
            self.drive.set_speed(
                (self.cruise_speed + correction).clamp(-1.0, 1.0),
                (self.cruise_speed - correction).clamp(-1.0, 1.0),
            );
        }

        self.drive.tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::mock::{MockActuator, MockGyro};
    use crate::devices::Actuator;

    struct Rig {
        gyro_drive: GyroDriveSubsystem,
        left_motor: MockActuator,
        right_motor: MockActuator,
        gyro: MockGyro,
    }

    fn rig() -> Rig {
        let left_motor = MockActuator::new();
        let right_motor = MockActuator::new();
        let gyro = MockGyro::new();
        let drive = DriveSubsystem::new(
            Box::new(left_motor.clone()),
            Box::new(right_motor.clone()),
        );
        let gyro_drive =
            GyroDriveSubsystem::new(drive, Box::new(gyro.clone()), 0.05, 0.0, 0.6);
        Rig {
            gyro_drive,
            left_motor,
            right_motor,
            gyro,
        }
    }

    #[test]
    fn test_wrap_heading_error() {
        assert_eq!(wrap_heading_error(0.0), 0.0);
        assert_eq!(wrap_heading_error(90.0), 90.0);
        assert_eq!(wrap_heading_error(180.0), 180.0);
        assert_eq!(wrap_heading_error(-180.0), 180.0);
        assert_eq!(wrap_heading_error(270.0), -90.0);
        assert_eq!(wrap_heading_error(-270.0), 90.0);
        assert_eq!(wrap_heading_error(450.0), 90.0);
    }

    #[test]
    fn test_heading_error_wraps_shortest_way() {
        let mut r = rig();
        r.gyro.set_angle(350.0);
        r.gyro_drive.rotate_to_heading(10.0);
        // 10 - 350 = -340 wraps to +20 (clockwise through north)
        assert!((r.gyro_drive.heading_error() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_correction_direction() {
        let mut r = rig();
        r.gyro.set_angle(0.0);
        r.gyro_drive.rotate_to_heading(90.0);
        r.gyro_drive.tick();
        // Target is clockwise: left wheel forward, right wheel back
        assert!(r.left_motor.last_output() > 0.0);
        assert!(r.right_motor.last_output() < 0.0);
        assert_eq!(
            r.left_motor.last_output(),
            -r.right_motor.last_output()
        );
    }

    #[test]
    fn test_rotation_correction_clamped() {
        let mut r = rig();
        // Large gain so the raw PID output exceeds the clamp
        r.gyro_drive.set_gyro_pid_gain(10.0);
        r.gyro.set_angle(0.0);
        r.gyro_drive.rotate_to_heading(180.0);
        r.gyro_drive.tick();
        assert_eq!(r.left_motor.last_output(), 0.6);
        assert_eq!(r.right_motor.last_output(), -0.6);
    }

    #[test]
    fn test_cruise_speed_blended() {
        let mut r = rig();
        r.gyro.set_angle(0.0);
        r.gyro_drive.drive_on_heading(0.5, 90.0);
        r.gyro_drive.tick();
        // Correction = 0.05 * 90/180 = 0.025
        assert!((r.left_motor.last_output() - 0.525).abs() < 1e-9);
        assert!((r.right_motor.last_output() - 0.475).abs() < 1e-9);
    }

    #[test]
    fn test_no_hold_leaves_speeds_alone() {
        let mut r = rig();
        r.gyro_drive.drive_mut().set_speed(0.3, 0.3);
        r.gyro_drive.tick();
        assert_eq!(r.left_motor.last_output(), 0.3);
        assert_eq!(r.right_motor.last_output(), 0.3);
    }

    #[test]
    fn test_reset_gyro_ends_hold() {
        let mut r = rig();
        r.gyro.set_angle(45.0);
        r.gyro_drive.rotate_to_heading(90.0);
        r.gyro_drive.reset_gyro_angle();
        assert!(!r.gyro_drive.heading_hold_active());
        assert_eq!(r.gyro_drive.current_heading(), 0.0);
        assert_eq!(r.gyro_drive.heading_error(), 0.0);
    }
}
