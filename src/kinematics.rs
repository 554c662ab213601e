//! Differential drive kinematics
//!
//! Converts operator stick positions into normalized left/right wheel
//! speeds for tank and arcade control schemes, with configurable input and
//! motor deadbands and a nonlinear shaping curve for arcade feel.

use crate::config::DriveConfig;
use crate::oi::StickPosition;

const DEFAULT_INPUT_DEADBAND: f64 = 0.08;
const DEFAULT_MOTOR_DEADBAND: f64 = 0.05;
const MAX_DEADBAND: f64 = 0.25;

/// A left/right wheel command pair in [-1.0, 1.0]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotorSpeeds {
    pub left: f64,
    pub right: f64,
}

impl MotorSpeeds {
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }
}

/// Stateless calculator for a differential drive system
#[derive(Debug, Clone)]
pub struct DifferentialDrive {
    input_deadband: f64,
    motor_deadband: f64,
}

impl Default for DifferentialDrive {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_DEADBAND, DEFAULT_MOTOR_DEADBAND)
    }
}

impl DifferentialDrive {
    /// Create a calculator with the given deadbands.
    ///
    /// A deadband magnitude above 0.25 is rejected with a warning and the
    /// default value is substituted.
    pub fn new(input_deadband: f64, motor_deadband: f64) -> Self {
        let input_deadband = if input_deadband.abs() > MAX_DEADBAND {
            log::warn!(
                "Invalid input deadband ({}). Default value {} used.",
                input_deadband,
                DEFAULT_INPUT_DEADBAND
            );
            DEFAULT_INPUT_DEADBAND
        } else {
            input_deadband.abs()
        };

        let motor_deadband = if motor_deadband.abs() > MAX_DEADBAND {
            log::warn!(
                "Invalid motor deadband ({}). Default value {} used.",
                motor_deadband,
                DEFAULT_MOTOR_DEADBAND
            );
            DEFAULT_MOTOR_DEADBAND
        } else {
            motor_deadband.abs()
        };

        Self {
            input_deadband,
            motor_deadband,
        }
    }

    /// Create a calculator from the drive configuration
    pub fn from_config(config: &DriveConfig) -> Self {
        Self::new(config.input_deadband, config.motor_deadband)
    }

    /// Set the input deadband. Invalid values (> 0.25) are ignored.
    pub fn set_input_deadband(&mut self, input_deadband: f64) {
        if input_deadband.abs() > MAX_DEADBAND {
            log::warn!(
                "Invalid input deadband ({}). set_input_deadband ignored",
                input_deadband
            );
            return;
        }
        self.input_deadband = input_deadband.abs();
    }

    /// Set the motor output deadband. Invalid values (> 0.25) are ignored.
    pub fn set_motor_deadband(&mut self, motor_deadband: f64) {
        if motor_deadband.abs() > MAX_DEADBAND {
            log::warn!(
                "Invalid motor deadband ({}). set_motor_deadband ignored",
                motor_deadband
            );
            return;
        }
        self.motor_deadband = motor_deadband.abs();
    }

    /// Arcade drive from a single stick.
    ///
    /// By convention the stick y axis is inverted: pushing forward gives a
    /// negative y, which maps to positive speed. The x axis is the
    /// rotation.
    pub fn arcade_from_stick(&self, stick: StickPosition) -> MotorSpeeds {
        self.arcade_drive(-stick.y, stick.x)
    }

    /// Arcade drive from two sticks: the left stick y axis (inverted) is
    /// the speed and the right stick x axis is the rotation.
    pub fn arcade_from_sticks(&self, left: StickPosition, right: StickPosition) -> MotorSpeeds {
        self.arcade_drive(-left.y, right.x)
    }

    /// Calculate the motor speeds for arcade feel.
    ///
    /// Both the input deadband and the motor output deadband are applied.
    pub fn arcade_drive(&self, speed: f64, rotation: f64) -> MotorSpeeds {
        // Require a speed or rotation greater than the input deadband
        if !(speed.abs() > self.input_deadband || rotation.abs() > self.input_deadband) {
            return MotorSpeeds::default();
        }

        let scaled_speed = self.scale(speed);
        let scaled_rotation = self.scale(rotation);

        let mut left_speed;
        let mut right_speed;

        // NOTE: the dominance test compares the scaled speed against the
        // raw rotation. This asymmetry is a long-standing tuning choice;
        // keep it.
        if scaled_speed.abs() > rotation.abs() {
            // Drive forward or reverse with steering: the wheel on the
            // inside of the turn is slowed.
            left_speed = scaled_speed;
            right_speed = scaled_speed;

            if speed > 0.0 {
                if rotation > 0.0 {
                    right_speed -= scaled_rotation;
                } else {
                    left_speed += scaled_rotation;
                }
            } else {
                // Driving backwards uses an inverted backwards drive.
                // FIXME: should be selectable whether to steer in the
                // natural or inverted direction when reversing.
                if rotation > 0.0 {
                    left_speed += scaled_rotation;
                } else {
                    right_speed -= scaled_rotation;
                }
            }
        } else {
            // Rotate on the spot. As the speed is adjusted, the robot
            // moves towards a pivot around the slower side.
            left_speed = scaled_rotation;
            right_speed = -scaled_rotation;

            if rotation > 0.0 {
                // Rotating clockwise
                if speed > 0.0 {
                    right_speed += scaled_speed;
                } else {
                    left_speed += scaled_speed;
                }
            } else {
                // Rotating counter-clockwise
                if speed > 0.0 {
                    left_speed += scaled_speed;
                } else {
                    right_speed += scaled_speed;
                }
            }
        }

        if left_speed.abs() <= self.motor_deadband {
            left_speed = 0.0;
        }
        if right_speed.abs() <= self.motor_deadband {
            right_speed = 0.0;
        }

        MotorSpeeds::new(left_speed, right_speed)
    }

    /// Calculate the motor speeds for tank feel: each stick y axis
    /// (inverted) drives its side directly. Each side is zeroed
    /// independently when its value is within either deadband.
    pub fn tank_drive(&self, left: StickPosition, right: StickPosition) -> MotorSpeeds {
        let mut left_speed = -left.y;
        let mut right_speed = -right.y;

        if left_speed.abs() <= self.input_deadband || left_speed.abs() <= self.motor_deadband {
            left_speed = 0.0;
        }

        if right_speed.abs() <= self.input_deadband || right_speed.abs() <= self.motor_deadband {
            right_speed = 0.0;
        }

        MotorSpeeds::new(left_speed, right_speed)
    }

    /// Shape a stick value to make acceleration and turning smoother.
    ///
    /// Values at or below 0.6 are cut in half; values from 0.6 to 1.0 are
    /// mapped linearly onto 0.3 to 1.0. The curve is continuous at 0.6 and
    /// odd; magnitudes above 1.0 are clamped first.
    fn scale(&self, value: f64) -> f64 {
        let value = value.clamp(-1.0, 1.0);

        let abs_value = value.abs();

        if abs_value <= self.input_deadband {
            return 0.0;
        }

        if abs_value <= 0.6 {
            return value / 2.0;
        }

        // y = mx + b segment scaling inputs of 0.6..1.0 onto 0.3..1.0
        if value > 0.0 {
            0.3 + (value - 0.6) * 7.0 / 4.0
        } else {
            -0.3 + (value + 0.6) * 7.0 / 4.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn drive() -> DifferentialDrive {
        DifferentialDrive::default()
    }

    #[test]
    fn test_scale_zero_and_odd() {
        let d = drive();
        assert_eq!(d.scale(0.0), 0.0);
        for v in [0.1, 0.3, 0.6, 0.75, 0.9, 1.0, 1.2] {
            assert!((d.scale(-v) + d.scale(v)).abs() < EPS, "scale not odd at {v}");
        }
    }

    #[test]
    fn test_scale_continuity_at_branch_point() {
        let d = drive();
        // Low branch at exactly 0.6
        assert!((d.scale(0.6) - 0.3).abs() < EPS);
        // High branch limit approaching 0.6 from above
        assert!((d.scale(0.6 + 1e-9) - 0.3).abs() < 1e-7);
    }

    #[test]
    fn test_scale_known_points() {
        let d = drive();
        assert!((d.scale(0.8) - 0.65).abs() < EPS);
        // Clamped to 1.0 before shaping: 0.3 + 0.4 * 1.75 = 1.0
        assert!((d.scale(1.2) - 1.0).abs() < EPS);
        assert!((d.scale(1.0) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_arcade_inside_deadband_is_zero() {
        let d = drive();
        for speed in [-0.08, -0.05, 0.0, 0.05, 0.08] {
            for rotation in [-0.08, 0.0, 0.08] {
                assert_eq!(d.arcade_drive(speed, rotation), MotorSpeeds::default());
            }
        }
    }

    #[test]
    fn test_arcade_straight_ahead() {
        let d = drive();
        let speeds = d.arcade_drive(0.8, 0.0);
        assert!((speeds.left - 0.65).abs() < EPS);
        assert!((speeds.right - 0.65).abs() < EPS);
    }

    #[test]
    fn test_arcade_forward_clockwise_slows_right() {
        let d = drive();
        let speeds = d.arcade_drive(0.8, 0.4);
        // Translate-dominant: |scale(0.8)| = 0.65 > |0.4|
        assert!((speeds.left - 0.65).abs() < EPS);
        assert!((speeds.right - (0.65 - 0.2)).abs() < EPS);
    }

    #[test]
    fn test_arcade_reverse_clockwise_slows_left() {
        let d = drive();
        let speeds = d.arcade_drive(-0.8, 0.4);
        // Inverted backwards steering: the left wheel takes the correction
        assert!((speeds.left - (-0.65 + 0.2)).abs() < EPS);
        assert!((speeds.right - (-0.65)).abs() < EPS);
    }

    #[test]
    fn test_arcade_rotate_dominant_point_turn() {
        let d = drive();
        let speeds = d.arcade_drive(0.0, 0.8);
        assert!((speeds.left - 0.65).abs() < EPS);
        assert!((speeds.right - (-0.65)).abs() < EPS);
    }

    #[test]
    fn test_arcade_rotate_dominant_drift_turn() {
        let d = drive();
        // |scale(0.3)| = 0.15 < |0.8|: rotate-dominant with drift
        let speeds = d.arcade_drive(0.3, 0.8);
        assert!((speeds.left - 0.65).abs() < EPS);
        assert!((speeds.right - (-0.65 + 0.15)).abs() < EPS);
    }

    #[test]
    fn test_tiebreak_compares_raw_rotation() {
        let d = drive();
        // scale(0.5) = 0.25; raw rotation 0.3 > 0.25 forces the rotate
        // branch even though scale(0.3) = 0.15 < 0.25. Documented quirk:
        // the dominance test uses the unscaled rotation.
        let speeds = d.arcade_drive(0.5, 0.3);
        // Rotate-dominant, clockwise, forward: right += scaled speed
        assert!((speeds.left - 0.15).abs() < EPS);
        assert!((speeds.right - (-0.15 + 0.25)).abs() < EPS);
    }

    #[test]
    fn test_arcade_motor_deadband_snap() {
        // Wide motor deadband swallows the small point-turn output
        let d = DifferentialDrive::new(0.08, 0.2);
        let speeds = d.arcade_drive(0.0, 0.3);
        // scale(0.3) = 0.15 <= 0.2 on both wheels
        assert_eq!(speeds, MotorSpeeds::default());
    }

    #[test]
    fn test_tank_independent_deadbands() {
        let d = drive();
        let speeds = d.tank_drive(StickPosition::new(0.0, -0.5), StickPosition::new(0.0, -0.04));
        assert_eq!(speeds.left, 0.5);
        assert_eq!(speeds.right, 0.0);

        let speeds = d.tank_drive(StickPosition::new(0.0, 0.06), StickPosition::new(0.0, 0.9));
        assert_eq!(speeds.left, 0.0);
        assert_eq!(speeds.right, -0.9);
    }

    #[test]
    fn test_invalid_deadband_substitutes_default() {
        let d = DifferentialDrive::new(0.4, 0.3);
        assert_eq!(d.input_deadband, DEFAULT_INPUT_DEADBAND);
        assert_eq!(d.motor_deadband, DEFAULT_MOTOR_DEADBAND);
    }

    #[test]
    fn test_invalid_deadband_setter_ignored() {
        let mut d = drive();
        d.set_input_deadband(0.5);
        d.set_motor_deadband(-0.5);
        assert_eq!(d.input_deadband, DEFAULT_INPUT_DEADBAND);
        assert_eq!(d.motor_deadband, DEFAULT_MOTOR_DEADBAND);

        d.set_input_deadband(-0.1);
        assert_eq!(d.input_deadband, 0.1);
    }
}
