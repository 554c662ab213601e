//! Differential drive subsystem
//!
//! A left/right drive with optional encoders on each side. The subsystem
//! can run open-loop or with per-wheel speed PIDs; distance and speed
//! queries degrade to a -1 sentinel when encoders are absent.

use crate::devices::{Actuator, Encoder};
use crate::kinematics::MotorSpeeds;
use crate::pid::NormalizedPid;

/// Sentinel returned by distance/speed queries when encoders are absent
pub const NO_ENCODER: f64 = -1.0;

/// Differential drive subsystem with optional closed-loop speed control
pub struct DriveSubsystem {
    left_motor: Box<dyn Actuator>,
    right_motor: Box<dyn Actuator>,

    left_encoder: Option<Box<dyn Encoder>>,
    right_encoder: Option<Box<dyn Encoder>>,

    left_speed_pid: NormalizedPid,
    right_speed_pid: NormalizedPid,

    max_encoder_speed: f64,
    encoder_counts_per_inch: f64,

    speed_pids_enabled: bool,
}

impl DriveSubsystem {
    /// Create a drive subsystem without encoders (open-loop only).
    ///
    /// The speed PIDs start disabled; without encoders they cannot be
    /// enabled.
    pub fn new(left_motor: Box<dyn Actuator>, right_motor: Box<dyn Actuator>) -> Self {
        Self::with_encoders(left_motor, right_motor, None, None, 0.0, 0.0, 1.0)
    }

    /// Create a drive subsystem with encoders and speed PID parameters.
    ///
    /// The speed PIDs start disabled; use
    /// [`enable_speed_pids`](Self::enable_speed_pids) and
    /// [`disable_speed_pids`](Self::disable_speed_pids) to turn them on and
    /// off.
    pub fn with_encoders(
        left_motor: Box<dyn Actuator>,
        right_motor: Box<dyn Actuator>,
        left_encoder: Option<Box<dyn Encoder>>,
        right_encoder: Option<Box<dyn Encoder>>,
        encoder_counts_per_inch: f64,
        kp: f64,
        max_encoder_speed: f64,
    ) -> Self {
        log::debug!(
            "DriveSubsystem: initialized, encoders={}, kp={}, max_encoder_speed={}",
            left_encoder.is_some() && right_encoder.is_some(),
            kp,
            max_encoder_speed
        );

        Self {
            left_motor,
            right_motor,
            left_encoder,
            right_encoder,
            left_speed_pid: NormalizedPid::new(kp),
            right_speed_pid: NormalizedPid::new(kp),
            max_encoder_speed,
            encoder_counts_per_inch,
            speed_pids_enabled: false,
        }
    }

    /// Enable the wheel speed PIDs.
    ///
    /// Silently refused when either encoder is absent or either
    /// proportional gain is zero; the subsystem stays open-loop. No-op when
    /// already enabled. Enabling clears the PID state; call
    /// [`set_speed`](Self::set_speed) afterwards to establish setpoints.
    pub fn enable_speed_pids(&mut self) {
        if self.speed_pids_enabled {
            return;
        }

        if self.left_encoder.is_none() || self.right_encoder.is_none() {
            return;
        }

        if self.left_speed_pid.kp() == 0.0 || self.right_speed_pid.kp() == 0.0 {
            return;
        }

        self.left_speed_pid.enable();
        self.right_speed_pid.enable();
        self.speed_pids_enabled = true;
    }

    /// Disable the wheel speed PIDs.
    ///
    /// The current actuator outputs are not changed; use
    /// [`set_speed`](Self::set_speed) to drive the motors directly after
    /// disabling.
    pub fn disable_speed_pids(&mut self) {
        if self.speed_pids_enabled {
            self.left_speed_pid.disable();
            self.right_speed_pid.disable();
            self.speed_pids_enabled = false;
        }
    }

    /// Whether the speed PIDs are currently enabled
    pub fn speed_pids_enabled(&self) -> bool {
        self.speed_pids_enabled
    }

    /// Set the wheel speeds.
    ///
    /// With the PIDs enabled this only updates the setpoints; actuation is
    /// deferred to the next [`tick`](Self::tick). With the PIDs disabled
    /// the actuators are driven immediately.
    pub fn set_speed(&mut self, left: f64, right: f64) {
        if self.speed_pids_enabled {
            self.left_speed_pid.set_setpoint(left);
            self.right_speed_pid.set_setpoint(right);
        } else {
            self.left_motor.set_output(left.clamp(-1.0, 1.0));
            self.right_motor.set_output(right.clamp(-1.0, 1.0));
        }
    }

    /// Set the wheel speeds from a calculated pair
    pub fn set_motor_speeds(&mut self, speeds: MotorSpeeds) {
        self.set_speed(speeds.left, speeds.right);
    }

    /// Zero both encoder counters. No-op if either encoder is absent.
    pub fn reset_encoders(&mut self) {
        let (Some(left), Some(right)) = (&mut self.left_encoder, &mut self.right_encoder) else {
            return;
        };
        left.reset();
        right.reset();
    }

    /// Average of the left and right encoder counts, or -1.0 if either
    /// encoder is absent.
    pub fn encoder_distance(&self) -> f64 {
        let (Some(left), Some(right)) = (&self.left_encoder, &self.right_encoder) else {
            return NO_ENCODER;
        };
        (left.position() + right.position()) as f64 / 2.0
    }

    /// Distance travelled in inches, or raw counts when the counts-per-inch
    /// scale is unset (0), or -1.0 if encoders are absent.
    pub fn distance_inches(&self) -> f64 {
        if self.encoder_counts_per_inch == 0.0 {
            return self.encoder_distance();
        }
        self.encoder_distance() / self.encoder_counts_per_inch
    }

    /// Average of the left and right encoder rates in counts/second, or
    /// -1.0 if either encoder is absent.
    pub fn encoder_speed(&self) -> f64 {
        let (Some(left), Some(right)) = (&self.left_encoder, &self.right_encoder) else {
            return NO_ENCODER;
        };
        (left.rate() + right.rate()) / 2.0
    }

    /// Attach or replace the encoders after construction.
    ///
    /// Setting either side to `None` disables the speed PIDs.
    pub fn set_encoders(
        &mut self,
        left_encoder: Option<Box<dyn Encoder>>,
        left_inverted: bool,
        right_encoder: Option<Box<dyn Encoder>>,
        right_inverted: bool,
        encoder_counts_per_inch: f64,
    ) {
        self.left_encoder = left_encoder;
        self.right_encoder = right_encoder;

        if let Some(left) = &mut self.left_encoder {
            left.set_inverted(left_inverted);
        }
        if let Some(right) = &mut self.right_encoder {
            right.set_inverted(right_inverted);
        }

        if self.left_encoder.is_none() || self.right_encoder.is_none() {
            self.disable_speed_pids();
        }

        self.set_encoder_counts_per_inch(encoder_counts_per_inch);
    }

    /// Set the encoder counts per inch. 0 makes
    /// [`distance_inches`](Self::distance_inches) report raw counts.
    pub fn set_encoder_counts_per_inch(&mut self, encoder_counts_per_inch: f64) {
        self.encoder_counts_per_inch = encoder_counts_per_inch;
    }

    /// Set the max loaded encoder rate used to normalize PID feedback.
    /// Used when a gear shift changes the attainable encoder speed.
    pub fn set_max_encoder_speed(&mut self, max_encoder_speed: f64) {
        self.max_encoder_speed = max_encoder_speed;
    }

    /// Set the proportional gain on both speed PIDs. A gain of zero
    /// disables the PIDs.
    pub fn set_speed_pid_gain(&mut self, kp: f64) {
        self.left_speed_pid.set_gain(kp);
        self.right_speed_pid.set_gain(kp);

        if kp == 0.0 {
            self.disable_speed_pids();
        }
    }

    /// Run one control tick.
    ///
    /// With encoders present and the PIDs enabled, each side's encoder
    /// rate (normalized by the max encoder speed) feeds its PID and the
    /// output is written to the actuator, clamped to [-1.0, 1.0].
    /// Otherwise the actuators keep their last commanded value.
    pub fn tick(&mut self) {
        let (Some(left_encoder), Some(right_encoder)) = (&self.left_encoder, &self.right_encoder)
        else {
            return;
        };

        if !self.speed_pids_enabled {
            return;
        }

        // Speed PID calculations require a normalized rate
        let left_output = self
            .left_speed_pid
            .calculate(left_encoder.rate() / self.max_encoder_speed);
        let right_output = self
            .right_speed_pid
            .calculate(right_encoder.rate() / self.max_encoder_speed);

        self.left_motor.set_output(left_output.clamp(-1.0, 1.0));
        self.right_motor.set_output(right_output.clamp(-1.0, 1.0));

        log::trace!(
            "DriveSubsystem: tick L={:.3} R={:.3}",
            self.left_motor.last_output(),
            self.right_motor.last_output()
        );
    }
}
