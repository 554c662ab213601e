//! Normalized PID controller
//!
//! A single-axis PID controller whose setpoint and feedback are pre-scaled
//! to [-1.0, 1.0], with an explicit enable/disable lifecycle. The output is
//! not clamped here; callers clamp to the actuation range.

/// Single-axis PID controller on normalized values
#[derive(Debug, Clone)]
pub struct NormalizedPid {
    kp: f64,
    ki: f64,
    kd: f64,

    setpoint: f64,
    integrator: f64,
    last_error: f64,
    last_output: f64,

    enabled: bool,
}

impl NormalizedPid {
    /// Create a proportional-only controller
    pub fn new(kp: f64) -> Self {
        Self::with_gains(kp, 0.0, 0.0)
    }

    /// Create a controller with all three gains
    pub fn with_gains(kp: f64, ki: f64, kd: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            setpoint: 0.0,
            integrator: 0.0,
            last_error: 0.0,
            last_output: 0.0,
            enabled: false,
        }
    }

    /// Enable the controller.
    ///
    /// On the disabled-to-enabled transition the integrator and error
    /// history are cleared. Gains and setpoint are untouched. No-op when
    /// already enabled.
    ///
    /// Callers are responsible for refusing to enable when feedback is
    /// unavailable or the proportional gain is zero; this controller has no
    /// knowledge of hardware availability.
    pub fn enable(&mut self) {
        if self.enabled {
            return;
        }
        self.integrator = 0.0;
        self.last_error = 0.0;
        self.enabled = true;
    }

    /// Disable the controller.
    ///
    /// The setpoint and last output are left as-is; the last commanded
    /// actuator output stands until the caller overwrites it. No-op when
    /// already disabled.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Whether the controller is enabled
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Run one controller update with the given normalized feedback.
    ///
    /// Has no effect while disabled; returns the last output unchanged.
    pub fn calculate(&mut self, feedback: f64) -> f64 {
        if !self.enabled {
            return self.last_output;
        }

        let error = self.setpoint - feedback;
        self.integrator += error;

        let output =
            self.kp * error + self.ki * self.integrator + self.kd * (error - self.last_error);

        self.last_error = error;
        self.last_output = output;
        output
    }

    /// Last computed output
    pub fn last_output(&self) -> f64 {
        self.last_output
    }

    /// Set the normalized setpoint
    pub fn set_setpoint(&mut self, setpoint: f64) {
        self.setpoint = setpoint;
    }

    /// Current setpoint
    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    /// Update the proportional gain.
    ///
    /// A gain of zero is a signal to the owning subsystem to disable the
    /// loop; that policy lives with the owner, not here.
    pub fn set_gain(&mut self, kp: f64) {
        self.kp = kp;
    }

    /// Current proportional gain
    pub fn kp(&self) -> f64 {
        self.kp
    }
}
