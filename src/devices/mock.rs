//! Mock devices for hardware-free testing
//!
//! Each mock is a cloneable handle over shared state, so a test can keep a
//! view of the device after moving a boxed copy into a subsystem.

use crate::devices::{Actuator, Encoder, Gyro};
use std::sync::{Arc, Mutex};

/// Mock wheel actuator
#[derive(Clone, Default)]
pub struct MockActuator {
    output: Arc<Mutex<f64>>,
}

impl MockActuator {
    /// Create a new mock actuator with output 0
    pub fn new() -> Self {
        Self::default()
    }
}

impl Actuator for MockActuator {
    fn set_output(&mut self, value: f64) {
        *self.output.lock().unwrap() = value;
    }

    fn last_output(&self) -> f64 {
        *self.output.lock().unwrap()
    }
}

#[derive(Debug, Default)]
struct MockEncoderState {
    position: i64,
    rate: f64,
    inverted: bool,
}

/// Mock wheel encoder
///
/// Tests drive it by setting the position and rate directly.
#[derive(Clone, Default)]
pub struct MockEncoder {
    state: Arc<Mutex<MockEncoderState>>,
}

impl MockEncoder {
    /// Create a new mock encoder at position 0, rate 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the raw (pre-inversion) position
    pub fn set_position(&self, position: i64) {
        self.state.lock().unwrap().position = position;
    }

    /// Set the raw (pre-inversion) rate in counts/second
    pub fn set_rate(&self, rate: f64) {
        self.state.lock().unwrap().rate = rate;
    }
}

impl Encoder for MockEncoder {
    fn position(&self) -> i64 {
        let state = self.state.lock().unwrap();
        if state.inverted {
            -state.position
        } else {
            state.position
        }
    }

    fn rate(&self) -> f64 {
        let state = self.state.lock().unwrap();
        if state.inverted {
            -state.rate
        } else {
            state.rate
        }
    }

    fn reset(&mut self) {
        self.state.lock().unwrap().position = 0;
    }

    fn set_inverted(&mut self, inverted: bool) {
        self.state.lock().unwrap().inverted = inverted;
    }
}

#[derive(Debug, Default)]
struct MockGyroState {
    angle: f64,
    offset: f64,
}

/// Mock gyro
#[derive(Clone, Default)]
pub struct MockGyro {
    state: Arc<Mutex<MockGyroState>>,
}

impl MockGyro {
    /// Create a new mock gyro at heading 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the absolute (pre-offset) angle in degrees
    pub fn set_angle(&self, angle: f64) {
        self.state.lock().unwrap().angle = angle;
    }
}

impl Gyro for MockGyro {
    fn heading_degrees(&self) -> f64 {
        let state = self.state.lock().unwrap();
        state.angle - state.offset
    }

    fn reset_heading(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.offset = state.angle;
    }
}
