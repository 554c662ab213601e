//! Hardware device traits
//!
//! The control core reaches hardware only through these seams. Real
//! implementations bind to motor controllers, quadrature encoders and a
//! gyro; [`mock`] provides shared-state fakes for tests and simulation.

pub mod mock;

/// A single wheel actuator (speed controller)
pub trait Actuator {
    /// Command the actuator output in [-1.0, 1.0]
    fn set_output(&mut self, value: f64);

    /// Last commanded output
    fn last_output(&self) -> f64;
}

/// A wheel encoder
///
/// Implementations apply the inversion flag before returning values from
/// [`position`](Encoder::position) and [`rate`](Encoder::rate).
pub trait Encoder {
    /// Signed count since the last reset
    fn position(&self) -> i64;

    /// Signed rate in counts/second
    fn rate(&self) -> f64;

    /// Zero the counter
    fn reset(&mut self);

    /// Invert the counting direction
    fn set_inverted(&mut self, inverted: bool);
}

/// A gyro providing the robot heading
pub trait Gyro {
    /// Continuous heading in degrees since the last reset, not wrapped.
    /// Positive is clockwise.
    fn heading_degrees(&self) -> f64;

    /// Zero the reference heading
    fn reset_heading(&mut self);
}
