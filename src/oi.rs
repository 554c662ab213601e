//! Operator input seam
//!
//! The control core consumes operator signals through [`OperatorInput`].
//! Bindings to a concrete game controller live outside this crate.

/// One 2-axis stick sample, both axes in [-1.0, 1.0]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StickPosition {
    pub x: f64,
    pub y: f64,
}

impl StickPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Operator input signals polled once per tick
pub trait OperatorInput {
    /// Cancel the running command
    fn cancel(&self) -> bool;

    /// Reset encoders and gyro reference
    fn reset(&self) -> bool;

    /// Whether the wheel speed PIDs should be enabled
    fn speed_pids_on(&self) -> bool;

    /// Requested heading in degrees, or `None` when no rotation is requested
    fn heading_request(&self) -> Option<f64>;

    /// Left stick position
    fn left_stick(&self) -> StickPosition;

    /// Right stick position
    fn right_stick(&self) -> StickPosition;
}
