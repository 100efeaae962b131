//! Controlled axis trait
//!
//! An axis is one degree of freedom driven by an external closed-loop
//! controller. The homing logic only writes setpoints and reads the
//! encoder; it never runs the control loop itself.

use super::encoder::EncoderError;

/// Trait for a position/speed controlled axis with an attached encoder
///
/// Target position and target speed both persist as last written values.
/// A non-zero target speed means the controller is seeking at that speed;
/// a zero target speed hands control back to the position target.
pub trait Axis {
    /// Command an open-loop seek speed (signed, units per second)
    ///
    /// A value of 0 stops seeking.
    fn set_target_speed(&mut self, speed: f32);

    /// Get the last commanded target speed
    fn target_speed(&self) -> f32;

    /// Command a closed-loop position target
    fn set_target_position(&mut self, position: f32);

    /// Get the last commanded target position
    fn target_position(&self) -> f32;

    /// Read the live encoder position
    fn position(&mut self) -> Result<f32, EncoderError>;

    /// Re-zero the encoder to an absolute value
    fn set_position(&mut self, position: f32) -> Result<(), EncoderError>;

    /// Check if the encoder reading is within `tolerance` of the target position
    ///
    /// The comparison is strict and never holds for a NaN reading.
    fn reached_target(&mut self, tolerance: f32) -> Result<bool, EncoderError> {
        let error = self.position()? - self.target_position();
        Ok(error < tolerance && error > -tolerance)
    }
}
