//! Rotary position sensor trait

/// Errors that can occur while reading a rotary encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncoderError {
    /// Bus transaction failed (I2C NACK, arbitration loss, ...)
    Bus,
    /// No magnet in front of the sensor
    MagnetNotDetected,
    /// Magnet too far from the sensor
    MagnetTooWeak,
    /// Magnet too close to the sensor
    MagnetTooStrong,
}

/// Trait for absolute rotary encoders with a settable zero
///
/// Positions are expressed in the same physical units as axis targets.
pub trait RotaryEncoder {
    /// Read the current position
    ///
    /// Takes `&mut self` because bus reads require mutable access and
    /// multi-turn tracking updates internal state.
    fn position(&mut self) -> Result<f32, EncoderError>;

    /// Re-zero the encoder so that the current physical position reads as `position`
    fn set_position(&mut self, position: f32) -> Result<(), EncoderError>;
}
