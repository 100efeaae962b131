//! Limit sensor trait

/// A binary limit sensor
///
/// Implementations handle the raw pin polarity; `true` always means the
/// sensor is triggered.
pub trait Endstop {
    /// Check if the endstop is currently triggered
    fn is_triggered(&mut self) -> bool;
}
