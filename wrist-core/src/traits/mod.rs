//! Hardware abstraction traits
//!
//! These traits define the interface between the homing logic
//! and hardware-specific implementations.

pub mod axis;
pub mod encoder;
pub mod endstop;

pub use axis::Axis;
pub use encoder::{EncoderError, RotaryEncoder};
pub use endstop::Endstop;
