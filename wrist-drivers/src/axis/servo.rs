//! Servo axis
//!
//! Couples an encoder with setpoints that the closed-loop servo task
//! reads. Setpoints are single atomic values, so the homing task can
//! write them while the servo loop polls them without a lock.

use core::sync::atomic::Ordering;

use portable_atomic::AtomicF32;
use wrist_core::traits::{Axis, EncoderError, RotaryEncoder};

/// Active control mode of an axis
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlMode {
    /// Seek open-loop at this speed
    Speed(f32),
    /// Hold or move to this position
    Position(f32),
}

/// Setpoints shared between the homing logic and the servo loop
///
/// Both values persist as last written. A non-zero speed takes precedence;
/// writing a zero speed hands control back to the position target.
pub struct AxisSetpoint {
    position: AtomicF32,
    speed: AtomicF32,
}

impl Default for AxisSetpoint {
    fn default() -> Self {
        Self::new()
    }
}

impl AxisSetpoint {
    /// Position 0, stopped
    pub const fn new() -> Self {
        Self {
            position: AtomicF32::new(0.0),
            speed: AtomicF32::new(0.0),
        }
    }

    pub fn set_position(&self, position: f32) {
        self.position.store(position, Ordering::Relaxed);
    }

    pub fn position(&self) -> f32 {
        self.position.load(Ordering::Relaxed)
    }

    pub fn set_speed(&self, speed: f32) {
        self.speed.store(speed, Ordering::Relaxed);
    }

    pub fn speed(&self) -> f32 {
        self.speed.load(Ordering::Relaxed)
    }

    /// Mode the servo loop should run in
    pub fn mode(&self) -> ControlMode {
        let speed = self.speed();
        if speed != 0.0 {
            ControlMode::Speed(speed)
        } else {
            ControlMode::Position(self.position())
        }
    }
}

/// An axis driven through shared setpoints
pub struct ServoAxis<'a, E> {
    setpoint: &'a AxisSetpoint,
    encoder: E,
}

impl<'a, E: RotaryEncoder> ServoAxis<'a, E> {
    /// Create a new servo axis
    pub fn new(setpoint: &'a AxisSetpoint, encoder: E) -> Self {
        Self { setpoint, encoder }
    }

    /// Setpoints of this axis
    pub fn setpoint(&self) -> &'a AxisSetpoint {
        self.setpoint
    }

    /// Access the encoder directly (e.g. for magnet checks)
    pub fn encoder_mut(&mut self) -> &mut E {
        &mut self.encoder
    }
}

impl<E: RotaryEncoder> Axis for ServoAxis<'_, E> {
    fn set_target_speed(&mut self, speed: f32) {
        self.setpoint.set_speed(speed);
    }

    fn target_speed(&self) -> f32 {
        self.setpoint.speed()
    }

    fn set_target_position(&mut self, position: f32) {
        self.setpoint.set_position(position);
    }

    fn target_position(&self) -> f32 {
        self.setpoint.position()
    }

    fn position(&mut self) -> Result<f32, EncoderError> {
        self.encoder.position()
    }

    fn set_position(&mut self, position: f32) -> Result<(), EncoderError> {
        self.encoder.set_position(position)
    }
}
