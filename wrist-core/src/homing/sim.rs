//! Simulated axes and switches for sequencer tests

use core::cell::Cell;

use crate::traits::{Axis, EncoderError, Endstop};

/// Slew rate of the simulated position controller, units per second
const POSITION_SLEW: f32 = 2.0;

/// Axis with an idealised controller and a re-zeroable encoder
///
/// Interior mutability lets a test keep a shared reference for driving the
/// plant while the sequencer holds another one through [`Axis`].
pub(crate) struct SimAxis {
    mechanical: Cell<f32>,
    offset: Cell<f32>,
    pub(crate) target_position: Cell<f32>,
    pub(crate) target_speed: Cell<f32>,
    pub(crate) zeroings: Cell<u32>,
    pub(crate) fail_reads: Cell<bool>,
}

impl SimAxis {
    /// Axis whose encoder currently reads `reading`
    pub(crate) fn at(reading: f32) -> Self {
        Self {
            mechanical: Cell::new(reading),
            offset: Cell::new(0.0),
            target_position: Cell::new(0.0),
            target_speed: Cell::new(0.0),
            zeroings: Cell::new(0),
            fail_reads: Cell::new(false),
        }
    }

    /// Move the axis so that the encoder reads `reading`
    pub(crate) fn set_reading(&self, reading: f32) {
        self.mechanical.set(reading - self.offset.get());
    }

    pub(crate) fn reading(&self) -> f32 {
        self.mechanical.get() + self.offset.get()
    }

    /// Physical position, unaffected by encoder re-zeroing
    pub(crate) fn mechanical(&self) -> f32 {
        self.mechanical.get()
    }

    /// Run the controller for `dt` seconds
    ///
    /// A non-zero target speed seeks at that speed, otherwise the axis
    /// slews towards the target position.
    pub(crate) fn advance(&self, dt: f32) {
        let speed = self.target_speed.get();
        if speed != 0.0 {
            self.mechanical.set(self.mechanical.get() + speed * dt);
            return;
        }

        let error = self.target_position.get() - self.reading();
        let max_step = POSITION_SLEW * dt;
        let step = error.clamp(-max_step, max_step);
        self.mechanical.set(self.mechanical.get() + step);
    }
}

impl Axis for &SimAxis {
    fn set_target_speed(&mut self, speed: f32) {
        self.target_speed.set(speed);
    }

    fn target_speed(&self) -> f32 {
        self.target_speed.get()
    }

    fn set_target_position(&mut self, position: f32) {
        self.target_position.set(position);
    }

    fn target_position(&self) -> f32 {
        self.target_position.get()
    }

    fn position(&mut self) -> Result<f32, EncoderError> {
        if self.fail_reads.get() {
            return Err(EncoderError::Bus);
        }
        Ok(self.reading())
    }

    fn set_position(&mut self, position: f32) -> Result<(), EncoderError> {
        if self.fail_reads.get() {
            return Err(EncoderError::Bus);
        }
        self.offset.set(position - self.mechanical.get());
        self.zeroings.set(self.zeroings.get() + 1);
        Ok(())
    }
}

/// Endstop whose state the test sets directly
pub(crate) struct Switch(Cell<bool>);

impl Switch {
    pub(crate) fn new(triggered: bool) -> Self {
        Self(Cell::new(triggered))
    }

    pub(crate) fn set(&self, triggered: bool) {
        self.0.set(triggered);
    }
}

impl Endstop for &Switch {
    fn is_triggered(&mut self) -> bool {
        self.0.get()
    }
}
