//! GPIO limit switch
//!
//! Reads a digital input and normalises its polarity, so that callers
//! only ever see "triggered" or "not triggered".

use core::convert::Infallible;

use embedded_hal::digital::InputPin;
use wrist_core::traits::Endstop;

/// Limit switch on a GPIO input
///
/// The pin can be active-high (default) or active-low. Only infallible
/// pins are accepted: a read error cannot be told apart from a released
/// switch, and treating it as either would corrupt the edge search.
pub struct LimitSwitch<P> {
    pin: P,
    /// If true, triggered = pin LOW
    inverted: bool,
}

impl<P> LimitSwitch<P>
where
    P: InputPin<Error = Infallible>,
{
    /// Create a new limit switch
    ///
    /// # Arguments
    /// - `pin`: The input pin to read
    /// - `inverted`: If true, the switch is triggered when the pin is LOW
    pub fn new(pin: P, inverted: bool) -> Self {
        Self { pin, inverted }
    }

    /// Create a limit switch that reads HIGH when triggered
    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, false)
    }

    /// Create a limit switch that reads LOW when triggered
    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, true)
    }

    /// Check if the switch is active-low
    pub fn is_inverted(&self) -> bool {
        self.inverted
    }
}

impl<P> Endstop for LimitSwitch<P>
where
    P: InputPin<Error = Infallible>,
{
    fn is_triggered(&mut self) -> bool {
        let high = match self.pin.is_high() {
            Ok(high) => high,
            Err(never) => match never {},
        };
        high != self.inverted
    }
}
