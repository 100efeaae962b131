//! Hardware configuration types
//!
//! These types define the board-level configuration for the endstop
//! inputs and encoders of both axes.

use super::types::{ConfigError, HomingConfig, SchedulerConfig};

/// Pin configuration with optional inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinConfig {
    /// GPIO pin number (0-29 for RP2040)
    pub pin: u8,
    /// Pin is active-low (inverted)
    pub inverted: bool,
    /// Enable internal pull-up
    pub pull_up: bool,
}

impl PinConfig {
    /// Create a new pin config
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: false,
        }
    }

    /// Create an inverted (active-low) pin with pull-up, the usual
    /// wiring for a switch to ground
    pub const fn active_low(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
            pull_up: true,
        }
    }
}

/// Per-axis hardware configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisHwConfig {
    /// Endstop input
    pub endstop_pin: PinConfig,
    /// Encoder counts in the opposite direction of the axis
    pub encoder_inverted: bool,
}

impl AxisHwConfig {
    /// Stock wiring of axis A (active-high endstop on GPIO14)
    pub const fn axis_a() -> Self {
        Self {
            endstop_pin: PinConfig::new(14),
            encoder_inverted: false,
        }
    }

    /// Stock wiring of axis B (active-low endstop on GPIO15)
    pub const fn axis_b() -> Self {
        Self {
            endstop_pin: PinConfig::active_low(15),
            encoder_inverted: false,
        }
    }
}

/// Complete machine configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MachineConfig {
    /// Homing sequence constants
    pub homing: HomingConfig,
    /// Homing trigger pacing
    pub scheduler: SchedulerConfig,
    /// Axis A wiring
    pub axis_a: AxisHwConfig,
    /// Axis B wiring
    pub axis_b: AxisHwConfig,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            homing: HomingConfig::default(),
            scheduler: SchedulerConfig::default(),
            axis_a: AxisHwConfig::axis_a(),
            axis_b: AxisHwConfig::axis_b(),
        }
    }
}

impl MachineConfig {
    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.homing.validate()?;
        self.scheduler.validate()
    }
}
