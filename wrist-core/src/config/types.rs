//! Homing configuration types
//!
//! All positions are in encoder units (radians for the AS5600 driver) and
//! all speeds in encoder units per second.

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A value is NaN or infinite
    NotFinite,
    /// Seek speeds must be positive
    InvalidSpeed,
    /// Position tolerance must be positive
    InvalidTolerance,
    /// Backoff and approach offsets must be positive
    InvalidOffset,
    /// Trigger interval must be non-zero
    InvalidTickInterval,
}

/// Constants that drive the homing sequence
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HomingConfig {
    /// Speed for the first, fast search of the A endstop
    pub coarse_speed: f32,
    /// Speed for the precise A search and the B edge search
    pub fine_speed: f32,
    /// Distance below which an axis counts as having reached its target
    pub position_tolerance: f32,
    /// How far A retreats from the coarse endstop hit before the fine search
    pub a_backoff: f32,
    /// Value the A encoder is re-zeroed to at the fine endstop hit
    pub a_endstop_position: f32,
    /// A target once it is calibrated, clearing the way for B
    pub a_max_travel: f32,
    /// Reference position of the B endstop
    pub b_endstop_position: f32,
    /// Distance short of the B endstop where the fine search starts
    pub b_approach_offset: f32,
    /// Final B target after calibration
    pub b_final_offset: f32,
}

impl Default for HomingConfig {
    fn default() -> Self {
        Self {
            coarse_speed: 2.0,
            fine_speed: 0.2,
            position_tolerance: 0.01,
            a_backoff: 0.3,
            a_endstop_position: 1.75,
            a_max_travel: 1.6,
            b_endstop_position: 2.6,
            b_approach_offset: 0.2,
            b_final_offset: -0.5,
        }
    }
}

impl HomingConfig {
    /// Check that the configuration describes a sequence that can complete
    pub fn validate(&self) -> Result<(), ConfigError> {
        let values = [
            self.coarse_speed,
            self.fine_speed,
            self.position_tolerance,
            self.a_backoff,
            self.a_endstop_position,
            self.a_max_travel,
            self.b_endstop_position,
            self.b_approach_offset,
            self.b_final_offset,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::NotFinite);
        }

        if self.coarse_speed <= 0.0 || self.fine_speed <= 0.0 {
            return Err(ConfigError::InvalidSpeed);
        }

        if self.position_tolerance <= 0.0 {
            return Err(ConfigError::InvalidTolerance);
        }

        if self.a_backoff <= 0.0 || self.b_approach_offset <= 0.0 {
            return Err(ConfigError::InvalidOffset);
        }

        Ok(())
    }
}

/// Trigger pacing for the homing task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SchedulerConfig {
    /// Interval between homing evaluations in milliseconds
    pub tick_ms: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { tick_ms: 10 }
    }
}

impl SchedulerConfig {
    /// Check that the trigger interval is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::InvalidTickInterval);
        }
        Ok(())
    }
}
