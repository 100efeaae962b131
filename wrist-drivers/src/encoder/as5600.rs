//! AS5600 magnetic rotary encoder (I2C)
//!
//! The AS5600 reports a 12-bit absolute angle over one revolution. This
//! driver extends it to a multi-turn position by counting wraps between
//! samples, and adds a software zero so the axis can be re-referenced
//! without touching the chip's OTP registers.
//!
//! # Sampling
//!
//! Wraps are detected by comparing consecutive samples: a jump of more
//! than half a revolution is taken as a crossing of the 0/4095 boundary.
//! The driver therefore has to be sampled at least twice per revolution
//! of the magnet, which the homing and servo loops easily do.

use core::f32::consts::TAU;

use embedded_hal::i2c::I2c;
use wrist_core::traits::{EncoderError, RotaryEncoder};

/// Fixed I2C address of the AS5600
pub const I2C_ADDRESS: u8 = 0x36;

/// Counts per revolution of the 12-bit angle
pub const COUNTS_PER_REV: u16 = 4096;

/// AS5600 register addresses
pub mod reg {
    /// Magnet status
    pub const STATUS: u8 = 0x0B;
    /// Unscaled angle, high byte (low byte follows)
    pub const RAW_ANGLE: u8 = 0x0C;
    /// Automatic gain control value
    pub const AGC: u8 = 0x1A;
}

/// STATUS register bits
mod status {
    /// Magnet detected
    pub const MD: u8 = 0x20;
    /// Magnet too weak
    pub const ML: u8 = 0x10;
    /// Magnet too strong
    pub const MH: u8 = 0x08;
}

/// AS5600 driver configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct As5600Config {
    /// Count in the opposite direction
    pub inverted: bool,
}

/// AS5600 encoder with multi-turn tracking
///
/// Positions are in radians.
pub struct As5600<I2C> {
    i2c: I2C,
    config: As5600Config,
    /// Last raw sample, `None` until the first read
    last_raw: Option<u16>,
    /// Full revolutions counted since the first sample
    turns: i32,
    /// Software zero, subtracted from the absolute angle
    offset: f32,
}

impl<I2C: I2c> As5600<I2C> {
    /// Create a new driver
    ///
    /// No bus traffic happens until the first read.
    pub fn new(i2c: I2C, config: As5600Config) -> Self {
        Self {
            i2c,
            config,
            last_raw: None,
            turns: 0,
            offset: 0.0,
        }
    }

    /// Full revolutions counted since the first sample
    pub fn turns(&self) -> i32 {
        self.turns
    }

    /// Check that a magnet is present and within range
    pub fn check_magnet(&mut self) -> Result<(), EncoderError> {
        let status = self.read_register(reg::STATUS)?;

        if status & status::MD == 0 {
            return Err(EncoderError::MagnetNotDetected);
        }
        if status & status::ML != 0 {
            return Err(EncoderError::MagnetTooWeak);
        }
        if status & status::MH != 0 {
            return Err(EncoderError::MagnetTooStrong);
        }

        Ok(())
    }

    /// Read the automatic gain control value (magnet field strength indicator)
    pub fn agc(&mut self) -> Result<u8, EncoderError> {
        self.read_register(reg::AGC)
    }

    /// Read the 12-bit raw angle
    pub fn read_raw(&mut self) -> Result<u16, EncoderError> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(I2C_ADDRESS, &[reg::RAW_ANGLE], &mut buf)
            .map_err(|_| EncoderError::Bus)?;

        Ok((((buf[0] & 0x0F) as u16) << 8) | buf[1] as u16)
    }

    fn read_register(&mut self, register: u8) -> Result<u8, EncoderError> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(I2C_ADDRESS, &[register], &mut buf)
            .map_err(|_| EncoderError::Bus)?;
        Ok(buf[0])
    }

    /// Sample the sensor and return the absolute multi-turn angle
    fn sample(&mut self) -> Result<f32, EncoderError> {
        let raw = self.read_raw()?;
        let raw = if self.config.inverted {
            (COUNTS_PER_REV - raw) % COUNTS_PER_REV
        } else {
            raw
        };

        if let Some(last) = self.last_raw {
            let delta = raw as i32 - last as i32;
            let half = (COUNTS_PER_REV / 2) as i32;
            if delta > half {
                self.turns -= 1;
            } else if delta < -half {
                self.turns += 1;
            }
        }
        self.last_raw = Some(raw);

        let revolutions = self.turns as f32 + raw as f32 / COUNTS_PER_REV as f32;
        Ok(revolutions * TAU)
    }
}

impl<I2C: I2c> RotaryEncoder for As5600<I2C> {
    fn position(&mut self) -> Result<f32, EncoderError> {
        Ok(self.sample()? - self.offset)
    }

    fn set_position(&mut self, position: f32) -> Result<(), EncoderError> {
        self.offset = self.sample()? - position;
        Ok(())
    }
}
