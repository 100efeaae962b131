//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in wrist-core:
//!
//! - Rotary encoders (AS5600 over I2C)
//! - Endstops (GPIO limit switches)
//! - Servo axes (encoder plus setpoints shared with the control loop)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod axis;
pub mod encoder;
pub mod endstop;
