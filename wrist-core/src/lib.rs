//! Board-agnostic core logic for the wrist firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (axis, rotary encoder, endstop)
//! - Homing state machine and its trigger-driven runner
//! - Configuration types and the `machine.toml` parser

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod homing;
pub mod traits;
