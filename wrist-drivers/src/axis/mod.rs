//! Axis implementations

pub mod servo;

pub use servo::{AxisSetpoint, ControlMode, ServoAxis};
