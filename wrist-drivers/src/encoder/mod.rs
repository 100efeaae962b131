//! Rotary encoder drivers

pub mod as5600;

pub use as5600::{As5600, As5600Config};
