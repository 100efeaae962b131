//! Embassy async tasks
//!
//! Each task runs independently and communicates via signals.

pub mod homing;
pub mod tick;

pub use homing::{homing_task, FirmwareWrist};
pub use tick::tick_task;
