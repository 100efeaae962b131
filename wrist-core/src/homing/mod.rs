//! Homing sequence for the two-axis wrist
//!
//! Brings both axes from an unknown mechanical position to a calibrated
//! zero using coarse and fine endstop searches. The state machine is
//! explicit, strictly forward and level-triggered: every evaluation looks
//! at the live sensor state and performs at most one transition.

pub mod event;
pub mod runner;
pub mod sequencer;
pub mod state;

#[cfg(test)]
pub(crate) mod sim;

pub use event::HomingEvent;
pub use runner::{run, HomingReport, Progress};
pub use sequencer::{HomingSequencer, Wrist};
pub use state::{ApproachDirection, EdgeCalibration, HomingPhase, HomingState};
