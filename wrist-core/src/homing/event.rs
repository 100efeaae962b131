//! Homing transition events
//!
//! Every transition of the sequencer produces exactly one event carrying
//! the values measured or commanded at that phase boundary.

use super::state::{ApproachDirection, EdgeCalibration, HomingPhase};

/// A completed homing transition
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HomingEvent {
    /// A endstop hit at coarse speed; A now backs off to `backoff_target`
    CoarseEndstopA { position: f32, backoff_target: f32 },
    /// A reached the backoff point; fine search started
    BackoffReachedA,
    /// A endstop hit at fine speed; encoder zeroed, A sent to its maximum
    FineEndstopA { zeroed_to: f32, max_target: f32 },
    /// A at its maximum; B sent towards its endstop region
    ApproachB {
        position: f32,
        dir: ApproachDirection,
        target: f32,
    },
    /// B reached the approach point; fine search started at `speed`
    ApproachReachedB { speed: f32 },
    /// B endstop triggered
    RisingEdgeB { position: f32 },
    /// B endstop released; encoder re-zeroed and final targets commanded
    FallingEdgeB { calibration: EdgeCalibration },
    /// Both axes at their final targets
    Complete,
}

impl HomingEvent {
    /// Phase the sequencer is in after this event
    pub fn target_phase(&self) -> HomingPhase {
        match self {
            HomingEvent::CoarseEndstopA { .. } => HomingPhase::BackoffA,
            HomingEvent::BackoffReachedA => HomingPhase::SeekAFine,
            HomingEvent::FineEndstopA { .. } => HomingPhase::MoveToBEnd,
            HomingEvent::ApproachB { .. } => HomingPhase::ApproachBSwitch,
            HomingEvent::ApproachReachedB { .. } => HomingPhase::FindBRisingEdge,
            HomingEvent::RisingEdgeB { .. } => HomingPhase::FindBFallingEdge,
            HomingEvent::FallingEdgeB { .. } => HomingPhase::MoveToZero,
            HomingEvent::Complete => HomingPhase::Finished,
        }
    }
}
