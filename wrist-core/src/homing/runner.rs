//! Trigger-driven homing loop
//!
//! The sequencer is evaluated once per trigger. The trigger is a
//! single-slot [`Signal`]: triggers that arrive while an evaluation is
//! pending collapse into one, since only presence matters to a
//! level-triggered state machine.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use heapless::Vec;

use super::event::HomingEvent;
use super::sequencer::{HomingSequencer, Wrist};
use super::state::{EdgeCalibration, HomingPhase, HomingState};
use crate::traits::{Axis, EncoderError, Endstop};

/// Maximum transitions in one homing run
pub const MAX_TRANSITIONS: usize = HomingPhase::ALL.len() - 1;

/// Diagnostic progress reported while homing runs
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Progress {
    /// The sequencer is evaluating a phase it was not in at the last report
    Entered(HomingPhase),
    /// A transition was taken
    Event(HomingEvent),
}

/// Outcome of a completed homing run
#[derive(Debug, Clone, PartialEq)]
pub struct HomingReport {
    /// B edge calibration applied during the run
    pub calibration: EdgeCalibration,
    /// Transitions taken by this run, in order
    pub events: Vec<HomingEvent, MAX_TRANSITIONS>,
}

/// Run the homing sequence to completion
///
/// Starts the coarse search, then waits for `trigger` and evaluates the
/// sequencer once per trigger until it reaches `Finished`. Progress is
/// reported through `on_progress` and has no influence on control.
///
/// An encoder error aborts the run but leaves the sequencer in its current
/// phase, so calling `run` again resumes where it stopped. A run on an
/// already finished sequencer returns after a single trigger.
pub async fn run<M, A, B, EA, EB, F>(
    sequencer: &mut HomingSequencer,
    wrist: &mut Wrist<A, B, EA, EB>,
    trigger: &Signal<M, ()>,
    mut on_progress: F,
) -> Result<HomingReport, EncoderError>
where
    M: RawMutex,
    A: Axis,
    B: Axis,
    EA: Endstop,
    EB: Endstop,
    F: FnMut(Progress),
{
    sequencer.begin(wrist);

    let mut events = Vec::new();
    let mut last_reported = None;

    loop {
        trigger.wait().await;

        let phase = sequencer.phase();
        if last_reported != Some(phase) {
            on_progress(Progress::Entered(phase));
            last_reported = Some(phase);
        }

        if let Some(event) = sequencer.step(wrist)? {
            // Capacity covers every transition of a full sequence
            let _ = events.push(event);
            on_progress(Progress::Event(event));
        }

        if let HomingState::Finished { calibration } = sequencer.state() {
            if last_reported != Some(HomingPhase::Finished) {
                on_progress(Progress::Entered(HomingPhase::Finished));
            }
            return Ok(HomingReport {
                calibration,
                events,
            });
        }
    }
}
