//! Homing trigger task
//!
//! Paces homing evaluations. Each tick sets the single-slot trigger, so
//! ticks that arrive while an evaluation is still pending collapse into
//! one. The task stops once the sequencer reports `Finished`.

use defmt::*;
use embassy_time::{Duration, Ticker};

use crate::channels::{HOMING_PHASE, HOMING_TRIGGER};

/// Tick task - triggers the homing sequencer every `tick_ms`
#[embassy_executor::task]
pub async fn tick_task(tick_ms: u32) {
    info!("Tick task started ({} ms)", tick_ms);

    let mut ticker = Ticker::every(Duration::from_millis(tick_ms as u64));

    loop {
        ticker.next().await;

        if let Some(phase) = HOMING_PHASE.try_take() {
            if phase.is_finished() {
                info!("Homing finished, tick task stopping");
                return;
            }
        }

        HOMING_TRIGGER.signal(());
    }
}
