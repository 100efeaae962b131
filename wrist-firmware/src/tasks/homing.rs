//! Homing task
//!
//! Owns the wrist hardware while homing runs. The sequencer is evaluated
//! on every tick; progress is logged and the entered phase is published
//! for the rest of the firmware.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::{I2C0, I2C1};
use embassy_time::Timer;

use wrist_core::config::HomingConfig;
use wrist_core::homing::{run, HomingEvent, HomingSequencer, Progress, Wrist};
use wrist_drivers::axis::ServoAxis;
use wrist_drivers::encoder::As5600;
use wrist_drivers::endstop::LimitSwitch;

use crate::channels::{HOMING_DONE, HOMING_PHASE, HOMING_TRIGGER};

/// Delay before homing resumes after an encoder fault
const FAULT_RETRY_MS: u64 = 500;

/// Encoder of axis A (I2C0)
pub type EncoderA = As5600<I2c<'static, I2C0, Blocking>>;

/// Encoder of axis B (I2C1)
pub type EncoderB = As5600<I2c<'static, I2C1, Blocking>>;

/// The wrist as wired on the controller board
pub type FirmwareWrist = Wrist<
    ServoAxis<'static, EncoderA>,
    ServoAxis<'static, EncoderB>,
    LimitSwitch<Input<'static>>,
    LimitSwitch<Input<'static>>,
>;

/// Homing task - runs the sequence to completion, then exits
#[embassy_executor::task]
pub async fn homing_task(mut wrist: FirmwareWrist, config: HomingConfig) {
    info!(
        "Homing task started: coarse={} rad/s, fine={} rad/s, tolerance={} rad",
        config.coarse_speed, config.fine_speed, config.position_tolerance
    );

    check_encoder("A", wrist.axis_a.encoder_mut());
    check_encoder("B", wrist.axis_b.encoder_mut());

    let mut sequencer = HomingSequencer::new(config);

    loop {
        match run(&mut sequencer, &mut wrist, &HOMING_TRIGGER, report_progress).await {
            Ok(report) => {
                info!(
                    "Homing complete after {} transitions, B zero {} rad, encoder turns A={} B={}",
                    report.events.len(),
                    report.calibration.calibrated,
                    wrist.axis_a.encoder_mut().turns(),
                    wrist.axis_b.encoder_mut().turns()
                );
                HOMING_DONE.signal(report.calibration);
                return;
            }
            Err(e) => {
                error!("Encoder fault during {:?}: {:?}", sequencer.phase(), e);
                Timer::after_millis(FAULT_RETRY_MS).await;
                info!("Resuming homing in {:?}", sequencer.phase());
            }
        }
    }
}

/// Log magnet status and field strength of an encoder
///
/// A bad magnet is only warned about; homing still runs and any read
/// failure surfaces as an encoder fault.
fn check_encoder<I2C: embedded_hal::i2c::I2c>(axis: &str, encoder: &mut As5600<I2C>) {
    if let Err(e) = encoder.check_magnet() {
        warn!("Axis {} encoder magnet: {:?}", axis, e);
    }
    match encoder.agc() {
        Ok(agc) => info!("Axis {} encoder AGC: {}", axis, agc),
        Err(e) => warn!("Axis {} encoder AGC read failed: {:?}", axis, e),
    }
}

/// Log homing progress and publish the entered phase
fn report_progress(progress: Progress) {
    match progress {
        Progress::Entered(phase) => {
            info!("State: {:?} ({})", phase, phase.index());
            HOMING_PHASE.signal(phase);
        }
        Progress::Event(event) => log_event(&event),
    }
}

fn log_event(event: &HomingEvent) {
    match *event {
        HomingEvent::CoarseEndstopA {
            position,
            backoff_target,
        } => info!(
            "A endstop hit at {} (coarse), backing off to {}",
            position, backoff_target
        ),
        HomingEvent::BackoffReachedA => info!("A backoff reached, fine search"),
        HomingEvent::FineEndstopA {
            zeroed_to,
            max_target,
        } => info!(
            "A endstop hit (fine), encoder set to {}, moving to {}",
            zeroed_to, max_target
        ),
        HomingEvent::ApproachB {
            position,
            dir,
            target,
        } => info!(
            "B at {}, approaching {:?} to {}",
            position, dir, target
        ),
        HomingEvent::ApproachReachedB { speed } => {
            info!("B approach reached, searching at {}", speed)
        }
        HomingEvent::RisingEdgeB { position } => info!("B rising edge at {}", position),
        HomingEvent::FallingEdgeB { calibration } => info!(
            "B falling edge at {}, rising {}, encoder set to {}",
            calibration.falling_edge, calibration.rising_edge, calibration.calibrated
        ),
        HomingEvent::Complete => info!("Both axes at final targets"),
    }
}
