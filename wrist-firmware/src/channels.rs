//! Inter-task communication channels
//!
//! Defines the static signals and shared setpoints used between Embassy
//! tasks and the servo loop.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use wrist_core::homing::{EdgeCalibration, HomingPhase};
use wrist_drivers::axis::AxisSetpoint;

/// Homing evaluation trigger (latest-only, set by the tick task)
pub static HOMING_TRIGGER: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Phase the homing sequencer most recently entered
pub static HOMING_PHASE: Signal<CriticalSectionRawMutex, HomingPhase> = Signal::new();

/// B edge calibration, signalled once homing has finished
pub static HOMING_DONE: Signal<CriticalSectionRawMutex, EdgeCalibration> = Signal::new();

/// Axis A setpoints, read by the servo loop
pub static AXIS_A_SETPOINT: AxisSetpoint = AxisSetpoint::new();

/// Axis B setpoints, read by the servo loop
pub static AXIS_B_SETPOINT: AxisSetpoint = AxisSetpoint::new();
