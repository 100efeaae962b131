//! Wrist - two-axis homing firmware
//!
//! Main firmware binary for the RP2040 wrist controller. Homes both axes
//! against their endstops on boot and hands calibrated setpoints to the
//! servo loop.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::i2c::{self, I2c};
use {defmt_rtt as _, panic_probe as _};

use wrist_core::config::{parse_config, MachineConfig, PinConfig};
use wrist_core::homing::Wrist;
use wrist_drivers::axis::ServoAxis;
use wrist_drivers::encoder::{As5600, As5600Config};
use wrist_drivers::endstop::LimitSwitch;

use crate::channels::{AXIS_A_SETPOINT, AXIS_B_SETPOINT, HOMING_DONE};

mod channels;
mod tasks;

/// Embedded configuration (compiled into firmware)
/// Edit machine.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../machine.toml");

/// Endstop GPIOs as routed on the board
const ENDSTOP_A_GPIO: u8 = 14;
const ENDSTOP_B_GPIO: u8 = 15;

/// AS5600 bus speed (fast mode)
const ENCODER_I2C_HZ: u32 = 400_000;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Wrist firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_config();

    // Encoders: AS5600 on I2C0 (SDA=GPIO4, SCL=GPIO5) and I2C1 (SDA=GPIO6, SCL=GPIO7)
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = ENCODER_I2C_HZ;

    let encoder_a = As5600::new(
        I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c_config.clone()),
        As5600Config {
            inverted: config.axis_a.encoder_inverted,
        },
    );
    let encoder_b = As5600::new(
        I2c::new_blocking(p.I2C1, p.PIN_7, p.PIN_6, i2c_config),
        As5600Config {
            inverted: config.axis_b.encoder_inverted,
        },
    );
    info!("Encoders initialized");

    // Endstops: pins are fixed by the board, only polarity and pull-up come
    // from config. The configured gpio number is checked against the wiring.
    check_endstop_pin("A", &config.axis_a.endstop_pin, ENDSTOP_A_GPIO);
    check_endstop_pin("B", &config.axis_b.endstop_pin, ENDSTOP_B_GPIO);

    let endstop_a = LimitSwitch::new(
        Input::new(p.PIN_14, pull_for(&config.axis_a.endstop_pin)),
        config.axis_a.endstop_pin.inverted,
    );
    let endstop_b = LimitSwitch::new(
        Input::new(p.PIN_15, pull_for(&config.axis_b.endstop_pin)),
        config.axis_b.endstop_pin.inverted,
    );
    info!(
        "Endstops initialized (A inverted={}, B inverted={})",
        endstop_a.is_inverted(),
        endstop_b.is_inverted()
    );

    let wrist = Wrist::new(
        ServoAxis::new(&AXIS_A_SETPOINT, encoder_a),
        ServoAxis::new(&AXIS_B_SETPOINT, encoder_b),
        endstop_a,
        endstop_b,
    );

    info!("Spawning tasks...");
    spawner.spawn(tasks::tick_task(config.scheduler.tick_ms)).unwrap();
    spawner
        .spawn(tasks::homing_task(wrist, config.homing))
        .unwrap();

    info!("All tasks spawned, firmware running");

    let calibration = HOMING_DONE.wait().await;
    info!(
        "Wrist homed: B edges {} / {}, A holding {:?}, B holding {:?}",
        calibration.rising_edge,
        calibration.falling_edge,
        AXIS_A_SETPOINT.mode(),
        AXIS_B_SETPOINT.mode()
    );

    // Main task has nothing else to do - the servo loop holds the final targets
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Parse the embedded configuration, falling back to defaults
fn load_config() -> MachineConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration successfully");
            info!("Homing config: {:?}", config.homing);
            config
        }
        Err(e) => {
            error!("Failed to parse embedded config: {:?}", e);
            error!("Using default configuration");
            MachineConfig::default()
        }
    }
}

fn pull_for(pin: &PinConfig) -> Pull {
    if pin.pull_up {
        Pull::Up
    } else {
        Pull::None
    }
}

/// Warn when the configured pin does not match the board wiring
fn check_endstop_pin(axis: &str, pin: &PinConfig, wired: u8) {
    if pin.pin != wired {
        warn!(
            "Axis {} endstop configured on gpio{}, board routes it to gpio{}",
            axis, pin.pin, wired
        );
    }
}
