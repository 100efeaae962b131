//! Simple TOML parser for machine configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! `machine.toml`. It does NOT support the full TOML spec and needs no
//! allocator.
//!
//! Supported features:
//! - Key = value pairs (float, integer, boolean, quoted pin string)
//! - [section] headers
//! - [section.subsection] headers
//! - Comments (# ...)
//!
//! Unknown keys are ignored; unknown sections are rejected. The parsed
//! configuration is validated before it is returned.

use super::hardware::{AxisHwConfig, MachineConfig, PinConfig};
use super::types::{ConfigError, HomingConfig, SchedulerConfig};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Invalid section header
    InvalidSection,
    /// Invalid value type
    InvalidValue,
    /// Invalid pin string
    InvalidPin,
    /// Values parsed but do not form a usable configuration
    Invalid(ConfigError),
}

impl From<ConfigError> for ParseError {
    fn from(e: ConfigError) -> Self {
        ParseError::Invalid(e)
    }
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Homing,
    Scheduler,
    AxisA,
    AxisB,
}

/// Highest GPIO number on the RP2040
const MAX_GPIO: u8 = 29;

/// Parse TOML configuration into MachineConfig
///
/// Missing sections and keys keep their default values.
pub fn parse_config(input: &str) -> Result<MachineConfig, ParseError> {
    let mut config = MachineConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        if let Some((key, value)) = parse_key_value(line) {
            match section {
                Section::Root => {}
                Section::Homing => apply_homing(&mut config.homing, key, value)?,
                Section::Scheduler => apply_scheduler(&mut config.scheduler, key, value)?,
                Section::AxisA => apply_axis(&mut config.axis_a, key, value)?,
                Section::AxisB => apply_axis(&mut config.axis_b, key, value)?,
            }
        }
    }

    config.validate()?;
    Ok(config)
}

/// Parse section header like "homing", "axis.a" or "axis a"
fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    let header = header.trim();

    let (section_type, name) = match header.split_once('.') {
        Some((section_type, name)) => (section_type.trim(), Some(name.trim())),
        None => {
            let mut parts = header.split_whitespace();
            let section_type = parts.next().ok_or(ParseError::InvalidSection)?;
            (section_type, parts.next())
        }
    };

    match (section_type, name) {
        ("homing", None) => Ok(Section::Homing),
        ("scheduler", None) => Ok(Section::Scheduler),
        ("axis", Some("a")) => Ok(Section::AxisA),
        ("axis", Some("b")) => Ok(Section::AxisB),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments
    let value = if let Some(hash_pos) = value.find('#') {
        // Make sure # is not inside a string
        let quote_count = value[..hash_pos].matches('"').count();
        if quote_count % 2 == 0 {
            value[..hash_pos].trim()
        } else {
            value
        }
    } else {
        value
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

fn apply_homing(h: &mut HomingConfig, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "coarse_speed" => h.coarse_speed = parse_float(value)?,
        "fine_speed" => h.fine_speed = parse_float(value)?,
        "position_tolerance" => h.position_tolerance = parse_float(value)?,
        "a_backoff" => h.a_backoff = parse_float(value)?,
        "a_endstop_position" => h.a_endstop_position = parse_float(value)?,
        "a_max_travel" => h.a_max_travel = parse_float(value)?,
        "b_endstop_position" => h.b_endstop_position = parse_float(value)?,
        "b_approach_offset" => h.b_approach_offset = parse_float(value)?,
        "b_final_offset" => h.b_final_offset = parse_float(value)?,
        _ => {} // Ignore unknown keys
    }
    Ok(())
}

fn apply_scheduler(s: &mut SchedulerConfig, key: &str, value: &str) -> Result<(), ParseError> {
    if key == "tick_ms" {
        s.tick_ms = parse_int(value)?;
    }
    Ok(())
}

fn apply_axis(a: &mut AxisHwConfig, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "endstop_pin" => a.endstop_pin = parse_pin(value)?,
        "encoder_inverted" => a.encoder_inverted = parse_bool(value)?,
        _ => {}
    }
    Ok(())
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> &str {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        &value[1..value.len() - 1]
    } else {
        // Allow unquoted strings for simple values
        value
    }
}

/// Parse a float value; integers are accepted too
fn parse_float(value: &str) -> Result<f32, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse an integer value
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Parse a pin string like "gpio14", "!gpio15", "^gpio4"
fn parse_pin(value: &str) -> Result<PinConfig, ParseError> {
    let mut s = parse_string(value);
    let mut inverted = false;
    let mut pull_up = false;

    // Check for modifiers
    loop {
        if let Some(rest) = s.strip_prefix('!') {
            inverted = true;
            s = rest;
        } else if let Some(rest) = s.strip_prefix('^') {
            pull_up = true;
            s = rest;
        } else {
            break;
        }
    }

    let pin: u8 = s
        .strip_prefix("gpio")
        .ok_or(ParseError::InvalidPin)?
        .parse()
        .map_err(|_| ParseError::InvalidPin)?;

    if pin > MAX_GPIO {
        return Err(ParseError::InvalidPin);
    }

    Ok(PinConfig {
        pin,
        inverted,
        pull_up,
    })
}
