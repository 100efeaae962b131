//! Build script for wrist-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates machine.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Keys of the [homing] section; missing keys keep the firmware defaults
const HOMING_KEYS: [&str; 9] = [
    "coarse_speed",
    "fine_speed",
    "position_tolerance",
    "a_backoff",
    "a_endstop_position",
    "a_max_travel",
    "b_endstop_position",
    "b_approach_offset",
    "b_final_offset",
];

/// Keys that must be strictly positive
const POSITIVE_KEYS: [&str; 5] = [
    "coarse_speed",
    "fine_speed",
    "position_tolerance",
    "a_backoff",
    "b_approach_offset",
];

/// Sections the firmware's parser accepts
const SECTIONS: [&str; 3] = ["homing", "scheduler", "axis"];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}

/// Validate machine.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=machine.toml");

    let config_path = Path::new("machine.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: machine.toml not found!                                  ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds machine.toml as its homing configuration.   ║\n\
            ║  Please create one in the wrist-firmware directory.              ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read machine.toml                              ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in machine.toml                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_homing(&config, &mut errors);
    validate_scheduler(&config, &mut errors);
    validate_axes(&config, &mut errors);
    report_errors(&errors);

    println!("cargo:warning=machine.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Abort the build listing every problem found
fn report_errors(errors: &[String]) {
    if errors.is_empty() {
        return;
    }

    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: Invalid configuration in machine.toml                    ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Integers are accepted wherever a float is expected
fn as_number(value: &toml::Value) -> Option<f64> {
    match value {
        toml::Value::Float(f) => Some(*f),
        toml::Value::Integer(i) => Some(*i as f64),
        _ => None,
    }
}

/// Reject sections the firmware would refuse to parse
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        return;
    };

    for (name, value) in root {
        if value.is_table() && !SECTIONS.contains(&name.as_str()) {
            errors.push(format!("[{}] unknown section", name));
        }
    }
}

/// Validate the optional [homing] section
fn validate_homing(config: &toml::Value, errors: &mut Vec<String>) {
    let homing = match config.get("homing") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[homing] must be a table".to_string());
            return;
        }
        None => return,
    };

    for key in HOMING_KEYS {
        let Some(value) = homing.get(key) else {
            continue;
        };

        match as_number(value) {
            Some(n) if !n.is_finite() => {
                errors.push(format!("[homing] {} must be finite", key));
            }
            Some(n) if POSITIVE_KEYS.contains(&key) && n <= 0.0 => {
                errors.push(format!("[homing] {} must be positive", key));
            }
            Some(_) => {}
            None => errors.push(format!("[homing] {} must be a number", key)),
        }
    }
}

/// Validate the optional [scheduler] section
fn validate_scheduler(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(scheduler) = config.get("scheduler") else {
        return;
    };

    match scheduler.get("tick_ms") {
        Some(toml::Value::Integer(ms)) => {
            if *ms < 1 || *ms > u32::MAX as i64 {
                errors.push("[scheduler] tick_ms must be a positive 32-bit integer".to_string());
            }
        }
        Some(_) => errors.push("[scheduler] tick_ms must be an integer".to_string()),
        None => {}
    }
}

/// Validate the optional [axis.a] and [axis.b] sections
fn validate_axes(config: &toml::Value, errors: &mut Vec<String>) {
    let axes = match config.get("axis") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[axis] must contain [axis.a] / [axis.b] tables".to_string());
            return;
        }
        None => return,
    };

    for (name, axis) in axes {
        if name != "a" && name != "b" {
            errors.push(format!("[axis.{}] unknown axis (expected a or b)", name));
            continue;
        }

        if let Some(pin) = axis.get("endstop_pin") {
            match pin.as_str() {
                Some(s) if is_valid_pin(s) => {}
                _ => errors.push(format!(
                    "[axis.{}] endstop_pin must look like \"gpio14\" or \"!^gpio15\"",
                    name
                )),
            }
        }

        if let Some(inverted) = axis.get("encoder_inverted") {
            if !inverted.is_bool() {
                errors.push(format!("[axis.{}] encoder_inverted must be a bool", name));
            }
        }
    }
}

/// Check a pin string: optional '!' / '^' modifiers, then gpio0-gpio29
fn is_valid_pin(s: &str) -> bool {
    let pin = s.trim_start_matches(['!', '^']);
    match pin.strip_prefix("gpio").map(str::parse::<u8>) {
        Some(Ok(n)) => n <= 29,
        _ => false,
    }
}
