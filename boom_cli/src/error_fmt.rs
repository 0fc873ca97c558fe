//! Human-readable error descriptions and structured JSON error formatting.

use boom_core::error::{BoomError, BuildError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingSensor => {
                "What happened: No sensor reader was provided to the control loop.\nLikely causes: The accelerometer failed to open or was not wired into the builder.\nHow to fix: Ensure the sensor reader is created and passed via with_sensor(...).".to_string()
            }
            BuildError::MissingActuator => {
                "What happened: No servo was provided to the control loop.\nLikely causes: The PWM channel failed to open or was not wired into the builder.\nHow to fix: Ensure the servo is created and passed via with_actuator(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the [servo] or [control] tables.\nHow to fix: Edit the config file, then rerun. See etc/boom_config.toml for a sample."
            ),
        };
    }

    if let Some(be) = err.downcast_ref::<BoomError>() {
        return match be {
            BoomError::NoSensorDetected { attempts } => format!(
                "What happened: No accelerometer detected; x stayed at 0 for {attempts} calibration polls.\nLikely causes: Sensor not powered, wrong I2C bus/address, or a silent simulation profile.\nHow to fix: Check wiring and [pins] i2c_bus/i2c_address, or raise control.calibration_attempts."
            ),
            BoomError::SensorInit(msg) => format!(
                "What happened: The accelerometer could not be initialized ({msg}).\nLikely causes: No device at the configured address, an unsupported chip, or missing I2C permissions.\nHow to fix: Run `i2cdetect -y <bus>`, check [pins] in the config, and make sure I2C is enabled."
            ),
            BoomError::Bus(msg) => format!(
                "What happened: A bus transfer failed ({msg}).\nLikely causes: Loose wiring, electrical noise, or the device was unplugged.\nHow to fix: Check the I2C/PWM connections and rerun."
            ),
            BoomError::Interrupted => "What happened: Stopped by request (Ctrl-C or --duration-ms) before the accelerometer produced a reading.\nLikely causes: The run was cancelled during calibration.\nHow to fix: Nothing to fix; rerun when ready. If calibration is slow, check the sensor wiring.".to_string(),
            BoomError::Config(msg) => format!(
                "What happened: Configuration error ({msg}).\nLikely causes: TOML syntax error, unknown enum value, unreadable file, or out-of-range values.\nHow to fix: Edit the config file and try again. See etc/boom_config.toml for a sample."
            ),
            BoomError::HardwareFault(msg) => format!(
                "What happened: Hardware fault ({msg}).\nLikely causes: Device or kernel driver error.\nHow to fix: Re-run with --log-level=debug and check the system log."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // Generic fallback
    let msg = err.to_string();
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes per failure class; anything unclassified returns 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<BoomError>() {
        Some(BoomError::NoSensorDetected { .. }) => 3,
        Some(BoomError::SensorInit(_)) => 4,
        Some(BoomError::Bus(_) | BoomError::HardwareFault(_)) => 5,
        Some(BoomError::Interrupted) => 130,
        _ => 1,
    }
}

/// Stable machine-readable name for the failure class.
pub fn reason_name(err: &eyre::Report) -> &'static str {
    if err.downcast_ref::<BuildError>().is_some() {
        return "InvalidSetup";
    }
    match err.downcast_ref::<BoomError>() {
        Some(BoomError::NoSensorDetected { .. }) => "NoSensorDetected",
        Some(BoomError::SensorInit(_)) => "SensorInit",
        Some(BoomError::Bus(_)) => "Bus",
        Some(BoomError::HardwareFault(_)) => "HardwareFault",
        Some(BoomError::Interrupted) => "Interrupted",
        Some(BoomError::Config(_)) => "Config",
        Some(BoomError::State(_)) => "State",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let msg = humanize(err);
    let reason = reason_name(err);
    match err.downcast_ref::<BoomError>() {
        Some(BoomError::NoSensorDetected { attempts }) => json!({
            "reason": reason,
            "details": { "attempts": attempts },
            "message": msg,
        })
        .to_string(),
        _ => json!({ "reason": reason, "message": msg }).to_string(),
    }
}
