#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core control logic (hardware-agnostic).
//!
//! This crate keeps a hobby servo level against the x axis of an accelerometer. All
//! hardware interactions go through `boom_traits::AccelSensor` and `boom_traits::Pwm`.
//!
//! ## Architecture
//!
//! - **Sampling**: a background thread polls the sensor and publishes the newest
//!   sample (`sampler` module)
//! - **Actuation**: angle clamping and angle→duty conversion (`actuator` module)
//! - **Control**: calibration gate, dead-band, incremental stepping (`control` module)
//! - **Configuration**: runtime tuning structs (`config` module)
//! - **Orchestration**: a single `runner::run` call wiring the pieces together
//!
//! ## Units
//!
//! Accelerations are m/s² rounded to 3 decimals; angles are degrees; duties are the
//! 16-bit fractions taken by `Pwm::set_duty`.

pub mod actuator;
pub mod atomic;
pub mod builder;
pub mod config;
pub mod control;
pub mod conversions;
pub mod error;
pub mod hw_error;
pub mod mocks;
pub mod runner;
pub mod sampler;
pub mod status;
pub mod types;
pub mod util;

pub use actuator::{Servo, clamp_degree, deg_step, degree_to_duty};
pub use atomic::RunFlag;
pub use builder::{ControlLoopBuilder, Missing, Set};
pub use config::{ControlCfg, SamplerCfg, ServoCfg};
pub use control::{ControlLoop, next_angle, wait_for_sensor};
pub use error::{BoomError, BuildError, Report, Result};
pub use runner::{RunParams, RunSummary};
pub use sampler::{Observer, SensorReader};
pub use status::{ControlStatus, LoopState};
pub use types::AccelerationSample;
