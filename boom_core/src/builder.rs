//! Type-state builder for `ControlLoop`.
//!
//! The builder enforces at compile time that a sensor reader and an actuator are
//! provided before `build()` is available. `try_build()` is always available for
//! dynamic checks.

use std::marker::PhantomData;
use std::sync::Arc;

use boom_traits::Pwm;
use boom_traits::clock::Clock;

use crate::actuator::Servo;
use crate::atomic::RunFlag;
use crate::config::{ControlCfg, ServoCfg};
use crate::control::ControlLoop;
use crate::error::{BuildError, Result};
use crate::sampler::SensorReader;

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for `ControlLoop`. Tuning is validated and calibration runs on `build()`.
pub struct ControlLoopBuilder<S, A, P: Pwm> {
    sensor: Option<SensorReader>,
    actuator: Option<Servo<P>>,
    control: Option<ControlCfg>,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
    shutdown: Option<RunFlag>,
    _s: PhantomData<S>,
    _a: PhantomData<A>,
}

impl<P: Pwm> Default for ControlLoopBuilder<Missing, Missing, P> {
    fn default() -> Self {
        Self {
            sensor: None,
            actuator: None,
            control: None,
            clock: None,
            shutdown: None,
            _s: PhantomData,
            _a: PhantomData,
        }
    }
}

fn invalid(msg: &'static str) -> eyre::Report {
    eyre::Report::new(BuildError::InvalidConfig(msg))
}

fn validate(control: &ControlCfg, servo: &ServoCfg) -> Result<()> {
    if !(control.gravity_ms2.is_finite() && control.gravity_ms2 > 0.0) {
        return Err(invalid("gravity_ms2 must be > 0"));
    }
    if !(control.tolerance_ms2.is_finite() && control.tolerance_ms2 >= 0.0) {
        return Err(invalid("tolerance_ms2 must be >= 0"));
    }
    if control.step_interval_ms == 0 {
        return Err(invalid("step_interval_ms must be >= 1"));
    }
    if control.calibration_attempts == 0 {
        return Err(invalid("calibration_attempts must be >= 1"));
    }
    if !(servo.min_deg < servo.max_deg) {
        return Err(invalid("servo min_deg must be < max_deg"));
    }
    if !(servo.min_deg..=servo.max_deg).contains(&servo.mid_deg) {
        return Err(invalid("servo mid_deg must lie within [min_deg, max_deg]"));
    }
    if servo.min_duty >= servo.max_duty {
        return Err(invalid("servo min_duty must be < max_duty"));
    }
    Ok(())
}

impl<S, A, P: Pwm> ControlLoopBuilder<S, A, P> {
    /// Fallible build available in any type-state; returns a detailed error for missing
    /// pieces. Runs the calibration gate before returning.
    pub fn try_build(self) -> Result<ControlLoop<P>> {
        let sensor = self
            .sensor
            .ok_or_else(|| eyre::Report::new(BuildError::MissingSensor))?;
        let actuator = self
            .actuator
            .ok_or_else(|| eyre::Report::new(BuildError::MissingActuator))?;
        let control = self.control.unwrap_or_default();
        validate(&control, actuator.cfg())?;

        let mut control_loop =
            ControlLoop::assemble(sensor, actuator, control, self.clock, self.shutdown)?;
        if let Err(e) = control_loop.calibrate() {
            control_loop.stop();
            return Err(e);
        }
        Ok(control_loop)
    }

    /// Supply a started sensor reader.
    pub fn with_sensor(self, sensor: SensorReader) -> ControlLoopBuilder<Set, A, P> {
        ControlLoopBuilder {
            sensor: Some(sensor),
            actuator: self.actuator,
            control: self.control,
            clock: self.clock,
            shutdown: self.shutdown,
            _s: PhantomData,
            _a: PhantomData,
        }
    }

    /// Supply the servo to drive.
    pub fn with_actuator(self, actuator: Servo<P>) -> ControlLoopBuilder<S, Set, P> {
        ControlLoopBuilder {
            sensor: self.sensor,
            actuator: Some(actuator),
            control: self.control,
            clock: self.clock,
            shutdown: self.shutdown,
            _s: PhantomData,
            _a: PhantomData,
        }
    }

    pub fn with_control(mut self, control: ControlCfg) -> Self {
        self.control = Some(control);
        self
    }

    /// Inject a clock (tests use `TestClock` to skip the real pauses).
    pub fn with_clock(mut self, clock: impl Clock + Send + Sync + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// External stop request; clearing the flag ends calibration and `run()`.
    pub fn with_shutdown(mut self, shutdown: RunFlag) -> Self {
        self.shutdown = Some(shutdown);
        self
    }
}

impl<P: Pwm> ControlLoopBuilder<Set, Set, P> {
    /// Validate, assemble and calibrate.
    pub fn build(self) -> Result<ControlLoop<P>> {
        self.try_build()
    }
}
