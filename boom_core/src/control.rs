//! The accelerometer→servo control loop (`ControlLoop`).
//!
//! Two paths run at different cadences:
//! - compare-and-store (`on_sample`), fed by every sample from the reader's
//!   single-slot channel, keeps the tracked x acceleration current;
//! - angle computation (`step`), paced by `step_interval_ms`, turns the tracked value
//!   into an incremental servo command.
//!
//! Keeping them apart stops the servo from being re-commanded on every 100 µs sample.

use std::sync::Arc;

use boom_traits::Pwm;
use boom_traits::clock::{Clock, MonotonicClock};
use crossbeam_channel as xch;
use tracing::{debug, error, info};

use crate::actuator::{Servo, deg_step};
use crate::atomic::RunFlag;
use crate::builder::{ControlLoopBuilder, Missing};
use crate::config::ControlCfg;
use crate::error::{BoomError, Result};
use crate::sampler::SensorReader;
use crate::status::{ControlStatus, LoopState};
use crate::types::AccelerationSample;
use crate::util::{poll_budget_ms, round3};

/// Compute the next servo angle from the tracked x acceleration.
///
/// Returns `None` inside the dead-band (`|g_raw| < tolerance`, or NaN). Otherwise the
/// magnitude is normalized to g (3 decimals), scaled by `deg_step`, and added to or
/// subtracted from `current` according to the sign of `g_raw`. The result is not
/// clamped; the servo does that.
#[inline]
pub fn next_angle(current: f64, g_raw: f64, cfg: &ControlCfg, deg_step: f64) -> Option<f64> {
    let magnitude = g_raw.abs();
    if !(magnitude >= cfg.tolerance_ms2) {
        return None;
    }
    let g_norm = round3(magnitude / cfg.gravity_ms2);
    let step = deg_step * g_norm;
    Some(if g_raw < 0.0 {
        current - step
    } else {
        current + step
    })
}

/// Poll `sensor.latest()` until its x axis reads nonzero.
///
/// Gives up with `NoSensorDetected` after `cfg.calibration_attempts` polls, or earlier
/// if the reader stops; a reader fault is returned as is. A cleared `shutdown` ends the
/// wait with `Interrupted`. On success returns the number of polls taken and the
/// detecting sample.
pub fn wait_for_sensor(
    sensor: &SensorReader,
    cfg: &ControlCfg,
    clock: &dyn Clock,
    shutdown: Option<&RunFlag>,
) -> Result<(u32, AccelerationSample)> {
    let poll = cfg.calibration_poll();
    info!(
        attempts = cfg.calibration_attempts,
        budget_ms = poll_budget_ms(cfg.calibration_attempts, cfg.calibration_poll_us),
        "waiting for accelerometer"
    );

    let mut polls: u32 = 0;
    while polls < cfg.calibration_attempts {
        polls += 1;
        let sample = sensor.latest();
        if sample.x != 0.0 {
            return Ok((polls, sample));
        }
        if let Some(fault) = sensor.fault() {
            return Err(eyre::Report::new(fault));
        }
        if shutdown.is_some_and(|f| !f.is_set()) {
            info!(polls, "calibration interrupted");
            return Err(eyre::Report::new(BoomError::Interrupted));
        }
        if !sensor.is_running() {
            break;
        }
        clock.sleep(poll);
    }

    error!(polls, "no accelerometer detected");
    Err(eyre::Report::new(BoomError::NoSensorDetected { attempts: polls }))
}

pub struct ControlLoop<P: Pwm> {
    pub(crate) sensor: SensorReader,
    pub(crate) servo: Servo<P>,
    pub(crate) updates: xch::Receiver<AccelerationSample>,
    pub(crate) cfg: ControlCfg,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) shutdown: Option<RunFlag>,
    pub(crate) deg_step: f64,
    pub(crate) tracked_g: f64,
    pub(crate) state: LoopState,
    pub(crate) moves: u64,
}

impl<P: Pwm> core::fmt::Debug for ControlLoop<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ControlLoop")
            .field("state", &self.state)
            .field("tracked_g", &self.tracked_g)
            .field("angle", &self.servo.angle())
            .field("moves", &self.moves)
            .finish()
    }
}

impl<P: Pwm> ControlLoop<P> {
    /// Start building a ControlLoop.
    pub fn builder() -> ControlLoopBuilder<Missing, Missing, P> {
        ControlLoopBuilder::default()
    }

    /// Build with default tuning and the real clock, then run the calibration gate.
    ///
    /// `sensor` must already be started.
    pub fn new(sensor: SensorReader, actuator: Servo<P>) -> Result<Self> {
        Self::builder()
            .with_sensor(sensor)
            .with_actuator(actuator)
            .build()
    }

    /// Assemble without calibrating. The sensor reader must be running.
    pub(crate) fn assemble(
        sensor: SensorReader,
        servo: Servo<P>,
        cfg: ControlCfg,
        clock: Option<Arc<dyn Clock + Send + Sync>>,
        shutdown: Option<RunFlag>,
    ) -> Result<Self> {
        if !sensor.is_running() {
            if let Some(fault) = sensor.fault() {
                return Err(eyre::Report::new(fault));
            }
            return Err(eyre::Report::new(BoomError::State(
                "sensor reader must be started before the control loop".into(),
            )));
        }
        let updates = sensor.updates();
        let deg_step = deg_step(servo.cfg());
        Ok(Self {
            sensor,
            servo,
            updates,
            cfg,
            clock: clock.unwrap_or_else(|| Arc::new(MonotonicClock::new())),
            shutdown,
            deg_step,
            tracked_g: 0.0,
            state: LoopState::Calibrating,
            moves: 0,
        })
    }

    /// Calibration gate: wait for a live reading, centre the servo, let it settle.
    ///
    /// Transitions `Calibrating → Steady` exactly once; later calls are no-ops.
    pub(crate) fn calibrate(&mut self) -> Result<()> {
        if self.state != LoopState::Calibrating {
            return Ok(());
        }
        let (polls, sample) =
            wait_for_sensor(&self.sensor, &self.cfg, &*self.clock, self.shutdown.as_ref())?;
        self.tracked_g = sample.x;

        let mid = self.servo.cfg().mid_deg;
        let applied = self.servo.set_angle(mid)?;
        info!(polls, x = sample.x, angle = applied, "accelerometer detected, servo centred");
        self.clock.sleep(self.cfg.settle());
        self.state = LoopState::Steady;
        Ok(())
    }

    /// Compare-and-store: track the sample's x value if it changed.
    /// Returns whether the tracked value was updated.
    pub fn on_sample(&mut self, sample: &AccelerationSample) -> bool {
        if sample.x != self.tracked_g {
            self.tracked_g = sample.x;
            true
        } else {
            false
        }
    }

    /// Apply the newest sample waiting on the reader's channel, if any.
    fn poll_updates(&mut self) {
        if let Some(sample) = self.updates.try_iter().last() {
            self.on_sample(&sample);
        }
    }

    /// One angle-computation iteration (no sleeping).
    pub fn step(&mut self) -> Result<ControlStatus> {
        if self.state != LoopState::Steady {
            return Err(eyre::Report::new(BoomError::State(format!(
                "control step requested while {:?}",
                self.state
            ))));
        }
        self.poll_updates();

        let current = self.servo.angle().unwrap_or(self.servo.cfg().mid_deg);
        let Some(target) = next_angle(current, self.tracked_g, &self.cfg, self.deg_step) else {
            return Ok(ControlStatus::DeadBand);
        };
        let applied = self.servo.set_angle(target)?;
        self.moves += 1;
        debug!(
            g = self.tracked_g,
            from = current,
            target,
            to = applied,
            "servo step"
        );
        Ok(ControlStatus::Moved {
            from: current,
            to: applied,
        })
    }

    fn keep_running(&self) -> bool {
        self.sensor.is_running() && self.shutdown.as_ref().is_none_or(RunFlag::is_set)
    }

    /// Steady-state loop: step, sleep `step_interval_ms`, repeat while the sensor reader
    /// (and the optional shutdown flag) keep running.
    ///
    /// Returns `Ok(())` once stopped, or the reader's fault if sampling died.
    pub fn run(&mut self) -> Result<()> {
        let step_interval = self.cfg.step_interval();
        info!(
            deg_step = self.deg_step,
            tolerance_ms2 = self.cfg.tolerance_ms2,
            step_ms = self.cfg.step_interval_ms,
            "control loop running"
        );

        while self.keep_running() {
            self.step()?;
            self.clock.sleep(step_interval);
        }

        self.state = LoopState::Stopped;
        info!(moves = self.moves, angle = ?self.servo.angle(), "control loop stopped");
        match self.sensor.fault() {
            Some(fault) => Err(eyre::Report::new(fault)),
            None => Ok(()),
        }
    }

    /// Stop sampling and release the servo (which keeps its last position).
    pub fn stop(&mut self) {
        self.sensor.stop();
        self.servo.stop();
        self.state = LoopState::Stopped;
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// The x acceleration (m/s²) currently driving the servo.
    pub fn tracked_g(&self) -> f64 {
        self.tracked_g
    }

    pub fn angle(&self) -> Option<f64> {
        self.servo.angle()
    }

    pub fn deg_step(&self) -> f64 {
        self.deg_step
    }

    /// Number of servo commands issued by `step`.
    pub fn moves(&self) -> u64 {
        self.moves
    }

    pub fn sensor(&self) -> &SensorReader {
        &self.sensor
    }

    pub fn servo(&self) -> &Servo<P> {
        &self.servo
    }
}
