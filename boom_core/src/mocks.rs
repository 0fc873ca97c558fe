//! Test and helper mocks for boom_core.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use boom_traits::{AccelSensor, HwResult, Pwm};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
struct Script {
    axes: (f64, f64, f64),
    fail: Option<String>,
    reads: u64,
}

/// Sensor returning whatever the test last scripted. Clones share the script, so a
/// test keeps one handle while the sampling thread owns the other.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSensor {
    script: Arc<Mutex<Script>>,
}

impl ScriptedSensor {
    pub fn new(axes: (f64, f64, f64)) -> Self {
        let s = Self::default();
        s.set(axes);
        s
    }

    pub fn set(&self, axes: (f64, f64, f64)) {
        lock(&self.script).axes = axes;
    }

    pub fn set_x(&self, x: f64) {
        lock(&self.script).axes.0 = x;
    }

    /// Make every following read fail with an I/O error carrying `msg`.
    pub fn fail_with(&self, msg: &str) {
        lock(&self.script).fail = Some(msg.to_owned());
    }

    pub fn reads(&self) -> u64 {
        lock(&self.script).reads
    }
}

impl AccelSensor for ScriptedSensor {
    fn read_axes(&mut self) -> HwResult<(f64, f64, f64)> {
        let mut script = lock(&self.script);
        script.reads += 1;
        match &script.fail {
            Some(msg) => Err(Box::new(std::io::Error::other(msg.clone()))),
            None => Ok(script.axes),
        }
    }
}

#[derive(Debug, Default)]
struct PwmLog {
    frequency_hz: Option<u32>,
    duties: Vec<u16>,
    fail: bool,
}

/// PWM output recording every write. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingPwm {
    log: Arc<Mutex<PwmLog>>,
}

impl RecordingPwm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frequency_hz(&self) -> Option<u32> {
        lock(&self.log).frequency_hz
    }

    /// Every duty written so far, oldest first.
    pub fn duties(&self) -> Vec<u16> {
        lock(&self.log).duties.clone()
    }

    /// Make every following write fail.
    pub fn fail_writes(&self) {
        lock(&self.log).fail = true;
    }
}

impl Pwm for RecordingPwm {
    fn set_frequency(&mut self, hz: u32) -> HwResult<()> {
        let mut log = lock(&self.log);
        if log.fail {
            return Err(Box::new(std::io::Error::other("pwm write failed")));
        }
        log.frequency_hz = Some(hz);
        Ok(())
    }

    fn set_duty(&mut self, duty: u16) -> HwResult<()> {
        let mut log = lock(&self.log);
        if log.fail {
            return Err(Box::new(std::io::Error::other("pwm write failed")));
        }
        log.duties.push(duty);
        Ok(())
    }
}
