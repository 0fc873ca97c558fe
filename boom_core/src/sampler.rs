//! Background accelerometer sampling.
//!
//! A `SensorReader` owns the sensor driver and, once started, exactly one thread that
//! polls it at a fixed interval. Each reading is rounded, stored in a snapshot slot,
//! published on a single-slot channel (newest wins, the producer never blocks) and
//! handed to the registered observer.
//!
//! A read failure is fatal: the thread records the fault, clears the run flag and
//! exits. Nothing is retried here.
//!
//! Safety: the thread is signalled and joined when the `SensorReader` is dropped,
//! preventing thread leaks.
use crossbeam_channel as xch;
use boom_traits::AccelSensor;
use boom_traits::clock::Clock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, trace};

use crate::atomic::RunFlag;
use crate::config::SamplerCfg;
use crate::error::{BoomError, Result};
use crate::hw_error::map_hw_error;
use crate::types::AccelerationSample;

/// Callback run on the sampling thread after every stored sample.
pub type Observer = Box<dyn FnMut(&AccelerationSample) + Send>;

type IdleParts = (
    Box<dyn AccelSensor + Send>,
    Box<dyn Clock + Send + Sync>,
);

#[derive(Default)]
struct Shared {
    latest: Mutex<AccelerationSample>,
    fault: Mutex<Option<BoomError>>,
    observer: Mutex<Option<Observer>>,
    samples: AtomicU64,
}

#[inline]
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct SensorReader {
    shared: Arc<Shared>,
    running: RunFlag,
    cfg: SamplerCfg,
    /// Driver and clock waiting for `start()`; moved into the thread afterwards.
    idle: Option<IdleParts>,
    tx: xch::Sender<AccelerationSample>,
    rx: xch::Receiver<AccelerationSample>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl core::fmt::Debug for SensorReader {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SensorReader")
            .field("running", &self.running.is_set())
            .field("started", &self.idle.is_none())
            .field("samples", &self.sample_count())
            .finish()
    }
}

impl SensorReader {
    /// Wrap an already opened sensor driver. Sampling starts with `start()`.
    pub fn new<S, C>(sensor: S, cfg: SamplerCfg, clock: C) -> Self
    where
        S: AccelSensor + Send + 'static,
        C: Clock + Send + Sync + 'static,
    {
        let (tx, rx) = xch::bounded(1);
        Self {
            shared: Arc::new(Shared::default()),
            running: RunFlag::new(),
            cfg,
            idle: Some((Box::new(sensor), Box::new(clock))),
            tx,
            rx,
            join_handle: None,
        }
    }

    /// Open the sensor driver through `open` and wrap it.
    ///
    /// A failure to open is reported as `BoomError::SensorInit` and is not retried.
    pub fn initialize<S, F, C>(open: F, cfg: SamplerCfg, clock: C) -> Result<Self>
    where
        S: AccelSensor + Send + 'static,
        F: FnOnce() -> std::result::Result<S, Box<dyn std::error::Error + Send + Sync>>,
        C: Clock + Send + Sync + 'static,
    {
        let sensor = open().map_err(|e| {
            let err = match map_hw_error(&*e) {
                init @ BoomError::SensorInit(_) => init,
                other => BoomError::SensorInit(other.to_string()),
            };
            error!(error = %err, "failed to open accelerometer");
            eyre::Report::new(err)
        })?;
        Ok(Self::new(sensor, cfg, clock))
    }

    /// Raise the run flag and spawn the sampling thread.
    pub fn start(&mut self) -> Result<()> {
        let Some((mut sensor, clock)) = self.idle.take() else {
            return Err(eyre::Report::new(BoomError::State(
                "sensor reader already started".into(),
            )));
        };

        self.running.raise();
        let running = self.running.clone();
        let shared = self.shared.clone();
        let tx = self.tx.clone();
        let drain = self.rx.clone();
        let period = self.cfg.interval();

        let spawned = std::thread::Builder::new()
            .name("boom-sampler".into())
            .spawn(move || {
                info!(interval_us = period.as_micros() as u64, "sampler thread started");
                while running.is_set() {
                    clock.sleep(period);
                    match sensor.read_axes() {
                        Ok(axes) => {
                            let sample = AccelerationSample::from_axes(axes);
                            *lock(&shared.latest) = sample;
                            shared.samples.fetch_add(1, Ordering::Relaxed);
                            publish(&tx, &drain, sample);
                            if let Some(observer) = lock(&shared.observer).as_mut() {
                                observer(&sample);
                            }
                            trace!(x = sample.x, y = sample.y, z = sample.z, "sample");
                        }
                        Err(e) => {
                            let fault = map_hw_error(&*e);
                            error!(error = %fault, "sensor read failed, sampling stopped");
                            *lock(&shared.fault) = Some(fault);
                            running.clear();
                            break;
                        }
                    }
                }
                info!("sampler thread exiting");
            });

        match spawned {
            Ok(handle) => {
                self.join_handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.running.clear();
                Err(eyre::Report::new(BoomError::State(format!(
                    "spawn sampler thread: {e}"
                ))))
            }
        }
    }

    /// Register the observer invoked on the sampling thread after every sample.
    ///
    /// Only one observer is kept; the last registration wins. The callback runs inline
    /// with sampling, so a slow observer slows sampling down. It must not call back
    /// into `register_observer`.
    pub fn register_observer<F>(&self, observer: F)
    where
        F: FnMut(&AccelerationSample) + Send + 'static,
    {
        *lock(&self.shared.observer) = Some(Box::new(observer));
    }

    /// Clear the run flag. The thread exits at its next loop check; an in-flight read
    /// is not interrupted.
    pub fn stop(&self) {
        if self.running.is_set() {
            info!("stopping sensor reader");
        }
        self.running.clear();
    }

    /// Snapshot of the most recent sample (all zeros before the first read).
    pub fn latest(&self) -> AccelerationSample {
        *lock(&self.shared.latest)
    }

    /// Single-slot feed of new samples. Intended for one consumer; a slow consumer only
    /// ever finds the newest sample waiting.
    pub fn updates(&self) -> xch::Receiver<AccelerationSample> {
        self.rx.clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.is_set()
    }

    /// Handle to the reader's run flag; clearing it stops sampling.
    pub fn run_flag(&self) -> RunFlag {
        self.running.clone()
    }

    /// The error that stopped sampling, if any.
    pub fn fault(&self) -> Option<BoomError> {
        lock(&self.shared.fault).clone()
    }

    /// Number of samples stored since start.
    pub fn sample_count(&self) -> u64 {
        self.shared.samples.load(Ordering::Relaxed)
    }
}

/// Replace whatever is waiting in the single-slot channel with `sample`.
fn publish(
    tx: &xch::Sender<AccelerationSample>,
    drain: &xch::Receiver<AccelerationSample>,
    sample: AccelerationSample,
) {
    if let Err(xch::TrySendError::Full(sample)) = tx.try_send(sample) {
        let _ = drain.try_recv();
        let _ = tx.try_send(sample);
    }
}

impl Drop for SensorReader {
    fn drop(&mut self) {
        self.running.clear();

        // The thread exits after at most one sleep, one read and one observer call.
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => {
                    debug!("sampler thread joined");
                }
                Err(e) => {
                    // Thread panicked; log but don't propagate (we're in Drop)
                    tracing::warn!(?e, "sampler thread panicked during shutdown");
                }
            }
        }
    }
}
