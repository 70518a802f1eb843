//! Background ticker.
//!
//! Emits one [`Tick`] per second into an unbounded channel until stopped.
//! The preferred backend is a dedicated OS thread, so ticks keep coming when
//! the async runtime is busy rendering. If that thread cannot be spawned the
//! ticker degrades to a tokio interval task on the current runtime, which has
//! the same 1 Hz semantics.
//!
//! Ticks carry the generation of the `start()` call that produced them.
//! A consumer can drop ticks from an older generation that were already in
//! flight when `stop()` ran.

use std::sync::mpsc as std_mpsc;
use std::thread;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::error::TickerError;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub generation: u64,
}

/// Start/stop contract the cycle engine drives.
///
/// Both operations are idempotent. There is no pause: pausing is `stop()`,
/// resuming is a fresh `start()`.
pub trait Ticker: Send {
    /// Begin emitting ticks. Has no effect if already running.
    fn start(&mut self) -> Result<(), TickerError>;

    /// Cancel any pending tick. Safe to call when not running.
    fn stop(&mut self);

    fn is_running(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickerBackend {
    /// Dedicated worker thread, falling back to `InProcess` on spawn failure.
    Worker,
    /// Tokio interval task on the current runtime.
    InProcess,
}

enum Active {
    Worker {
        // Dropping the sender wakes the worker and ends it.
        _stop: std_mpsc::Sender<()>,
    },
    Task(tokio::task::JoinHandle<()>),
}

/// Ticker backed by a worker thread or a tokio task.
pub struct BackgroundTicker {
    tx: mpsc::UnboundedSender<Tick>,
    preferred: TickerBackend,
    period: Duration,
    generation: u64,
    active: Option<Active>,
    #[cfg(test)]
    worker_disabled: bool,
}

impl BackgroundTicker {
    pub fn new(tx: mpsc::UnboundedSender<Tick>) -> Self {
        Self::with_backend(tx, TickerBackend::Worker)
    }

    pub fn with_backend(tx: mpsc::UnboundedSender<Tick>, preferred: TickerBackend) -> Self {
        Self {
            tx,
            preferred,
            period: TICK_PERIOD,
            generation: 0,
            active: None,
            #[cfg(test)]
            worker_disabled: false,
        }
    }

    /// Override the tick period. Only tests want anything but one second.
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Generation of the most recent `start()`.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Backend currently emitting ticks, if running.
    pub fn active_backend(&self) -> Option<TickerBackend> {
        match self.active {
            Some(Active::Worker { .. }) => Some(TickerBackend::Worker),
            Some(Active::Task(_)) => Some(TickerBackend::InProcess),
            None => None,
        }
    }

    /// Make every worker spawn fail, as if the OS refused the thread.
    #[cfg(test)]
    fn without_worker(mut self) -> Self {
        self.worker_disabled = true;
        self
    }

    #[cfg(test)]
    fn worker_disabled(&self) -> bool {
        self.worker_disabled
    }

    #[cfg(not(test))]
    fn worker_disabled(&self) -> bool {
        false
    }

    fn spawn_worker(&self, generation: u64) -> Result<Active, TickerError> {
        if self.worker_disabled() {
            return Err(TickerError::WorkerSpawn(std::io::Error::new(
                std::io::ErrorKind::Other,
                "worker threads disabled",
            )));
        }
        let (stop_tx, stop_rx) = std_mpsc::channel::<()>();
        let tx = self.tx.clone();
        let period = self.period;

        thread::Builder::new()
            .name("pomoweb-ticker".into())
            .spawn(move || {
                let mut next = Instant::now() + period;
                loop {
                    let wait = next.saturating_duration_since(Instant::now());
                    match stop_rx.recv_timeout(wait) {
                        Err(std_mpsc::RecvTimeoutError::Timeout) => {
                            if tx.send(Tick { generation }).is_err() {
                                break;
                            }
                            next += period;
                        }
                        Ok(()) | Err(std_mpsc::RecvTimeoutError::Disconnected) => break,
                    }
                }
            })
            .map_err(TickerError::WorkerSpawn)?;

        Ok(Active::Worker { _stop: stop_tx })
    }

    fn spawn_task(&self, generation: u64) -> Result<Active, TickerError> {
        let handle = tokio::runtime::Handle::try_current().map_err(|_| TickerError::NoRuntime)?;
        let tx = self.tx.clone();
        let period = self.period;

        let task = handle.spawn(async move {
            let mut interval =
                tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if tx.send(Tick { generation }).is_err() {
                    break;
                }
            }
        });
        Ok(Active::Task(task))
    }
}

impl Ticker for BackgroundTicker {
    fn start(&mut self) -> Result<(), TickerError> {
        if self.active.is_some() {
            return Ok(());
        }
        let generation = self.generation + 1;

        let active = match self.preferred {
            TickerBackend::Worker => match self.spawn_worker(generation) {
                Ok(active) => active,
                Err(e) => {
                    tracing::warn!(error = %e, "ticker worker unavailable, using in-process interval");
                    self.spawn_task(generation)?
                }
            },
            TickerBackend::InProcess => self.spawn_task(generation)?,
        };

        self.generation = generation;
        self.active = Some(active);
        tracing::debug!(generation, backend = ?self.active_backend(), "ticker started");
        Ok(())
    }

    fn stop(&mut self) {
        match self.active.take() {
            Some(Active::Task(task)) => task.abort(),
            Some(Active::Worker { .. }) => {}
            None => return,
        }
        tracing::debug!(generation = self.generation, "ticker stopped");
    }

    fn is_running(&self) -> bool {
        self.active.is_some()
    }
}

impl Drop for BackgroundTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Ticker for hosts that deliver ticks themselves.
///
/// It emits nothing; it only records the start/stop commands it receives.
#[derive(Debug, Default, Clone)]
pub struct ManualTicker {
    running: bool,
    starts: u32,
    stops: u32,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `start()` calls that actually started the ticker.
    pub fn starts(&self) -> u32 {
        self.starts
    }

    /// Number of `stop()` calls that actually stopped the ticker.
    pub fn stops(&self) -> u32 {
        self.stops
    }
}

impl Ticker for ManualTicker {
    fn start(&mut self) -> Result<(), TickerError> {
        if !self.running {
            self.running = true;
            self.starts += 1;
        }
        Ok(())
    }

    fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.stops += 1;
        }
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
