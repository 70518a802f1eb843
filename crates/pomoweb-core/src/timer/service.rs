//! Single-owner event loop around the cycle engine.
//!
//! All engine input (user commands, ticks and settings snapshots) flows
//! through one task, so state transitions are applied one at a time and
//! nothing else ever touches [`CycleState`](super::CycleState).
//!
//! ```ignore
//! let store = SettingsStore::open()?;
//! let (service, handle) = CycleService::new(store.subscribe(), TickerBackend::Worker);
//! tokio::spawn(service.run());
//! handle.start()?;
//! ```

use tokio::sync::{broadcast, mpsc, oneshot, watch};

use super::engine::CycleEngine;
use super::mode::Mode;
use super::ticker::{BackgroundTicker, Tick, Ticker, TickerBackend};
use crate::error::{CoreError, Result};
use crate::events::{Event, Snapshot};
use crate::storage::Settings;

/// User commands accepted by the loop.
#[derive(Debug)]
pub enum Command {
    Start,
    Pause,
    Toggle,
    Reset,
    SelectMode(Mode),
    Snapshot(oneshot::Sender<Snapshot>),
    Shutdown,
}

/// Cloneable handle for sending commands and subscribing to events.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    commands: mpsc::UnboundedSender<Command>,
    events: broadcast::Sender<Event>,
}

impl EngineHandle {
    fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| CoreError::EngineClosed)
    }

    pub fn start(&self) -> Result<()> {
        self.send(Command::Start)
    }

    pub fn pause(&self) -> Result<()> {
        self.send(Command::Pause)
    }

    pub fn toggle(&self) -> Result<()> {
        self.send(Command::Toggle)
    }

    pub fn reset(&self) -> Result<()> {
        self.send(Command::Reset)
    }

    pub fn select_mode(&self, mode: Mode) -> Result<()> {
        self.send(Command::SelectMode(mode))
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown)
    }

    /// Current engine state, answered in order with other commands.
    pub async fn snapshot(&self) -> Result<Snapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot(tx))?;
        rx.await.map_err(|_| CoreError::EngineClosed)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }
}

/// The loop itself. Consume with [`CycleService::run`].
pub struct CycleService {
    engine: CycleEngine<BackgroundTicker>,
    commands: mpsc::UnboundedReceiver<Command>,
    ticks: mpsc::UnboundedReceiver<Tick>,
    settings: watch::Receiver<Settings>,
}

impl CycleService {
    pub fn new(
        mut settings: watch::Receiver<Settings>,
        backend: TickerBackend,
    ) -> (Self, EngineHandle) {
        let (tick_tx, ticks) = mpsc::unbounded_channel();
        let (command_tx, commands) = mpsc::unbounded_channel();

        let initial = settings.borrow_and_update().clone();
        let ticker = BackgroundTicker::with_backend(tick_tx, backend);
        let engine = CycleEngine::new(initial, ticker);

        let handle = EngineHandle {
            commands: command_tx,
            events: engine.event_sender(),
        };
        let service = Self {
            engine,
            commands,
            ticks,
            settings,
        };
        (service, handle)
    }

    pub fn engine(&self) -> &CycleEngine<BackgroundTicker> {
        &self.engine
    }

    /// Mutable access before the loop starts, e.g. to pre-select a mode.
    pub fn engine_mut(&mut self) -> &mut CycleEngine<BackgroundTicker> {
        &mut self.engine
    }

    /// Process input until shutdown or until every handle is dropped.
    pub async fn run(mut self) {
        let mut settings_open = true;
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    None | Some(Command::Shutdown) => break,
                    Some(command) => self.handle(command),
                },
                Some(tick) = self.ticks.recv() => {
                    self.on_tick(tick);
                }
                changed = self.settings.changed(), if settings_open => match changed {
                    Ok(()) => {
                        let settings = self.settings.borrow_and_update().clone();
                        self.engine.apply_settings(settings);
                    }
                    Err(_) => {
                        tracing::debug!("settings store dropped, keeping last snapshot");
                        settings_open = false;
                    }
                },
            }
        }

        self.engine.ticker_mut().stop();
        tracing::debug!("cycle service stopped");
    }

    /// Apply a tick unless it belongs to an earlier `start()` and crossed
    /// the cancel. Returns whether the engine saw it.
    fn on_tick(&mut self, tick: Tick) -> bool {
        if tick.generation != self.engine.ticker().generation() {
            tracing::trace!(generation = tick.generation, "stale tick dropped");
            return false;
        }
        self.engine.tick();
        true
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Start => {
                self.engine.start();
            }
            Command::Pause => {
                self.engine.pause();
            }
            Command::Toggle => {
                self.engine.toggle();
            }
            Command::Reset => {
                self.engine.reset();
            }
            Command::SelectMode(mode) => {
                self.engine.select_mode(mode);
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.engine.snapshot());
            }
            Command::Shutdown => {}
        }
    }
}
