//! # Pomoweb Core Library
//!
//! Core logic for the Pomoweb Pomodoro timer: a work / short break /
//! long break cycle with user-configurable durations. Front ends (the
//! `pomoweb` terminal binary, or anything else) are thin layers that send
//! commands and render the events this crate publishes.
//!
//! ## Architecture
//!
//! - **Cycle Engine**: a deadline-based state machine; remaining time is
//!   always recomputed from a wall-clock target, so late ticks never drift
//! - **Background Ticker**: 1 Hz signal from a worker thread, with an
//!   in-process tokio fallback
//! - **Cycle Service**: the single task that owns the engine and serialises
//!   commands, ticks and settings changes
//! - **Settings Store**: JSON-persisted preferences broadcast as snapshots
//! - **Notifications**: fire-and-forget dispatch of completion events
//!
//! ## Key Components
//!
//! - [`CycleEngine`]: Core cycle state machine
//! - [`CycleService`] / [`EngineHandle`]: Event loop and its command handle
//! - [`SettingsStore`]: Settings persistence
//! - [`Notifier`]: Trait for notification backends

pub mod error;
pub mod events;
pub mod notify;
pub mod storage;
pub mod timer;

pub use error::{CoreError, NotifyError, SettingsError, TickerError};
pub use events::{Event, NotificationKind, Snapshot};
pub use notify::{NotificationDispatcher, Notifier};
pub use storage::{Settings, SettingsStore};
pub use timer::{
    BackgroundTicker, CycleEngine, CycleService, CycleState, EngineHandle, ManualTicker, Mode,
    Ticker, TickerBackend,
};
