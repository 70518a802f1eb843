//! Cycle engine implementation.
//!
//! The engine is a deadline-based state machine over three modes
//! (work, short break, long break). It does not decrement a counter on each
//! tick: when running it remembers the wall-clock instant the interval ends
//! and recomputes the remaining seconds from that deadline whenever a tick
//! arrives. Late, skipped or coalesced ticks therefore cannot cause drift.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> Running --pause--> Idle
//!   ^                |
//!   +---complete-----+   (auto-start flags may re-arm immediately)
//! ```
//!
//! `reset` and `select_mode` return to Idle from anywhere.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = CycleEngine::new(settings, ticker);
//! engine.start();
//! // On every tick from the ticker:
//! engine.tick();
//! ```
//!
//! Every operation has an `*_at(now)` form taking the current time
//! explicitly; the plain forms use `Utc::now()`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::mode::{Mode, LONG_BREAK_INTERVAL};
use super::ticker::Ticker;
use crate::events::{Event, NotificationKind, Snapshot};
use crate::storage::Settings;

const EVENT_CAPACITY: usize = 64;

/// Deadlines further out than this are capped; keeps chrono arithmetic in range.
const MAX_DEADLINE_SECS: u64 = 100 * 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnginePhase {
    Idle,
    Running,
}

/// The engine's mutable state. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleState {
    pub mode: Mode,
    pub remaining_seconds: u64,
    pub running: bool,
    /// Wall-clock end of the current interval while running.
    pub target_end: Option<DateTime<Utc>>,
    pub completed_work_intervals: u32,
    pub session_number: u32,
}

impl CycleState {
    fn initial(settings: &Settings) -> Self {
        Self {
            mode: Mode::Work,
            remaining_seconds: settings.duration_for(Mode::Work),
            running: false,
            target_end: None,
            completed_work_intervals: 0,
            session_number: 1,
        }
    }
}

/// Core cycle engine.
///
/// Sole owner of [`CycleState`]. Commands the ticker and publishes every
/// state change on a broadcast channel.
pub struct CycleEngine<T: Ticker> {
    settings: Settings,
    state: CycleState,
    ticker: T,
    events: broadcast::Sender<Event>,
}

impl<T: Ticker> CycleEngine<T> {
    /// Create an engine in Work mode with the full configured duration.
    pub fn new(settings: Settings, ticker: T) -> Self {
        let (events, _rx) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: CycleState::initial(&settings),
            settings,
            ticker,
            events,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &CycleState {
        &self.state
    }

    pub fn phase(&self) -> EnginePhase {
        if self.state.running {
            EnginePhase::Running
        } else {
            EnginePhase::Idle
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn ticker(&self) -> &T {
        &self.ticker
    }

    pub fn ticker_mut(&mut self) -> &mut T {
        &mut self.ticker
    }

    /// Duration of `mode` under the current settings.
    pub fn duration_for(&self, mode: Mode) -> u64 {
        self.settings.duration_for(mode)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            mode: self.state.mode,
            remaining_seconds: self.state.remaining_seconds,
            running: self.state.running,
            session_number: self.state.session_number,
            duration_secs: self.duration_for(self.state.mode),
            completed_work_intervals: self.state.completed_work_intervals,
        }
    }

    /// Subscribe to engine events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Sender side of the event channel, for handles that subscribe later.
    pub fn event_sender(&self) -> broadcast::Sender<Event> {
        self.events.clone()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Vec<Event> {
        self.start_at(Utc::now())
    }

    pub fn start_at(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut out = Vec::new();
        self.start_into(now, &mut out);
        out
    }

    pub fn pause(&mut self) -> Vec<Event> {
        self.pause_at(Utc::now())
    }

    /// Stop the countdown, keeping the remaining time. No-op when idle.
    pub fn pause_at(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut out = Vec::new();
        if !self.state.running {
            return out;
        }
        self.ticker.stop();

        let remaining = self
            .state
            .target_end
            .map(|target| remaining_until(target, now))
            .unwrap_or(self.state.remaining_seconds);
        // Settings may have shrunk the mode while the interval was in flight.
        self.state.remaining_seconds = remaining.min(self.duration_for(self.state.mode));
        self.state.running = false;
        self.state.target_end = None;

        tracing::debug!(mode = ?self.state.mode, remaining_secs = self.state.remaining_seconds, "paused");
        self.emit_update(now, &mut out);
        out
    }

    /// Alias of [`pause`](Self::pause).
    pub fn stop(&mut self) -> Vec<Event> {
        self.pause()
    }

    pub fn toggle(&mut self) -> Vec<Event> {
        self.toggle_at(Utc::now())
    }

    /// Pause when running, start otherwise.
    pub fn toggle_at(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        if self.state.running {
            self.pause_at(now)
        } else {
            self.start_at(now)
        }
    }

    pub fn reset(&mut self) -> Vec<Event> {
        self.reset_at(Utc::now())
    }

    /// Discard the current interval and all counters; back to a fresh Work
    /// interval.
    pub fn reset_at(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut out = Vec::new();
        self.ticker.stop();
        let discarded = self.state.mode;

        self.state = CycleState::initial(&self.settings);

        tracing::debug!(discarded = ?discarded, "reset");
        self.emit(
            Event::notification(NotificationKind::Discarded, discarded, now),
            &mut out,
        );
        self.emit_update(now, &mut out);
        out
    }

    pub fn select_mode(&mut self, mode: Mode) -> Vec<Event> {
        self.select_mode_at(mode, Utc::now())
    }

    /// Manual override. Counters are left alone.
    pub fn select_mode_at(&mut self, mode: Mode, now: DateTime<Utc>) -> Vec<Event> {
        let mut out = Vec::new();
        self.ticker.stop();
        self.state.mode = mode;
        self.state.remaining_seconds = self.duration_for(mode);
        self.state.running = false;
        self.state.target_end = None;

        tracing::debug!(mode = ?mode, "mode selected");
        self.emit_update(now, &mut out);
        out
    }

    pub fn tick(&mut self) -> Vec<Event> {
        self.tick_at(Utc::now())
    }

    /// Account for elapsed time. Ignored unless running.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut out = Vec::new();
        let Some(target) = self.state.target_end.filter(|_| self.state.running) else {
            tracing::trace!("tick ignored while idle");
            return out;
        };

        self.state.remaining_seconds = remaining_until(target, now);
        if self.state.remaining_seconds == 0 {
            self.complete_into(now, &mut out);
        } else {
            self.emit_update(now, &mut out);
        }
        out
    }

    pub fn apply_settings(&mut self, settings: Settings) -> Vec<Event> {
        self.apply_settings_at(settings, Utc::now())
    }

    /// Replace the settings snapshot.
    ///
    /// When idle the current mode's duration is recomputed immediately.
    /// A running countdown keeps its deadline; the new durations apply from
    /// the next mode computation.
    pub fn apply_settings_at(&mut self, settings: Settings, now: DateTime<Utc>) -> Vec<Event> {
        let mut out = Vec::new();
        self.settings = settings;

        if self.state.running {
            tracing::debug!("settings changed while running, deferring");
            return out;
        }
        self.state.remaining_seconds = self.duration_for(self.state.mode);
        self.emit_update(now, &mut out);
        out
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn start_into(&mut self, now: DateTime<Utc>, out: &mut Vec<Event>) {
        if self.state.running {
            return;
        }
        if self.state.remaining_seconds == 0 {
            // Already expired: run completion instead of arming a zero-length interval.
            self.complete_into(now, out);
            return;
        }

        self.state.target_end = Some(deadline_after(now, self.state.remaining_seconds));
        self.state.running = true;
        if let Err(e) = self.ticker.start() {
            tracing::error!(error = %e, "ticker could not be started; countdown will only advance on commands");
        }

        tracing::debug!(mode = ?self.state.mode, remaining_secs = self.state.remaining_seconds, "started");
        self.emit_update(now, out);
    }

    fn complete_into(&mut self, now: DateTime<Utc>, out: &mut Vec<Event>) {
        self.ticker.stop();
        self.state.running = false;
        self.state.target_end = None;

        let finished = self.state.mode;
        let next = match finished {
            Mode::Work => {
                self.state.completed_work_intervals =
                    self.state.completed_work_intervals.saturating_add(1);
                self.emit(
                    Event::notification(NotificationKind::WorkComplete, finished, now),
                    out,
                );
                if self.state.completed_work_intervals % LONG_BREAK_INTERVAL == 0 {
                    Mode::LongBreak
                } else {
                    Mode::ShortBreak
                }
            }
            Mode::ShortBreak | Mode::LongBreak => {
                self.emit(
                    Event::notification(NotificationKind::BreakComplete, finished, now),
                    out,
                );
                if finished == Mode::LongBreak {
                    self.state.session_number = 1;
                    self.state.completed_work_intervals = 0;
                } else {
                    self.state.session_number = self.state.session_number.saturating_add(1);
                }
                Mode::Work
            }
        };

        self.state.mode = next;
        self.state.remaining_seconds = self.duration_for(next);
        tracing::info!(
            finished = ?finished,
            next = ?next,
            completed = self.state.completed_work_intervals,
            session = self.state.session_number,
            "interval complete"
        );

        if self.settings.auto_start_after(finished) {
            self.start_into(now, out);
        } else {
            self.emit_update(now, out);
        }
    }

    fn emit_update(&self, now: DateTime<Utc>, out: &mut Vec<Event>) {
        self.emit(
            Event::StateUpdated {
                snapshot: self.snapshot(),
                at: now,
            },
            out,
        );
    }

    fn emit(&self, event: Event, out: &mut Vec<Event>) {
        // No subscribers is fine.
        let _ = self.events.send(event.clone());
        out.push(event);
    }
}

/// Whole seconds from `now` until `target`, rounded, never negative.
fn remaining_until(target: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let ms = (target - now).num_milliseconds();
    if ms <= 0 {
        0
    } else {
        ((ms + 500) / 1000) as u64
    }
}

fn deadline_after(now: DateTime<Utc>, secs: u64) -> DateTime<Utc> {
    let secs = secs.min(MAX_DEADLINE_SECS) as i64;
    now + Duration::seconds(secs)
}
