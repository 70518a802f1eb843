//! Presentation helpers.
//!
//! Pure functions from an engine [`Snapshot`] to the strings and numbers a
//! presenter draws. Nothing here feeds back into the engine.

use std::f64::consts::PI;

use serde::Serialize;

use super::mode::Mode;
use crate::events::Snapshot;

/// Radius of the progress ring, in drawing units.
pub const RING_RADIUS: f64 = 90.0;

pub const APP_TITLE: &str = "Pomodoro Timer";

/// `MM:SS`, zero padded. Minutes are not wrapped into hours.
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Window title, e.g. `🍅 24:59 - Pomodoro Timer`.
pub fn window_title(mode: Mode, remaining_seconds: u64) -> String {
    let icon = if mode.is_break() { "☕" } else { "🍅" };
    format!("{icon} {} - {APP_TITLE}", format_clock(remaining_seconds))
}

/// Fraction of the interval already elapsed, in `[0, 1]`.
pub fn progress(remaining_seconds: u64, duration_secs: u64) -> f64 {
    if duration_secs == 0 {
        return 0.0;
    }
    (1.0 - remaining_seconds as f64 / duration_secs as f64).clamp(0.0, 1.0)
}

pub fn ring_circumference() -> f64 {
    2.0 * PI * RING_RADIUS
}

/// Stroke dash offset for the progress ring: full circumference when
/// nothing has elapsed, zero when the interval is done.
pub fn ring_offset(progress: f64) -> f64 {
    ring_circumference() * (1.0 - progress.clamp(0.0, 1.0))
}

/// Everything a presenter needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    pub mode: Mode,
    pub clock: String,
    pub label: &'static str,
    pub title: String,
    pub progress: f64,
    pub ring_offset: f64,
    pub button_label: &'static str,
    pub session_number: u32,
    /// The settings form is disabled while a countdown runs.
    pub settings_locked: bool,
}

impl View {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let progress = progress(snapshot.remaining_seconds, snapshot.duration_secs);
        let button_label = if snapshot.running {
            "Pause"
        } else if snapshot.remaining_seconds < snapshot.duration_secs {
            "Resume"
        } else {
            "Start"
        };

        Self {
            mode: snapshot.mode,
            clock: format_clock(snapshot.remaining_seconds),
            label: snapshot.mode.label(),
            title: window_title(snapshot.mode, snapshot.remaining_seconds),
            progress,
            ring_offset: ring_offset(progress),
            button_label,
            session_number: snapshot.session_number,
            settings_locked: snapshot.running,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(remaining: u64, running: bool) -> Snapshot {
        Snapshot {
            mode: Mode::Work,
            remaining_seconds: remaining,
            running,
            session_number: 1,
            duration_secs: 1500,
            completed_work_intervals: 0,
        }
    }

    #[test]
    fn clock_is_zero_padded() {
        assert_eq!(format_clock(1500), "25:00");
        assert_eq!(format_clock(300), "05:00");
        assert_eq!(format_clock(61), "01:01");
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(120 * 60), "120:00");
    }

    #[test]
    fn title_icon_follows_mode() {
        assert_eq!(window_title(Mode::Work, 1499), "🍅 24:59 - Pomodoro Timer");
        assert_eq!(window_title(Mode::LongBreak, 900), "☕ 15:00 - Pomodoro Timer");
    }

    #[test]
    fn ring_runs_from_full_to_empty() {
        assert_eq!(ring_offset(0.0), ring_circumference());
        assert_eq!(ring_offset(1.0), 0.0);
        assert_eq!(progress(750, 1500), 0.5);
        // Deferred settings can leave remaining above the new duration.
        assert_eq!(progress(2000, 1500), 0.0);
    }

    #[test]
    fn button_label_tracks_state() {
        assert_eq!(View::from_snapshot(&snapshot(1500, false)).button_label, "Start");
        assert_eq!(View::from_snapshot(&snapshot(1400, true)).button_label, "Pause");
        assert_eq!(View::from_snapshot(&snapshot(1400, false)).button_label, "Resume");
    }

    #[test]
    fn settings_locked_only_while_running() {
        assert!(View::from_snapshot(&snapshot(1400, true)).settings_locked);
        assert!(!View::from_snapshot(&snapshot(1400, false)).settings_locked);
    }
}
