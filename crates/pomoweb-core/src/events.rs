use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Mode;

pub const WORK_COMPLETE_MESSAGE: &str = "Work session complete! Time for a break.";
pub const BREAK_COMPLETE_MESSAGE: &str = "Break is over! Time to get back to work.";
pub const DISCARDED_MESSAGE: &str = "Interval discarded.";

/// What the presenter needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub mode: Mode,
    pub remaining_seconds: u64,
    pub running: bool,
    pub session_number: u32,
    /// Full length of the current mode under the current settings.
    pub duration_secs: u64,
    pub completed_work_intervals: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationKind {
    WorkComplete,
    BreakComplete,
    Discarded,
}

impl NotificationKind {
    pub fn default_message(self) -> &'static str {
        match self {
            NotificationKind::WorkComplete => WORK_COMPLETE_MESSAGE,
            NotificationKind::BreakComplete => BREAK_COMPLETE_MESSAGE,
            NotificationKind::Discarded => DISCARDED_MESSAGE,
        }
    }
}

/// Every state change in the engine produces an Event.
/// Presenters react to `StateUpdated`; notifiers react to `Notification`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    StateUpdated {
        snapshot: Snapshot,
        at: DateTime<Utc>,
    },
    Notification {
        kind: NotificationKind,
        /// Mode of the interval that finished or was discarded.
        mode: Mode,
        message: Option<String>,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn notification(kind: NotificationKind, mode: Mode, at: DateTime<Utc>) -> Self {
        Event::Notification {
            kind,
            mode,
            message: Some(kind.default_message().to_string()),
            at,
        }
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            Event::StateUpdated { snapshot, .. } => Some(snapshot),
            Event::Notification { .. } => None,
        }
    }

    pub fn notification_kind(&self) -> Option<NotificationKind> {
        match self {
            Event::Notification { kind, .. } => Some(*kind),
            Event::StateUpdated { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_is_tagged_by_type() {
        let event = Event::notification(NotificationKind::WorkComplete, Mode::Work, Utc::now());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "notification");
        assert_eq!(json["kind"], "workComplete");
        assert_eq!(json["message"], WORK_COMPLETE_MESSAGE);
    }

    #[test]
    fn snapshot_uses_camel_case_fields() {
        let snapshot = Snapshot {
            mode: Mode::Work,
            remaining_seconds: 1500,
            running: false,
            session_number: 1,
            duration_secs: 1500,
            completed_work_intervals: 0,
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["remainingSeconds"], 1500);
        assert_eq!(json["sessionNumber"], 1);
        assert_eq!(json["mode"], "work");
    }
}
