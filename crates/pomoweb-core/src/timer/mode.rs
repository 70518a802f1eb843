use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Every 4th completed work interval is followed by a long break.
pub const LONG_BREAK_INTERVAL: u32 = 4;

/// Shortest interval the engine will ever arm, whatever the settings say.
pub const MIN_DURATION_SECS: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    #[serde(alias = "pomodoro")]
    Work,
    ShortBreak,
    LongBreak,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Work, Mode::ShortBreak, Mode::LongBreak];

    pub fn is_break(self) -> bool {
        !matches!(self, Mode::Work)
    }

    /// Label shown above the countdown.
    pub fn label(self) -> &'static str {
        match self {
            Mode::Work => "Focus Time",
            Mode::ShortBreak => "Short Break",
            Mode::LongBreak => "Long Break",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Work => "work",
            Mode::ShortBreak => "short-break",
            Mode::LongBreak => "long-break",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "work" | "pomodoro" | "focus" => Ok(Mode::Work),
            "short-break" | "short" | "shortbreak" => Ok(Mode::ShortBreak),
            "long-break" | "long" | "longbreak" => Ok(Mode::LongBreak),
            other => Err(format!(
                "unknown mode '{other}' (expected work, short-break or long-break)"
            )),
        }
    }
}

/// Convert configured minutes to an interval length in seconds.
///
/// Zero and negative values clamp to [`MIN_DURATION_SECS`] so a bad setting
/// can never produce a zero-length interval that completes in a tight loop.
/// Uses saturating arithmetic for absurdly large values.
pub fn minutes_to_secs(minutes: i64) -> u64 {
    if minutes <= 0 {
        return MIN_DURATION_SECS;
    }
    (minutes as u64).saturating_mul(60).max(MIN_DURATION_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ui_and_cli_spellings() {
        assert_eq!("pomodoro".parse::<Mode>().unwrap(), Mode::Work);
        assert_eq!("Short-Break".parse::<Mode>().unwrap(), Mode::ShortBreak);
        assert_eq!("long".parse::<Mode>().unwrap(), Mode::LongBreak);
        assert!("lunch".parse::<Mode>().is_err());
    }

    #[test]
    fn serde_uses_kebab_case() {
        assert_eq!(
            serde_json::to_string(&Mode::ShortBreak).unwrap(),
            "\"short-break\""
        );
        let m: Mode = serde_json::from_str("\"pomodoro\"").unwrap();
        assert_eq!(m, Mode::Work);
    }

    #[test]
    fn minutes_clamp_to_one_second() {
        assert_eq!(minutes_to_secs(25), 1500);
        assert_eq!(minutes_to_secs(0), 1);
        assert_eq!(minutes_to_secs(-3), 1);
        assert_eq!(minutes_to_secs(i64::MAX), u64::MAX);
    }

    #[test]
    fn labels_match_mode() {
        assert_eq!(Mode::Work.label(), "Focus Time");
        assert!(Mode::LongBreak.is_break());
        assert!(!Mode::Work.is_break());
    }
}
