//! JSON-backed user settings.
//!
//! The persisted record is the same shape the web front end kept under its
//! `pomodoroSettings` key:
//!
//! ```json
//! { "pomodoro": 25, "shortBreak": 5, "longBreak": 15,
//!   "autoStartBreaks": false, "autoStartPomodoros": false, "soundEnabled": true }
//! ```
//!
//! Stored at `<data_dir>/settings.json`. Missing fields take their default;
//! an unreadable or unparseable file yields the default record.

use std::fmt::Display;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use super::data_dir;
use crate::error::SettingsError;
use crate::timer::{minutes_to_secs, Mode};

pub const SETTINGS_FILE: &str = "settings.json";

/// Immutable snapshot of the user's preferences.
///
/// Minute fields are signed on purpose: a hand-edited file may hold `0` or a
/// negative number, which [`Settings::duration_for`] clamps instead of rejecting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_pomodoro")]
    pub pomodoro: i64,
    #[serde(default = "default_short_break")]
    pub short_break: i64,
    #[serde(default = "default_long_break")]
    pub long_break: i64,
    #[serde(default)]
    pub auto_start_breaks: bool,
    #[serde(default)]
    pub auto_start_pomodoros: bool,
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
}

fn default_pomodoro() -> i64 {
    25
}
fn default_short_break() -> i64 {
    5
}
fn default_long_break() -> i64 {
    15
}
fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pomodoro: default_pomodoro(),
            short_break: default_short_break(),
            long_break: default_long_break(),
            auto_start_breaks: false,
            auto_start_pomodoros: false,
            sound_enabled: true,
        }
    }
}

impl Settings {
    /// Configured minutes for `mode`.
    pub fn minutes_for(&self, mode: Mode) -> i64 {
        match mode {
            Mode::Work => self.pomodoro,
            Mode::ShortBreak => self.short_break,
            Mode::LongBreak => self.long_break,
        }
    }

    /// Interval length in seconds for `mode`, never less than one second.
    pub fn duration_for(&self, mode: Mode) -> u64 {
        minutes_to_secs(self.minutes_for(mode))
    }

    /// Whether finishing an interval of `mode` should arm the next one.
    pub fn auto_start_after(&self, mode: Mode) -> bool {
        match mode {
            Mode::Work => self.auto_start_breaks,
            Mode::ShortBreak | Mode::LongBreak => self.auto_start_pomodoros,
        }
    }

    /// Parse a persisted record.
    ///
    /// A field that is missing or has the wrong type (`2.5`, `null`, a
    /// string) takes its default; the other fields are kept.
    ///
    /// # Errors
    /// Returns [`SettingsError::ParseFailed`] when the text is not a JSON
    /// object.
    pub fn from_json(content: &str) -> Result<Self, SettingsError> {
        let value: serde_json::Value =
            serde_json::from_str(content).map_err(|e| SettingsError::ParseFailed(e.to_string()))?;
        let serde_json::Value::Object(fields) = value else {
            return Err(SettingsError::ParseFailed(
                "settings record is not a JSON object".into(),
            ));
        };

        let defaults = Self::default();
        Ok(Self {
            pomodoro: field_or(&fields, "pomodoro", defaults.pomodoro),
            short_break: field_or(&fields, "shortBreak", defaults.short_break),
            long_break: field_or(&fields, "longBreak", defaults.long_break),
            auto_start_breaks: field_or(&fields, "autoStartBreaks", defaults.auto_start_breaks),
            auto_start_pomodoros: field_or(
                &fields,
                "autoStartPomodoros",
                defaults.auto_start_pomodoros,
            ),
            sound_enabled: field_or(&fields, "soundEnabled", defaults.sound_enabled),
        })
    }

    /// Parse a persisted record, substituting defaults when it is malformed.
    pub fn from_json_or_default(content: &str) -> Self {
        match Self::from_json(content) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(error = %e, "malformed settings record, using defaults");
                Self::default()
            }
        }
    }

    /// Get a field as a string by its persisted key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        json.get(key).map(|v| v.to_string())
    }

    /// Return a copy with `key` set to `value`, parsed according to the
    /// field's type.
    ///
    /// # Errors
    /// Returns an error if the key is unknown or the value does not parse
    /// as the field's type.
    pub fn with_value(&self, key: &str, value: &str) -> Result<Self, SettingsError> {
        let mut json = serde_json::to_value(self)
            .map_err(|e| SettingsError::ParseFailed(e.to_string()))?;
        let obj = json
            .as_object_mut()
            .ok_or_else(|| SettingsError::ParseFailed("settings is not an object".into()))?;
        let existing = obj
            .get(key)
            .ok_or_else(|| SettingsError::UnknownKey(key.to_string()))?;

        let invalid = |message: String| SettingsError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .trim()
                    .parse::<bool>()
                    .map_err(|_| invalid(format!("expected true or false, got '{value}'")))?,
            ),
            serde_json::Value::Number(_) => serde_json::Value::Number(
                value
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| invalid(format!("expected whole minutes, got '{value}'")))?
                    .into(),
            ),
            _ => return Err(invalid("field cannot be set from the command line".into())),
        };

        obj.insert(key.to_string(), new_value);
        serde_json::from_value(json).map_err(|e| SettingsError::ParseFailed(e.to_string()))
    }
}

/// Typed value of `key`, or `default` when it is absent or mistyped.
fn field_or<T: DeserializeOwned>(
    fields: &serde_json::Map<String, serde_json::Value>,
    key: &str,
    default: T,
) -> T {
    let Some(value) = fields.get(key) else {
        return default;
    };
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring invalid settings field");
            default
        }
    }
}

/// Owner of the persisted settings record.
///
/// The store is the only writer. Every change is broadcast as a complete
/// replacement snapshot on a `watch` channel, so readers never observe a
/// half-applied update.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    tx: watch::Sender<Settings>,
}

impl SettingsStore {
    /// Open the store in the default data directory.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn open() -> Result<Self, SettingsError> {
        Ok(Self::with_path(data_dir()?.join(SETTINGS_FILE)))
    }

    /// Open a store backed by an explicit file, loading it immediately.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let initial = Self::read(&path);
        let (tx, _rx) = watch::channel(initial);
        Self { path, tx }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The latest snapshot.
    pub fn current(&self) -> Settings {
        self.tx.borrow().clone()
    }

    /// Subscribe to replacement snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Settings> {
        self.tx.subscribe()
    }

    /// Persist `settings` and broadcast it to every subscriber.
    ///
    /// The record is written to a temporary file next to the target and
    /// renamed over it, so a concurrent [`reload`](Self::reload) sees either
    /// the old record or the new one, never a partial write.
    ///
    /// # Errors
    /// Returns an error if the record cannot be written. Subscribers are not
    /// notified in that case.
    pub fn save(&self, settings: Settings) -> Result<(), SettingsError> {
        let content =
            serde_json::to_string_pretty(&settings).map_err(|e| self.save_failed(e))?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| self.save_failed(e))?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| self.save_failed(e))?;
        tmp.write_all(content.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| self.save_failed(e))?;
        tmp.persist(&self.path).map_err(|e| self.save_failed(e.error))?;

        tracing::info!(path = %self.path.display(), "settings saved");
        self.tx.send_replace(settings);
        Ok(())
    }

    /// Set one field by key, persist and broadcast. Returns the new snapshot.
    ///
    /// # Errors
    /// Returns an error if the key is unknown, the value does not parse or
    /// the record cannot be written.
    pub fn set(&self, key: &str, value: &str) -> Result<Settings, SettingsError> {
        let updated = self.current().with_value(key, value)?;
        self.save(updated.clone())?;
        Ok(updated)
    }

    /// Restore and persist the default record.
    ///
    /// # Errors
    /// Returns an error if the record cannot be written.
    pub fn reset(&self) -> Result<Settings, SettingsError> {
        let defaults = Settings::default();
        self.save(defaults.clone())?;
        Ok(defaults)
    }

    /// Re-read the file and broadcast only if the record changed on disk.
    ///
    /// A file that cannot be read or parsed leaves the current snapshot in
    /// place. Returns `true` when subscribers were notified.
    pub fn reload(&self) -> bool {
        let fresh = match Self::load(&self.path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(error = %e, "keeping current settings");
                return false;
            }
        };
        self.tx.send_if_modified(|current| {
            if *current == fresh {
                false
            } else {
                tracing::debug!("settings changed on disk");
                *current = fresh;
                true
            }
        })
    }

    fn save_failed(&self, e: impl Display) -> SettingsError {
        SettingsError::SaveFailed {
            path: self.path.clone(),
            message: e.to_string(),
        }
    }

    /// Strict read: a missing file is the default record, anything
    /// unreadable or unparseable is an error.
    fn load(path: &Path) -> Result<Settings, SettingsError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Settings::from_json(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Settings::default()),
            Err(e) => Err(SettingsError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Startup read: falls back to the default record on any failure.
    fn read(path: &Path) -> Settings {
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using default settings");
            Settings::default()
        })
    }
}
