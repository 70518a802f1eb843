mod settings;

pub use settings::{Settings, SettingsStore, SETTINGS_FILE};

use std::path::PathBuf;

use crate::error::SettingsError;

/// Returns the directory settings are persisted in.
///
/// `POMOWEB_DATA_DIR` wins outright. Otherwise `~/.config/pomoweb[-dev]/`,
/// where `POMOWEB_ENV=dev` selects the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, SettingsError> {
    let dir = match std::env::var_os("POMOWEB_DATA_DIR") {
        Some(explicit) if !explicit.is_empty() => PathBuf::from(explicit),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("POMOWEB_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("pomoweb-dev")
            } else {
                base_dir.join("pomoweb")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| SettingsError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
