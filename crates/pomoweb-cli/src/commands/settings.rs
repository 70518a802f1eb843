use clap::Subcommand;
use pomoweb_core::SettingsStore;

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Get a settings value
    Get {
        /// Settings key (e.g. "pomodoro", "autoStartBreaks")
        key: String,
    },
    /// Set a settings value
    Set {
        /// Settings key
        key: String,
        /// New value
        value: String,
    },
    /// List all settings as JSON
    List,
    /// Reset settings to defaults
    Reset,
    /// Print the settings file location
    Path,
}

pub fn run(action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = SettingsStore::open()?;

    match action {
        SettingsAction::Get { key } => match store.current().get(&key) {
            Some(value) => println!("{value}"),
            None => return Err(format!("unknown key: {key}").into()),
        },
        SettingsAction::Set { key, value } => {
            store.set(&key, &value)?;
            println!("ok");
        }
        SettingsAction::List => {
            let json = serde_json::to_string_pretty(&store.current())?;
            println!("{json}");
        }
        SettingsAction::Reset => {
            store.reset()?;
            println!("settings reset to defaults");
        }
        SettingsAction::Path => {
            println!("{}", store.path().display());
        }
    }
    Ok(())
}
