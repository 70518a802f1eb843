use clap::Args;
use pomoweb_core::timer::display::View;
use pomoweb_core::{CycleEngine, ManualTicker, Mode, SettingsStore};

#[derive(Args)]
pub struct StatusArgs {
    /// Mode to describe
    #[arg(long, default_value = "work")]
    mode: Mode,
    /// Include the rendered view (clock text, labels, progress)
    #[arg(long)]
    view: bool,
}

/// Timer state is never persisted, so this is always the state a fresh
/// session would open with.
pub fn run(args: StatusArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = SettingsStore::open()?;
    let mut engine = CycleEngine::new(store.current(), ManualTicker::new());
    if args.mode != Mode::Work {
        engine.select_mode(args.mode);
    }
    let snapshot = engine.snapshot();

    if args.view {
        let output = serde_json::json!({
            "snapshot": snapshot,
            "view": View::from_snapshot(&snapshot),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }
    Ok(())
}
