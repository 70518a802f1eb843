use std::io::{BufRead, IsTerminal};
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use pomoweb_core::{
    CycleService, EngineHandle, Mode, NotificationDispatcher, SettingsStore, TickerBackend,
};
use tokio::sync::mpsc;

use crate::notifiers::{BellNotifier, DesktopNotifier};
use crate::presenter::TerminalPresenter;

const HELP: &str = "keys: [enter]/s start-pause  p pause  r reset  1 work  2 short break  3 long break  q quit";

/// How often the settings file is re-read for changes made elsewhere.
const SETTINGS_POLL: Duration = Duration::from_secs(1);

#[derive(Args)]
pub struct RunArgs {
    /// Mode to open in
    #[arg(long, default_value = "work")]
    mode: Mode,
    /// Start the countdown immediately
    #[arg(long)]
    start: bool,
    /// Do not show desktop notification banners
    #[arg(long)]
    no_desktop: bool,
    /// Tick from the async runtime instead of a dedicated thread
    #[arg(long)]
    in_process_ticker: bool,
}

/// One line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Toggle,
    Start,
    Pause,
    Reset,
    Select(Mode),
    Help,
    Quit,
}

pub fn parse_input(line: &str) -> Option<Input> {
    let input = match line.trim().to_ascii_lowercase().as_str() {
        "" | "s" | "space" | "toggle" => Input::Toggle,
        "start" => Input::Start,
        "p" | "pause" | "stop" => Input::Pause,
        "r" | "reset" => Input::Reset,
        "1" => Input::Select(Mode::Work),
        "2" => Input::Select(Mode::ShortBreak),
        "3" => Input::Select(Mode::LongBreak),
        "h" | "?" | "help" => Input::Help,
        "q" | "quit" | "exit" => Input::Quit,
        _ => return None,
    };
    Some(input)
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(session(args));
    runtime.shutdown_timeout(Duration::from_millis(500));
    result
}

async fn session(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(SettingsStore::open()?);
    let backend = if args.in_process_ticker {
        TickerBackend::InProcess
    } else {
        TickerBackend::Worker
    };

    let (mut service, handle) = CycleService::new(store.subscribe(), backend);
    if args.mode != Mode::Work {
        service.engine_mut().select_mode(args.mode);
    }
    let initial = service.engine().snapshot();

    let mut dispatcher = NotificationDispatcher::new(store.subscribe())
        .with_notifier(BellNotifier::new(std::io::stderr()));
    if !args.no_desktop {
        dispatcher = dispatcher.with_notifier(DesktopNotifier);
    }

    let stdout = std::io::stdout();
    let set_title = stdout.is_terminal();
    let mut presenter = TerminalPresenter::new(stdout, set_title);
    eprintln!("{HELP}");
    presenter.render(&initial)?;

    let presenter_events = handle.subscribe();
    let dispatcher_events = handle.subscribe();
    let engine_task = tokio::spawn(service.run());
    let presenter_task = tokio::spawn(presenter.run(presenter_events));
    tokio::spawn(dispatcher.run(dispatcher_events));

    let poll_store = Arc::clone(&store);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SETTINGS_POLL);
        loop {
            interval.tick().await;
            poll_store.reload();
        }
    });

    if args.start {
        handle.start()?;
    }

    let mut lines = spawn_stdin_reader();
    while let Some(line) = lines.recv().await {
        match parse_input(&line) {
            Some(Input::Quit) => break,
            Some(Input::Help) => eprintln!("{HELP}"),
            Some(input) => apply(&handle, input)?,
            None => eprintln!("unknown command '{}' ({HELP})", line.trim()),
        }
    }

    handle.shutdown()?;
    engine_task.await?;
    // The engine is gone; dropping the last handle closes the event channel
    // and lets the presenter draw what is left.
    drop(handle);
    let mut presenter = presenter_task.await?;
    presenter.finish()?;
    Ok(())
}

fn apply(handle: &EngineHandle, input: Input) -> pomoweb_core::error::Result<()> {
    match input {
        Input::Toggle => handle.toggle(),
        Input::Start => handle.start(),
        Input::Pause => handle.pause(),
        Input::Reset => handle.reset(),
        Input::Select(mode) => handle.select_mode(mode),
        Input::Help | Input::Quit => Ok(()),
    }
}

/// Blocking stdin reads live on their own thread so the runtime can shut
/// down without waiting on the terminal.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    let spawned = std::thread::Builder::new()
        .name("pomoweb-stdin".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
    if let Err(e) = spawned {
        tracing::error!(error = %e, "could not read from stdin");
    }
    rx
}
