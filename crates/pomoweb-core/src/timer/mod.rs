pub mod display;
mod engine;
mod mode;
mod service;
mod ticker;

pub use engine::{CycleEngine, CycleState, EnginePhase};
pub use mode::{minutes_to_secs, Mode, LONG_BREAK_INTERVAL, MIN_DURATION_SECS};
pub use service::{Command, CycleService, EngineHandle};
pub use ticker::{BackgroundTicker, ManualTicker, Tick, Ticker, TickerBackend, TICK_PERIOD};
