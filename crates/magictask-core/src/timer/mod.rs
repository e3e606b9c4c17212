mod config;
mod engine;
mod runner;

pub use config::{
    ConfigPatch, SessionKind, TimerConfig, DEFAULT_BREAK_MINUTES, DEFAULT_CYCLES_BEFORE_LONG_BREAK,
    DEFAULT_LONG_BREAK_MINUTES, DEFAULT_WORK_MINUTES,
};
pub use engine::{IntervalTimer, Remaining, TimerSnapshot, TimerState};
pub use runner::{TimerRunner, TICK_PERIOD};
