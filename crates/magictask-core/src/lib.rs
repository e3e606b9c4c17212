//! # MagicTask Core Library
//!
//! Core logic for the MagicTask personal task tracker: the work/break
//! interval timer, its synchronization with the persisted app-state
//! document, and the focus-mode cursor that walks through active tasks.
//! The `magictask` CLI is a thin front end over this crate.
//!
//! ## Architecture
//!
//! - **Timer**: [`IntervalTimer`] is a pure state machine; [`TimerRunner`]
//!   drives it once per second on tokio
//! - **Events**: timers publish [`TimerEvent`]s to any number of observers
//! - **Bridge**: [`TimerStateBridge`] persists timer transitions and
//!   rebuilds timers from the stored document
//! - **Focus**: [`FocusCursor`] picks the current task and advances on completion
//! - **Storage**: SQLite-backed [`TaskStore`] and [`AppStateStore`], and a
//!   TOML [`Config`]

pub mod bridge;
pub mod error;
pub mod events;
pub mod focus;
pub mod storage;
pub mod task;
pub mod timer;

pub use bridge::{Notifier, RestoredTimer, StateWriter, TimerStateBridge};
pub use error::{ConfigError, CoreError, StoreError, ValidationError};
pub use events::{EventBus, TimerEvent, TimerObserver};
pub use focus::{enter_focus_mode, exit_focus_mode, Focus, FocusCursor};
pub use storage::{AppStatePatch, AppStateStore, Config, Database, PersistedAppState, TaskStore};
pub use task::{Effort, NewTask, Subtask, SubtaskPatch, Task, TaskPatch, TaskView, Urgency};
pub use timer::{
    ConfigPatch, IntervalTimer, Remaining, SessionKind, TimerConfig, TimerRunner, TimerSnapshot,
    TimerState,
};
