//! Mirrors timer transitions into the persisted app-state document and
//! rebuilds a timer from it at startup.
//!
//! Observers run under the timer lock, so [`TimerStateBridge`] never touches
//! the store itself. It turns each event into an [`AppStatePatch`] and queues
//! it; a [`StateWriter`] task applies the queue in order. A failed write is
//! logged and dropped, and the in-memory timer stays authoritative until the
//! next write succeeds.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::events::{TimerEvent, TimerObserver};
use crate::storage::{AppStatePatch, AppStateStore, PersistedAppState, PomodoroPatch};
use crate::timer::{
    ConfigPatch, IntervalTimer, SessionKind, TimerConfig, TimerState, DEFAULT_BREAK_MINUTES,
    DEFAULT_CYCLES_BEFORE_LONG_BREAK, DEFAULT_LONG_BREAK_MINUTES, DEFAULT_WORK_MINUTES,
};

/// Construction parameters recovered from the persisted document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoredTimer {
    pub config: TimerConfig,
    pub completed_cycles: u32,
}

impl RestoredTimer {
    pub fn into_timer(self) -> IntervalTimer {
        IntervalTimer::new(self.config, self.completed_cycles)
    }
}

/// Build a timer configuration from the `pomodoro` sub-document.
///
/// Missing and zero values fall back to the defaults; this never fails.
pub fn load_config(state: &PersistedAppState) -> RestoredTimer {
    let p = &state.pomodoro;
    let positive = |value: Option<u32>, default: u32| value.filter(|v| *v > 0).unwrap_or(default);
    RestoredTimer {
        config: TimerConfig {
            work_minutes: positive(p.work_minutes, DEFAULT_WORK_MINUTES),
            break_minutes: positive(p.break_minutes, DEFAULT_BREAK_MINUTES),
            long_break_minutes: positive(p.long_break_minutes, DEFAULT_LONG_BREAK_MINUTES),
            cycles_before_long_break: positive(
                p.cycles_before_long_break,
                DEFAULT_CYCLES_BEFORE_LONG_BREAK,
            ),
            enabled: p.enabled.unwrap_or(true),
        },
        completed_cycles: p.cycles_completed_today.unwrap_or(0),
    }
}

/// Read the store and recover the timer parameters.
///
/// # Errors
/// A read failure is returned as-is; callers must not start a timer without
/// a configuration.
pub fn restore(store: &dyn AppStateStore) -> Result<RestoredTimer, StoreError> {
    let state = store.read()?;
    let restored = load_config(&state);
    info!(
        work = restored.config.work_minutes,
        cycles = restored.completed_cycles,
        enabled = restored.config.enabled,
        "restored timer from app state"
    );
    Ok(restored)
}

/// The partial document a timer event should persist, if any.
///
/// Ticks of a running timer are not persisted.
pub fn patch_for(event: &TimerEvent) -> Option<AppStatePatch> {
    let snapshot = event.snapshot();
    let current = PomodoroPatch {
        current_minutes: Some(snapshot.remaining.minutes),
        current_seconds: Some(snapshot.remaining.seconds),
        ..PomodoroPatch::default()
    };
    let pomodoro = match event {
        TimerEvent::Tick { .. } if snapshot.state == TimerState::Running => return None,
        TimerEvent::Tick { .. } => current,
        TimerEvent::StateChanged { .. } => PomodoroPatch {
            active: Some(snapshot.state == TimerState::Running),
            on_break: Some(
                snapshot.state != TimerState::Idle && snapshot.session == SessionKind::Break,
            ),
            ..current
        },
        TimerEvent::CycleComplete { finished, .. } => PomodoroPatch {
            cycles_completed_today: Some(snapshot.completed_cycles),
            active: Some(false),
            on_break: Some(*finished == SessionKind::Work),
            ..current
        },
    };
    Some(AppStatePatch::new().pomodoro(pomodoro))
}

/// The configuration fields of `patch` as a document patch.
pub fn patch_for_config(patch: &ConfigPatch) -> AppStatePatch {
    AppStatePatch::new().pomodoro(PomodoroPatch {
        enabled: patch.enabled,
        work_minutes: patch.work_minutes,
        break_minutes: patch.break_minutes,
        long_break_minutes: patch.long_break_minutes,
        cycles_before_long_break: patch.cycles_before_long_break,
        ..PomodoroPatch::default()
    })
}

/// Message shown when a `finished` session runs out.
pub fn completion_message(finished: SessionKind) -> &'static str {
    match finished {
        SessionKind::Work => "Work session complete! Time for a break.",
        SessionKind::Break => "Break over! Time for work.",
    }
}

/// Presents a message to the user. Called at most once per completed session.
pub trait Notifier: Send {
    fn notify(&self, message: &str);
}

impl<F> Notifier for F
where
    F: Fn(&str) + Send,
{
    fn notify(&self, message: &str) {
        self(message)
    }
}

/// Timer observer that queues persistence and raises completion notices.
pub struct TimerStateBridge {
    tx: UnboundedSender<AppStatePatch>,
    notifier: Option<Box<dyn Notifier>>,
}

impl TimerStateBridge {
    /// A bridge and the writer that drains its queue.
    pub fn new() -> (Self, StateWriter) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self { tx, notifier: None },
            StateWriter { rx },
        )
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Some(Box::new(notifier));
        self
    }
}

impl TimerObserver for TimerStateBridge {
    fn on_event(&self, event: &TimerEvent) {
        if let Some(patch) = patch_for(event) {
            if self.tx.send(patch).is_err() {
                debug!("state writer gone; dropping app-state patch");
            }
        }
        if let TimerEvent::CycleComplete { finished, .. } = event {
            if let Some(notifier) = &self.notifier {
                notifier.notify(completion_message(*finished));
            }
        }
    }
}

/// Applies queued patches to the store, in order, until every bridge is dropped.
pub struct StateWriter {
    rx: UnboundedReceiver<AppStatePatch>,
}

impl StateWriter {
    /// Run until the queue closes. Returns the number of successful writes.
    pub async fn run(mut self, store: Arc<dyn AppStateStore>) -> usize {
        let mut written = 0;
        while let Some(patch) = self.rx.recv().await {
            let store = Arc::clone(&store);
            match tokio::task::spawn_blocking(move || store.merge(&patch)).await {
                Ok(Ok(_)) => written += 1,
                Ok(Err(e)) => warn!(error = %e, "failed to persist timer state"),
                Err(e) => warn!(error = %e, "app-state write task failed"),
            }
        }
        debug!(written, "state writer finished");
        written
    }
}
