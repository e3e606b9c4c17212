//! Interval timer state machine.
//!
//! The engine has no thread and no clock of its own - whoever drives it
//! calls [`IntervalTimer::tick`] once per second while it is `Running`
//! (see [`TimerRunner`](super::TimerRunner)).
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Paused -> Running -> ... -> (session ends) -> Idle
//! ```
//!
//! Sessions alternate Work/Break. A finished session never starts the next
//! one on its own; the timer waits in `Idle` for an explicit `start()`.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::config::{ConfigPatch, SessionKind, TimerConfig};
use crate::error::ValidationError;
use crate::events::{EventBus, TimerEvent, TimerObserver};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
}

/// Time left in the current session, kept as a minutes/seconds pair the way
/// it is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Remaining {
    pub minutes: u32,
    pub seconds: u32,
}

impl Remaining {
    pub fn full(minutes: u32) -> Self {
        Self {
            minutes,
            seconds: 0,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.minutes == 0 && self.seconds == 0
    }

    pub fn total_seconds(&self) -> u64 {
        u64::from(self.minutes) * 60 + u64::from(self.seconds)
    }

    /// Count down one second. Returns `true` once 00:00 is reached.
    fn count_down(&mut self) -> bool {
        if self.seconds > 0 {
            self.seconds -= 1;
        } else if self.minutes > 0 {
            self.minutes -= 1;
            self.seconds = 59;
        }
        self.is_zero()
    }
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes, self.seconds)
    }
}

/// Point-in-time view of the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub session: SessionKind,
    pub remaining: Remaining,
    pub completed_cycles: u32,
}

/// Work/break countdown with cycle counting and long-break promotion.
#[derive(Debug)]
pub struct IntervalTimer {
    config: TimerConfig,
    state: TimerState,
    session: SessionKind,
    remaining: Remaining,
    completed_cycles: u32,
    bus: EventBus,
}

impl IntervalTimer {
    /// Create an idle timer at the start of a work session.
    pub fn new(config: TimerConfig, initial_cycles: u32) -> Self {
        Self {
            config,
            state: TimerState::Idle,
            session: SessionKind::Work,
            remaining: Remaining::full(config.work_minutes),
            completed_cycles: initial_cycles,
            bus: EventBus::new(),
        }
    }

    /// Register an observer.
    ///
    /// The observer immediately receives a `StateChanged` and a `Tick`
    /// describing the current snapshot, so it never has to wait for the
    /// first tick to render.
    pub fn subscribe(&mut self, observer: impl TimerObserver + 'static) {
        let snapshot = self.snapshot();
        observer.on_event(&TimerEvent::StateChanged { snapshot });
        observer.on_event(&TimerEvent::Tick { snapshot });
        self.bus.subscribe(Box::new(observer));
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn session(&self) -> SessionKind {
        self.session
    }

    pub fn remaining(&self) -> Remaining {
        self.remaining
    }

    pub fn completed_cycles(&self) -> u32 {
        self.completed_cycles
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            state: self.state,
            session: self.session,
            remaining: self.remaining,
            completed_cycles: self.completed_cycles,
        }
    }

    /// Full length of the current session under the current config.
    pub fn session_duration(&self) -> Remaining {
        Remaining::full(self.session_minutes(self.session))
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start or resume the countdown. No-op while running or disabled.
    pub fn start(&mut self) {
        match self.state {
            TimerState::Running => return,
            TimerState::Idle | TimerState::Paused => {}
        }
        if !self.config.enabled {
            tracing::debug!("timer disabled, ignoring start");
            return;
        }
        // A session that has not begun picks up the latest durations.
        if self.state == TimerState::Idle || self.remaining == self.session_duration() {
            self.remaining = self.session_duration();
        }
        self.state = TimerState::Running;
        self.emit_state_changed();
    }

    /// Freeze the countdown. No-op unless running.
    pub fn pause(&mut self) {
        if self.state != TimerState::Running {
            return;
        }
        self.state = TimerState::Paused;
        self.emit_state_changed();
    }

    /// Abandon the current session and wait at the start of a `kind` session.
    /// The cycle counter is left alone.
    pub fn skip_to(&mut self, kind: SessionKind) {
        self.session = kind;
        self.remaining = Remaining::full(self.session_minutes(kind));
        self.state = TimerState::Idle;
        self.emit_state_changed();
        self.emit_tick();
    }

    /// Merge `patch` into the configuration.
    ///
    /// A running countdown is paused first; it is never stretched or shrunk
    /// mid-flight. The current session is then rewound to its full new length.
    ///
    /// # Errors
    /// Returns an error, leaving the timer untouched, if the merged
    /// configuration is invalid.
    pub fn reconfigure(&mut self, patch: &ConfigPatch) -> Result<(), ValidationError> {
        let merged = self.config.merged(patch);
        merged.validate()?;

        self.pause();
        self.config = merged;
        // Idle or Paused from here on.
        self.remaining = self.session_duration();
        self.emit_tick();
        Ok(())
    }

    /// Back to an idle work session at full length. Keeps the cycle counter.
    pub fn reset(&mut self) {
        self.state = TimerState::Idle;
        self.session = SessionKind::Work;
        self.remaining = Remaining::full(self.config.work_minutes);
        self.emit_state_changed();
        self.emit_tick();
    }

    /// Advance the countdown by one second. Does nothing unless running.
    pub fn tick(&mut self) {
        if self.state != TimerState::Running {
            return;
        }
        if !self.remaining.count_down() {
            self.emit_tick();
            return;
        }

        let finished = self.session;
        if finished == SessionKind::Work {
            self.completed_cycles = self.completed_cycles.saturating_add(1);
        }
        self.session = finished.other();
        self.remaining = Remaining::full(self.session_minutes(self.session));
        self.state = TimerState::Idle;
        self.bus.emit(&TimerEvent::CycleComplete {
            finished,
            snapshot: self.snapshot(),
        });
        self.emit_state_changed();
        self.emit_tick();
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn session_minutes(&self, kind: SessionKind) -> u32 {
        self.config.session_minutes(kind, self.completed_cycles)
    }

    fn emit_state_changed(&self) {
        self.bus.emit(&TimerEvent::StateChanged {
            snapshot: self.snapshot(),
        });
    }

    fn emit_tick(&self) {
        self.bus.emit(&TimerEvent::Tick {
            snapshot: self.snapshot(),
        });
    }
}
