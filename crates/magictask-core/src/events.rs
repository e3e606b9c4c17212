use serde::{Deserialize, Serialize};

use crate::timer::{SessionKind, TimerSnapshot};

/// Every observable change of an [`IntervalTimer`](crate::timer::IntervalTimer)
/// produces one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimerEvent {
    /// Remaining time changed.
    Tick { snapshot: TimerSnapshot },
    /// State or session kind changed.
    StateChanged { snapshot: TimerSnapshot },
    /// A session ran out. `snapshot` is taken after the switch: the timer
    /// is `Idle` at the start of the next session and `completed_cycles`
    /// includes the finished one. A `StateChanged` and a `Tick` with the
    /// same snapshot follow.
    CycleComplete {
        finished: SessionKind,
        snapshot: TimerSnapshot,
    },
}

impl TimerEvent {
    pub fn snapshot(&self) -> &TimerSnapshot {
        match self {
            TimerEvent::Tick { snapshot }
            | TimerEvent::StateChanged { snapshot }
            | TimerEvent::CycleComplete { snapshot, .. } => snapshot,
        }
    }
}

/// Receives timer events synchronously, in emission order.
///
/// Observers run while the timer is borrowed, so they must not call back
/// into it.
pub trait TimerObserver: Send {
    fn on_event(&self, event: &TimerEvent);
}

impl<F> TimerObserver for F
where
    F: Fn(&TimerEvent) + Send,
{
    fn on_event(&self, event: &TimerEvent) {
        self(event)
    }
}

/// Fan-out to any number of observers.
#[derive(Default)]
pub struct EventBus {
    observers: Vec<Box<dyn TimerObserver>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn TimerObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn emit(&self, event: &TimerEvent) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("observers", &self.observers.len())
            .finish()
    }
}
