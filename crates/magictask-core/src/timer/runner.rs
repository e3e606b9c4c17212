//! One-tick-per-second driver for an [`IntervalTimer`].
//!
//! The runner owns the timer behind a single mutex; commands and ticks both
//! take that lock, so a tick can never interleave with `pause()` or
//! `skip_to()`. Each countdown is a tokio task guarded by its own
//! cancellation token. Stopping the countdown cancels the token under the
//! lock, so a tick already waiting on the lock sees the cancellation and
//! does nothing.
//!
//! ```ignore
//! let mut runner = TimerRunner::new(IntervalTimer::new(config, cycles))?;
//! runner.subscribe(bridge)?;
//! runner.start()?;
//! // ...
//! runner.shutdown();
//! ```

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::config::{ConfigPatch, SessionKind};
use super::engine::{IntervalTimer, TimerSnapshot};
use crate::error::{CoreError, Result};
use crate::events::TimerObserver;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Owns an [`IntervalTimer`] and the task that ticks it.
///
/// Dropping the runner shuts it down: pending ticks are cancelled and a
/// running timer is paused.
pub struct TimerRunner {
    timer: Arc<Mutex<IntervalTimer>>,
    runtime: Handle,
    period: Duration,
    countdown: Option<CancellationToken>,
    shutdown: CancellationToken,
}

impl TimerRunner {
    /// Wrap `timer`. Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// Returns [`CoreError::NoRuntime`] outside a runtime.
    pub fn new(timer: IntervalTimer) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| CoreError::NoRuntime)?;
        Ok(Self {
            timer: Arc::new(Mutex::new(timer)),
            runtime,
            period: TICK_PERIOD,
            countdown: None,
            shutdown: CancellationToken::new(),
        })
    }

    /// Override the tick period.
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Shared handle to the timer, for read access from other tasks.
    pub fn timer(&self) -> Arc<Mutex<IntervalTimer>> {
        Arc::clone(&self.timer)
    }

    pub fn subscribe(&self, observer: impl TimerObserver + 'static) -> Result<()> {
        lock(&self.timer)?.subscribe(observer);
        Ok(())
    }

    pub fn snapshot(&self) -> Result<TimerSnapshot> {
        Ok(lock(&self.timer)?.snapshot())
    }

    /// Whether a countdown task is currently live.
    pub fn is_counting_down(&self) -> bool {
        self.countdown
            .as_ref()
            .is_some_and(|token| !token.is_cancelled())
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// # Errors
    /// Returns [`CoreError::RunnerShutDown`] once the runner has been shut
    /// down; the timer is left untouched.
    pub fn start(&mut self) -> Result<()> {
        if self.shutdown.is_cancelled() {
            return Err(CoreError::RunnerShutDown);
        }
        let mut timer = lock(&self.timer)?;
        timer.start();
        if !timer.is_running() || self.is_counting_down() {
            return Ok(());
        }
        let token = self.shutdown.child_token();
        self.countdown = Some(token.clone());
        drop(timer);

        debug!(period_ms = self.period.as_millis() as u64, "countdown started");
        self.runtime
            .spawn(drive(Arc::clone(&self.timer), token, self.period));
        Ok(())
    }

    pub fn pause(&mut self) -> Result<()> {
        let mut timer = lock(&self.timer)?;
        timer.pause();
        stop_countdown(&mut self.countdown);
        Ok(())
    }

    pub fn skip_to(&mut self, kind: SessionKind) -> Result<()> {
        let mut timer = lock(&self.timer)?;
        stop_countdown(&mut self.countdown);
        timer.skip_to(kind);
        Ok(())
    }

    /// # Errors
    /// Fails if the merged configuration is invalid; the timer keeps running.
    pub fn reconfigure(&mut self, patch: &ConfigPatch) -> Result<()> {
        let mut timer = lock(&self.timer)?;
        timer.reconfigure(patch)?;
        stop_countdown(&mut self.countdown);
        Ok(())
    }

    pub fn reset(&mut self) -> Result<()> {
        let mut timer = lock(&self.timer)?;
        stop_countdown(&mut self.countdown);
        timer.reset();
        Ok(())
    }

    /// Cancel any pending tick and pause a running timer. Later calls to
    /// [`start`](Self::start) fail.
    pub fn shutdown(&mut self) {
        let timer = lock(&self.timer);
        self.shutdown.cancel();
        self.countdown = None;
        if let Ok(mut timer) = timer {
            timer.pause();
        }
    }
}

fn stop_countdown(countdown: &mut Option<CancellationToken>) {
    if let Some(token) = countdown.take() {
        token.cancel();
    }
}

impl Drop for TimerRunner {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn drive(timer: Arc<Mutex<IntervalTimer>>, token: CancellationToken, period: Duration) {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = interval.tick() => {
                let Ok(mut guard) = lock(&timer) else {
                    warn!("timer lock poisoned, stopping countdown");
                    break;
                };
                if token.is_cancelled() {
                    break;
                }
                guard.tick();
                if !guard.is_running() {
                    // Session finished; mark this countdown dead while still locked.
                    token.cancel();
                    break;
                }
            }
        }
    }
    debug!("countdown stopped");
}

fn lock(timer: &Mutex<IntervalTimer>) -> Result<MutexGuard<'_, IntervalTimer>> {
    timer.lock().map_err(|_| CoreError::LockPoisoned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{Remaining, TimerConfig, TimerState};

    fn short_config() -> TimerConfig {
        TimerConfig::new(1, 1, 2, 4, true).unwrap()
    }

    async fn sleep_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[test]
    fn new_outside_runtime_fails() {
        let result = TimerRunner::new(IntervalTimer::new(TimerConfig::default(), 0));
        assert!(matches!(result, Err(CoreError::NoRuntime)));
    }

    #[tokio::test(start_paused = true)]
    async fn counts_down_once_per_second() {
        let mut runner = TimerRunner::new(IntervalTimer::new(TimerConfig::default(), 0)).unwrap();
        runner.start().unwrap();
        sleep_ms(3_500).await;
        assert_eq!(
            runner.snapshot().unwrap().remaining,
            Remaining { minutes: 24, seconds: 57 }
        );
        assert!(runner.is_counting_down());
    }

    #[tokio::test(start_paused = true)]
    async fn completes_session_and_stops() {
        let mut runner = TimerRunner::new(IntervalTimer::new(short_config(), 0)).unwrap();
        runner.start().unwrap();
        sleep_ms(61_000).await;

        let snap = runner.snapshot().unwrap();
        assert_eq!(snap.state, TimerState::Idle);
        assert_eq!(snap.session, SessionKind::Break);
        assert_eq!(snap.completed_cycles, 1);
        assert!(!runner.is_counting_down());

        runner.start().unwrap();
        sleep_ms(61_000).await;
        let snap = runner.snapshot().unwrap();
        assert_eq!(snap.session, SessionKind::Work);
        assert_eq!(snap.completed_cycles, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_halts_ticks() {
        let mut runner = TimerRunner::new(IntervalTimer::new(TimerConfig::default(), 0)).unwrap();
        runner.start().unwrap();
        sleep_ms(5_500).await;
        runner.pause().unwrap();
        sleep_ms(10_000).await;

        let snap = runner.snapshot().unwrap();
        assert_eq!(snap.state, TimerState::Paused);
        assert_eq!(snap.remaining, Remaining { minutes: 24, seconds: 55 });
    }

    #[tokio::test(start_paused = true)]
    async fn quick_pause_resume_does_not_double_tick() {
        let mut runner = TimerRunner::new(IntervalTimer::new(TimerConfig::default(), 0)).unwrap();
        runner.start().unwrap();
        sleep_ms(1_500).await;
        runner.pause().unwrap();
        runner.start().unwrap();
        runner.start().unwrap();
        sleep_ms(1_200).await;
        assert_eq!(
            runner.snapshot().unwrap().remaining,
            Remaining { minutes: 24, seconds: 58 }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn skip_stops_countdown() {
        let mut runner = TimerRunner::new(IntervalTimer::new(TimerConfig::default(), 0)).unwrap();
        runner.start().unwrap();
        sleep_ms(2_500).await;
        runner.skip_to(SessionKind::Break).unwrap();
        sleep_ms(3_000).await;
        let snap = runner.snapshot().unwrap();
        assert_eq!(snap.state, TimerState::Idle);
        assert_eq!(snap.remaining, Remaining::full(5));
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_pending_ticks() {
        let mut runner = TimerRunner::new(IntervalTimer::new(TimerConfig::default(), 0)).unwrap();
        let shared = runner.timer();
        runner.start().unwrap();
        sleep_ms(1_500).await;
        drop(runner);
        sleep_ms(5_000).await;
        let timer = shared.lock().unwrap();
        assert_eq!(timer.remaining(), Remaining { minutes: 24, seconds: 59 });
        assert_eq!(timer.state(), TimerState::Paused);
    }

    #[tokio::test(start_paused = true)]
    async fn start_after_shutdown_is_refused() {
        let mut runner = TimerRunner::new(IntervalTimer::new(TimerConfig::default(), 0)).unwrap();
        runner.shutdown();
        assert!(matches!(runner.start(), Err(CoreError::RunnerShutDown)));
        sleep_ms(5_000).await;

        let snap = runner.snapshot().unwrap();
        assert_eq!(snap.state, TimerState::Idle);
        assert_eq!(snap.remaining, Remaining::full(25));
        assert!(!runner.is_counting_down());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_pauses_running_timer() {
        let mut runner = TimerRunner::new(IntervalTimer::new(TimerConfig::default(), 0)).unwrap();
        runner.start().unwrap();
        sleep_ms(2_500).await;
        runner.shutdown();
        sleep_ms(3_000).await;

        let snap = runner.snapshot().unwrap();
        assert_eq!(snap.state, TimerState::Paused);
        assert_eq!(snap.remaining, Remaining { minutes: 24, seconds: 58 });
        assert!(matches!(runner.start(), Err(CoreError::RunnerShutDown)));
    }
}
