//! Integration tests for the timer, its runner and the app-state bridge.

use std::sync::Arc;
use std::time::Duration;

use magictask_core::bridge::{self, TimerStateBridge};
use magictask_core::storage::PomodoroPatch;
use magictask_core::{
    AppStatePatch, AppStateStore, ConfigPatch, Database, Remaining, SessionKind, TimerRunner,
    TimerState,
};

fn store_with(pomodoro: PomodoroPatch) -> Arc<Database> {
    let db = Database::open_memory().unwrap();
    db.merge(&AppStatePatch::new().pomodoro(pomodoro)).unwrap();
    Arc::new(db)
}

#[tokio::test]
async fn long_break_after_fourth_cycle_is_persisted() {
    let store = store_with(PomodoroPatch {
        work_minutes: Some(25),
        break_minutes: Some(5),
        long_break_minutes: Some(15),
        cycles_before_long_break: Some(4),
        cycles_completed_today: Some(3),
        ..PomodoroPatch::default()
    });

    let restored = bridge::restore(store.as_ref()).unwrap();
    assert_eq!(restored.completed_cycles, 3);

    let (bridge, writer) = TimerStateBridge::new();
    let mut timer = restored.into_timer();
    timer.subscribe(bridge);
    timer.start();
    for _ in 0..25 * 60 {
        timer.tick();
    }

    assert_eq!(timer.state(), TimerState::Idle);
    assert_eq!(timer.session(), SessionKind::Break);
    assert_eq!(timer.completed_cycles(), 4);
    assert_eq!(timer.remaining(), Remaining { minutes: 15, seconds: 0 });

    drop(timer);
    writer.run(store.clone()).await;

    let state = store.read().unwrap();
    assert_eq!(state.pomodoro.cycles_completed_today, Some(4));
    assert!(!state.pomodoro.active);
    assert_eq!(state.pomodoro.current_minutes, Some(15));
    assert_eq!(state.pomodoro.current_seconds, Some(0));
    // Configuration written before the session is untouched.
    assert_eq!(state.pomodoro.work_minutes, Some(25));
}

#[tokio::test]
async fn merging_active_flag_keeps_daily_cycle_count() {
    let store = store_with(PomodoroPatch {
        cycles_completed_today: Some(7),
        ..PomodoroPatch::default()
    });

    let merged = store
        .merge(&AppStatePatch::new().pomodoro(PomodoroPatch {
            active: Some(true),
            ..PomodoroPatch::default()
        }))
        .unwrap();

    assert!(merged.pomodoro.active);
    assert_eq!(merged.pomodoro.cycles_completed_today, Some(7));
}

#[tokio::test(start_paused = true)]
async fn runner_session_is_mirrored_into_the_store() {
    let store = store_with(PomodoroPatch {
        work_minutes: Some(1),
        break_minutes: Some(5),
        ..PomodoroPatch::default()
    });
    let restored = bridge::restore(store.as_ref()).unwrap();

    let (bridge, writer) = TimerStateBridge::new();
    let writer = tokio::spawn(writer.run(store.clone()));

    let mut runner = TimerRunner::new(restored.into_timer()).unwrap();
    runner.subscribe(bridge).unwrap();
    runner.start().unwrap();

    tokio::time::sleep(Duration::from_secs(61)).await;

    let snapshot = runner.snapshot().unwrap();
    assert_eq!(snapshot.state, TimerState::Idle);
    assert_eq!(snapshot.session, SessionKind::Break);
    assert_eq!(snapshot.completed_cycles, 1);
    assert!(!runner.is_counting_down());

    drop(runner);
    writer.await.unwrap();

    let state = store.read().unwrap();
    assert_eq!(state.pomodoro.cycles_completed_today, Some(1));
    assert!(!state.pomodoro.active);
    assert!(!state.pomodoro.on_break);
    assert_eq!(state.pomodoro.current_minutes, Some(5));
}

#[tokio::test(start_paused = true)]
async fn paused_runner_persists_remaining_time() {
    let store = store_with(PomodoroPatch::default());
    let restored = bridge::restore(store.as_ref()).unwrap();

    let (bridge, writer) = TimerStateBridge::new();
    let writer = tokio::spawn(writer.run(store.clone()));

    let mut runner = TimerRunner::new(restored.into_timer()).unwrap();
    runner.subscribe(bridge).unwrap();
    runner.start().unwrap();
    tokio::time::sleep(Duration::from_millis(10_500)).await;
    runner.pause().unwrap();

    let snapshot = runner.snapshot().unwrap();
    assert_eq!(snapshot.remaining, Remaining { minutes: 24, seconds: 50 });

    drop(runner);
    writer.await.unwrap();

    let state = store.read().unwrap();
    assert!(!state.pomodoro.active);
    assert_eq!(state.pomodoro.current_minutes, Some(24));
    assert_eq!(state.pomodoro.current_seconds, Some(50));
}

#[tokio::test]
async fn reconfigure_is_persisted_and_restored() {
    let store = store_with(PomodoroPatch::default());
    let patch = ConfigPatch {
        work_minutes: Some(45),
        cycles_before_long_break: Some(2),
        ..ConfigPatch::default()
    };
    store.merge(&bridge::patch_for_config(&patch)).unwrap();

    let restored = bridge::restore(store.as_ref()).unwrap();
    assert_eq!(restored.config.work_minutes, 45);
    assert_eq!(restored.config.cycles_before_long_break, 2);
    assert_eq!(restored.config.break_minutes, 5);

    let timer = restored.into_timer();
    assert_eq!(timer.remaining(), Remaining { minutes: 45, seconds: 0 });
}
