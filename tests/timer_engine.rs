use std::{sync::Arc, time::Duration};

use countdown_lamp::timer::{
    ManualScheduler, TimerConfiguration, TimerEngine, TimerEvent, TokioScheduler,
};

fn engine() -> (TimerEngine, ManualScheduler) {
    let scheduler = ManualScheduler::new();
    let engine = TimerEngine::new(Arc::new(scheduler.clone()));
    (engine, scheduler)
}

fn configure(engine: &TimerEngine, h: u64, m: u64, s: u64) {
    engine
        .set_configuration(TimerConfiguration::new(h, m, s).unwrap())
        .unwrap();
}

fn drain(events: &mut tokio::sync::broadcast::Receiver<TimerEvent>) -> Vec<TimerEvent> {
    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }
    received
}

#[test]
fn initial_state_is_idle() {
    let (engine, _) = engine();
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.total_seconds, 0);
    assert_eq!(snapshot.remaining_seconds, 0);
    assert!(!snapshot.is_running);
    assert!(!snapshot.is_finished);
    assert_eq!(snapshot.progress, 1.0);
    assert_eq!(snapshot.display_time, "00:00:00");
}

#[test]
fn stop_is_idempotent() {
    let (engine, scheduler) = engine();
    configure(&engine, 0, 0, 30);
    for _ in 0..3 {
        engine.stop().unwrap();
    }
    assert!(!engine.is_running());
    assert_eq!(engine.remaining(), Duration::ZERO);

    engine.start().unwrap();
    scheduler.advance(5);
    for _ in 0..3 {
        engine.stop().unwrap();
    }
    assert!(!engine.is_running());
    assert_eq!(engine.remaining(), Duration::from_secs(25));
    assert_eq!(scheduler.cancel_count(), 1);
}

#[test]
fn countdown_is_monotonic_and_never_negative() {
    let (engine, scheduler) = engine();
    configure(&engine, 0, 0, 10);
    engine.start().unwrap();

    let mut previous = engine.snapshot().remaining_seconds;
    assert_eq!(previous, 10);
    for _ in 0..10 {
        scheduler.advance(1);
        let current = engine.snapshot().remaining_seconds;
        assert_eq!(current, previous - 1);
        previous = current;
    }

    scheduler.advance(5);
    assert_eq!(engine.snapshot().remaining_seconds, 0);
}

#[tokio::test]
async fn completion_fires_once_per_run() {
    let (engine, scheduler) = engine();
    let mut events = engine.events();
    configure(&engine, 0, 0, 2);

    engine.start().unwrap();
    scheduler.advance(2);
    assert!(engine.is_finished());
    assert!(!engine.is_running());
    scheduler.advance(5);

    let finished = drain(&mut events)
        .into_iter()
        .filter(|event| *event == TimerEvent::Finished)
        .count();
    assert_eq!(finished, 1);
    assert!(engine.is_finished());
}

#[test]
fn progress_stays_in_bounds() {
    let (engine, scheduler) = engine();
    configure(&engine, 0, 0, 7);
    engine.start().unwrap();

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.progress, 1.0);
    for _ in 0..9 {
        scheduler.advance(1);
        let snapshot = engine.snapshot();
        assert!((0.0..=1.0).contains(&snapshot.progress));
        if snapshot.remaining_seconds == snapshot.total_seconds {
            assert_eq!(snapshot.progress, 1.0);
        } else {
            assert!(snapshot.progress < 1.0);
        }
    }
    assert_eq!(engine.progress(), 0.0);
}

#[test]
fn reset_restores_full_duration() {
    let (engine, scheduler) = engine();
    configure(&engine, 0, 0, 5);
    engine.start().unwrap();
    scheduler.advance(2);
    engine.stop().unwrap();
    engine.start().unwrap();
    scheduler.advance(5);
    assert!(engine.is_finished());

    engine.reset().unwrap();
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.remaining_seconds, snapshot.total_seconds);
    assert_eq!(snapshot.remaining_seconds, 5);
    assert_eq!(snapshot.progress, 1.0);
    assert_eq!(snapshot.display_time, "00:00:05");
    assert!(!snapshot.is_finished);
    assert!(!snapshot.is_running);
    assert_eq!(scheduler.active_subscriptions(), 0);
}

#[test]
fn reset_when_idle_is_harmless() {
    let (engine, _) = engine();
    engine.reset().unwrap();
    engine.reset().unwrap();
    assert_eq!(engine.snapshot().display_time, "00:00:00");
    assert!(!engine.is_running());
}

#[test]
fn three_second_run_finishes_after_three_ticks() {
    let (engine, scheduler) = engine();
    configure(&engine, 0, 0, 3);
    engine.start().unwrap();
    scheduler.advance(2);
    assert!(!engine.is_finished());

    scheduler.advance(1);
    assert_eq!(engine.display_time(), "00:00:00");
    assert!(engine.is_finished());
    assert!(!engine.is_running());
}

#[test]
fn one_minute_run_after_one_tick() {
    let (engine, scheduler) = engine();
    configure(&engine, 0, 1, 0);
    engine.start().unwrap();
    scheduler.advance(1);

    assert_eq!(engine.display_time(), "00:00:59");
    assert_eq!(engine.progress(), 59.0 / 60.0);
}

#[test]
fn zero_duration_run_takes_one_tick() {
    let (engine, scheduler) = engine();
    configure(&engine, 0, 0, 0);
    engine.start().unwrap();
    assert!(engine.is_running());
    assert!(!engine.is_finished());
    assert_eq!(engine.progress(), 1.0);

    scheduler.advance(1);
    assert!(engine.is_finished());
    assert!(!engine.is_running());
    assert_eq!(engine.progress(), 1.0);
}

#[test]
fn double_start_keeps_one_subscription() {
    let (engine, scheduler) = engine();
    configure(&engine, 0, 0, 10);
    engine.start().unwrap();
    engine.start().unwrap();

    assert_eq!(scheduler.subscribe_count(), 2);
    assert_eq!(scheduler.cancel_count(), 1);
    assert_eq!(scheduler.active_subscriptions(), 1);

    scheduler.advance(3);
    assert_eq!(engine.remaining(), Duration::from_secs(7));
}

#[test]
fn large_unchecked_configuration_is_summed() {
    let (engine, scheduler) = engine();
    engine
        .set_configuration(TimerConfiguration::unchecked(30, 0, 90))
        .unwrap();
    engine.start().unwrap();
    assert_eq!(engine.display_time(), "30:01:30");
    scheduler.advance(1);
    assert_eq!(engine.display_time(), "30:01:29");
}

#[tokio::test(start_paused = true)]
async fn real_time_scheduler_counts_down() {
    let engine = TimerEngine::new(Arc::new(TokioScheduler::new()));
    configure(&engine, 0, 0, 3);
    engine.start().unwrap();

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(engine.display_time(), "00:00:02");
    assert!(engine.is_running());

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(engine.display_time(), "00:00:00");
    assert!(engine.is_finished());
    assert!(!engine.is_running());
}

#[tokio::test(start_paused = true)]
async fn real_time_restart_does_not_double_tick() {
    let engine = TimerEngine::new(Arc::new(TokioScheduler::new()));
    configure(&engine, 0, 0, 10);
    engine.start().unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;
    engine.start().unwrap();

    tokio::time::sleep(Duration::from_millis(3500)).await;
    assert_eq!(engine.remaining(), Duration::from_secs(7));
}
