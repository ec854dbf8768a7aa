use lift_timer::{Tick, Ticker, TickerSet, TimerError, TimerKind};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{timeout, Instant};

#[tokio::test(start_paused = true)]
async fn test_ticker_emits_at_fixed_period() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let start = Instant::now();
    let _ticker = Ticker::spawn(TimerKind::Rest, 7, Duration::from_secs(1), tx).unwrap();

    for expected in 1..=3 {
        let tick = rx.recv().await.unwrap();
        assert_eq!(
            tick,
            Tick {
                kind: TimerKind::Rest,
                generation: 7,
                sequence: expected
            }
        );
    }
    assert_eq!(start.elapsed(), Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_closes_channel() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let ticker = Ticker::spawn(TimerKind::Duration, 1, Duration::from_secs(1), tx).unwrap();
    assert!(rx.recv().await.is_some());

    ticker.cancel();
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn test_zero_period_rejected() {
    let (tx, _rx) = mpsc::unbounded_channel();
    assert_eq!(
        Ticker::spawn(TimerKind::Stopwatch, 1, Duration::ZERO, tx).unwrap_err(),
        TimerError::ZeroPeriod
    );
    assert_eq!(TickerSet::new(Duration::ZERO).unwrap_err(), TimerError::ZeroPeriod);
}

#[tokio::test(start_paused = true)]
async fn test_ticker_set_pause_is_independent() {
    let (mut set, mut rx) = TickerSet::new(Duration::from_secs(1)).unwrap();
    set.resume(TimerKind::Duration).unwrap();
    set.resume(TimerKind::Rest).unwrap();
    set.resume(TimerKind::Rest).unwrap();
    assert_eq!(set.len(), 2);

    set.pause(TimerKind::Rest);
    assert!(set.is_running(TimerKind::Duration));
    assert!(!set.is_running(TimerKind::Rest));

    for _ in 0..3 {
        let tick = rx.recv().await.unwrap();
        assert_eq!(tick.kind, TimerKind::Duration);
    }
}

#[tokio::test(start_paused = true)]
async fn test_clear_stops_all_ticks() {
    let (mut set, mut rx) = TickerSet::new(Duration::from_secs(1)).unwrap();
    for kind in TimerKind::ALL {
        set.resume(kind).unwrap();
    }
    assert_eq!(set.len(), 3);

    set.clear();
    assert!(set.is_empty());
    assert!(timeout(Duration::from_secs(5), rx.recv()).await.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_queued_ticks_are_stale_after_restart() {
    let (mut set, mut rx) = TickerSet::new(Duration::from_secs(1)).unwrap();
    set.resume(TimerKind::Rest).unwrap();
    let first = set.generation(TimerKind::Rest).unwrap();

    tokio::time::sleep(Duration::from_millis(3500)).await;
    set.restart(TimerKind::Rest).unwrap();
    let second = set.generation(TimerKind::Rest).unwrap();
    assert_ne!(first, second);

    let mut stale = 0;
    while let Ok(tick) = rx.try_recv() {
        assert_eq!(tick.generation, first);
        assert!(!set.is_live(&tick));
        stale += 1;
    }
    assert_eq!(stale, 3);

    let tick = rx.recv().await.unwrap();
    assert!(set.is_live(&tick));
    assert_eq!(tick.sequence, 1);

    set.pause(TimerKind::Rest);
    assert_eq!(set.generation(TimerKind::Rest), None);
    assert!(!set.is_live(&tick));
}
