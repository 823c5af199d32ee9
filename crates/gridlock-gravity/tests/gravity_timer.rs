//! Integration tests for the gravity timer.
//!
//! All timing tests run with `start_paused = true` so `sleep_until`
//! resolves deterministically as the test advances the clock.

use std::time::Duration;

use gridlock_gravity::GravityTimer;

// =========================================================================
// Construction and accessors
// =========================================================================

#[test]
fn test_new_timer_is_stopped() {
    let timer = GravityTimer::new(0);
    assert!(!timer.is_running());
    assert!(!timer.is_paused());
    assert_eq!(timer.drops(), 0);
}

#[test]
fn test_interval_tracks_level_curve() {
    assert_eq!(
        GravityTimer::new(0).interval(),
        Duration::from_millis(1000)
    );
    assert_eq!(
        GravityTimer::new(29).interval(),
        Duration::from_millis(50)
    );
    assert!(
        GravityTimer::new(5).interval()
            < GravityTimer::new(2).interval()
    );
}

// =========================================================================
// Tick firing
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_wait_for_drop_fires_after_one_interval() {
    let mut timer = GravityTimer::new(0);
    timer.start();
    assert!(timer.is_running());

    let tick = timer.wait_for_drop().await;
    assert_eq!(tick.drop, 1);
    assert_eq!(tick.level, 0);
    assert_eq!(tick.interval, Duration::from_millis(1000));
}

#[tokio::test(start_paused = true)]
async fn test_drop_count_increments_monotonically() {
    let mut timer = GravityTimer::new(0);
    timer.start();
    for expected in 1..=5 {
        let tick = timer.wait_for_drop().await;
        assert_eq!(tick.drop, expected);
    }
    assert_eq!(timer.drops(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_stopped_timer_pends_forever() {
    let mut timer = GravityTimer::new(0);
    // Never started: a generous timeout must win.
    let result = tokio::time::timeout(
        Duration::from_secs(60),
        timer.wait_for_drop(),
    )
    .await;
    assert!(result.is_err(), "stopped timer must not tick");
}

#[tokio::test(start_paused = true)]
async fn test_stop_disarms_a_running_timer() {
    let mut timer = GravityTimer::new(0);
    timer.start();
    timer.wait_for_drop().await;

    timer.stop();
    assert!(!timer.is_running());
    let result = tokio::time::timeout(
        Duration::from_secs(60),
        timer.wait_for_drop(),
    )
    .await;
    assert!(result.is_err());

    // Idempotent.
    timer.stop();
    assert!(!timer.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_restart_after_stop_ticks_again() {
    let mut timer = GravityTimer::new(0);
    timer.start();
    timer.wait_for_drop().await;
    timer.stop();

    timer.start();
    let tick = timer.wait_for_drop().await;
    assert_eq!(tick.drop, 2);
}

// =========================================================================
// Level changes
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_set_level_restarts_with_new_interval() {
    let mut timer = GravityTimer::new(0);
    timer.start();
    timer.wait_for_drop().await;

    timer.set_level(29);
    assert!(timer.is_running());
    assert_eq!(timer.interval(), Duration::from_millis(50));

    let start = tokio::time::Instant::now();
    let tick = timer.wait_for_drop().await;
    assert_eq!(tick.level, 29);
    // The new cadence applies immediately, not after one stale tick.
    assert!(start.elapsed() <= Duration::from_millis(51));
}

#[tokio::test(start_paused = true)]
async fn test_set_level_on_stopped_timer_stays_stopped() {
    let mut timer = GravityTimer::new(0);
    timer.set_level(10);
    assert!(!timer.is_running());
    assert_eq!(timer.level(), 10);
}

#[tokio::test(start_paused = true)]
async fn test_set_level_same_level_keeps_deadline() {
    let mut timer = GravityTimer::new(3);
    timer.start();
    // A no-op level change must not push the next tick out.
    tokio::time::advance(Duration::from_millis(500)).await;
    timer.set_level(3);
    let start = tokio::time::Instant::now();
    timer.wait_for_drop().await;
    assert!(start.elapsed() < timer.interval());
}

// =========================================================================
// Pause / resume
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_paused_timer_pends() {
    let mut timer = GravityTimer::new(0);
    timer.start();
    timer.pause();
    assert!(timer.is_paused());
    assert!(!timer.is_running());

    let result = tokio::time::timeout(
        Duration::from_secs(60),
        timer.wait_for_drop(),
    )
    .await;
    assert!(result.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_resume_schedules_fresh_interval() {
    let mut timer = GravityTimer::new(0);
    timer.start();
    timer.pause();
    tokio::time::advance(Duration::from_secs(30)).await;
    timer.resume();

    // The 30 paused seconds must not burst out as missed ticks.
    let tick = timer.wait_for_drop().await;
    assert_eq!(tick.drop, 1);
    let result = tokio::time::timeout(
        Duration::from_millis(900),
        timer.wait_for_drop(),
    )
    .await;
    assert!(result.is_err(), "only one interval may elapse per tick");
}
