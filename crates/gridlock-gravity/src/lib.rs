//! Per-player gravity timer.
//!
//! One `GravityTimer` lives inside each player's simulation actor and
//! drives the auto-drop. The interval is derived from the player's
//! level ([`gridlock_core::drop_interval`]); the timer restarts itself
//! whenever the level changes and pends forever while stopped or
//! paused.
//!
//! # Integration
//!
//! The timer is designed to sit inside the actor's `tokio::select!`
//! loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = commands.recv() => { /* apply action */ }
//!         tick = gravity.wait_for_drop() => { /* auto-drop */ }
//!     }
//! }
//! ```
//!
//! Cancellation is ownership: the timer dies with the actor, so a
//! dead player state can never leave a ticking timer behind.

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, trace};

/// Information about one gravity tick, returned by
/// [`GravityTimer::wait_for_drop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropTick {
    /// Monotonically increasing tick number (starts at 1).
    pub drop: u64,
    /// The level the timer was running at when the tick fired.
    pub level: u32,
    /// The interval that produced this tick.
    pub interval: Duration,
}

/// A restartable interval timer keyed to a player's level.
///
/// Created stopped; [`start`](Self::start) arms it. `stop` and
/// `start` are idempotent.
#[derive(Debug)]
pub struct GravityTimer {
    level: u32,
    interval: Duration,
    next_drop: Option<Instant>,
    paused: bool,
    drops: u64,
}

impl GravityTimer {
    /// Creates a stopped timer for the given level.
    pub fn new(level: u32) -> Self {
        Self {
            level,
            interval: gridlock_core::drop_interval(level),
            next_drop: None,
            paused: false,
            drops: 0,
        }
    }

    /// Arms the timer: the first tick fires one interval from now.
    pub fn start(&mut self) {
        if self.next_drop.is_none() {
            self.next_drop = Some(Instant::now() + self.interval);
            debug!(
                level = self.level,
                interval_ms = self.interval.as_millis() as u64,
                "gravity timer started"
            );
        }
    }

    /// Disarms the timer. Idempotent; `wait_for_drop` pends until the
    /// next `start`.
    pub fn stop(&mut self) {
        if self.next_drop.take().is_some() {
            debug!(level = self.level, "gravity timer stopped");
        }
    }

    /// Whether the timer is armed (started and not paused).
    pub fn is_running(&self) -> bool {
        self.next_drop.is_some() && !self.paused
    }

    /// Re-keys the timer to a new level.
    ///
    /// The old deadline is always discarded; if the timer was
    /// running, the next tick fires one *new* interval from now.
    pub fn set_level(&mut self, level: u32) {
        if level == self.level {
            return;
        }
        let was_running = self.next_drop.is_some();
        self.level = level;
        self.interval = gridlock_core::drop_interval(level);
        self.next_drop =
            was_running.then(|| Instant::now() + self.interval);
        debug!(
            level,
            interval_ms = self.interval.as_millis() as u64,
            restarted = was_running,
            "gravity timer re-keyed"
        );
    }

    /// Pauses an armed timer. Resuming schedules a full fresh
    /// interval rather than crediting paused time.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            debug!(level = self.level, "gravity timer paused");
        }
    }

    /// Resumes after [`pause`](Self::pause).
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            if self.next_drop.is_some() {
                self.next_drop = Some(Instant::now() + self.interval);
            }
            debug!(level = self.level, "gravity timer resumed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// The timer's current level.
    pub fn level(&self) -> u32 {
        self.level
    }

    /// The current drop interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Total ticks delivered.
    pub fn drops(&self) -> u64 {
        self.drops
    }

    /// Waits for the next drop tick.
    ///
    /// While stopped or paused this pends forever — inside a
    /// `select!` the other branches still run. On wake the next tick
    /// is scheduled one interval after the missed deadline, so load
    /// spikes don't silently slow gravity down.
    pub async fn wait_for_drop(&mut self) -> DropTick {
        let deadline = match self.next_drop {
            Some(deadline) if !self.paused => deadline,
            _ => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        };

        time::sleep_until(deadline).await;

        self.drops += 1;
        self.next_drop = Some(deadline + self.interval);
        trace!(
            drop = self.drops,
            level = self.level,
            "gravity tick"
        );

        DropTick {
            drop: self.drops,
            level: self.level,
            interval: self.interval,
        }
    }
}
