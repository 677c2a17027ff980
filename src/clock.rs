use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of monotonic nanosecond ticks.
///
/// Ticks only need to be monotonic within a process; they are not wall-clock
/// time and are never compared across restarts. A clock that goes backwards
/// violates this contract and leaves meter maintenance stalled until it has
/// caught up again.
pub trait Clock: Send + Sync {
    fn tick(&self) -> i64;
}

/// Nanoseconds elapsed since the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn tick(&self) -> i64 {
        // i64 nanoseconds cover ~292 years of uptime
        self.origin.elapsed().as_nanos() as i64
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(tick: i64) -> Self {
        Self { now: Arc::new(AtomicI64::new(tick)) }
    }

    pub fn set(&self, tick: i64) {
        self.now.store(tick, Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(by.as_nanos() as i64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn tick(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn tick(&self) -> i64 {
        (**self).tick()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn tick(&self) -> i64 {
        (**self).tick()
    }
}
