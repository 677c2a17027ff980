use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use tracing::{debug, trace};

use crate::clock::{Clock, MonotonicClock};
use crate::error::MeterError;
use crate::ewma::{DecayingRate, TICK_INTERVAL};
use crate::metered::Metered;
use crate::unit::RateUnit;

const TICK_INTERVAL_NANOS: i64 = TICK_INTERVAL.as_nanos() as i64;
const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Counts events and estimates their rate over 1, 5 and 15 minute windows.
///
/// There is no background thread. Every `mark` and every windowed rate query
/// checks whether at least one [`TICK_INTERVAL`] has passed since the last
/// maintenance and, if so, exactly one of the racing callers replays the
/// owed ticks on all three windows. Nothing on any path takes a lock.
#[derive(Debug)]
pub struct Meter<C: Clock = MonotonicClock> {
    clock: C,
    start_tick: i64,
    last_tick: AtomicI64,
    count: AtomicU64,
    // 1, 5 and 15 minutes
    rates: [DecayingRate; 3],
}

impl Meter<MonotonicClock> {
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::new())
    }
}

impl Default for Meter<MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Meter<C> {
    pub fn with_clock(clock: C) -> Self {
        let start_tick = clock.tick();
        Self {
            clock,
            start_tick,
            last_tick: AtomicI64::new(start_tick),
            count: AtomicU64::new(0),
            rates: [
                DecayingRate::one_minute(),
                DecayingRate::five_minute(),
                DecayingRate::fifteen_minute(),
            ],
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    #[inline]
    pub fn mark(&self) {
        self.mark_n(1);
    }

    pub fn mark_n(&self, n: u64) {
        self.tick_if_necessary();
        self.count.fetch_add(n, Ordering::Relaxed);
        for rate in &self.rates {
            rate.update(n);
        }
    }

    /// Marks `n` events coming from a signed quantity.
    ///
    /// Negative amounts are rejected without touching any state.
    pub fn try_mark(&self, n: i64) -> Result<(), MeterError> {
        let n = u64::try_from(n).map_err(|_| MeterError::NegativeAmount(n))?;
        self.mark_n(n);
        Ok(())
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn one_minute_rate(&self) -> f64 {
        self.windowed_rate(0)
    }

    pub fn five_minute_rate(&self) -> f64 {
        self.windowed_rate(1)
    }

    pub fn fifteen_minute_rate(&self) -> f64 {
        self.windowed_rate(2)
    }

    /// Events per second since construction, with no decay applied.
    pub fn mean_rate(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            return 0.0;
        }
        let elapsed = self.clock.tick() - self.start_tick;
        if elapsed <= 0 {
            return 0.0;
        }
        count as f64 / elapsed as f64 * NANOS_PER_SEC
    }

    fn windowed_rate(&self, idx: usize) -> f64 {
        self.tick_if_necessary();
        self.rates[idx].rate(RateUnit::Seconds)
    }

    /// Replays owed ticks if the meter is stale. Returns how many ticks this
    /// caller applied; zero when not stale or another caller won the race.
    pub(crate) fn tick_if_necessary(&self) -> u64 {
        let old_tick = self.last_tick.load(Ordering::Acquire);
        let new_tick = self.clock.tick();
        let age = new_tick - old_tick;
        // strictly greater: an age of exactly one interval waits for the next call
        if age <= TICK_INTERVAL_NANOS {
            return 0;
        }
        if self
            .last_tick
            .compare_exchange(old_tick, new_tick, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return 0;
        }

        let required = (age / TICK_INTERVAL_NANOS) as u64;
        trace!(ticks = required, age_ns = age, "Replaying meter ticks");
        if required > 1 {
            debug!(ticks = required, "Meter catching up after idle period");
        }
        for _ in 0..required {
            for rate in &self.rates {
                rate.tick();
            }
        }
        required
    }
}

impl<C: Clock> Metered for Meter<C> {
    fn count(&self) -> u64 {
        Meter::count(self)
    }

    fn mean_rate(&self) -> f64 {
        Meter::mean_rate(self)
    }

    fn one_minute_rate(&self) -> f64 {
        Meter::one_minute_rate(self)
    }

    fn five_minute_rate(&self) -> f64 {
        Meter::five_minute_rate(self)
    }

    fn fifteen_minute_rate(&self) -> f64 {
        Meter::fifteen_minute_rate(self)
    }
}
