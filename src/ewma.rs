use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use crate::unit::RateUnit;

/// Cadence at which decaying rates are advanced.
pub const TICK_INTERVAL: Duration = Duration::from_secs(5);

/// Exponentially decaying event rate over a trailing window.
///
/// Events are accumulated with [`update`](Self::update) from any number of
/// threads and folded into the smoothed rate once per [`TICK_INTERVAL`] by
/// [`tick`](Self::tick). `tick` expects a single caller at a time; the
/// [`Meter`](crate::Meter) guarantees that with its maintenance gate.
#[derive(Debug)]
pub struct DecayingRate {
    window: Duration,
    alpha: f64,
    uncounted: AtomicU64,
    initialized: AtomicBool,
    // f64 bit pattern, events per second
    rate: AtomicU64,
}

impl DecayingRate {
    pub fn one_minute() -> Self {
        Self::with_window(Duration::from_secs(60))
    }

    pub fn five_minute() -> Self {
        Self::with_window(Duration::from_secs(5 * 60))
    }

    pub fn fifteen_minute() -> Self {
        Self::with_window(Duration::from_secs(15 * 60))
    }

    /// Creates an estimator whose time constant is `window`.
    ///
    /// Panics if `window` is zero.
    pub fn with_window(window: Duration) -> Self {
        assert!(!window.is_zero(), "decaying rate window must be non-zero");
        let alpha = 1.0 - (-TICK_INTERVAL.as_secs_f64() / window.as_secs_f64()).exp();
        Self {
            window,
            alpha,
            uncounted: AtomicU64::new(0),
            initialized: AtomicBool::new(false),
            rate: AtomicU64::new(0.0f64.to_bits()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Per-tick smoothing weight.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    #[inline]
    pub fn update(&self, n: u64) {
        if n != 0 {
            self.uncounted.fetch_add(n, Ordering::Relaxed);
        }
    }

    /// Folds the events seen since the previous tick into the rate.
    pub fn tick(&self) {
        let count = self.uncounted.swap(0, Ordering::Relaxed);
        let instant = count as f64 / TICK_INTERVAL.as_secs_f64();

        let next = match self.current() {
            Some(rate) => rate + self.alpha * (instant - rate),
            None => instant,
        };
        self.rate.store(next.to_bits(), Ordering::Release);
        self.initialized.store(true, Ordering::Release);
    }

    /// Smoothed rate in events per second, `None` until the first tick.
    pub fn current(&self) -> Option<f64> {
        if self.initialized.load(Ordering::Acquire) {
            Some(f64::from_bits(self.rate.load(Ordering::Acquire)))
        } else {
            None
        }
    }

    pub fn rate(&self, unit: RateUnit) -> f64 {
        unit.convert_per_second(self.current().unwrap_or(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn alpha_matches_window() {
        let m1 = DecayingRate::one_minute();
        assert!(close(m1.alpha(), 1.0 - (-5.0f64 / 60.0).exp()));
        assert!(close(DecayingRate::five_minute().alpha(), 1.0 - (-5.0f64 / 300.0).exp()));
        assert!(close(DecayingRate::fifteen_minute().alpha(), 1.0 - (-5.0f64 / 900.0).exp()));
        assert_eq!(m1.window(), Duration::from_secs(60));
    }

    #[test]
    fn unticked_rate_is_zero_and_uninitialized() {
        let ewma = DecayingRate::one_minute();
        ewma.update(100);
        assert_eq!(ewma.current(), None);
        assert_eq!(ewma.rate(RateUnit::Seconds), 0.0);
    }

    #[test]
    fn first_tick_takes_instant_rate() {
        let ewma = DecayingRate::one_minute();
        ewma.update(3);
        ewma.tick();
        assert_eq!(ewma.current(), Some(0.6));
        assert!(close(ewma.rate(RateUnit::Minutes), 36.0));
    }

    #[test]
    fn ticking_to_zero_is_still_initialized() {
        let ewma = DecayingRate::five_minute();
        ewma.tick();
        assert_eq!(ewma.current(), Some(0.0));
    }

    #[test]
    fn idle_ticks_decay_toward_zero() {
        let ewma = DecayingRate::one_minute();
        ewma.update(10);
        ewma.tick();
        let mut prev = ewma.rate(RateUnit::Seconds);
        assert_eq!(prev, 2.0);
        for _ in 0..12 {
            ewma.tick();
            let now = ewma.rate(RateUnit::Seconds);
            assert!(now < prev && now > 0.0);
            assert!(close(now, prev * (1.0 - ewma.alpha())));
            prev = now;
        }
        // one full window of idle ticks leaves ~1/e of the rate
        assert!(close(prev, 2.0 * (-1.0f64).exp()));
    }

    #[test]
    fn tick_resets_uncounted() {
        let ewma = DecayingRate::one_minute();
        ewma.update(5);
        ewma.tick();
        ewma.tick();
        // second tick saw zero events
        assert!(ewma.rate(RateUnit::Seconds) < 1.0);
    }

    #[test]
    #[should_panic(expected = "non-zero")]
    fn zero_window_is_rejected() {
        let _ = DecayingRate::with_window(Duration::ZERO);
    }
}
