//! Lock-free event rate meter.
//!
//! A [`Meter`] counts events and keeps exponentially decaying 1, 5 and 15
//! minute rates plus an all-time mean. Maintenance of the decaying rates is
//! driven by callers as they mark events or read rates, so no timer thread
//! is needed and nothing on the hot path blocks.
//!
//! ```
//! use ratemeter::{Meter, Metered, RateUnit};
//!
//! let meter = Meter::new();
//! meter.mark_n(3);
//! assert_eq!(meter.count(), 3);
//! let snap = meter.snapshot(RateUnit::Seconds);
//! assert_eq!(snap.count, 3);
//! ```

pub mod clock;
pub mod error;
pub mod ewma;
pub mod meter;
pub mod metered;
pub mod snapshot;
pub mod unit;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use error::MeterError;
pub use ewma::{DecayingRate, TICK_INTERVAL};
pub use meter::Meter;
pub use metered::Metered;
pub use snapshot::MeterSnapshot;
pub use unit::RateUnit;
