use std::fmt;

use serde::{Deserialize, Serialize};

use crate::unit::RateUnit;

/// Point-in-time reading of a meter, rates already converted to `unit`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeterSnapshot {
    pub count: u64,
    pub mean_rate: f64,
    pub one_minute_rate: f64,
    pub five_minute_rate: f64,
    pub fifteen_minute_rate: f64,
    pub unit: RateUnit,
}

impl fmt::Display for MeterSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "count={} mean={:.2} m1={:.2} m5={:.2} m15={:.2} {}",
            self.count,
            self.mean_rate,
            self.one_minute_rate,
            self.five_minute_rate,
            self.fifteen_minute_rate,
            self.unit,
        )
    }
}
