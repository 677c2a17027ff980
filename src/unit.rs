use std::fmt;

use serde::{Deserialize, Serialize};

/// Time unit a rate is expressed per, e.g. events per minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    #[default]
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl RateUnit {
    pub const fn as_secs_f64(self) -> f64 {
        match self {
            RateUnit::Nanoseconds => 1e-9,
            RateUnit::Microseconds => 1e-6,
            RateUnit::Milliseconds => 1e-3,
            RateUnit::Seconds => 1.0,
            RateUnit::Minutes => 60.0,
            RateUnit::Hours => 3_600.0,
            RateUnit::Days => 86_400.0,
        }
    }

    /// Converts an events-per-second rate into events per `self`.
    #[inline]
    pub fn convert_per_second(self, per_second: f64) -> f64 {
        per_second * self.as_secs_f64()
    }

    fn singular(self) -> &'static str {
        match self {
            RateUnit::Nanoseconds => "nanosecond",
            RateUnit::Microseconds => "microsecond",
            RateUnit::Milliseconds => "millisecond",
            RateUnit::Seconds => "second",
            RateUnit::Minutes => "minute",
            RateUnit::Hours => "hour",
            RateUnit::Days => "day",
        }
    }
}

impl fmt::Display for RateUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "events/{}", self.singular())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_from_per_second() {
        assert_eq!(RateUnit::Seconds.convert_per_second(2.5), 2.5);
        assert_eq!(RateUnit::Minutes.convert_per_second(2.0), 120.0);
        assert_eq!(RateUnit::Hours.convert_per_second(1.0), 3_600.0);
        assert!((RateUnit::Milliseconds.convert_per_second(1000.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn display_and_serde_names() {
        assert_eq!(RateUnit::Minutes.to_string(), "events/minute");
        assert_eq!(serde_json::to_string(&RateUnit::Days).unwrap(), "\"days\"");
        let unit: RateUnit = serde_json::from_str("\"microseconds\"").unwrap();
        assert_eq!(unit, RateUnit::Microseconds);
    }
}
