use crate::snapshot::MeterSnapshot;
use crate::unit::RateUnit;

/// Read side of a meter, as polled by reporters.
///
/// All rates are in events per second.
pub trait Metered: Send + Sync {
    fn count(&self) -> u64;

    fn mean_rate(&self) -> f64;

    fn one_minute_rate(&self) -> f64;

    fn five_minute_rate(&self) -> f64;

    fn fifteen_minute_rate(&self) -> f64;

    fn snapshot(&self, unit: RateUnit) -> MeterSnapshot {
        MeterSnapshot {
            count: self.count(),
            mean_rate: unit.convert_per_second(self.mean_rate()),
            one_minute_rate: unit.convert_per_second(self.one_minute_rate()),
            five_minute_rate: unit.convert_per_second(self.five_minute_rate()),
            fifteen_minute_rate: unit.convert_per_second(self.fifteen_minute_rate()),
            unit,
        }
    }
}
