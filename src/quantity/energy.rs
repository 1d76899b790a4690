use std::ops::{Div, Mul};

use crate::quantity::{
    cost::{Cost, KilowattHourRate},
    power::Kilowatts,
    time::Hours,
};

quantity!(KilowattHours, "kWh");

impl KilowattHours {
    /// Round to the nearest watt-hour, which is what we keep in the ledger.
    #[must_use]
    pub fn round_to_watt_hours(self) -> Self {
        Self((self.0 * 1000.0).round() / 1000.0)
    }
}

impl Mul<KilowattHourRate> for KilowattHours {
    type Output = Cost;

    fn mul(self, rate: KilowattHourRate) -> Self::Output {
        Cost(self.0 * rate.0)
    }
}

impl Div<Hours> for KilowattHours {
    type Output = Option<Kilowatts>;

    fn div(self, hours: Hours) -> Self::Output {
        (hours.0 > 0.0).then(|| Kilowatts(self.0 / hours.0))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn round_to_watt_hours_ok() {
        assert_abs_diff_eq!(KilowattHours(1.234_56).round_to_watt_hours().0, 1.235);
    }

    #[test]
    fn average_power_ok() {
        assert_abs_diff_eq!((KilowattHours(3.0) / Hours(2.0)).unwrap().0, 1.5);
        assert!((KilowattHours(3.0) / Hours(0.0)).is_none());
    }
}
