use std::ops::Mul;

use crate::quantity::{
    electric::{Amperes, Volts},
    energy::KilowattHours,
    time::Hours,
};

quantity!(Watts, "W");
quantity!(Kilowatts, "kW");

impl From<Kilowatts> for Watts {
    fn from(kilowatts: Kilowatts) -> Self {
        Self(kilowatts.0 * 1000.0)
    }
}

impl From<Watts> for Kilowatts {
    fn from(watts: Watts) -> Self {
        Self(watts.0 / 1000.0)
    }
}

impl Mul<Hours> for Kilowatts {
    type Output = KilowattHours;

    fn mul(self, hours: Hours) -> Self::Output {
        KilowattHours(self.0 * hours.0)
    }
}

impl Mul<Hours> for Watts {
    type Output = KilowattHours;

    fn mul(self, hours: Hours) -> Self::Output {
        Kilowatts::from(self) * hours
    }
}

impl Mul<Volts> for Amperes {
    type Output = Watts;

    fn mul(self, voltage: Volts) -> Self::Output {
        Watts(self.0 * voltage.0)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn watts_times_hours_ok() {
        assert_abs_diff_eq!((Watts(1500.0) * Hours(2.0)).0, 3.0);
    }

    #[test]
    fn string_power_ok() {
        assert_abs_diff_eq!((Amperes(2.5) * Volts(400.0)).0, 1000.0);
    }

    #[test]
    fn ordering_ok() {
        assert!(Watts(1.0) < Watts(2.0));
        assert_eq!(Watts(3.0).max(Watts(2.0)), Watts(3.0));
    }
}
