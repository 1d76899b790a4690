use chrono::{DateTime, Local};
use derive_more::AddAssign;

use crate::quantity::{energy::KilowattHours, power::Kilowatts, power::Watts, time::Hours};

/// Numerical integration rule for turning power samples into energy.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum IntegrationMethod {
    /// Average of both ends times the elapsed time.
    #[default]
    Trapezoid,

    /// Value at the interval start times the elapsed time.
    Rectangle,
}

impl IntegrationMethod {
    /// Energy delivered between two consecutive samples.
    ///
    /// Uses the actual elapsed time, so a missed run simply yields a longer interval.
    #[must_use]
    pub fn integrate(
        self,
        (from_time, from_power): (DateTime<Local>, Watts),
        (to_time, to_power): (DateTime<Local>, Watts),
    ) -> Integrator {
        let hours = Hours::from(to_time - from_time);
        if hours <= Hours::zero() {
            return Integrator::default();
        }
        let power = match self {
            Self::Trapezoid => (from_power + to_power) / 2.0,
            Self::Rectangle => from_power,
        };
        Integrator { hours, value: power * hours }
    }
}

/// Value accumulator over time.
#[derive(Copy, Clone, Debug, AddAssign)]
pub struct Integrator {
    pub hours: Hours,
    pub value: KilowattHours,
}

impl Default for Integrator {
    fn default() -> Self {
        Self { hours: Hours::zero(), value: KilowattHours::zero() }
    }
}

impl Integrator {
    pub fn average(self) -> Option<Kilowatts> {
        self.value / self.hours
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::{TimeDelta, TimeZone};

    use super::*;

    fn at(minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 6, 1, 12, minute, 0).unwrap()
    }

    #[test]
    fn trapezoid_ok() {
        let integrator =
            IntegrationMethod::Trapezoid.integrate((at(0), Watts(1000.0)), (at(30), Watts(2000.0)));
        assert_abs_diff_eq!(integrator.value.0, 0.75);
        assert_abs_diff_eq!(integrator.hours.0, 0.5);
    }

    #[test]
    fn rectangle_ok() {
        let integrator =
            IntegrationMethod::Rectangle.integrate((at(0), Watts(1000.0)), (at(30), Watts(2000.0)));
        assert_abs_diff_eq!(integrator.value.0, 0.5);
    }

    #[test]
    fn non_increasing_time_yields_nothing() {
        let integrator =
            IntegrationMethod::Trapezoid.integrate((at(5), Watts(1000.0)), (at(5), Watts(2000.0)));
        assert_abs_diff_eq!(integrator.value.0, 0.0);
        assert!(integrator.average().is_none());
    }

    #[test]
    fn spacing_insensitive() {
        let method = IntegrationMethod::Trapezoid;
        let start = (at(0), Watts(600.0));
        let end = (at(5), Watts(1100.0));
        let coarse = method.integrate(start, end);

        let mut fine = Integrator::default();
        let mut previous = start;
        for minute in 1..=5 {
            let next = (
                at(0) + TimeDelta::minutes(minute),
                Watts(600.0 + 100.0 * f64::from(u32::try_from(minute).unwrap())),
            );
            fine += method.integrate(previous, next);
            previous = next;
        }

        assert_abs_diff_eq!(coarse.value.0, fine.value.0, epsilon = 1e-9);
        assert_abs_diff_eq!(coarse.average().unwrap().0, 0.85, epsilon = 1e-9);
    }
}
