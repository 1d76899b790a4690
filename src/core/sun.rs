use chrono::{DateTime, Datelike, Local, NaiveDate, TimeDelta};

use crate::prelude::*;

/// Location of the installation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self> {
        ensure!((-90.0..=90.0).contains(&latitude), "latitude {latitude} is out of range");
        ensure!((-180.0..=180.0).contains(&longitude), "longitude {longitude} is out of range");
        Ok(Self { latitude, longitude })
    }

    /// Sunrise and sunset on the day, `None` when the sun does not rise or does not set.
    #[must_use]
    pub fn sun_times(self, day: NaiveDate) -> Option<SunTimes> {
        let (sunrise, sunset) = sunrise::sunrise_sunset(
            self.latitude,
            self.longitude,
            day.year(),
            day.month(),
            day.day(),
        );
        let sunrise = DateTime::from_timestamp(sunrise, 0)?.with_timezone(&Local);
        let sunset = DateTime::from_timestamp(sunset, 0)?.with_timezone(&Local);
        let length = sunset - sunrise;
        (length > TimeDelta::zero() && length < TimeDelta::days(1))
            .then_some(SunTimes { sunrise, sunset })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SunTimes {
    pub sunrise: DateTime<Local>,
    pub sunset: DateTime<Local>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREENWICH: Coordinates = Coordinates { latitude: 51.4769, longitude: 0.0 };

    #[test]
    fn day_length_follows_the_seasons() -> Result {
        let summer = GREENWICH
            .sun_times(NaiveDate::from_ymd_opt(2026, 6, 21).unwrap())
            .context("the sun rises in June")?;
        let length = summer.sunset - summer.sunrise;
        assert!(length > TimeDelta::hours(16) && length < TimeDelta::hours(17), "{length}");

        let winter = GREENWICH
            .sun_times(NaiveDate::from_ymd_opt(2026, 12, 21).unwrap())
            .context("the sun rises in December")?;
        let length = winter.sunset - winter.sunrise;
        assert!(length > TimeDelta::minutes(450) && length < TimeDelta::minutes(495), "{length}");
        Ok(())
    }

    #[test]
    fn invalid_coordinates_rejected() {
        assert!(Coordinates::try_new(91.0, 0.0).is_err());
        assert!(Coordinates::try_new(0.0, -181.0).is_err());
        assert!(Coordinates::try_new(52.37, 4.89).is_ok());
    }
}
