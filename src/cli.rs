mod chart;
mod inverter;
mod labels;
mod paths;

use chrono::NaiveTime;
use clap::Parser;

use self::{chart::ChartArgs, inverter::InverterArgs, labels::LabelArgs, paths::PathArgs};
use crate::{
    core::{
        integrator::IntegrationMethod,
        mode::{DaylightWindow, Mode},
        sun::Coordinates,
    },
    prelude::*,
    quantity::power::Watts,
    settings::Settings,
};

/// Poll the inverter once: append a sample during the day, close the day at night.
#[derive(Parser)]
#[command(author, version, about)]
#[must_use]
pub struct Args {
    /// Append a sample regardless of the time and output.
    #[clap(short = 'd', long = "daytime", conflicts_with = "end_of_day")]
    pub daytime: bool,

    /// Close the day regardless of the time and output, without contacting the inverter.
    #[clap(short = 'e', long = "end-of-day")]
    pub end_of_day: bool,

    /// Write everything into the test location.
    #[clap(short = 't', long = "test")]
    pub test: bool,

    /// Start of the local daylight window.
    #[clap(long, env = "DAYLIGHT_START", default_value = "04:30", value_parser = parse_time)]
    pub daylight_start: NaiveTime,

    /// End of the local daylight window.
    #[clap(long, env = "DAYLIGHT_END", default_value = "21:30", value_parser = parse_time)]
    pub daylight_end: NaiveTime,

    /// Latitude of the installation: the daylight window then runs from sunrise to sunset.
    #[clap(long, env = "LATITUDE", requires = "longitude", allow_negative_numbers = true)]
    pub latitude: Option<f64>,

    #[clap(long, env = "LONGITUDE", requires = "latitude", allow_negative_numbers = true)]
    pub longitude: Option<f64>,

    /// Output at or below this is not generation.
    #[clap(long = "noise-threshold-watts", env = "NOISE_THRESHOLD_WATTS", default_value = "10")]
    pub noise_threshold: Watts,

    /// Readings above this are discarded.
    #[clap(long = "max-power-watts", env = "MAX_POWER_WATTS", default_value = "10000")]
    pub max_power: Watts,

    #[clap(long, env = "INTEGRATION", default_value = "trapezoid")]
    pub integration: IntegrationMethod,

    #[clap(flatten)]
    pub inverter: InverterArgs,

    #[clap(flatten)]
    pub paths: PathArgs,

    #[clap(flatten)]
    pub labels: LabelArgs,

    #[clap(flatten)]
    pub chart: ChartArgs,
}

impl Args {
    pub const fn mode_override(&self) -> Option<Mode> {
        if self.daytime {
            Some(Mode::Daytime)
        } else if self.end_of_day {
            Some(Mode::EndOfDay)
        } else {
            None
        }
    }

    pub fn into_settings(self) -> Result<Settings> {
        ensure!(self.max_power > Watts::zero(), "maximum power must be positive");
        ensure!(
            self.noise_threshold.is_non_negative_finite(),
            "noise threshold must be a non-negative number",
        );
        let daylight = DaylightWindow::try_new(self.daylight_start, self.daylight_end)?;
        let coordinates = match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates::try_new(latitude, longitude)?),
            _ => None,
        };
        Ok(Settings::builder()
            .maybe_mode_override(self.mode_override())
            .test_mode(self.test)
            .paths(self.paths.into_paths(self.test))
            .inverter(self.inverter.into())
            .daylight(daylight)
            .maybe_coordinates(coordinates)
            .noise_threshold(self.noise_threshold)
            .max_power(self.max_power)
            .integration(self.integration)
            .labels(self.labels.try_into()?)
            .chart(self.chart.try_into()?)
            .build())
    }
}

fn parse_time(value: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(value, "%H:%M")
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_args() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults_ok() -> Result {
        let settings = Args::try_parse_from(["pvtally"])?.into_settings()?;
        assert_eq!(settings.mode_override, None);
        assert!(!settings.test_mode);
        assert_eq!(settings.daylight, DaylightWindow::default());
        assert_eq!(settings.coordinates, None);
        assert_eq!(settings.labels.string_name(2), "South Panels");
        assert_eq!(settings.paths.web, "/pvmon/data");
        Ok(())
    }

    #[test]
    fn forced_modes_ok() -> Result {
        let settings = Args::try_parse_from(["pvtally", "-e", "-t"])?.into_settings()?;
        assert_eq!(settings.mode_override, Some(Mode::EndOfDay));
        assert!(settings.test_mode);
        assert_eq!(settings.paths.live, settings.paths.archive);

        let settings = Args::try_parse_from(["pvtally", "--daytime"])?.into_settings()?;
        assert_eq!(settings.mode_override, Some(Mode::Daytime));
        Ok(())
    }

    #[test]
    fn test_mode_uses_test_path() -> Result {
        let settings =
            Args::try_parse_from(["pvtally", "-t", "--test-path", "/tmp/pvtally-test"])?.into_settings()?;
        assert!(settings.test_mode);
        assert_eq!(settings.paths.live, std::path::PathBuf::from("/tmp/pvtally-test"));
        assert_eq!(settings.paths.archive, settings.paths.live);

        let settings = Args::try_parse_from([
            "pvtally",
            "--live-path",
            "/tmp/live",
            "--archive-path",
            "/tmp/archive",
        ])?
        .into_settings()?;
        assert!(!settings.test_mode);
        assert_eq!(settings.paths.live, std::path::PathBuf::from("/tmp/live"));
        assert_eq!(settings.paths.archive, std::path::PathBuf::from("/tmp/archive"));
        Ok(())
    }

    #[test]
    fn coordinates_ok() -> Result {
        let settings = Args::try_parse_from(["pvtally", "--latitude", "52.37", "--longitude", "-4.89"])?
            .into_settings()?;
        assert_eq!(settings.coordinates, Some(Coordinates { latitude: 52.37, longitude: -4.89 }));

        assert!(Args::try_parse_from(["pvtally", "--latitude", "52.37"]).is_err());
        let args = Args::try_parse_from(["pvtally", "--latitude", "95", "--longitude", "0"])?;
        assert!(args.into_settings().is_err());
        Ok(())
    }

    #[test]
    fn conflicting_modes_rejected() {
        assert!(Args::try_parse_from(["pvtally", "-d", "-e"]).is_err());
    }

    #[test]
    fn inverted_window_rejected() -> Result {
        let args = Args::try_parse_from([
            "pvtally",
            "--daylight-start",
            "21:00",
            "--daylight-end",
            "05:00",
        ])?;
        assert!(args.into_settings().is_err());
        Ok(())
    }
}
