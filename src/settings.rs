use std::{path::PathBuf, time::Duration};

use bon::Builder;
use reqwest::Url;

use crate::{
    core::{
        aggregator::Aggregator,
        integrator::IntegrationMethod,
        mode::{Classifier, DaylightWindow, Mode},
        sun::Coordinates,
    },
    quantity::{cost::KilowattHourRate, power::Watts},
};

/// Immutable run configuration, built once at start-up.
#[must_use]
#[derive(Clone, Debug, Builder)]
pub struct Settings {
    /// Forced mode, bypassing the classifier.
    pub mode_override: Option<Mode>,

    /// Marks the charts as produced by test runs.
    #[builder(default)]
    pub test_mode: bool,

    pub paths: Paths,

    #[builder(default)]
    pub inverter: InverterSettings,

    #[builder(default)]
    pub daylight: DaylightWindow,

    /// Follow the sunrise and sunset here instead of the fixed window.
    pub coordinates: Option<Coordinates>,

    #[builder(default = Watts(10.0))]
    pub noise_threshold: Watts,

    #[builder(default = Watts(10_000.0))]
    pub max_power: Watts,

    #[builder(default)]
    pub integration: IntegrationMethod,

    #[builder(default)]
    pub labels: Labels,

    #[builder(default)]
    pub chart: ChartScale,
}

impl Settings {
    pub const fn classifier(&self) -> Classifier {
        Classifier {
            window: self.daylight,
            coordinates: self.coordinates,
            noise_threshold: self.noise_threshold,
        }
    }

    pub const fn aggregator(&self) -> Aggregator {
        Aggregator { method: self.integration, max_power: self.max_power }
    }
}

#[must_use]
#[derive(Clone, Debug)]
pub struct InverterSettings {
    /// Base URL of the inverter, for example `http://192.168.1.123`.
    pub url: Url,

    pub timeout: Duration,
}

impl Default for InverterSettings {
    fn default() -> Self {
        Self {
            url: Url::parse("http://192.168.1.123").expect("the default inverter URL is valid"),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Where the files go.
#[must_use]
#[derive(Clone, Debug)]
pub struct Paths {
    /// Live chart and `history.html`.
    pub live: PathBuf,

    /// Per-day files, the ledger, and the summary charts.
    pub archive: PathBuf,

    /// Public URL path of the archive, used in `history.html`.
    pub web: String,
}

impl Paths {
    /// Everything in a single directory.
    pub fn single(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self { live: path.clone(), archive: path, web: ".".to_owned() }
    }
}

/// Human-facing annotations.
#[must_use]
#[derive(Clone, Debug)]
pub struct Labels {
    /// System name on the charts.
    pub location: String,

    /// String names, the first one is string #1.
    pub strings: Vec<String>,

    pub currency: String,

    /// Value of a kilowatt-hour, saved or earned.
    pub value_per_kwh: KilowattHourRate,

    /// For example, `Saved` or `Earned`.
    pub value_label: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            location: "My House".to_owned(),
            strings: vec!["East Panels".to_owned(), "South Panels".to_owned()],
            currency: "£".to_owned(),
            value_per_kwh: KilowattHourRate(0.1872),
            value_label: "Saved".to_owned(),
        }
    }
}

impl Labels {
    /// Name of the one-based string.
    #[must_use]
    pub fn string_name(&self, id: usize) -> String {
        id.checked_sub(1)
            .and_then(|index| self.strings.get(index))
            .cloned()
            .unwrap_or_else(|| format!("String {id}"))
    }
}

/// Vertical axis of the charts.
#[must_use]
#[derive(Copy, Clone, Debug)]
pub struct ChartScale {
    pub min: Watts,
    pub max: Watts,
    pub step: Watts,
}

impl Default for ChartScale {
    fn default() -> Self {
        Self { min: Watts(0.0), max: Watts(5250.0), step: Watts(250.0) }
    }
}
