use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{
    core::series::DailySeries,
    quantity::{energy::KilowattHours, power::Watts},
};

/// One ledger row: the day's energy and peak output.
#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyTotals {
    #[serde(rename = "date")]
    pub date: NaiveDate,

    #[serde(rename = "energy_kwh")]
    pub energy: KilowattHours,

    #[serde(rename = "peak_power_w")]
    pub peak_power: Watts,

    #[serde(rename = "peak_at")]
    pub peak_at: Option<DateTime<Local>>,
}

impl DailyTotals {
    /// Totals of an empty day.
    pub const fn zero(date: NaiveDate) -> Self {
        Self { date, energy: KilowattHours(0.0), peak_power: Watts(0.0), peak_at: None }
    }

    /// Running totals derived from the series so far.
    pub fn from_series(series: &DailySeries) -> Self {
        let mut totals = Self::zero(series.day());
        totals.energy = series.energy().round_to_watt_hours();
        if let Some(peak) = series.peak() {
            totals.peak_power = peak.power;
            totals.peak_at = Some(peak.timestamp);
        }
        totals
    }
}
