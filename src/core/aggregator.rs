use chrono::NaiveDate;

use crate::{
    core::{
        integrator::IntegrationMethod,
        reading::{Reading, StringReading},
        series::{DailySeries, Push, StringSeries},
        totals::DailyTotals,
    },
    prelude::*,
    quantity::power::Watts,
};

/// Everything accumulated for a single day.
#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub struct DayState {
    pub series: DailySeries,
    pub strings: StringSeries,
}

impl DayState {
    pub const fn new(day: NaiveDate) -> Self {
        Self { series: DailySeries::new(day), strings: StringSeries::new(day) }
    }

    pub const fn day(&self) -> NaiveDate {
        self.series.day()
    }

    /// The in-progress totals row.
    pub fn totals(&self) -> DailyTotals {
        DailyTotals::from_series(&self.series)
    }
}

#[must_use]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SampleOutcome {
    Appended {
        /// Whether the string series gained a row as well.
        with_strings: bool,
    },

    /// The sample's minute is already stored.
    Duplicate,

    /// Outside of physical bounds, discarded.
    Implausible,

    /// The reading belongs to another day than the state.
    OtherDay,

    /// The day is in the ledger already and stays as it was closed.
    DayClosed,
}

#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub enum Finalization {
    /// The day has just been closed with these totals.
    Closed(DailyTotals),

    /// The day had been closed by an earlier run.
    AlreadyClosed(DailyTotals),

    /// There were no samples for the day.
    NothingToClose,
}

/// Merges readings into the day state.
#[derive(Copy, Clone)]
pub struct Aggregator {
    pub method: IntegrationMethod,

    /// Readings above this are discarded.
    pub max_power: Watts,
}

impl Aggregator {
    #[instrument(skip_all, fields(timestamp = %reading.timestamp, power = ?reading.power))]
    pub fn apply_daytime_sample(&self, state: &mut DayState, reading: &Reading) -> SampleOutcome {
        if !reading.power.is_non_negative_finite() || reading.power > self.max_power {
            warn!(max_power = ?self.max_power, "implausible power, discarding the sample");
            return SampleOutcome::Implausible;
        }

        let timestamp = reading.minute();
        match state.series.push(timestamp, reading.power, self.method) {
            Push::Appended => {}
            Push::Stale => {
                info!(last = ?state.series.last().map(|sample| sample.timestamp), "already sampled");
                return SampleOutcome::Duplicate;
            }
            Push::OtherDay => {
                warn!(day = %state.day(), "the reading belongs to another day");
                return SampleOutcome::OtherDay;
            }
        }

        let with_strings = if reading.strings.is_empty() {
            false
        } else if !reading.strings.iter().all(StringReading::is_plausible) {
            warn!(strings = ?reading.strings, "implausible string values, skipping them");
            false
        } else {
            state.strings.push(timestamp, reading.strings.clone()) == Push::Appended
        };

        debug!(n_samples = state.series.len(), with_strings, "appended");
        SampleOutcome::Appended { with_strings }
    }

    /// Close the day unless `closed` says it has been closed already.
    pub fn finalize_day(&self, state: &DayState, closed: Option<&DailyTotals>) -> Finalization {
        if let Some(closed) = closed {
            Finalization::AlreadyClosed(closed.clone())
        } else if state.series.is_empty() {
            Finalization::NothingToClose
        } else {
            Finalization::Closed(state.totals())
        }
    }
}
