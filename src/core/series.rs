use std::collections::BTreeMap;

use chrono::{DateTime, Local, NaiveDate, TimeDelta, Timelike};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    core::{
        integrator::{IntegrationMethod, Integrator},
        reading::StringReading,
    },
    quantity::{energy::KilowattHours, power::Watts},
};

/// Per-string data is kept at most once per bucket.
pub const STRING_BUCKET: TimeDelta = TimeDelta::minutes(5);

/// Result of pushing a sample into a series.
#[must_use]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Push {
    Appended,

    /// Not later than the last sample.
    Stale,

    /// Belongs to a different day.
    OtherDay,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    #[serde(rename = "timestamp")]
    pub timestamp: DateTime<Local>,

    #[serde(rename = "power_w")]
    pub power: Watts,

    /// Energy generated since the first sample of the day.
    #[serde(rename = "energy_kwh")]
    pub energy: KilowattHours,
}

/// Total AC output over one day.
#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub struct DailySeries {
    day: NaiveDate,
    samples: Vec<Sample>,
}

impl DailySeries {
    pub const fn new(day: NaiveDate) -> Self {
        Self { day, samples: Vec::new() }
    }

    pub const fn day(&self) -> NaiveDate {
        self.day
    }

    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    #[must_use]
    pub fn contains(&self, timestamp: DateTime<Local>) -> bool {
        self.samples.binary_search_by_key(&timestamp, |sample| sample.timestamp).is_ok()
    }

    /// Append the sample and extend the running energy total.
    pub fn push(
        &mut self,
        timestamp: DateTime<Local>,
        power: Watts,
        method: IntegrationMethod,
    ) -> Push {
        if timestamp.date_naive() != self.day {
            return Push::OtherDay;
        }
        let energy = match self.samples.last() {
            Some(last) if timestamp <= last.timestamp => return Push::Stale,
            Some(last) => {
                last.energy + method.integrate((last.timestamp, last.power), (timestamp, power)).value
            }
            None => KilowattHours::zero(),
        };
        self.samples.push(Sample { timestamp, power, energy });
        Push::Appended
    }

    pub fn energy(&self) -> KilowattHours {
        self.samples.last().map_or_else(KilowattHours::zero, |sample| sample.energy)
    }

    /// The earliest sample with the highest power.
    #[must_use]
    pub fn peak(&self) -> Option<&Sample> {
        self.samples.iter().fold(None, |peak, sample| match peak {
            Some(peak) if peak.power >= sample.power => Some(peak),
            _ => Some(sample),
        })
    }

    pub fn integrate(&self, method: IntegrationMethod) -> Integrator {
        let mut integrator = Integrator::default();
        for (from, to) in self.samples.iter().tuple_windows() {
            integrator += method.integrate((from.timestamp, from.power), (to.timestamp, to.power));
        }
        integrator
    }
}

#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub struct StringSample {
    pub timestamp: DateTime<Local>,
    pub strings: Vec<StringReading>,
}

impl StringSample {
    /// Power of the specified string, if it was sampled.
    #[must_use]
    pub fn power_of(&self, id: usize) -> Option<Watts> {
        self.strings.iter().find(|string| string.id == id).map(StringReading::power)
    }
}

/// Per-string DC values, at most one row per bucket.
#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub struct StringSeries {
    day: NaiveDate,
    rows: Vec<StringSample>,
}

impl StringSeries {
    pub const fn new(day: NaiveDate) -> Self {
        Self { day, rows: Vec::new() }
    }

    #[must_use]
    pub fn rows(&self) -> &[StringSample] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// String identifiers seen during the day, in order.
    #[must_use]
    pub fn string_ids(&self) -> Vec<usize> {
        self.rows
            .iter()
            .flat_map(|row| row.strings.iter().map(|string| string.id))
            .sorted_unstable()
            .dedup()
            .collect()
    }

    /// Whether a row at `timestamp` would open a new bucket.
    #[must_use]
    pub fn admits(&self, timestamp: DateTime<Local>) -> bool {
        timestamp.date_naive() == self.day
            && self.rows.last().is_none_or(|last| {
                (bucket_of(timestamp) > bucket_of(last.timestamp))
                    && (timestamp - last.timestamp >= STRING_BUCKET)
            })
    }

    pub fn push(&mut self, timestamp: DateTime<Local>, strings: Vec<StringReading>) -> Push {
        if timestamp.date_naive() != self.day {
            Push::OtherDay
        } else if self.admits(timestamp) {
            self.rows.push(StringSample { timestamp, strings });
            Push::Appended
        } else {
            Push::Stale
        }
    }

    /// Energy generated by each string over the day.
    #[must_use]
    pub fn energies(&self, method: IntegrationMethod) -> BTreeMap<usize, KilowattHours> {
        let mut energies: BTreeMap<usize, KilowattHours> =
            self.string_ids().into_iter().map(|id| (id, KilowattHours::zero())).collect();
        for (from, to) in self.rows.iter().tuple_windows() {
            for (id, energy) in &mut energies {
                if let (Some(from_power), Some(to_power)) = (from.power_of(*id), to.power_of(*id)) {
                    *energy += method
                        .integrate((from.timestamp, from_power), (to.timestamp, to_power))
                        .value;
                }
            }
        }
        energies
    }
}

/// Index of the bucket within its day.
fn bucket_of(timestamp: DateTime<Local>) -> u32 {
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let bucket_seconds = STRING_BUCKET.num_seconds() as u32;
    timestamp.num_seconds_from_midnight() / bucket_seconds
}
