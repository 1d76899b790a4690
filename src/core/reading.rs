use bon::Builder;
use chrono::{DateTime, Local, NaiveDate, Timelike};

use crate::quantity::{
    electric::{Amperes, Volts},
    power::Watts,
};

/// Instantaneous inverter snapshot.
#[must_use]
#[derive(Clone, Debug, PartialEq, Builder)]
pub struct Reading {
    pub timestamp: DateTime<Local>,

    /// Total AC output.
    pub power: Watts,

    #[builder(default)]
    pub strings: Vec<StringReading>,
}

impl Reading {
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Sample timestamp: the reading time truncated to the whole minute.
    pub fn minute(&self) -> DateTime<Local> {
        truncate_to_minute(self.timestamp)
    }
}

/// DC values of a single PV string.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Builder)]
pub struct StringReading {
    /// One-based string number as the inverter counts them.
    pub id: usize,

    pub current: Amperes,
    pub voltage: Volts,
}

impl StringReading {
    pub fn power(&self) -> Watts {
        self.current * self.voltage
    }

    pub const fn is_plausible(&self) -> bool {
        self.current.is_non_negative_finite() && self.voltage.is_non_negative_finite()
    }
}

pub fn truncate_to_minute(timestamp: DateTime<Local>) -> DateTime<Local> {
    timestamp.with_nanosecond(0).and_then(|it| it.with_second(0)).unwrap_or(timestamp)
}
