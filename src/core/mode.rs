use chrono::{DateTime, Days, Local, NaiveDate, NaiveTime};

use crate::{core::sun::Coordinates, prelude::*, quantity::power::Watts};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Mode {
    /// The inverter is generating: append to the live series.
    Daytime,

    /// Generation has stopped: close the day.
    EndOfDay,
}

/// Local time range in which the sun may plausibly be up.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DaylightWindow {
    /// Inclusive.
    pub start: NaiveTime,

    /// Exclusive.
    pub end: NaiveTime,
}

impl Default for DaylightWindow {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(4, 30, 0).unwrap_or(NaiveTime::MIN),
            end: NaiveTime::from_hms_opt(21, 30, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl DaylightWindow {
    pub fn try_new(start: NaiveTime, end: NaiveTime) -> Result<Self> {
        ensure!(start < end, "daylight window must start before it ends ({start}..{end})");
        Ok(Self { start, end })
    }

    #[must_use]
    pub fn contains(self, time: NaiveTime) -> bool {
        (self.start <= time) && (time < self.end)
    }
}

#[must_use]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Classification {
    pub mode: Mode,

    /// The day the mode applies to.
    pub day: NaiveDate,
}

/// Decides whether a run appends a sample or closes a day.
#[derive(Copy, Clone)]
pub struct Classifier {
    /// Used when the location is unknown or the sun does not set.
    pub window: DaylightWindow,

    /// Derive the window from the sunrise and sunset instead.
    pub coordinates: Option<Coordinates>,

    /// Output at or below this is considered noise.
    pub noise_threshold: Watts,
}

impl Classifier {
    /// The day's window: from sunrise to sunset when the location is known.
    pub fn window_on(&self, day: NaiveDate) -> DaylightWindow {
        self.coordinates
            .and_then(|coordinates| coordinates.sun_times(day))
            .and_then(|sun| DaylightWindow::try_new(sun.sunrise.time(), sun.sunset.time()).ok())
            .unwrap_or(self.window)
    }

    pub fn classify(
        &self,
        now: DateTime<Local>,
        power: Option<Watts>,
        mode_override: Option<Mode>,
    ) -> Classification {
        let window = self.window_on(now.date_naive());
        let mode = mode_override.unwrap_or_else(|| {
            let is_generating = power.is_some_and(|power| power > self.noise_threshold);
            if is_generating || window.contains(now.time()) {
                Mode::Daytime
            } else {
                Mode::EndOfDay
            }
        });
        let day = match mode {
            Mode::Daytime => now.date_naive(),
            Mode::EndOfDay => closing_day(now, window),
        };
        Classification { mode, day }
    }
}

/// Before the window opens, the last generating day is yesterday.
fn closing_day(now: DateTime<Local>, window: DaylightWindow) -> NaiveDate {
    let today = now.date_naive();
    if now.time() < window.start {
        today.checked_sub_days(Days::new(1)).unwrap_or(today)
    } else {
        today
    }
}
