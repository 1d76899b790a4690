//! Day-state store: the files that carry state from one run to the next.

mod atomic;
mod day_file;
pub mod history;
pub mod ledger;
mod lock;
mod string_file;

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;

pub use self::{ledger::Ledger, lock::StoreLock};
use crate::{
    core::{
        aggregator::DayState,
        integrator::IntegrationMethod,
        series::{DailySeries, StringSeries},
        totals::DailyTotals,
    },
    prelude::*,
    settings::Paths,
};

const LOCK_FILE_NAME: &str = ".pvtally.lock";
const LEDGER_FILE_NAME: &str = "dailytotals.csv";
const LIVE_CHART_FILE_NAME: &str = "currentPwr.png";
const HISTORY_FILE_NAME: &str = "history.html";
const CORRUPT_SUFFIX: &str = "corrupt";

pub struct Store {
    paths: Paths,
}

impl Store {
    /// Make sure the output directories exist.
    #[instrument(skip_all, fields(live = %paths.live.display(), archive = %paths.archive.display()))]
    pub fn open(paths: &Paths) -> Result<Self> {
        for directory in [&paths.live, &paths.archive] {
            fs::create_dir_all(directory)
                .with_context(|| format!("failed to create `{}`", directory.display()))?;
        }
        Ok(Self { paths: paths.clone() })
    }

    pub fn try_lock(&self) -> Result<Option<StoreLock>> {
        StoreLock::try_acquire(&self.paths.archive.join(LOCK_FILE_NAME))
    }

    #[must_use]
    pub fn day_path(&self, day: NaiveDate) -> PathBuf {
        self.paths.archive.join(format!("{day}.csv"))
    }

    #[must_use]
    pub fn strings_path(&self, day: NaiveDate) -> PathBuf {
        self.paths.archive.join(format!("{day}-string.csv"))
    }

    #[must_use]
    pub fn summary_chart_file_name(day: NaiveDate) -> String {
        format!("{day}.png")
    }

    #[must_use]
    pub fn summary_chart_path(&self, day: NaiveDate) -> PathBuf {
        self.paths.archive.join(Self::summary_chart_file_name(day))
    }

    #[must_use]
    pub fn live_chart_path(&self) -> PathBuf {
        self.paths.live.join(LIVE_CHART_FILE_NAME)
    }

    #[must_use]
    pub fn ledger_path(&self) -> PathBuf {
        self.paths.archive.join(LEDGER_FILE_NAME)
    }

    #[must_use]
    pub fn history_path(&self) -> PathBuf {
        self.paths.live.join(HISTORY_FILE_NAME)
    }

    /// Load the day, starting afresh from whatever turns out unreadable.
    ///
    /// Unreadable files are moved aside with the `.corrupt` suffix, so that the next write does
    /// not silently destroy them.
    #[instrument(skip_all, fields(day = %day))]
    pub fn load_day(&self, day: NaiveDate, method: IntegrationMethod) -> DayState {
        let day_path = self.day_path(day);
        let series = match day_file::read(&day_path, day, method) {
            Ok(Some(series)) => series,
            Ok(None) => {
                info!("starting a new day");
                DailySeries::new(day)
            }
            Err(error) => {
                warn!(path = %day_path.display(), "corrupt day series, starting afresh: {error:#}");
                Self::quarantine(&day_path);
                DailySeries::new(day)
            }
        };

        let strings_path = self.strings_path(day);
        let strings = match string_file::read(&strings_path, day) {
            Ok(Some(strings))
                if strings.rows().iter().all(|row| series.contains(row.timestamp)) =>
            {
                strings
            }
            Ok(Some(_)) => {
                warn!(path = %strings_path.display(), "string series does not match the day series, starting afresh");
                Self::quarantine(&strings_path);
                StringSeries::new(day)
            }
            Ok(None) => {
                if !series.is_empty() {
                    info!(path = %strings_path.display(), "string series is missing");
                }
                StringSeries::new(day)
            }
            Err(error) => {
                warn!(path = %strings_path.display(), "corrupt string series, starting afresh: {error:#}");
                Self::quarantine(&strings_path);
                StringSeries::new(day)
            }
        };

        debug!(n_samples = series.len(), n_string_samples = strings.len(), "loaded");
        DayState { series, strings }
    }

    #[instrument(skip_all, fields(day = %state.day()))]
    pub fn save_day(&self, state: &DayState) -> Result {
        day_file::write(&self.day_path(state.day()), &state.series)?;
        string_file::write(&self.strings_path(state.day()), &state.strings)?;
        debug!(n_samples = state.series.len(), n_string_samples = state.strings.len(), "saved");
        Ok(())
    }

    pub fn read_ledger(&self) -> Result<Ledger> {
        Ledger::read(&self.ledger_path())
    }

    pub fn append_to_ledger(&self, totals: &DailyTotals) -> Result {
        Ledger::append(&self.ledger_path(), totals)
    }

    /// List the day's summary chart on top of `history.html`.
    pub fn prepend_to_history(&self, day: NaiveDate) -> Result<bool> {
        let entry = history::entry(&self.paths.web, day, &Self::summary_chart_file_name(day));
        history::prepend(&self.history_path(), day, &entry)
    }

    /// Let `draw` write the chart into a temporary file, then move it into place.
    pub fn write_chart(path: &Path, draw: impl FnOnce(&Path) -> Result) -> Result {
        atomic::replace_atomically(path, draw)
    }

    /// Earlier corrupt copies are kept: `x.csv.corrupt`, then `x.csv.1.corrupt`, and so on.
    fn quarantine(path: &Path) {
        let extension = path.extension().and_then(|extension| extension.to_str()).unwrap_or_default();
        let Some(target) = (0_u32..)
            .map(|n| match n {
                0 => path.with_extension(format!("{extension}.{CORRUPT_SUFFIX}")),
                n => path.with_extension(format!("{extension}.{n}.{CORRUPT_SUFFIX}")),
            })
            .find(|target| !target.exists())
        else {
            warn!("no free name to move `{}` aside", path.display());
            return;
        };
        match fs::rename(path, &target) {
            Ok(()) => warn!(target = %target.display(), "moved aside"),
            Err(error) => warn!("failed to move `{}` aside: {error:#}", path.display()),
        }
    }
}
