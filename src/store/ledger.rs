//! `dailytotals.csv`: append-only, one row per closed day.

use std::{fs::OpenOptions, path::Path};

use chrono::NaiveDate;

use crate::{core::totals::DailyTotals, prelude::*};

#[must_use]
#[derive(Debug, Default)]
pub struct Ledger(Vec<DailyTotals>);

impl Ledger {
    /// Read the ledger, skipping malformed rows.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn read(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let mut reader = csv::Reader::from_path(path)?;
        let mut rows = Vec::new();
        for (index, record) in reader.deserialize::<DailyTotals>().enumerate() {
            match record {
                Ok(totals) => rows.push(totals),
                Err(error) if error.is_io_error() => {
                    return Err(error).context("failed to read the ledger");
                }
                Err(error) => {
                    warn!(row = index + 1, "skipping a malformed ledger row: {error:#}");
                }
            }
        }
        debug!(n_rows = rows.len(), "read");
        Ok(Self(rows))
    }

    /// The closed totals of the day, if any.
    #[must_use]
    pub fn find(&self, date: NaiveDate) -> Option<&DailyTotals> {
        self.0.iter().rev().find(|totals| totals.date == date)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Append a single row, writing the header first if the ledger is new.
    #[instrument(skip_all, fields(path = %path.display(), date = %totals.date))]
    pub fn append(path: &Path, totals: &DailyTotals) -> Result {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open `{}`", path.display()))?;
        let is_new = file.metadata()?.len() == 0;
        let mut writer = csv::WriterBuilder::new().has_headers(is_new).from_writer(file);
        writer.serialize(totals)?;
        writer.flush()?;
        writer.into_inner().map_err(|error| anyhow!("{error}"))?.sync_all()?;
        info!(energy = ?totals.energy, peak_power = ?totals.peak_power, "appended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::{Local, TimeZone};

    use super::*;
    use crate::quantity::{energy::KilowattHours, power::Watts};

    fn totals(day: u32, energy: f64) -> DailyTotals {
        DailyTotals {
            date: NaiveDate::from_ymd_opt(2026, 6, day).unwrap(),
            energy: KilowattHours(energy),
            peak_power: Watts(3120.0),
            peak_at: Some(Local.with_ymd_and_hms(2026, 6, day, 13, 2, 0).unwrap()),
        }
    }

    #[test]
    fn append_then_read_ok() -> Result {
        let directory = tempfile::tempdir()?;
        let path = directory.path().join("dailytotals.csv");
        assert_eq!(Ledger::read(&path)?.len(), 0);

        Ledger::append(&path, &totals(1, 21.5))?;
        Ledger::append(&path, &totals(2, 18.25))?;

        let contents = fs::read_to_string(&path)?;
        assert_eq!(contents.lines().count(), 3, "header and two rows");
        let ledger = Ledger::read(&path)?;
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.find(totals(2, 0.0).date), Some(&totals(2, 18.25)));
        assert!(ledger.find(NaiveDate::from_ymd_opt(2026, 6, 3).unwrap()).is_none());
        Ok(())
    }

    #[test]
    fn malformed_rows_are_skipped() -> Result {
        let directory = tempfile::tempdir()?;
        let path = directory.path().join("dailytotals.csv");
        Ledger::append(&path, &totals(1, 21.5))?;
        fs::write(&path, format!("{}garbage,row\n", fs::read_to_string(&path)?))?;
        Ledger::append(&path, &totals(2, 18.25))?;

        let ledger = Ledger::read(&path)?;
        assert_eq!(ledger.len(), 2);
        Ok(())
    }

    #[test]
    fn empty_peak_time_ok() -> Result {
        let directory = tempfile::tempdir()?;
        let path = directory.path().join("dailytotals.csv");
        let totals = DailyTotals::zero(NaiveDate::from_ymd_opt(2026, 6, 1).unwrap());
        Ledger::append(&path, &totals)?;
        assert_eq!(Ledger::read(&path)?.find(totals.date), Some(&totals));
        Ok(())
    }
}
