//! `YYYY-MM-DD.csv`: one row per sampled minute.

use std::path::Path;

use chrono::NaiveDate;

use crate::{
    core::{
        integrator::IntegrationMethod,
        series::{DailySeries, Push, Sample},
    },
    prelude::*,
    store::atomic::write_atomically,
};

/// Read the day series, `None` if there is no file yet.
///
/// The running energy is recomputed from the stored power values.
pub fn read(path: &Path, day: NaiveDate, method: IntegrationMethod) -> Result<Option<DailySeries>> {
    if !path.is_file() {
        return Ok(None);
    }
    let mut reader = csv::Reader::from_path(path)?;
    let mut series = DailySeries::new(day);
    for (index, record) in reader.deserialize::<Sample>().enumerate() {
        let sample = record.with_context(|| format!("malformed row #{}", index + 1))?;
        let push = series.push(sample.timestamp, sample.power, method);
        ensure!(
            push == Push::Appended,
            "row #{} at {} does not extend the series ({push:?})",
            index + 1,
            sample.timestamp,
        );
    }
    Ok(Some(series))
}

pub fn write(path: &Path, series: &DailySeries) -> Result {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for sample in series.samples() {
        writer.serialize(sample)?;
    }
    write_atomically(path, &writer.into_inner()?)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::{Local, TimeZone};

    use super::*;
    use crate::quantity::power::Watts;

    #[test]
    fn missing_file_ok() -> Result {
        let directory = tempfile::tempdir()?;
        let day = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let path = directory.path().join("2026-06-01.csv");
        assert!(read(&path, day, IntegrationMethod::Trapezoid)?.is_none());
        Ok(())
    }

    #[test]
    fn write_then_read_ok() -> Result {
        let directory = tempfile::tempdir()?;
        let day = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let path = directory.path().join("2026-06-01.csv");
        let method = IntegrationMethod::Trapezoid;

        let mut series = DailySeries::new(day);
        let _ = series.push(Local.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap(), Watts(0.0), method);
        let _ =
            series.push(Local.with_ymd_and_hms(2026, 6, 1, 9, 1, 0).unwrap(), Watts(1200.0), method);
        write(&path, &series)?;

        assert!(fs::read_to_string(&path)?.starts_with("timestamp,power_w,energy_kwh\n"));
        assert_eq!(read(&path, day, method)?, Some(series));
        Ok(())
    }

    #[test]
    fn garbage_is_an_error() -> Result {
        let directory = tempfile::tempdir()?;
        let day = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let path = directory.path().join("2026-06-01.csv");
        fs::write(&path, "timestamp,power_w,energy_kwh\nyesterday,lots,\n")?;
        assert!(read(&path, day, IntegrationMethod::Trapezoid).is_err());
        Ok(())
    }

    #[test]
    fn unordered_rows_are_an_error() -> Result {
        let directory = tempfile::tempdir()?;
        let day = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let path = directory.path().join("2026-06-01.csv");
        let first = Local.with_ymd_and_hms(2026, 6, 1, 9, 1, 0).unwrap();
        let second = Local.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap();
        fs::write(
            &path,
            format!(
                "timestamp,power_w,energy_kwh\n{},100,0\n{},100,0\n",
                first.to_rfc3339(),
                second.to_rfc3339(),
            ),
        )?;
        assert!(read(&path, day, IntegrationMethod::Trapezoid).is_err());
        Ok(())
    }
}
