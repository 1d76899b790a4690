//! `YYYY-MM-DD-string.csv`: per-string DC values, one row per bucket.
//!
//! The width depends on the number of strings, so the columns are named after the string IDs:
//! `timestamp,string_1_current_a,string_1_voltage_v,string_1_power_w,string_2_current_a,…`

use std::{collections::BTreeMap, path::Path};

use chrono::{DateTime, Local, NaiveDate};
use csv::StringRecord;

use crate::{
    core::{
        reading::StringReading,
        series::{Push, StringSeries},
    },
    prelude::*,
    quantity::electric::{Amperes, Volts},
    store::atomic::write_atomically,
};

const CURRENT_SUFFIX: &str = "_current_a";
const VOLTAGE_SUFFIX: &str = "_voltage_v";
const POWER_SUFFIX: &str = "_power_w";

/// Read the string series, `None` if there is no file yet.
pub fn read(path: &Path, day: NaiveDate) -> Result<Option<StringSeries>> {
    if !path.is_file() {
        return Ok(None);
    }
    let mut reader = csv::Reader::from_path(path)?;
    let mut series = StringSeries::new(day);
    if reader.headers()?.is_empty() {
        return Ok(Some(series));
    }
    let columns = Columns::parse(reader.headers()?)?;
    for (index, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("malformed row #{}", index + 1))?;
        let (timestamp, strings) =
            columns.parse_row(&record).with_context(|| format!("malformed row #{}", index + 1))?;
        let push = series.push(timestamp, strings);
        ensure!(
            push == Push::Appended,
            "row #{} at {timestamp} does not open a new bucket ({push:?})",
            index + 1,
        );
    }
    Ok(Some(series))
}

pub fn write(path: &Path, series: &StringSeries) -> Result {
    let ids = series.string_ids();
    let mut writer = csv::Writer::from_writer(Vec::new());
    if !series.is_empty() {
        let mut header = vec!["timestamp".to_owned()];
        for id in &ids {
            header.push(format!("string_{id}{CURRENT_SUFFIX}"));
            header.push(format!("string_{id}{VOLTAGE_SUFFIX}"));
            header.push(format!("string_{id}{POWER_SUFFIX}"));
        }
        writer.write_record(&header)?;
    }
    for row in series.rows() {
        let mut record = vec![row.timestamp.to_rfc3339()];
        for id in &ids {
            match row.strings.iter().find(|string| string.id == *id) {
                Some(string) => {
                    record.push(string.current.0.to_string());
                    record.push(string.voltage.0.to_string());
                    record.push(format!("{:.0}", string.power().0));
                }
                None => record.extend([String::new(), String::new(), String::new()]),
            }
        }
        writer.write_record(&record)?;
    }
    write_atomically(path, &writer.into_inner()?)
}

/// Column indices of each string's current and voltage.
struct Columns(BTreeMap<usize, (usize, usize)>);

impl Columns {
    fn parse(header: &StringRecord) -> Result<Self> {
        ensure!(header.get(0) == Some("timestamp"), "the first column must be `timestamp`");
        let mut currents = BTreeMap::new();
        let mut voltages = BTreeMap::new();
        for (index, name) in header.iter().enumerate().skip(1) {
            if let Some(id) = parse_string_id(name, CURRENT_SUFFIX) {
                currents.insert(id?, index);
            } else if let Some(id) = parse_string_id(name, VOLTAGE_SUFFIX) {
                voltages.insert(id?, index);
            }
        }
        let mut columns = BTreeMap::new();
        for (id, current_index) in currents {
            let voltage_index =
                voltages.remove(&id).with_context(|| format!("string #{id} has no voltage column"))?;
            columns.insert(id, (current_index, voltage_index));
        }
        ensure!(voltages.is_empty(), "some strings have no current column");
        Ok(Self(columns))
    }

    fn parse_row(&self, record: &StringRecord) -> Result<(DateTime<Local>, Vec<StringReading>)> {
        let timestamp = DateTime::parse_from_rfc3339(record.get(0).context("missing timestamp")?)?
            .with_timezone(&Local);
        let mut strings = Vec::with_capacity(self.0.len());
        for (&id, &(current_index, voltage_index)) in &self.0 {
            let current = record.get(current_index).unwrap_or_default();
            let voltage = record.get(voltage_index).unwrap_or_default();
            if current.is_empty() && voltage.is_empty() {
                continue;
            }
            strings.push(
                StringReading::builder()
                    .id(id)
                    .current(Amperes(current.parse()?))
                    .voltage(Volts(voltage.parse()?))
                    .build(),
            );
        }
        Ok((timestamp, strings))
    }
}

fn parse_string_id(name: &str, suffix: &str) -> Option<Result<usize>> {
    let id = name.strip_prefix("string_")?.strip_suffix(suffix)?;
    Some(id.parse().with_context(|| format!("invalid string column `{name}`")))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::TimeZone;

    use super::*;

    fn string(id: usize, current: f64) -> StringReading {
        StringReading::builder().id(id).current(Amperes(current)).voltage(Volts(410.5)).build()
    }

    #[test]
    fn write_then_read_ok() -> Result {
        let directory = tempfile::tempdir()?;
        let day = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let path = directory.path().join("2026-06-01-string.csv");

        let mut series = StringSeries::new(day);
        let _ = series.push(
            Local.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap(),
            vec![string(1, 1.25), string(2, 0.5)],
        );
        let _ = series.push(Local.with_ymd_and_hms(2026, 6, 1, 9, 5, 0).unwrap(), vec![string(2, 3.0)]);
        write(&path, &series)?;

        let contents = fs::read_to_string(&path)?;
        assert!(contents.starts_with(
            "timestamp,string_1_current_a,string_1_voltage_v,string_1_power_w,\
             string_2_current_a,string_2_voltage_v,string_2_power_w\n"
        ));
        assert_eq!(read(&path, day)?, Some(series));
        Ok(())
    }

    #[test]
    fn empty_series_ok() -> Result {
        let directory = tempfile::tempdir()?;
        let day = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let path = directory.path().join("2026-06-01-string.csv");
        write(&path, &StringSeries::new(day))?;
        assert_eq!(fs::read_to_string(&path)?, "");
        assert_eq!(read(&path, day)?, Some(StringSeries::new(day)));
        Ok(())
    }

    #[test]
    fn same_bucket_rows_are_an_error() -> Result {
        let directory = tempfile::tempdir()?;
        let day = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let path = directory.path().join("2026-06-01-string.csv");
        let first = Local.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap();
        let second = Local.with_ymd_and_hms(2026, 6, 1, 9, 3, 0).unwrap();
        fs::write(
            &path,
            format!(
                "timestamp,string_1_current_a,string_1_voltage_v\n{},1,400\n{},1,400\n",
                first.to_rfc3339(),
                second.to_rfc3339(),
            ),
        )?;
        assert!(read(&path, day).is_err());
        Ok(())
    }
}
