//! `history.html`: summary chart links, newest first.

use std::{fs, path::Path};

use chrono::NaiveDate;

use crate::{prelude::*, store::atomic::write_atomically};

/// Markup of the day's entry.
#[must_use]
pub fn entry(web_path: &str, day: NaiveDate, chart_file_name: &str) -> String {
    let web_path = web_path.trim_end_matches('/');
    format!(r#"<p style="text-align:center;"><img src="{web_path}/{chart_file_name}" alt="{day}"></p>"#)
}

/// Put the day's entry on top, unless it is listed already.
///
/// Returns whether the file changed.
#[instrument(skip_all, fields(path = %path.display(), day = %day))]
pub fn prepend(path: &Path, day: NaiveDate, entry: &str) -> Result<bool> {
    let existing = if path.is_file() {
        fs::read_to_string(path).with_context(|| format!("failed to read `{}`", path.display()))?
    } else {
        String::new()
    };
    let marker = format!(r#"alt="{day}""#);
    if existing.lines().any(|line| line.contains(&marker)) {
        debug!("already listed");
        return Ok(false);
    }
    write_atomically(path, format!("{entry}\n{existing}").as_bytes())?;
    info!("prepended");
    Ok(true)
}
