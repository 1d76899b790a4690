//! One cron invocation: fetch, classify, and either append a sample or close the day.

use chrono::{DateTime, Local, NaiveDate, TimeDelta};

use crate::{
    api::ReadingSource,
    core::{
        aggregator::{DayState, Finalization, SampleOutcome},
        mode::Mode,
        reading::Reading,
        totals::DailyTotals,
    },
    error::RunError,
    prelude::*,
    render::{ChartKind, render_chart},
    settings::Settings,
    store::Store,
    tables::build_day_table,
};

/// A daytime run this long after the window start expects earlier samples.
const LATE_START: TimeDelta = TimeDelta::minutes(30);

#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub enum RunOutcome {
    Sampled(SampleOutcome),
    Closed(DailyTotals),
    AlreadyClosed(NaiveDate),
    NothingToClose(NaiveDate),
}

#[instrument(skip_all, fields(now = %now))]
pub async fn run<S: ReadingSource + ?Sized>(
    settings: &Settings,
    store: &Store,
    source: &S,
    now: DateTime<Local>,
) -> Result<RunOutcome, RunError> {
    let _lock = store.try_lock().map_err(RunError::Configuration)?.ok_or(RunError::Conflict)?;

    let reading = if settings.mode_override == Some(Mode::EndOfDay) {
        info!("forced end of day, not contacting the inverter");
        None
    } else {
        Some(source.fetch().await.map_err(RunError::Fetch)?)
    };

    let classification = settings.classifier().classify(
        now,
        reading.as_ref().map(|reading| reading.power),
        settings.mode_override,
    );
    info!(mode = ?classification.mode, day = %classification.day, "classified");

    match (classification.mode, reading) {
        (Mode::Daytime, Some(reading)) => {
            run_daytime(settings, store, classification.day, &reading, now)
        }
        (Mode::EndOfDay, _) => run_end_of_day(settings, store, classification.day, now),
        (Mode::Daytime, None) => {
            Err(RunError::Configuration(anyhow!("daytime run without a reading")))
        }
    }
}

fn run_daytime(
    settings: &Settings,
    store: &Store,
    day: NaiveDate,
    reading: &Reading,
    now: DateTime<Local>,
) -> Result<RunOutcome, RunError> {
    if reading.day() != day {
        warn!(reading_day = %reading.day(), "the inverter clock disagrees with the local clock");
    }
    let ledger = store.read_ledger().map_err(RunError::Configuration)?;
    if let Some(totals) = ledger.find(day) {
        info!(energy = %totals.energy, "the day is closed already, leaving it as is");
        return Ok(RunOutcome::Sampled(SampleOutcome::DayClosed));
    }

    let mut state = store.load_day(day, settings.integration);
    let window = settings.classifier().window_on(day);
    if state.series.is_empty() && now.time() > window.start + LATE_START {
        info!("no earlier samples today, the previous runs must have failed");
    }

    let outcome = settings.aggregator().apply_daytime_sample(&mut state, reading);
    if matches!(outcome, SampleOutcome::Appended { .. }) {
        store.save_day(&state).map_err(RunError::Configuration)?;
        if state.series.len() >= 2 {
            let kind = ChartKind::Live { current_power: reading.power };
            if let Err(error) = publish_chart(settings, &state, kind, &store.live_chart_path(), now) {
                warn!("failed to update the live chart: {error:#}");
            }
        }
    }
    Ok(RunOutcome::Sampled(outcome))
}

fn run_end_of_day(
    settings: &Settings,
    store: &Store,
    day: NaiveDate,
    now: DateTime<Local>,
) -> Result<RunOutcome, RunError> {
    let ledger = store.read_ledger().map_err(RunError::Configuration)?;
    debug!(n_closed_days = ledger.len(), "read the ledger");
    let state = store.load_day(day, settings.integration);
    let summary_chart_path = store.summary_chart_path(day);

    match settings.aggregator().finalize_day(&state, ledger.find(day)) {
        Finalization::Closed(totals) => {
            store.append_to_ledger(&totals).map_err(RunError::Configuration)?;
            info!(energy = %totals.energy, peak_power = %totals.peak_power, "closed the day");
            if let Err(error) = publish_summary(settings, store, &state, now) {
                warn!("failed to publish the summary: {error:#}");
            }
            println!("{}", build_day_table(&state, &totals, settings));
            Ok(RunOutcome::Closed(totals))
        }

        Finalization::AlreadyClosed(totals) => {
            let is_forced = settings.mode_override == Some(Mode::EndOfDay);
            if summary_chart_path.exists() {
                info!(path = %summary_chart_path.display(), "summary chart exists");
            }
            if is_forced || !summary_chart_path.exists() {
                if let Err(error) = publish_summary(settings, store, &state, now) {
                    warn!("failed to publish the summary: {error:#}");
                }
            }
            debug!(energy = %totals.energy, "already closed");
            Ok(RunOutcome::AlreadyClosed(day))
        }

        Finalization::NothingToClose => {
            info!("no samples, nothing to close");
            Ok(RunOutcome::NothingToClose(day))
        }
    }
}

/// Draw the summary chart and list it in the history.
fn publish_summary(
    settings: &Settings,
    store: &Store,
    state: &DayState,
    now: DateTime<Local>,
) -> Result {
    let day = state.day();
    publish_chart(settings, state, ChartKind::Summary, &store.summary_chart_path(day), now)?;
    if store.prepend_to_history(day)? {
        info!("listed in the history");
    }
    Ok(())
}

#[instrument(skip_all, fields(path = %path.display()))]
fn publish_chart(
    settings: &Settings,
    state: &DayState,
    kind: ChartKind,
    path: &std::path::Path,
    now: DateTime<Local>,
) -> Result {
    Store::write_chart(path, |target| render_chart(state, settings, kind, now, target))?;
    debug!("written");
    Ok(())
}
