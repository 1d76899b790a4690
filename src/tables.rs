use std::time::Duration;

use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};
use humantime::format_duration;

use crate::{
    core::{aggregator::DayState, totals::DailyTotals},
    settings::Settings,
};

/// Summary of a freshly closed day.
pub fn build_day_table(state: &DayState, totals: &DailyTotals, settings: &Settings) -> Table {
    let labels = &settings.labels;
    let value = totals.energy * labels.value_per_kwh;
    let integrated = state.series.integrate(settings.integration);

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table.set_header(vec![Cell::new(&labels.location), Cell::new(totals.date)]);
    table.add_row(vec![
        Cell::new("Generated"),
        Cell::new(format!("{:.3} kWh", totals.energy.0))
            .set_alignment(CellAlignment::Right)
            .add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new(&labels.value_label),
        Cell::new(format!("{}{:.2}", labels.currency, value.0))
            .set_alignment(CellAlignment::Right)
            .fg(Color::Green),
    ]);
    table.add_row(vec![
        Cell::new("Peak"),
        Cell::new(format!("{:.0} W", totals.peak_power.0)).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("Peak at"),
        Cell::new(totals.peak_at.map_or_else(|| "-".to_owned(), |at| at.format("%H:%M").to_string()))
            .set_alignment(CellAlignment::Right)
            .add_attribute(Attribute::Dim),
    ]);
    if let Some(average) = integrated.average() {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let minutes = (integrated.hours.0 * 60.0).round().max(0.0) as u64;
        table.add_row(vec![
            Cell::new(format!("Average over {}", format_duration(Duration::from_secs(minutes * 60)))),
            Cell::new(format!("{:.3} kW", average.0)).set_alignment(CellAlignment::Right),
        ]);
    }
    table.add_row(vec![
        Cell::new("Samples"),
        Cell::new(state.series.len()).set_alignment(CellAlignment::Right).add_attribute(Attribute::Dim),
    ]);
    for (id, energy) in state.strings.energies(settings.integration) {
        table.add_row(vec![
            Cell::new(labels.string_name(id)),
            Cell::new(format!("{:.3} kWh", energy.0)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}
