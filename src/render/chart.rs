use std::{path::Path, sync::OnceLock};

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeDelta};
use clap::crate_version;
use plotters::{
    prelude::*,
    style::{FontStyle, register_font},
};

use crate::{
    core::aggregator::DayState,
    prelude::*,
    quantity::power::Watts,
    settings::Settings,
};

const SIZE: (u32, u32) = (1600, 900);

const BACKGROUND: RGBColor = RGBColor(0x1F, 0x77, 0xB4);

/// Bar colours by 500 W bands, from yellow to red.
const BAND_COLORS: [RGBColor; 9] = [
    RGBColor(0xF0, 0xFF, 0x00),
    RGBColor(0xF1, 0xDF, 0x00),
    RGBColor(0xF3, 0xBF, 0x00),
    RGBColor(0xF5, 0x9F, 0x00),
    RGBColor(0xF7, 0x7F, 0x00),
    RGBColor(0xF9, 0x5F, 0x00),
    RGBColor(0xFB, 0x3F, 0x00),
    RGBColor(0xFD, 0x1F, 0x00),
    RGBColor(0xFF, 0x00, 0x00),
];

const BAND_WIDTH: Watts = Watts(500.0);

const STRING_COLORS: [RGBColor; 4] = [MAGENTA, BLUE, CYAN, GREEN];

#[derive(Copy, Clone, Debug)]
pub enum ChartKind {
    /// Updated by every daytime run.
    Live { current_power: Watts },

    /// Drawn once the day is closed.
    Summary,
}

static FONT: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

/// Render the day as a PNG image at `path`.
#[instrument(skip_all, fields(day = %state.day(), kind = ?kind))]
pub fn render_chart(
    state: &DayState,
    settings: &Settings,
    kind: ChartKind,
    generated_at: DateTime<Local>,
    path: &Path,
) -> Result {
    register_fonts()?;

    let day = state.day();
    let window = settings.classifier().window_on(day);
    let x_range = at(day, window.start.min(settings.daylight.start))?
        ..at(day, window.end.max(settings.daylight.end))?;
    let scale = settings.chart;
    let title = title(state, settings, kind, generated_at);

    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&title, ("sans-serif", 22))
        .margin(20)
        .x_label_area_size(70)
        .y_label_area_size(80)
        .build_cartesian_2d(x_range.clone(), scale.min.0..scale.max.0)?;
    chart.plotting_area().fill(&BACKGROUND)?;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n_y_labels = ((scale.max.0 - scale.min.0) / scale.step.0).ceil().max(1.0) as usize + 1;
    #[allow(clippy::cast_sign_loss)]
    let n_x_labels = (x_range.end - x_range.start).num_hours().max(1) as usize + 1;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n_x_labels)
        .y_labels(n_y_labels)
        .x_label_formatter(&|timestamp| timestamp.format("%H:%M").to_string())
        .y_label_formatter(&|watts| format!("{watts:.0}"))
        .x_desc(footer(day, settings))
        .y_desc("Generated electricity (W)")
        .bold_line_style(WHITE.mix(0.3))
        .light_line_style(TRANSPARENT)
        .label_style(("sans-serif", 14))
        .draw()?;

    chart.draw_series(state.series.samples().iter().map(|sample| {
        let top = sample.power.clamp(scale.min, scale.max);
        Rectangle::new(
            [(sample.timestamp, scale.min.0), (sample.timestamp + TimeDelta::minutes(1), top.0)],
            band_color(sample.power).filled(),
        )
    }))?;

    for (index, id) in state.strings.string_ids().into_iter().enumerate() {
        let color = STRING_COLORS[index % STRING_COLORS.len()];
        chart
            .draw_series(LineSeries::new(
                state
                    .strings
                    .rows()
                    .iter()
                    .filter_map(|row| row.power_of(id).map(|power| (row.timestamp, power.0))),
                color.stroke_width(2),
            ))?
            .label(settings.labels.string_name(id))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }
    if !state.strings.is_empty() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font(("sans-serif", 14))
            .draw()?;
    }

    root.present()?;
    Ok(())
}

/// The bitmap backend has no system fonts to fall back to.
fn register_fonts() -> Result {
    static IS_REGISTERED: OnceLock<bool> = OnceLock::new();
    let is_registered = *IS_REGISTERED
        .get_or_init(|| register_font("sans-serif", FontStyle::Normal, FONT).is_ok());
    ensure!(is_registered, "the embedded font is not a valid TrueType font");
    Ok(())
}

fn footer(day: NaiveDate, settings: &Settings) -> String {
    let mut footer = format!(
        "{day}   pvtally {}   daylight window {}–{}",
        crate_version!(),
        settings.daylight.start.format("%H:%M"),
        settings.daylight.end.format("%H:%M"),
    );
    if let Some(sun) = settings.coordinates.and_then(|coordinates| coordinates.sun_times(day)) {
        footer.push_str(&format!(
            "   sunrise {}, sunset {}",
            sun.sunrise.format("%H:%M"),
            sun.sunset.format("%H:%M"),
        ));
    }
    footer
}

fn title(
    state: &DayState,
    settings: &Settings,
    kind: ChartKind,
    generated_at: DateTime<Local>,
) -> String {
    let labels = &settings.labels;
    let energy = state.series.energy();
    let value = energy * labels.value_per_kwh;
    let mut title = format!(
        "{} PV at {}: generated {:.2} kWh, {} {}{:.2}",
        labels.location,
        generated_at.format("%d/%m/%Y, %H:%M:%S"),
        energy.0,
        labels.value_label,
        labels.currency,
        value.0,
    );
    match kind {
        ChartKind::Live { current_power } => {
            title.push_str(&format!(", current output {:.0} W", current_power.0));
        }
        ChartKind::Summary => title.push_str(", daily summary"),
    }
    if settings.test_mode {
        title.insert_str(0, "[TEST] ");
    }
    title
}

fn band_color(power: Watts) -> RGBColor {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let band = (power.0 / BAND_WIDTH.0).floor().max(0.0) as usize;
    BAND_COLORS[band.min(BAND_COLORS.len() - 1)]
}

fn at(day: NaiveDate, time: NaiveTime) -> Result<DateTime<Local>> {
    day.and_time(time)
        .and_local_timezone(Local)
        .earliest()
        .with_context(|| format!("{day} {time} does not exist in the local time zone"))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::TimeZone;

    use super::*;
    use crate::{
        core::{integrator::IntegrationMethod, reading::StringReading, sun::Coordinates},
        quantity::electric::{Amperes, Volts},
        settings::Paths,
    };

    fn state() -> DayState {
        let day = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let mut state = DayState::new(day);
        for minute in 0..20 {
            let timestamp = at(day, NaiveTime::from_hms_opt(12, minute, 0).unwrap()).unwrap();
            let _ = state.series.push(
                timestamp,
                Watts(f64::from(minute) * 300.0),
                IntegrationMethod::Trapezoid,
            );
            let _ = state.strings.push(
                timestamp,
                vec![
                    StringReading::builder().id(1).current(Amperes(2.0)).voltage(Volts(400.0)).build(),
                    StringReading::builder().id(2).current(Amperes(1.0)).voltage(Volts(380.0)).build(),
                ],
            );
        }
        state
    }

    fn settings(test_mode: bool) -> Settings {
        Settings::builder().paths(Paths::single(".")).test_mode(test_mode).build()
    }

    const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

    #[test]
    fn summary_chart_ok() -> Result {
        let directory = tempfile::tempdir()?;
        let path = directory.path().join("2026-06-01.png");
        render_chart(&state(), &settings(false), ChartKind::Summary, Local::now(), &path)?;
        assert!(fs::read(&path)?.starts_with(PNG_SIGNATURE));
        Ok(())
    }

    #[test]
    fn live_chart_ok() -> Result {
        let directory = tempfile::tempdir()?;
        let path = directory.path().join("currentPwr.png");
        let kind = ChartKind::Live { current_power: Watts(5700.0) };
        render_chart(&state(), &settings(true), kind, Local::now(), &path)?;
        assert!(fs::read(&path)?.starts_with(PNG_SIGNATURE));
        Ok(())
    }

    #[test]
    fn empty_day_renders() -> Result {
        let directory = tempfile::tempdir()?;
        let path = directory.path().join("2026-06-01.png");
        let state = DayState::new(NaiveDate::from_ymd_opt(2026, 6, 1).unwrap());
        render_chart(&state, &settings(false), ChartKind::Summary, Local::now(), &path)?;
        assert!(fs::read(&path)?.starts_with(PNG_SIGNATURE));
        Ok(())
    }

    #[test]
    fn title_ok() {
        let generated_at = Local.with_ymd_and_hms(2026, 6, 1, 12, 30, 0).unwrap();
        let state = state();

        let summary = title(&state, &settings(false), ChartKind::Summary, generated_at);
        assert!(summary.starts_with("My House PV at 01/06/2026, 12:30:00: generated "), "{summary}");
        assert!(summary.contains("Saved £"), "{summary}");
        assert!(summary.ends_with(", daily summary"), "{summary}");

        let kind = ChartKind::Live { current_power: Watts(5700.0) };
        let live = title(&state, &settings(true), kind, generated_at);
        assert!(live.starts_with("[TEST] My House PV at"), "{live}");
        assert!(live.ends_with(", current output 5700 W"), "{live}");
    }

    #[test]
    fn footer_shows_sun_times() -> Result {
        let day = NaiveDate::from_ymd_opt(2026, 6, 21).unwrap();
        let fixed = footer(day, &settings(false));
        assert!(fixed.contains("daylight window 04:30–21:30"), "{fixed}");
        assert!(!fixed.contains("sunrise"), "{fixed}");

        let located = Settings {
            coordinates: Some(Coordinates::try_new(51.4769, 0.0)?),
            ..settings(false)
        };
        let with_sun = footer(day, &located);
        assert!(with_sun.contains("   sunrise "), "{with_sun}");
        assert!(with_sun.contains(", sunset "), "{with_sun}");
        Ok(())
    }

    #[test]
    fn band_color_ok() {
        assert_eq!(band_color(Watts(0.0)), BAND_COLORS[0]);
        assert_eq!(band_color(Watts(499.0)), BAND_COLORS[0]);
        assert_eq!(band_color(Watts(500.0)), BAND_COLORS[1]);
        assert_eq!(band_color(Watts(9000.0)), BAND_COLORS[8]);
    }
}
