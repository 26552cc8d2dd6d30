use std::fmt::{self, Write};

use chrono::FixedOffset;
use skyview_core::{
    CurrentConditions, DataView, Display, ForecastSample, LoadedForecast, Section, icon_url,
};

const SPARKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const COLUMN: usize = 5;

pub fn render(display: &Display<'_>, offset: FixedOffset) -> String {
    Screen { display, offset }.to_string()
}

/// One frame of output for a display state.
struct Screen<'a, 'b> {
    display: &'a Display<'b>,
    offset: FixedOffset,
}

impl fmt::Display for Screen<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.display {
            Display::Loading => writeln!(f, "Loading weather..."),
            Display::Error(msg) => writeln!(f, "Error: {msg}"),
            Display::NoData => {
                writeln!(f, "No weather data yet.")?;
                writeln!(
                    f,
                    "Hint: search for a place, or enable a position with `skyview configure`."
                )
            }
            Display::Data(view) => render_data(f, view, self.offset),
        }
    }
}

/// Rounded whole degrees, e.g. `7°C`.
pub fn degrees(t: f64) -> String {
    format!("{}°C", t.round() as i64)
}

/// Label for one entry of the day list.
pub fn day_label(sample: &ForecastSample, offset: FixedOffset) -> String {
    let local = sample.time.with_timezone(&offset);
    format!(
        "{:<11} {:>5}  {}",
        local.format("%a %b %-d").to_string(),
        degrees(sample.temperature_c),
        sample.description
    )
}

/// Label for one point of the hourly chart.
pub fn hour_label(sample: &ForecastSample, offset: FixedOffset) -> String {
    let local = sample.time.with_timezone(&offset);
    format!(
        "{}  {}  {}",
        local.format("%H:%M"),
        degrees(sample.temperature_c),
        sample.description
    )
}

fn render_data(out: &mut impl Write, view: &DataView<'_>, offset: FixedOffset) -> fmt::Result {
    if let Some(place) = view.place_name() {
        writeln!(out, "{place}")?;
    }

    match view.current {
        Section::Ready(current) => render_current(out, current)?,
        Section::Failed(err) => writeln!(out, "  Current conditions unavailable: {err}")?,
        Section::Missing => {}
    }

    match view.forecast {
        Section::Ready(forecast) => render_forecast(out, view, forecast, offset)?,
        Section::Failed(err) => writeln!(out, "\nForecast unavailable: {err}")?,
        Section::Missing => {}
    }

    Ok(())
}

fn render_current(out: &mut impl Write, current: &CurrentConditions) -> fmt::Result {
    writeln!(
        out,
        "  {}  {}",
        degrees(current.temperature_c),
        current.description
    )?;
    writeln!(
        out,
        "  Feels like {} · Humidity {}% · Wind {:.1} m/s",
        degrees(current.feels_like_c),
        current.humidity_pct,
        current.wind_speed_ms
    )?;
    if let Some(url) = icon_url(&current.icon_id) {
        writeln!(out, "  Icon: {url}")?;
    }
    Ok(())
}

fn render_forecast(
    out: &mut impl Write,
    view: &DataView<'_>,
    forecast: &LoadedForecast,
    offset: FixedOffset,
) -> fmt::Result {
    let title = match view.selection.day() {
        Some(day) => day.date().format("%b %-d").to_string(),
        None => "Today".to_string(),
    };
    writeln!(out, "\n24-Hour Forecast for {title}")?;
    render_chart(out, view.hourly(), view.selection.hour(), offset)?;

    if let Some(sample) = view.selected_sample() {
        writeln!(
            out,
            "  Selected {} · {} · {} · Humidity {}% · Wind {:.1} m/s",
            sample.time.with_timezone(&offset).format("%H:%M"),
            degrees(sample.temperature_c),
            sample.description,
            sample.humidity_pct,
            sample.wind_speed_ms
        )?;
    }

    writeln!(out, "\n5-Day Forecast")?;
    let selected = view.selection.day();
    for (bucket, sample) in forecast.buckets.buckets().iter().zip(view.summary()) {
        let marker = if Some(bucket.day) == selected { '>' } else { ' ' };
        writeln!(out, "{marker} {}", day_label(sample, offset))?;
    }
    Ok(())
}

fn render_chart(
    out: &mut impl Write,
    samples: &[ForecastSample],
    selected: Option<usize>,
    offset: FixedOffset,
) -> fmt::Result {
    if samples.is_empty() {
        return writeln!(out, "  (no samples)");
    }

    let temps: Vec<f64> = samples.iter().map(|s| s.temperature_c).collect();
    let min = temps.iter().copied().fold(f64::INFINITY, f64::min);
    let max = temps.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut spark = String::from(" ");
    let mut values = String::from(" ");
    let mut hours = String::from(" ");
    for (sample, t) in samples.iter().zip(&temps) {
        let level = if max > min {
            (((t - min) / (max - min)) * (SPARKS.len() - 1) as f64).round() as usize
        } else {
            SPARKS.len() / 2
        };
        write!(spark, "{:>COLUMN$}", SPARKS[level.min(SPARKS.len() - 1)])?;
        write!(values, "{:>COLUMN$}", format!("{}°", t.round() as i64))?;
        write!(
            hours,
            "{:>COLUMN$}",
            sample.time.with_timezone(&offset).format("%H").to_string()
        )?;
    }
    writeln!(out, "{spark}")?;
    writeln!(out, "{values}")?;
    writeln!(out, "{hours}")?;

    if let Some(index) = selected.filter(|i| *i < samples.len()) {
        let pad = 1 + index * COLUMN + (COLUMN - 1);
        writeln!(out, "{}^", " ".repeat(pad))?;
    }
    Ok(())
}
