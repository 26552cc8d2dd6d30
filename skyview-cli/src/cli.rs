use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, anyhow, bail};
use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};
use skyview_core::{
    Config, ConfiguredLocation, Coordinates, DayBuckets, DayKey, LocationQuery, WeatherApp,
    provider::provider_from_config,
};

use crate::{configure, interactive, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skyview", version, about = "Current weather and 5-day forecast")]
pub struct Cli {
    /// Read configuration from this file instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log more detail to stderr; repeat for even more.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and location preferences.
    Configure,

    /// Show current conditions and the forecast.
    Show {
        /// Place name; if absent, the device position is used.
        #[arg(conflicts_with_all = ["lat", "lon"])]
        place: Option<String>,

        #[command(flatten)]
        position: PositionArgs,

        /// Day to detail: a date (YYYY-MM-DD) or a position in the day list, starting at 1.
        #[arg(long)]
        day: Option<String>,

        /// Point of the hourly chart to detail, starting at 1.
        #[arg(long)]
        hour: Option<usize>,
    },

    /// Browse the forecast interactively.
    Interactive {
        /// Place name to start with; if absent, the device position is used.
        #[arg(conflicts_with_all = ["lat", "lon"])]
        place: Option<String>,

        #[command(flatten)]
        position: PositionArgs,
    },
}

/// Explicit device position, overriding the configured one.
#[derive(Debug, Args)]
pub struct PositionArgs {
    /// Latitude in decimal degrees.
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude in decimal degrees.
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,
}

impl PositionArgs {
    fn coordinates(&self) -> Option<Coordinates> {
        match (self.lat, self.lon) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config_path = match self.config {
            Some(path) => path,
            None => Config::config_file_path()?,
        };
        let config = Config::load_from(&config_path)?;

        match self.command {
            Command::Configure => configure::run(config, &config_path)?,
            Command::Show {
                place,
                position,
                day,
                hour,
            } => {
                let app = build_app(&config, &position)?;
                let out = show(&app, place.as_deref(), day.as_deref(), hour).await?;
                print!("{out}");
            }
            Command::Interactive { place, position } => {
                let app = build_app(&config, &position)?;
                interactive::run(&app, place.as_deref()).await?;
            }
        }

        Ok(())
    }
}

fn build_app(config: &Config, position: &PositionArgs) -> anyhow::Result<WeatherApp> {
    let provider = provider_from_config(config)?;
    let location = match position.coordinates() {
        Some(coordinates) => ConfiguredLocation::fixed(coordinates),
        None => ConfiguredLocation::new(config.location.clone()),
    };

    Ok(WeatherApp::new(
        Arc::from(provider),
        Arc::new(location),
        config.day_boundary.resolve(),
    ))
}

/// Run one lookup, apply `--day`/`--hour` and render the result.
///
/// Without a forecast the day and hour are skipped, so location and fetch
/// errors still reach the screen.
async fn show(
    app: &WeatherApp,
    place: Option<&str>,
    day: Option<&str>,
    hour: Option<usize>,
) -> anyhow::Result<String> {
    let hour = hour
        .map(|h| h.checked_sub(1).context("Hours are numbered from 1"))
        .transpose()?;

    lookup(app, place).await?;

    let has_forecast = app.with_state(|s| s.buckets().is_some());
    if has_forecast {
        if let Some(day) = day {
            let key = app
                .with_state(|s| s.buckets().and_then(|b| parse_day(b, day)))
                .ok_or_else(|| anyhow!("No forecast day matches '{day}'"))?;
            app.select_day(key)?;
        }
        if let Some(index) = hour {
            app.select_hour(index)?;
        }
    } else if day.is_some() || hour.is_some() {
        tracing::warn!("no forecast loaded; ignoring --day/--hour");
    }

    Ok(app.with_state(|s| render::render(&s.display(), app.day_offset())))
}

/// Search for `place`, or use the device position when there is none.
pub async fn lookup(app: &WeatherApp, place: Option<&str>) -> anyhow::Result<()> {
    match place {
        Some(place) => {
            if LocationQuery::place(place).is_none() {
                bail!("Place name must not be empty");
            }
            app.search(place).await;
        }
        None => {
            app.load_device_location().await;
        }
    }
    Ok(())
}

/// Resolve a `--day` argument: an ISO date, or a 1-based position.
pub fn parse_day(buckets: &DayBuckets, arg: &str) -> Option<DayKey> {
    let arg = arg.trim();
    if let Ok(date) = NaiveDate::parse_from_str(arg, "%Y-%m-%d") {
        return Some(DayKey::new(date));
    }
    let position: usize = arg.parse().ok()?;
    buckets.days().nth(position.checked_sub(1)?)
}
