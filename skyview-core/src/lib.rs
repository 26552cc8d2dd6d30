//! Core library for the `skyview` weather lookup app.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Abstraction over the weather provider and the device location service
//! - Shared domain models (conditions, forecast samples)
//! - Grouping of forecast samples into days, and day/hour selection
//! - The application controller that runs lookups and owns the state
//!
//! It is used by `skyview-cli`, but can also be reused by other front ends.

pub mod app;
pub mod config;
pub mod error;
pub mod forecast;
pub mod icon;
pub mod location;
pub mod model;
pub mod provider;
pub mod selection;
pub mod state;

pub use app::WeatherApp;
pub use config::{Config, DayBoundary, LocationSettings};
pub use error::{Endpoint, FetchError, LocationError, SelectionError};
pub use forecast::{DayBucket, DayBuckets, DayKey, SUMMARY_DAYS};
pub use icon::{IconScale, icon_url};
pub use location::{ConfiguredLocation, LocationService, PermissionStatus};
pub use model::{Coordinates, CurrentConditions, ForecastSample, ForecastSet, LocationQuery};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider};
pub use selection::Selection;
pub use state::{AppState, DataView, Display, FetchState, LoadedForecast, Section};
