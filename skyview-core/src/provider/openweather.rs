use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::{Endpoint, FetchError},
    model::{CurrentConditions, ForecastSample, ForecastSet, LocationQuery},
};

use super::{UNITS, WeatherProvider};

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
const CURRENT_PATH: &str = "/data/2.5/weather";
const FORECAST_PATH: &str = "/data/2.5/forecast";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the provider at another host, e.g. a mock server.
    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    async fn get(
        &self,
        endpoint: Endpoint,
        path: &str,
        query: &LocationQuery,
    ) -> Result<String, FetchError> {
        let url = format!("{}{}", self.base_url, path);

        let mut params = query.query_pairs();
        params.push(("appid", self.api_key.clone()));
        params.push(("units", UNITS.to_string()));

        tracing::debug!(%endpoint, location = %query, "GET {url}");

        let res = self
            .http
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| FetchError::Network {
                endpoint,
                message: e.to_string(),
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| FetchError::Network {
            endpoint,
            message: format!("failed to read response body: {e}"),
        })?;

        if !status.is_success() {
            return Err(FetchError::Status {
                endpoint,
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: Option<OwCity>,
    list: Vec<OwForecastEntry>,
}

/// Description and icon of the first weather entry.
fn describe(weather: &[OwWeather]) -> (String, String) {
    weather
        .first()
        .map(|w| (w.description.clone(), w.icon.clone()))
        .unwrap_or_else(|| ("Unknown".to_string(), String::new()))
}

fn parse_current(body: &str) -> Result<CurrentConditions, FetchError> {
    let parsed: OwCurrentResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed {
            endpoint: Endpoint::Current,
            message: e.to_string(),
        })?;

    let (description, icon_id) = describe(&parsed.weather);

    Ok(CurrentConditions {
        place_name: parsed.name,
        temperature_c: parsed.main.temp,
        feels_like_c: parsed.main.feels_like,
        humidity_pct: parsed.main.humidity,
        wind_speed_ms: parsed.wind.speed,
        description,
        icon_id,
    })
}

fn parse_forecast(body: &str) -> Result<ForecastSet, FetchError> {
    let parsed: OwForecastResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed {
            endpoint: Endpoint::Forecast,
            message: e.to_string(),
        })?;

    if parsed.list.is_empty() {
        return Err(FetchError::Empty {
            endpoint: Endpoint::Forecast,
        });
    }

    let samples = parsed
        .list
        .into_iter()
        .map(|entry| -> Result<ForecastSample, FetchError> {
            let time = DateTime::from_timestamp(entry.dt, 0).ok_or_else(|| {
                FetchError::Malformed {
                    endpoint: Endpoint::Forecast,
                    message: format!("timestamp {} is out of range", entry.dt),
                }
            })?;
            let (description, icon_id) = describe(&entry.weather);
            Ok(ForecastSample {
                time,
                temperature_c: entry.main.temp,
                feels_like_c: entry.main.feels_like,
                humidity_pct: entry.main.humidity,
                wind_speed_ms: entry.wind.speed,
                description,
                icon_id,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let place_name = parsed.city.map(|c| {
        if c.country.is_empty() {
            c.name
        } else {
            format!("{}, {}", c.name, c.country)
        }
    });

    Ok(ForecastSet {
        place_name,
        samples,
    })
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, query: &LocationQuery) -> Result<CurrentConditions, FetchError> {
        let body = self.get(Endpoint::Current, CURRENT_PATH, query).await?;
        parse_current(&body)
    }

    async fn forecast(&self, query: &LocationQuery) -> Result<ForecastSet, FetchError> {
        let body = self.get(Endpoint::Forecast, FORECAST_PATH, query).await?;
        parse_forecast(&body)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
