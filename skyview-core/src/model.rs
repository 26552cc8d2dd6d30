use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Decimal-degree position reported by the location service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// What both provider endpoints are asked about.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Coordinates(Coordinates),
    Place(String),
}

impl LocationQuery {
    /// Build a place-name query from user input. Returns `None` for blank input.
    pub fn place(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(LocationQuery::Place(trimmed.to_string()))
        }
    }

    /// Query-string pairs identifying the location.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        match self {
            LocationQuery::Coordinates(c) => vec![
                ("lat", c.latitude.to_string()),
                ("lon", c.longitude.to_string()),
            ],
            LocationQuery::Place(name) => vec![("q", name.clone())],
        }
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationQuery::Coordinates(c) => write!(f, "({c})"),
            LocationQuery::Place(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub place_name: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_ms: f64,
    pub description: String,
    pub icon_id: String,
}

/// One forecast time slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    #[serde(with = "chrono::serde::ts_seconds")]
    pub time: DateTime<Utc>,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_ms: f64,
    pub description: String,
    pub icon_id: String,
}

impl ForecastSample {
    pub fn unix_timestamp(&self) -> i64 {
        self.time.timestamp()
    }
}

/// Forecast samples in the order the provider returned them (chronological).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastSet {
    pub place_name: Option<String>,
    pub samples: Vec<ForecastSample>,
}

impl ForecastSet {
    pub fn new(samples: Vec<ForecastSample>) -> Self {
        Self {
            place_name: None,
            samples,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_place_is_rejected() {
        assert_eq!(LocationQuery::place("   "), None);
        assert_eq!(
            LocationQuery::place("  Oslo "),
            Some(LocationQuery::Place("Oslo".into()))
        );
    }

    #[test]
    fn query_pairs_for_coordinates_and_place() {
        let q = LocationQuery::Coordinates(Coordinates {
            latitude: 52.5,
            longitude: -1.25,
        });
        assert_eq!(
            q.query_pairs(),
            vec![("lat", "52.5".to_string()), ("lon", "-1.25".to_string())]
        );

        let q = LocationQuery::Place("Lyon".into());
        assert_eq!(q.query_pairs(), vec![("q", "Lyon".to_string())]);
    }

    #[test]
    fn sample_serializes_time_as_unix_seconds() {
        let sample = ForecastSample {
            time: DateTime::from_timestamp(1_704_067_200, 0).expect("valid timestamp"),
            temperature_c: 5.0,
            feels_like_c: 3.0,
            humidity_pct: 80,
            wind_speed_ms: 2.0,
            description: "mist".into(),
            icon_id: "50n".into(),
        };
        let json = serde_json::to_value(&sample).expect("serialize");
        assert_eq!(json["time"], 1_704_067_200);
        assert_eq!(sample.unix_timestamp(), 1_704_067_200);
    }
}
