//! Device location abstraction.
//!
//! A terminal has no GPS, so [`ConfiguredLocation`] answers with the position
//! stored in the configuration file, and only when the user opted in.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::{config::LocationSettings, error::LocationError, model::Coordinates};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

#[async_trait]
pub trait LocationService: Send + Sync + Debug {
    /// One-shot permission request.
    async fn request_permission(&self) -> PermissionStatus;

    /// One-shot position read. Only meaningful after permission was granted.
    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

#[derive(Debug, Clone, Default)]
pub struct ConfiguredLocation {
    settings: LocationSettings,
}

impl ConfiguredLocation {
    pub fn new(settings: LocationSettings) -> Self {
        Self { settings }
    }

    /// A location service that always reports `coordinates`.
    pub fn fixed(coordinates: Coordinates) -> Self {
        Self::new(LocationSettings {
            enabled: true,
            latitude: Some(coordinates.latitude),
            longitude: Some(coordinates.longitude),
        })
    }
}

#[async_trait]
impl LocationService for ConfiguredLocation {
    async fn request_permission(&self) -> PermissionStatus {
        if self.settings.enabled {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        }
    }

    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        if !self.settings.enabled {
            return Err(LocationError::PermissionDenied);
        }
        match (self.settings.latitude, self.settings.longitude) {
            (Some(latitude), Some(longitude)) => {
                if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
                    return Err(LocationError::Other(format!(
                        "configured position ({latitude}, {longitude}) is out of range"
                    )));
                }
                Ok(Coordinates {
                    latitude,
                    longitude,
                })
            }
            _ => Err(LocationError::Unavailable(
                "no position configured; run `skyview configure` or pass --lat/--lon".into(),
            )),
        }
    }
}
