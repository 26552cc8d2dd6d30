use crate::{
    config::Config,
    error::FetchError,
    model::{CurrentConditions, ForecastSet, LocationQuery},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Units convention shared by every request.
pub const UNITS: &str = "metric";

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions at `query`.
    async fn current(&self, query: &LocationQuery) -> Result<CurrentConditions, FetchError>;

    /// Multi-point forecast at `query`, chronological.
    async fn forecast(&self, query: &LocationQuery) -> Result<ForecastSet, FetchError>;
}

/// Construct the provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key()?;
    Ok(Box::new(OpenWeatherProvider::new(api_key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn provider_from_config_works_when_key_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());

        let provider = provider_from_config(&cfg);
        assert!(provider.is_ok());
    }
}
