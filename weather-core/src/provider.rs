use crate::{
    Config,
    model::{CurrentConditions, ForecastSample, LocationCandidate},
    provider::openweather::OpenWeatherClient,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Failure talking to an external weather or geocoding service.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("service responded with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("response contained no weather condition")]
    MissingCondition,
    #[error("invalid sample timestamp '{0}'")]
    Timestamp(String),
}

/// Free-text location lookup.
#[async_trait]
pub trait GeocodingService: Send + Sync + Debug {
    /// Returns at most `limit` matches, in the service's own ranking order.
    async fn geocode(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<LocationCandidate>, ProviderError>;
}

/// Current conditions and fixed-interval forecast for a coordinate pair.
#[async_trait]
pub trait WeatherService: Send + Sync + Debug {
    async fn current(&self, lat: f64, lon: f64) -> Result<CurrentConditions, ProviderError>;

    async fn forecast(&self, lat: f64, lon: f64) -> Result<Vec<ForecastSample>, ProviderError>;
}

/// Construct the OpenWeather client from config.
pub fn openweather_from_config(config: &Config) -> anyhow::Result<OpenWeatherClient> {
    let api_key = config.api_key()?;
    OpenWeatherClient::new(config.base_url(), api_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openweather_from_config_errors_when_missing_api_key() {
        // Only meaningful when the override variable is not set in the test environment.
        if std::env::var(crate::config::API_KEY_ENV).is_ok() {
            return;
        }
        let cfg = Config::default();
        let err = openweather_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("No OpenWeather API key configured"));
    }

    #[test]
    fn openweather_from_config_works_when_key_set() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());

        assert!(openweather_from_config(&cfg).is_ok());
    }

    #[test]
    fn status_error_displays_status_and_body() {
        let err = ProviderError::Status {
            status: reqwest::StatusCode::UNAUTHORIZED,
            body: "Invalid API key".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("401"));
        assert!(msg.contains("Invalid API key"));
    }
}
