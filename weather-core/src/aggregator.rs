//! Current conditions plus a one-sample-per-day forecast for a location.

use chrono::{NaiveTime, Timelike};
use std::sync::Arc;

use crate::{
    error::WeatherFetchError,
    model::{FORECAST_DAYS, ForecastDay, ForecastSample, WeatherReport},
    provider::WeatherService,
};

#[derive(Debug, Clone)]
pub struct WeatherAggregator {
    service: Arc<dyn WeatherService>,
}

impl WeatherAggregator {
    pub fn new(service: Arc<dyn WeatherService>) -> Self {
        Self { service }
    }

    /// Fetch current conditions and forecast concurrently.
    ///
    /// Fails as a unit: if either request fails, no partial report is returned.
    pub async fn fetch_weather(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<WeatherReport, WeatherFetchError> {
        let current = async {
            self.service
                .current(lat, lon)
                .await
                .map_err(WeatherFetchError::Current)
        };
        let forecast = async {
            self.service
                .forecast(lat, lon)
                .await
                .map_err(WeatherFetchError::Forecast)
        };

        let (current, samples) = tokio::try_join!(current, forecast)?;
        let forecast = collapse_to_daily(&samples);

        tracing::debug!(
            lat,
            lon,
            samples = samples.len(),
            days = forecast.len(),
            "weather fetched"
        );

        Ok(WeatherReport { current, forecast })
    }
}

/// Reduce fixed-interval forecast samples to one midday sample per calendar date.
///
/// Days without a 12:00 sample are omitted.
pub fn collapse_to_daily(samples: &[ForecastSample]) -> Vec<ForecastDay> {
    let mut midday: Vec<&ForecastSample> = samples
        .iter()
        .filter(|s| is_midday(s.timestamp.time()))
        .collect();
    midday.sort_by_key(|s| s.timestamp);

    let mut days: Vec<ForecastDay> = Vec::with_capacity(FORECAST_DAYS);
    for sample in midday {
        if days.len() == FORECAST_DAYS {
            break;
        }
        let date = sample.timestamp.date();
        if days.last().is_some_and(|d| d.date == date) {
            continue;
        }
        days.push(ForecastDay::from(sample));
    }
    days
}

fn is_midday(time: NaiveTime) -> bool {
    time.hour() == 12 && time.minute() == 0 && time.second() == 0
}
