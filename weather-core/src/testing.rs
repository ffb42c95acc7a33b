//! In-process fakes for the external services, used by unit tests.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use crate::model::{CurrentConditions, ForecastSample, LocationCandidate};
use crate::provider::{GeocodingService, ProviderError, WeatherService};

fn unavailable() -> ProviderError {
    ProviderError::Status {
        status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
        body: "down".into(),
    }
}

pub fn candidate(name: &str, lat: f64, lon: f64) -> LocationCandidate {
    LocationCandidate {
        name: name.into(),
        country: "XX".into(),
        lat,
        lon,
    }
}

pub fn sample(ts: &str, temp: f64) -> ForecastSample {
    ForecastSample {
        timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M").unwrap(),
        temperature_c: temp,
        humidity_pct: 50,
        condition_main: "Clouds".into(),
        condition_description: "scattered clouds".into(),
        icon_id: "03d".into(),
    }
}

/// Names every candidate after the query, after an optional per-query delay.
#[derive(Debug, Default)]
pub struct FakeGeocoder {
    pub delays: HashMap<String, Duration>,
    pub fail: AtomicBool,
    pub calls: Mutex<Vec<String>>,
}

impl FakeGeocoder {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl GeocodingService for FakeGeocoder {
    async fn geocode(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<LocationCandidate>, ProviderError> {
        self.calls.lock().push(query.to_string());
        if let Some(delay) = self.delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        // Returns more than `limit`; callers truncate.
        Ok((0..limit + 2)
            .map(|i| candidate(query, i as f64, i as f64))
            .collect())
    }
}

/// Reports the latitude as the temperature so tests can tell responses apart.
#[derive(Debug, Default)]
pub struct FakeWeather {
    /// Response delay keyed by latitude, rounded to an integer.
    pub delays: HashMap<i64, Duration>,
    pub fail_current: bool,
    pub fail_forecast: bool,
    pub samples: Vec<ForecastSample>,
    /// Requests received, both legs counted.
    pub calls: Mutex<u32>,
}

impl FakeWeather {
    async fn delay_for(&self, lat: f64) {
        if let Some(delay) = self.delays.get(&(lat.round() as i64)) {
            tokio::time::sleep(*delay).await;
        }
    }

    pub fn calls(&self) -> u32 {
        *self.calls.lock()
    }
}

#[async_trait]
impl WeatherService for FakeWeather {
    async fn current(&self, lat: f64, lon: f64) -> Result<CurrentConditions, ProviderError> {
        *self.calls.lock() += 1;
        self.delay_for(lat).await;
        if self.fail_current {
            return Err(unavailable());
        }
        Ok(CurrentConditions {
            location_label: format!("{lat},{lon}"),
            temperature_c: lat,
            humidity_pct: 40,
            wind_speed_ms: 2.5,
            temp_min_c: lat - 1.0,
            temp_max_c: lat + 1.0,
            condition_main: "Clear".into(),
            condition_description: "clear sky".into(),
            icon_id: "01d".into(),
            lat,
            lon,
        })
    }

    async fn forecast(&self, lat: f64, _lon: f64) -> Result<Vec<ForecastSample>, ProviderError> {
        *self.calls.lock() += 1;
        self.delay_for(lat).await;
        if self.fail_forecast {
            return Err(unavailable());
        }
        Ok(self.samples.clone())
    }
}
