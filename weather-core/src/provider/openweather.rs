use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;

use crate::model::{CurrentConditions, ForecastSample, LocationCandidate};

use super::{GeocodingService, ProviderError, WeatherService};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const DT_TXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// OpenWeather geocoding, current weather and 5-day/3-hour forecast client.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    base_url: String,
    api_key: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(base_url: impl Into<String>, api_key: String) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            http,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "OpenWeather request");

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[derive(Debug, Deserialize)]
struct OwGeoEntry {
    name: String,
    #[serde(default)]
    country: String,
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
    temp_min: f64,
    temp_max: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    coord: OwCoord,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwSampleMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt_txt: String,
    main: OwSampleMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

impl TryFrom<OwCurrentResponse> for CurrentConditions {
    type Error = ProviderError;

    fn try_from(parsed: OwCurrentResponse) -> Result<Self, Self::Error> {
        let condition = parsed
            .weather
            .into_iter()
            .next()
            .ok_or(ProviderError::MissingCondition)?;

        Ok(CurrentConditions {
            location_label: parsed.name,
            temperature_c: parsed.main.temp,
            humidity_pct: parsed.main.humidity,
            wind_speed_ms: parsed.wind.speed,
            temp_min_c: parsed.main.temp_min,
            temp_max_c: parsed.main.temp_max,
            condition_main: condition.main,
            condition_description: condition.description,
            icon_id: condition.icon,
            lat: parsed.coord.lat,
            lon: parsed.coord.lon,
        })
    }
}

impl TryFrom<OwForecastEntry> for ForecastSample {
    type Error = ProviderError;

    fn try_from(entry: OwForecastEntry) -> Result<Self, Self::Error> {
        let timestamp = NaiveDateTime::parse_from_str(&entry.dt_txt, DT_TXT_FORMAT)
            .map_err(|_| ProviderError::Timestamp(entry.dt_txt.clone()))?;
        let condition = entry
            .weather
            .into_iter()
            .next()
            .ok_or(ProviderError::MissingCondition)?;

        Ok(ForecastSample {
            timestamp,
            temperature_c: entry.main.temp,
            humidity_pct: entry.main.humidity,
            condition_main: condition.main,
            condition_description: condition.description,
            icon_id: condition.icon,
        })
    }
}

#[async_trait]
impl GeocodingService for OpenWeatherClient {
    async fn geocode(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<LocationCandidate>, ProviderError> {
        let entries: Vec<OwGeoEntry> = self
            .get_json(
                "/geo/1.0/direct",
                &[("q", query.to_string()), ("limit", limit.to_string())],
            )
            .await?;

        Ok(entries
            .into_iter()
            .take(limit)
            .map(|e| LocationCandidate {
                name: e.name,
                country: e.country,
                lat: e.lat,
                lon: e.lon,
            })
            .collect())
    }
}

#[async_trait]
impl WeatherService for OpenWeatherClient {
    async fn current(&self, lat: f64, lon: f64) -> Result<CurrentConditions, ProviderError> {
        let parsed: OwCurrentResponse = self
            .get_json("/data/2.5/weather", &coord_query(lat, lon))
            .await?;

        parsed.try_into()
    }

    async fn forecast(&self, lat: f64, lon: f64) -> Result<Vec<ForecastSample>, ProviderError> {
        let parsed: OwForecastResponse = self
            .get_json("/data/2.5/forecast", &coord_query(lat, lon))
            .await?;

        parsed.list.into_iter().map(ForecastSample::try_from).collect()
    }
}

fn coord_query(lat: f64, lon: f64) -> [(&'static str, String); 3] {
    [
        ("lat", lat.to_string()),
        ("lon", lon.to_string()),
        ("units", "metric".to_string()),
    ]
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_body_keeps_short_bodies() {
        assert_eq!(truncate_body("not found"), "not found");
    }

    #[test]
    fn truncate_body_cuts_long_bodies_on_char_boundary() {
        let body = "é".repeat(300);
        let out = truncate_body(&body);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 203);
    }

    #[test]
    fn forecast_entry_parses_dt_txt() {
        let entry: OwForecastEntry = serde_json::from_value(serde_json::json!({
            "dt": 1717243200,
            "dt_txt": "2024-06-01 12:00:00",
            "main": { "temp": 21.4, "humidity": 55, "pressure": 1012 },
            "weather": [{ "id": 800, "main": "Clear", "description": "clear sky", "icon": "01d" }]
        }))
        .unwrap();

        let sample = ForecastSample::try_from(entry).unwrap();
        assert_eq!(sample.timestamp.to_string(), "2024-06-01 12:00:00");
        assert_eq!(sample.condition_main, "Clear");
        assert_eq!(sample.icon_id, "01d");
    }

    #[test]
    fn forecast_entry_rejects_bad_timestamp() {
        let entry: OwForecastEntry = serde_json::from_value(serde_json::json!({
            "dt_txt": "June 1st",
            "main": { "temp": 21.4, "humidity": 55 },
            "weather": [{ "main": "Clear", "description": "clear sky", "icon": "01d" }]
        }))
        .unwrap();

        assert!(matches!(
            ForecastSample::try_from(entry),
            Err(ProviderError::Timestamp(ts)) if ts == "June 1st"
        ));
    }

    #[test]
    fn current_response_without_condition_is_rejected() {
        let parsed: OwCurrentResponse = serde_json::from_value(serde_json::json!({
            "name": "Paris",
            "coord": { "lat": 48.85, "lon": 2.35 },
            "main": { "temp": 18.0, "humidity": 60, "temp_min": 16.0, "temp_max": 20.0 },
            "weather": [],
            "wind": { "speed": 3.1 }
        }))
        .unwrap();

        assert!(matches!(
            CurrentConditions::try_from(parsed),
            Err(ProviderError::MissingCondition)
        ));
    }
}
