use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Maximum number of geocoding candidates offered for one query.
pub const MAX_CANDIDATES: usize = 5;

/// Maximum number of entries kept in the search history.
pub const HISTORY_CAPACITY: usize = 10;

/// Number of calendar days kept in a collapsed forecast.
pub const FORECAST_DAYS: usize = 5;

/// A geocoded match for a free-text query, not yet chosen by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCandidate {
    pub name: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

impl LocationCandidate {
    /// Label shown in the search box and stored in history, e.g. "Paris, FR".
    pub fn label(&self) -> String {
        format!("{}, {}", self.name, self.country)
    }
}

/// Point-in-time weather snapshot for one location. Temperatures in Celsius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub location_label: String,
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_ms: f64,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    pub condition_main: String,
    pub condition_description: String,
    pub icon_id: String,
    pub lat: f64,
    pub lon: f64,
}

/// One fixed-interval sample as returned by the forecast service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    pub timestamp: NaiveDateTime,
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub condition_main: String,
    pub condition_description: String,
    pub icon_id: String,
}

/// Representative weather for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub condition_main: String,
    pub condition_description: String,
    pub icon_id: String,
}

impl From<&ForecastSample> for ForecastDay {
    fn from(sample: &ForecastSample) -> Self {
        Self {
            date: sample.timestamp.date(),
            temperature_c: sample.temperature_c,
            humidity_pct: sample.humidity_pct,
            condition_main: sample.condition_main.clone(),
            condition_description: sample.condition_description.clone(),
            icon_id: sample.icon_id.clone(),
        }
    }
}

/// Combined result of one weather lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub current: CurrentConditions,
    pub forecast: Vec<ForecastDay>,
}

/// A persisted, previously confirmed search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub location_name: String,
    pub lat: f64,
    pub lon: f64,
}
