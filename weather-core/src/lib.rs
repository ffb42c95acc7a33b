//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client behind geocoding/weather service traits
//! - Debounced location resolution, weather aggregation and search history
//! - The search orchestrator that ties them into one displayed state
//!
//! It is used by `weather-cli`, but can also be reused by other front-ends.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod history;
pub mod model;
pub mod orchestrator;
pub mod provider;
pub mod resolver;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregator::{WeatherAggregator, collapse_to_daily};
pub use config::Config;
pub use error::{PersistenceError, ResolutionError, WeatherFetchError};
pub use history::{FileStore, HistoryStore, KeyValueStore, MemoryStore};
pub use model::{
    CurrentConditions, ForecastDay, ForecastSample, HistoryEntry, LocationCandidate, WeatherReport,
};
pub use orchestrator::{SearchOrchestrator, SearchOutcome, SearchPhase, SearchView};
pub use provider::{GeocodingService, ProviderError, WeatherService, openweather::OpenWeatherClient};
pub use resolver::{LocationResolver, Resolution};
