//! Coordinates weather lookups, the displayed search state and history updates.
//!
//! Every search is tagged with a sequence number when it starts. Only the most
//! recently started search may move the view into a terminal state; older
//! searches that finish later are reported as [`SearchOutcome::Superseded`]
//! and change nothing, history included.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{
    aggregator::WeatherAggregator,
    error::PersistenceError,
    history::HistoryStore,
    model::{HistoryEntry, LocationCandidate, WeatherReport},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchPhase {
    #[default]
    Idle,
    Loading,
    Success,
    Failed,
}

/// Snapshot of everything the presentation layer renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchView {
    /// Label of the location being (or last) searched.
    pub query: String,
    pub phase: SearchPhase,
    pub weather: Option<WeatherReport>,
    pub error: Option<String>,
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Completed(WeatherReport),
    Failed(String),
    /// A newer search started before this one finished.
    Superseded,
}

#[derive(Debug)]
pub struct SearchOrchestrator {
    aggregator: WeatherAggregator,
    history: HistoryStore,
    latest: AtomicU64,
    view: Mutex<SearchView>,
}

/// Where a search came from; replays never touch history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    New,
    Replay,
}

impl SearchOrchestrator {
    pub fn new(aggregator: WeatherAggregator, history: HistoryStore) -> Self {
        Self {
            aggregator,
            history,
            latest: AtomicU64::new(0),
            view: Mutex::new(SearchView::default()),
        }
    }

    pub fn view(&self) -> SearchView {
        self.view.lock().clone()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Populate the displayed history from the store. On failure the list is left as is.
    pub async fn load_history(&self) -> Result<(), PersistenceError> {
        let entries = self.history.list().await.inspect_err(|e| {
            tracing::warn!(error = %e, "failed to load search history");
        })?;
        self.view.lock().history = entries;
        Ok(())
    }

    pub async fn submit_new_search(&self, candidate: &LocationCandidate) -> SearchOutcome {
        self.search(candidate.label(), candidate.lat, candidate.lon, Origin::New)
            .await
    }

    pub async fn replay_history(&self, entry: &HistoryEntry) -> SearchOutcome {
        self.search(entry.location_name.clone(), entry.lat, entry.lon, Origin::Replay)
            .await
    }

    /// Delete a history entry and drop it from the displayed list.
    ///
    /// The weather panel is untouched. On failure the displayed list is unchanged.
    pub async fn delete_history_entry(&self, id: &str) -> Result<(), PersistenceError> {
        self.history.remove(id).await.inspect_err(|e| {
            tracing::warn!(id, error = %e, "failed to delete history entry");
        })?;
        self.view.lock().history.retain(|e| e.id != id);
        Ok(())
    }

    /// Return to `Idle`, dropping any displayed weather and invalidating in-flight searches.
    pub fn reset(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
        let mut view = self.view.lock();
        view.phase = SearchPhase::Idle;
        view.weather = None;
        view.error = None;
        view.query.clear();
    }

    async fn search(&self, label: String, lat: f64, lon: f64, origin: Origin) -> SearchOutcome {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut view = self.view.lock();
            view.query = label.clone();
            view.phase = SearchPhase::Loading;
            view.error = None;
        }
        tracing::debug!(ticket, location = %label, ?origin, "search started");

        let result = self.aggregator.fetch_weather(lat, lon).await;

        if self.latest.load(Ordering::SeqCst) != ticket {
            tracing::debug!(ticket, location = %label, "ignoring superseded search result");
            return SearchOutcome::Superseded;
        }

        let report = match result {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(location = %label, error = %e, "error fetching weather data");
                let message = e.to_string();
                let mut view = self.view.lock();
                view.phase = SearchPhase::Failed;
                view.weather = None;
                view.error = Some(message.clone());
                return SearchOutcome::Failed(message);
            }
        };

        {
            let mut view = self.view.lock();
            view.phase = SearchPhase::Success;
            view.weather = Some(report.clone());
        }

        if origin == Origin::New {
            self.record(&label, lat, lon).await;
        }

        SearchOutcome::Completed(report)
    }

    async fn record(&self, label: &str, lat: f64, lon: f64) {
        if let Err(e) = self.history.append(label, lat, lon).await {
            tracing::warn!(location = label, error = %e, "failed to save search history");
            return;
        }
        match self.history.list().await {
            Ok(entries) => self.view.lock().history = entries,
            Err(e) => tracing::warn!(error = %e, "failed to refresh search history"),
        }
    }
}
