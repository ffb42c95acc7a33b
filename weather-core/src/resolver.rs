//! Debounced free-text location lookup.
//!
//! Each call to [`LocationResolver::resolve`] takes a ticket from a monotonically
//! increasing counter, waits out the quiet window and then performs the lookup.
//! The ticket is checked before and after the lookup; if newer input arrived in
//! the meantime the call reports [`Resolution::Superseded`] and leaves the
//! candidate list untouched.

use parking_lot::Mutex;
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use crate::{
    config::DEFAULT_DEBOUNCE_MS,
    error::ResolutionError,
    model::{LocationCandidate, MAX_CANDIDATES},
    provider::GeocodingService,
};

/// Outcome of one `resolve` call.
#[derive(Debug)]
pub enum Resolution {
    /// Latest input resolved; candidate state now holds these.
    Candidates(Vec<LocationCandidate>),
    /// Latest input failed to resolve; candidate state was cleared.
    Failed(ResolutionError),
    /// Newer input arrived before this call finished; nothing was updated.
    Superseded,
}

#[derive(Debug)]
pub struct LocationResolver {
    geocoder: Arc<dyn GeocodingService>,
    quiet_window: Duration,
    latest: AtomicU64,
    candidates: Mutex<Vec<LocationCandidate>>,
}

impl LocationResolver {
    pub fn new(geocoder: Arc<dyn GeocodingService>) -> Self {
        Self::with_quiet_window(geocoder, Duration::from_millis(DEFAULT_DEBOUNCE_MS))
    }

    pub fn with_quiet_window(geocoder: Arc<dyn GeocodingService>, quiet_window: Duration) -> Self {
        Self {
            geocoder,
            quiet_window,
            latest: AtomicU64::new(0),
            candidates: Mutex::new(Vec::new()),
        }
    }

    /// Candidates from the most recent non-superseded resolution.
    pub fn candidates(&self) -> Vec<LocationCandidate> {
        self.candidates.lock().clone()
    }

    /// Clear candidates and invalidate any in-flight resolution.
    pub fn dismiss(&self) {
        self.next_ticket();
        self.candidates.lock().clear();
    }

    pub async fn resolve(&self, query: &str) -> Resolution {
        let query = query.trim();
        if query.is_empty() {
            self.dismiss();
            return Resolution::Candidates(Vec::new());
        }

        let ticket = self.next_ticket();
        tokio::time::sleep(self.quiet_window).await;
        if !self.is_current(ticket) {
            tracing::debug!(query, "location lookup debounced");
            return Resolution::Superseded;
        }

        let result = self.geocoder.geocode(query, MAX_CANDIDATES).await;
        if !self.is_current(ticket) {
            tracing::debug!(query, "discarding stale location lookup");
            return Resolution::Superseded;
        }

        match result {
            Ok(mut found) => {
                found.truncate(MAX_CANDIDATES);
                *self.candidates.lock() = found.clone();
                Resolution::Candidates(found)
            }
            Err(e) => {
                let err = ResolutionError::from(e);
                tracing::warn!(query, error = %err, "location lookup failed");
                self.candidates.lock().clear();
                Resolution::Failed(err)
            }
        }
    }

    fn next_ticket(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket
    }
}
