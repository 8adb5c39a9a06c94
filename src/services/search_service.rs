//! Debounced venue search.
//!
//! Each call to [`VenueSearch::submit`] takes a ticket from a generation
//! counter. A submission that is overtaken by a newer one, either while it
//! waits out the debounce interval or while its request is in flight, returns
//! `Ok(None)` so a stale response is never applied.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use tracing::debug;

use crate::{
    models::venue::Venue,
    services::api_service::{ApiResult, VenueRepository},
};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

pub struct VenueSearch {
    repository: Arc<dyn VenueRepository>,
    debounce: Duration,
    generation: AtomicU64,
}

impl VenueSearch {
    pub fn new(repository: Arc<dyn VenueRepository>, debounce: Duration) -> Self {
        Self {
            repository,
            debounce,
            generation: AtomicU64::new(0),
        }
    }

    /// Run `query` after the debounce interval.
    ///
    /// A blank query lists every venue. Results are sorted by name, A to Z.
    /// Returns `Ok(None)` when a newer submission superseded this one.
    pub async fn submit(&self, query: &str) -> ApiResult<Option<Vec<Venue>>> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        tokio::time::sleep(self.debounce).await;
        if self.is_stale(ticket) {
            debug!(ticket, "search superseded before dispatch");
            return Ok(None);
        }

        let query = query.trim();
        let result = if query.is_empty() {
            self.repository.list_venues().await
        } else {
            self.repository.search_venues(query).await
        };

        if self.is_stale(ticket) {
            debug!(ticket, "discarding stale search response");
            return Ok(None);
        }

        let mut venues = result?;
        sort_by_name(&mut venues);
        Ok(Some(venues))
    }

    fn is_stale(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != ticket
    }
}

/// Case-insensitive A to Z ordering by venue name.
pub fn sort_by_name(venues: &mut [Venue]) {
    venues.sort_by_cached_key(|venue| venue.name.to_lowercase());
}
