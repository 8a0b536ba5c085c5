//! Chunked place detail fetching with pauses between chunks.

use std::sync::Arc;
use std::time::Duration;

use crate::models::{CandidateRef, PlaceDetails};
use crate::providers::PlacesProvider;
use crate::runtime::Sleeper;

/// Fields requested from the detail call.
pub const DETAIL_FIELDS: &[&str] = &[
    "name",
    "formatted_address",
    "formatted_phone_number",
    "website",
    "url",
    "business_status",
];

const MIN_CHUNK: usize = 2;
const MAX_CHUNK: usize = 5;
const MIN_PAUSE: Duration = Duration::from_secs(1);
const MAX_PAUSE: Duration = Duration::from_secs(2);

/// Fetches place details a chunk at a time.
#[derive(Clone)]
pub struct DetailFetcher {
    places: Arc<dyn PlacesProvider>,
    sleeper: Arc<dyn Sleeper>,
}

impl DetailFetcher {
    /// Creates a fetcher; `sleeper` drives the pause between chunks.
    #[must_use]
    pub fn new(places: Arc<dyn PlacesProvider>, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { places, sleeper }
    }

    /// Chunk size for a per-keyword limit: `clamp(limit / 10, 2, 5)`.
    #[must_use]
    pub fn chunk_size(limit: usize) -> usize {
        (limit / 10).clamp(MIN_CHUNK, MAX_CHUNK)
    }

    /// Pause after a chunk of `chunk_size`: `clamp(chunk_size / 3 s, 1 s, 2 s)`.
    #[must_use]
    pub fn pause_for(chunk_size: usize) -> Duration {
        let millis = u64::try_from(chunk_size)
            .unwrap_or(u64::MAX)
            .saturating_mul(1000)
            / 3;
        Duration::from_millis(millis).clamp(MIN_PAUSE, MAX_PAUSE)
    }

    /// Fetches details for every candidate in `chunk`, in order.
    ///
    /// Failed lookups are logged and skipped.
    pub async fn fetch_chunk(&self, chunk: &[CandidateRef]) -> Vec<PlaceDetails> {
        let mut details = Vec::with_capacity(chunk.len());

        for candidate in chunk {
            match self
                .places
                .place_details(&candidate.place_id, DETAIL_FIELDS)
                .await
            {
                Ok(found) => details.push(found),
                Err(error) => {
                    tracing::warn!(
                        place_id = %candidate.place_id,
                        name = %candidate.name,
                        %error,
                        "Detail lookup failed, skipping place"
                    );
                }
            }
        }

        details
    }

    /// Waits out the inter-chunk pause.
    pub async fn pause(&self, chunk_size: usize) {
        self.sleeper.sleep(Self::pause_for(chunk_size)).await;
    }
}

impl std::fmt::Debug for DetailFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetailFetcher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ProviderError;
    use crate::testing::{RecordingSleeper, StubPlaces};

    #[test]
    fn test_chunk_size() {
        assert_eq!(DetailFetcher::chunk_size(0), 2);
        assert_eq!(DetailFetcher::chunk_size(5), 2);
        assert_eq!(DetailFetcher::chunk_size(20), 2);
        assert_eq!(DetailFetcher::chunk_size(30), 3);
        assert_eq!(DetailFetcher::chunk_size(50), 5);
        assert_eq!(DetailFetcher::chunk_size(100), 5);
    }

    #[test]
    fn test_pause_for() {
        assert_eq!(DetailFetcher::pause_for(2), Duration::from_secs(1));
        assert_eq!(DetailFetcher::pause_for(3), Duration::from_secs(1));
        assert_eq!(DetailFetcher::pause_for(4), Duration::from_millis(1333));
        assert_eq!(DetailFetcher::pause_for(5), Duration::from_millis(1666));
        assert_eq!(DetailFetcher::pause_for(6), Duration::from_secs(2));
        assert_eq!(DetailFetcher::pause_for(30), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_fetch_chunk_skips_failures() {
        let places = StubPlaces::new()
            .with_details("a", PlaceDetails {
                name: "A".to_string(),
                ..Default::default()
            })
            .with_details_failure("b", ProviderError::api("places", "NOT_FOUND", ""))
            .with_details("c", PlaceDetails {
                name: "C".to_string(),
                ..Default::default()
            });
        let fetcher = DetailFetcher::new(Arc::new(places), Arc::new(RecordingSleeper::new()));

        let chunk = vec![
            CandidateRef::new("a", "A"),
            CandidateRef::new("b", "B"),
            CandidateRef::new("c", "C"),
        ];
        let names: Vec<_> = fetcher
            .fetch_chunk(&chunk)
            .await
            .into_iter()
            .map(|d| d.name)
            .collect();

        assert_eq!(names, vec!["A", "C"]);
    }

    #[tokio::test]
    async fn test_pause_goes_through_sleeper() {
        let sleeper = Arc::new(RecordingSleeper::new());
        let fetcher = DetailFetcher::new(Arc::new(StubPlaces::new()), sleeper.clone());

        fetcher.pause(6).await;
        fetcher.pause(2).await;

        assert_eq!(
            sleeper.recorded(),
            vec![Duration::from_secs(2), Duration::from_secs(1)]
        );
    }
}
