//! Keyword text search around a resolved location.

use std::sync::Arc;

use crate::models::{CandidateRef, Coordinate};
use crate::providers::PlacesProvider;

/// Default search radius around the resolved coordinate, in meters.
pub const DEFAULT_SEARCH_RADIUS_M: u32 = 5_000;

/// Runs one text search per keyword.
///
/// Fail-soft: a provider failure is logged and yields no candidates, so the
/// task moves on to its next keyword.
#[derive(Clone)]
pub struct CandidateSearcher {
    places: Arc<dyn PlacesProvider>,
    radius_m: u32,
}

impl CandidateSearcher {
    /// Creates a searcher with the default radius.
    #[must_use]
    pub fn new(places: Arc<dyn PlacesProvider>) -> Self {
        Self {
            places,
            radius_m: DEFAULT_SEARCH_RADIUS_M,
        }
    }

    /// Sets the search radius.
    #[must_use]
    pub fn with_radius_m(mut self, radius_m: u32) -> Self {
        self.radius_m = radius_m;
        self
    }

    /// The text query sent for a keyword.
    #[must_use]
    pub fn query_for(keyword: &str, postal_code: &str) -> String {
        format!("{keyword} in {postal_code}")
    }

    /// Returns at most `limit` candidates, in provider order.
    pub async fn search(
        &self,
        center: Coordinate,
        keyword: &str,
        postal_code: &str,
        limit: usize,
    ) -> Vec<CandidateRef> {
        let query = Self::query_for(keyword, postal_code);

        match self.places.text_search(&query, center, self.radius_m).await {
            Ok(mut candidates) => {
                candidates.truncate(limit);
                tracing::debug!(
                    postal_code,
                    keyword,
                    count = candidates.len(),
                    "Text search returned candidates"
                );
                candidates
            }
            Err(error) => {
                tracing::warn!(postal_code, keyword, %error, "Text search failed");
                Vec::new()
            }
        }
    }
}

impl std::fmt::Debug for CandidateSearcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidateSearcher")
            .field("radius_m", &self.radius_m)
            .finish_non_exhaustive()
    }
}
