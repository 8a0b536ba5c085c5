//! Postal code to coordinate resolution.

use std::sync::Arc;

use crate::errors::SearchError;
use crate::models::{Coordinate, Country};
use crate::providers::Geocoder;

/// Resolves postal codes through a geocoding service.
#[derive(Clone)]
pub struct AddressResolver {
    geocoder: Arc<dyn Geocoder>,
}

impl AddressResolver {
    /// Creates a resolver backed by `geocoder`.
    #[must_use]
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }

    /// The geocoding query sent for a postal code.
    #[must_use]
    pub fn query_for(postal_code: &str, country: Country) -> String {
        format!("{postal_code}, {}", country.display_name())
    }

    /// Resolves `postal_code` to the geocoder's best coordinate.
    ///
    /// No retries: an empty answer and a provider failure both end the current
    /// postal code's task with a resolution error.
    pub async fn resolve(
        &self,
        postal_code: &str,
        country: Country,
    ) -> Result<Coordinate, SearchError> {
        let query = Self::query_for(postal_code, country);
        tracing::debug!(postal_code, %query, "Geocoding postal code");

        let candidates = match self.geocoder.geocode(&query).await {
            Ok(candidates) => candidates,
            Err(error) => {
                tracing::warn!(postal_code, %query, %error, "Geocoding failed");
                return Err(SearchError::Resolution {
                    postal_code: postal_code.to_string(),
                    query,
                    cause: Some(error),
                });
            }
        };

        let Some(coordinate) = candidates.into_iter().next() else {
            return Err(SearchError::Resolution {
                postal_code: postal_code.to_string(),
                query,
                cause: None,
            });
        };

        tracing::debug!(postal_code, %coordinate, "Location found");
        Ok(coordinate)
    }
}

impl std::fmt::Debug for AddressResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressResolver").finish_non_exhaustive()
    }
}
