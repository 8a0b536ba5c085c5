//! Protocol traits for the external services.
//!
//! The search and export engines only ever see these traits, so every
//! provider can be swapped for a scripted fake in tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::{ProviderError, SheetsError};
use crate::models::{CandidateRef, Coordinate, PlaceDetails};

/// Geocoding service.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolves a free-form address to candidate coordinates, best first.
    async fn geocode(&self, address: &str) -> Result<Vec<Coordinate>, ProviderError>;
}

/// Place search and detail service.
#[async_trait]
pub trait PlacesProvider: Send + Sync {
    /// Text search around `center` within `radius_m` meters.
    async fn text_search(
        &self,
        query: &str,
        center: Coordinate,
        radius_m: u32,
    ) -> Result<Vec<CandidateRef>, ProviderError>;

    /// Fetches the requested detail fields for one place.
    async fn place_details(
        &self,
        place_id: &str,
        fields: &[&str],
    ) -> Result<PlaceDetails, ProviderError>;
}

/// Generic HTTP GET returning page text.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url` within `timeout`, sending `headers`.
    async fn fetch_text(
        &self,
        url: &str,
        timeout: Duration,
        headers: &HashMap<String, String>,
    ) -> Result<String, ProviderError>;
}

/// Spreadsheet service bound to one target spreadsheet.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SheetsService: Send + Sync {
    /// Adds a sheet titled `title`.
    ///
    /// Returns [`SheetsError::AlreadyExists`] on a title collision.
    async fn create_sheet(&self, title: &str) -> Result<(), SheetsError>;

    /// Overwrites `range` with `rows`.
    async fn write_range(&self, range: &str, rows: Vec<Vec<String>>) -> Result<(), SheetsError>;

    /// Appends `rows` after the last row of `range`.
    async fn append_range(&self, range: &str, rows: Vec<Vec<String>>) -> Result<(), SheetsError>;
}
