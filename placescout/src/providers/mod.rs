//! External service boundaries.
//!
//! This module provides:
//! - Protocol traits the engines depend on
//! - reqwest-backed adapters for Google Maps, plain web pages and Google Sheets

#[cfg(feature = "google")]
mod google_maps;
#[cfg(feature = "google")]
mod google_sheets;
#[cfg(feature = "google")]
mod http_fetch;
mod protocols;

#[cfg(feature = "google")]
pub use google_maps::GoogleMapsClient;
#[cfg(feature = "google")]
pub use google_sheets::GoogleSheetsClient;
#[cfg(feature = "google")]
pub use http_fetch::HttpPageFetcher;
pub use protocols::{Geocoder, PageFetcher, PlacesProvider, SheetsService};

#[cfg(test)]
pub use protocols::MockSheetsService;
