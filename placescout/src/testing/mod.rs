//! Testing utilities for placescout.
//!
//! This module provides:
//! - Scripted fakes for every external service
//! - Sample places and records
//! - A search harness wired onto the fakes

mod fixtures;
mod mocks;

pub use fixtures::{place_details, sample_records, with_candidates, TestSearch};
pub use mocks::{
    FetchRequest, RecordingSheets, RecordingSleeper, SheetsCall, StubGeocoder,
    StubPageFetcher, StubPlaces,
};
