//! Scripted service fakes that record their calls.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

use crate::errors::{ProviderError, SheetsError};
use crate::models::{CandidateRef, Coordinate, PlaceDetails};
use crate::providers::{Geocoder, PageFetcher, PlacesProvider, SheetsService};
use crate::runtime::Sleeper;

/// A geocoder answering from a fixed table.
///
/// Unknown addresses resolve to no candidates.
#[derive(Debug, Default)]
pub struct StubGeocoder {
    locations: HashMap<String, Vec<Coordinate>>,
    failures: HashMap<String, ProviderError>,
    queries: Mutex<Vec<String>>,
}

impl StubGeocoder {
    /// Creates a geocoder that knows no address.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a candidate for `address`, after any already registered.
    #[must_use]
    pub fn with_location(mut self, address: impl Into<String>, coordinate: Coordinate) -> Self {
        self.locations
            .entry(address.into())
            .or_default()
            .push(coordinate);
        self
    }

    /// Makes `address` fail with `error`.
    #[must_use]
    pub fn with_failure(mut self, address: impl Into<String>, error: ProviderError) -> Self {
        self.failures.insert(address.into(), error);
        self
    }

    /// Addresses queried so far.
    #[must_use]
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn geocode(&self, address: &str) -> Result<Vec<Coordinate>, ProviderError> {
        self.queries.lock().push(address.to_string());

        if let Some(error) = self.failures.get(address) {
            return Err(error.clone());
        }
        Ok(self.locations.get(address).cloned().unwrap_or_default())
    }
}

/// A places provider answering from fixed tables.
///
/// Unknown queries return no candidates; unknown place ids fail with
/// `NOT_FOUND`. Stalled place ids never answer; delayed ones answer late.
#[derive(Debug, Default)]
pub struct StubPlaces {
    results: HashMap<String, Vec<CandidateRef>>,
    search_failures: HashMap<String, ProviderError>,
    details: HashMap<String, PlaceDetails>,
    detail_failures: HashMap<String, ProviderError>,
    stalled: HashSet<String>,
    delayed: HashMap<String, Duration>,
    search_calls: Mutex<Vec<(String, u32)>>,
    detail_calls: Mutex<Vec<String>>,
    detail_answers: Mutex<usize>,
}

impl StubPlaces {
    /// Creates a provider with no data.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the candidates returned for `query`.
    #[must_use]
    pub fn with_search_results(
        mut self,
        query: impl Into<String>,
        candidates: impl IntoIterator<Item = CandidateRef>,
    ) -> Self {
        self.results
            .insert(query.into(), candidates.into_iter().collect());
        self
    }

    /// Makes the search for `query` fail.
    #[must_use]
    pub fn with_search_failure(mut self, query: impl Into<String>, error: ProviderError) -> Self {
        self.search_failures.insert(query.into(), error);
        self
    }

    /// Sets the details returned for `place_id`.
    #[must_use]
    pub fn with_details(mut self, place_id: impl Into<String>, details: PlaceDetails) -> Self {
        self.details.insert(place_id.into(), details);
        self
    }

    /// Makes the detail lookup for `place_id` fail.
    #[must_use]
    pub fn with_details_failure(
        mut self,
        place_id: impl Into<String>,
        error: ProviderError,
    ) -> Self {
        self.detail_failures.insert(place_id.into(), error);
        self
    }

    /// Makes the detail lookup for `place_id` hang forever.
    #[must_use]
    pub fn with_stalled_details(mut self, place_id: impl Into<String>) -> Self {
        self.stalled.insert(place_id.into());
        self
    }

    /// Holds the detail answer for `place_id` back by `delay`.
    #[must_use]
    pub fn with_delayed_details(mut self, place_id: impl Into<String>, delay: Duration) -> Self {
        self.delayed.insert(place_id.into(), delay);
        self
    }

    /// `(query, radius_m)` of every text search so far.
    #[must_use]
    pub fn search_calls(&self) -> Vec<(String, u32)> {
        self.search_calls.lock().clone()
    }

    /// Place ids of every detail lookup so far.
    #[must_use]
    pub fn detail_calls(&self) -> Vec<String> {
        self.detail_calls.lock().clone()
    }

    /// Number of detail lookups that have returned, successfully or not.
    #[must_use]
    pub fn detail_answers(&self) -> usize {
        *self.detail_answers.lock()
    }
}

#[async_trait]
impl PlacesProvider for StubPlaces {
    async fn text_search(
        &self,
        query: &str,
        _center: Coordinate,
        radius_m: u32,
    ) -> Result<Vec<CandidateRef>, ProviderError> {
        self.search_calls.lock().push((query.to_string(), radius_m));

        if let Some(error) = self.search_failures.get(query) {
            return Err(error.clone());
        }
        Ok(self.results.get(query).cloned().unwrap_or_default())
    }

    async fn place_details(
        &self,
        place_id: &str,
        _fields: &[&str],
    ) -> Result<PlaceDetails, ProviderError> {
        self.detail_calls.lock().push(place_id.to_string());

        if self.stalled.contains(place_id) {
            return futures::future::pending().await;
        }
        if let Some(delay) = self.delayed.get(place_id) {
            tokio::time::sleep(*delay).await;
        }
        *self.detail_answers.lock() += 1;

        if let Some(error) = self.detail_failures.get(place_id) {
            return Err(error.clone());
        }
        self.details
            .get(place_id)
            .cloned()
            .ok_or_else(|| ProviderError::api("places", "NOT_FOUND", place_id))
    }
}

/// One request seen by [`StubPageFetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Requested URL.
    pub url: String,
    /// Timeout passed with the request.
    pub timeout: Duration,
    /// Headers passed with the request.
    pub headers: HashMap<String, String>,
}

/// A page fetcher serving fixed bodies.
///
/// Unknown URLs answer HTTP 404.
#[derive(Debug, Default)]
pub struct StubPageFetcher {
    pages: HashMap<String, String>,
    failures: HashMap<String, ProviderError>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl StubPageFetcher {
    /// Creates a fetcher serving nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` at `url`.
    #[must_use]
    pub fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), body.into());
        self
    }

    /// Makes `url` fail with `error`.
    #[must_use]
    pub fn with_failure(mut self, url: impl Into<String>, error: ProviderError) -> Self {
        self.failures.insert(url.into(), error);
        self
    }

    /// Requests seen so far.
    #[must_use]
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl PageFetcher for StubPageFetcher {
    async fn fetch_text(
        &self,
        url: &str,
        timeout: Duration,
        headers: &HashMap<String, String>,
    ) -> Result<String, ProviderError> {
        self.requests.lock().push(FetchRequest {
            url: url.to_string(),
            timeout,
            headers: headers.clone(),
        });

        if let Some(error) = self.failures.get(url) {
            return Err(error.clone());
        }
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| ProviderError::status("website", 404, "Not Found"))
    }
}

/// A call made against [`RecordingSheets`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetsCall {
    /// `create_sheet(title)`.
    Create(String),
    /// `write_range(range, rows)`.
    Write {
        /// Target range.
        range: String,
        /// Rows written.
        rows: Vec<Vec<String>>,
    },
    /// `append_range(range, rows)`.
    Append {
        /// Target range.
        range: String,
        /// Rows appended.
        rows: Vec<Vec<String>>,
    },
}

/// A spreadsheet service that records every call.
///
/// Creation results are scripted in order; once the script runs out every
/// creation succeeds. Writes succeed unless a write failure is set.
#[derive(Debug, Default)]
pub struct RecordingSheets {
    create_results: Mutex<VecDeque<Result<(), SheetsError>>>,
    write_failure: Option<SheetsError>,
    calls: Mutex<Vec<SheetsCall>>,
}

impl RecordingSheets {
    /// Creates a service where everything succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the results of the next creation attempts.
    #[must_use]
    pub fn with_create_results(
        self,
        results: impl IntoIterator<Item = Result<(), SheetsError>>,
    ) -> Self {
        self.create_results.lock().extend(results);
        self
    }

    /// Queues `count` title collisions.
    #[must_use]
    pub fn with_collisions(self, count: usize) -> Self {
        let collisions = (0..count).map(|_| Err(SheetsError::already_exists("taken")));
        self.with_create_results(collisions)
    }

    /// Makes every write and append fail with `error`.
    #[must_use]
    pub fn with_write_failure(mut self, error: SheetsError) -> Self {
        self.write_failure = Some(error);
        self
    }

    /// Every call so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<SheetsCall> {
        self.calls.lock().clone()
    }

    /// Titles passed to `create_sheet`, in order.
    #[must_use]
    pub fn created_titles(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                SheetsCall::Create(title) => Some(title.clone()),
                _ => None,
            })
            .collect()
    }

    fn write_result(&self) -> Result<(), SheetsError> {
        self.write_failure.clone().map_or(Ok(()), Err)
    }
}

#[async_trait]
impl SheetsService for RecordingSheets {
    async fn create_sheet(&self, title: &str) -> Result<(), SheetsError> {
        self.calls.lock().push(SheetsCall::Create(title.to_string()));
        self.create_results.lock().pop_front().unwrap_or(Ok(()))
    }

    async fn write_range(&self, range: &str, rows: Vec<Vec<String>>) -> Result<(), SheetsError> {
        self.calls.lock().push(SheetsCall::Write {
            range: range.to_string(),
            rows,
        });
        self.write_result()
    }

    async fn append_range(&self, range: &str, rows: Vec<Vec<String>>) -> Result<(), SheetsError> {
        self.calls.lock().push(SheetsCall::Append {
            range: range.to_string(),
            rows,
        });
        self.write_result()
    }
}

/// A sleeper that returns immediately and records what it was asked for.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    /// Creates a new sleeper.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Durations requested so far.
    #[must_use]
    pub fn recorded(&self) -> Vec<Duration> {
        self.sleeps.lock().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().push(duration);
    }
}
