//! Sample data and wiring for tests.

use std::sync::Arc;

use super::mocks::{RecordingSleeper, StubGeocoder, StubPageFetcher, StubPlaces};
use crate::config::{ScrapeConfig, SearchConfig};
use crate::models::{BusinessRecord, CandidateRef, PlaceDetails};
use crate::search::{SearchOrchestrator, SearchServices};

/// Details for a place called `name`, with a website when one is given.
#[must_use]
pub fn place_details(name: &str, website: Option<&str>) -> PlaceDetails {
    PlaceDetails {
        name: name.to_string(),
        address: format!("{name} Street"),
        phone: "(555) 010-0000".to_string(),
        website: website.unwrap_or_default().to_string(),
        maps_url: format!("https://maps.google.com/?q={}", name.replace(' ', "+")),
        business_status: "OPERATIONAL".to_string(),
    }
}

/// `count` records tagged with `postal_code` and `keyword`.
#[must_use]
pub fn sample_records(count: usize, postal_code: &str, keyword: &str) -> Vec<BusinessRecord> {
    (0..count)
        .map(|i| {
            BusinessRecord::from_details(
                place_details(&format!("Business {i}"), None),
                None,
                postal_code,
                keyword,
            )
        })
        .collect()
}

/// Registers `count` candidates with details for `query`, ids `{prefix}0..`.
#[must_use]
pub fn with_candidates(places: StubPlaces, query: &str, prefix: &str, count: usize) -> StubPlaces {
    let candidates: Vec<_> = (0..count)
        .map(|i| CandidateRef::new(format!("{prefix}{i}"), format!("{prefix} {i}")))
        .collect();

    candidates.iter().fold(
        places.with_search_results(query, candidates.clone()),
        |places, candidate| {
            places.with_details(
                candidate.place_id.clone(),
                place_details(&candidate.name, None),
            )
        },
    )
}

/// A search harness over stub services, keeping handles for assertions.
pub struct TestSearch {
    /// The geocoder fake.
    pub geocoder: Arc<StubGeocoder>,
    /// The places fake.
    pub places: Arc<StubPlaces>,
    /// The page fetcher fake.
    pub fetcher: Arc<StubPageFetcher>,
    /// The sleeper fake.
    pub sleeper: Arc<RecordingSleeper>,
    /// The orchestrator wired to the fakes.
    pub orchestrator: SearchOrchestrator,
}

impl TestSearch {
    /// Wires an orchestrator with default settings onto the fakes.
    #[must_use]
    pub fn new(geocoder: StubGeocoder, places: StubPlaces, fetcher: StubPageFetcher) -> Self {
        Self::with_config(SearchConfig::default(), geocoder, places, fetcher)
    }

    /// Wires an orchestrator with `config` onto the fakes.
    #[must_use]
    pub fn with_config(
        config: SearchConfig,
        geocoder: StubGeocoder,
        places: StubPlaces,
        fetcher: StubPageFetcher,
    ) -> Self {
        let geocoder = Arc::new(geocoder);
        let places = Arc::new(places);
        let fetcher = Arc::new(fetcher);
        let sleeper = Arc::new(RecordingSleeper::new());

        let services = SearchServices {
            geocoder: geocoder.clone(),
            places: places.clone(),
            fetcher: fetcher.clone(),
            sleeper: sleeper.clone(),
        };
        let orchestrator = SearchOrchestrator::new(config, &ScrapeConfig::default(), services);

        Self {
            geocoder,
            places,
            fetcher,
            sleeper,
            orchestrator,
        }
    }
}
