//! # Placescout
//!
//! Finds local businesses by postal code and keyword, enriches them with a
//! contact email scraped from their website, and exports the result to a
//! spreadsheet.
//!
//! - **Deadline-bounded search**: one task per postal code, each with a budget
//!   scaled to the requested result count; a task that runs out of time
//!   returns what it has so far
//! - **Fail-soft pipeline**: provider failures are logged and skipped at the
//!   smallest granularity, so one bad keyword or place never sinks a search
//! - **Collision-safe export**: sheet titles are sanitized and renamed with a
//!   time suffix when a sheet of the same name already exists
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use placescout::prelude::*;
//!
//! let config = FinderConfig::new(maps_key, sheets_token, spreadsheet_id);
//! init_tracing(&config.log_level, config.log_format)?;
//!
//! let finder = BusinessFinder::connect(config).await?;
//! let (outcome, sheet) = finder
//!     .search_and_export(["94105"], ["bakery"], "US", Some(20), None)
//!     .await?;
//!
//! for error in &outcome.errors {
//!     eprintln!("{}: {error}", error.postal_code());
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod errors;
pub mod export;
pub mod finder;
pub mod models;
pub mod observability;
pub mod providers;
pub mod runtime;
pub mod search;
pub mod testing;
pub mod validation;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Credentials, ExportConfig, FinderConfig, ScrapeConfig, SearchConfig};
    pub use crate::errors::{
        ConfigError, ExportError, FinderError, ProviderError, SearchError, SheetsError,
        ValidationError,
    };
    pub use crate::export::{RetryConfig, SheetExporter, SHEET_HEADERS};
    pub use crate::finder::BusinessFinder;
    pub use crate::models::{BusinessRecord, Coordinate, Country, PlaceDetails};
    pub use crate::observability::{init_tracing, LogFormat};
    pub use crate::providers::{Geocoder, PageFetcher, PlacesProvider, SheetsService};
    pub use crate::runtime::{Sleeper, TokioSleeper};
    pub use crate::search::{
        SearchOrchestrator, SearchOutcome, SearchServices, TaskReport, TaskStatus, TimeoutPlanner,
    };
    pub use crate::validation::SearchRequest;

    #[cfg(feature = "google")]
    pub use crate::providers::{GoogleMapsClient, GoogleSheetsClient, HttpPageFetcher};
}
