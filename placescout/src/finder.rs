//! One-stop facade: search, then export.

use std::sync::Arc;

use crate::config::FinderConfig;
use crate::errors::FinderError;
use crate::export::SheetExporter;
use crate::models::BusinessRecord;
use crate::providers::SheetsService;
use crate::runtime::Sleeper;
use crate::search::{SearchOrchestrator, SearchOutcome, SearchServices};
use crate::validation::SearchRequest;

/// Searches businesses and exports them to a spreadsheet.
///
/// Built once at start-up; every collaborator is wired here and shared by
/// reference afterwards.
#[derive(Debug)]
pub struct BusinessFinder {
    config: FinderConfig,
    orchestrator: SearchOrchestrator,
    exporter: SheetExporter,
}

impl BusinessFinder {
    /// Wires the finder onto explicit services.
    #[must_use]
    pub fn with_services(
        config: FinderConfig,
        search: SearchServices,
        sheets: Arc<dyn SheetsService>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        let orchestrator = SearchOrchestrator::new(config.search.clone(), &config.scrape, search);
        let exporter = SheetExporter::new(&config.export, sheets, sleeper);

        Self {
            config,
            orchestrator,
            exporter,
        }
    }

    /// The configuration the finder was built with.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Validates the inputs, then runs one deadline-bounded task per postal code.
    ///
    /// `country` is a two-letter code (`US` or `IN`). Only validation errors
    /// fail the call; task failures are reported in the outcome.
    pub async fn search_businesses<P, K>(
        &self,
        postal_codes: P,
        keywords: K,
        country: &str,
        max_results: Option<usize>,
    ) -> Result<SearchOutcome, FinderError>
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        K: IntoIterator,
        K::Item: AsRef<str>,
    {
        let request = SearchRequest::parse(postal_codes, keywords, country, max_results)?;
        Ok(self.orchestrator.run(&request).await)
    }

    /// Exports `records` to a new sheet, returning its title.
    pub async fn export_to_sheets(
        &self,
        records: &[BusinessRecord],
        sheet_name: Option<&str>,
    ) -> Result<Option<String>, FinderError> {
        Ok(self.exporter.export(records, sheet_name).await?)
    }

    /// Searches, then exports whatever was found.
    ///
    /// No sheet is created when the search found nothing.
    pub async fn search_and_export<P, K>(
        &self,
        postal_codes: P,
        keywords: K,
        country: &str,
        max_results: Option<usize>,
        sheet_name: Option<&str>,
    ) -> Result<(SearchOutcome, Option<String>), FinderError>
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        K: IntoIterator,
        K::Item: AsRef<str>,
    {
        let outcome = self
            .search_businesses(postal_codes, keywords, country, max_results)
            .await?;

        if outcome.is_empty() {
            tracing::info!(
                run_id = %outcome.run_id,
                errors = outcome.errors.len(),
                "No businesses found, skipping export"
            );
            return Ok((outcome, None));
        }

        let sheet = self.export_to_sheets(&outcome.records, sheet_name).await?;
        Ok((outcome, sheet))
    }
}

#[cfg(feature = "google")]
mod google {
    use std::sync::Arc;

    use super::BusinessFinder;
    use crate::config::FinderConfig;
    use crate::errors::{ConfigError, FinderError};
    use crate::providers::{GoogleMapsClient, GoogleSheetsClient, HttpPageFetcher};
    use crate::runtime::TokioSleeper;
    use crate::search::SearchServices;

    impl BusinessFinder {
        /// Validates `config` and wires the Google-backed services.
        pub fn from_config(config: FinderConfig) -> Result<Self, FinderError> {
            Ok(Self::from_parts(config)?.0)
        }

        /// Like [`BusinessFinder::from_config`], then checks that the
        /// spreadsheet is reachable with the configured token.
        pub async fn connect(config: FinderConfig) -> Result<Self, FinderError> {
            let (finder, sheets) = Self::from_parts(config)?;
            sheets.verify_access().await?;
            tracing::info!(
                spreadsheet_id = %finder.config.export.spreadsheet_id,
                "Spreadsheet access verified"
            );
            Ok(finder)
        }

        fn from_parts(
            config: FinderConfig,
        ) -> Result<(Self, Arc<GoogleSheetsClient>), FinderError> {
            config.validate()?;

            let client = reqwest::Client::builder()
                .build()
                .map_err(|e| ConfigError::Invalid {
                    field: "http_client",
                    reason: e.to_string(),
                })?;

            let maps = Arc::new(GoogleMapsClient::new(
                client.clone(),
                config.credentials.maps_api_key.clone(),
            ));
            let sheets = Arc::new(GoogleSheetsClient::new(
                client.clone(),
                config.credentials.sheets_access_token.clone(),
                config.export.spreadsheet_id.clone(),
            ));
            let sleeper = Arc::new(TokioSleeper);

            let services = SearchServices {
                geocoder: maps.clone(),
                places: maps,
                fetcher: Arc::new(HttpPageFetcher::new(client)),
                sleeper: sleeper.clone(),
            };

            let finder = Self::with_services(config, services, sheets.clone(), sleeper);
            Ok((finder, sheets))
        }
    }

}
