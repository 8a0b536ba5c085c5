//! Configuration for the finder.
//!
//! The whole configuration is one value, built once at start-up and handed to
//! the orchestrator and the exporter. Loading it (environment, files, secret
//! stores) is the caller's business; this module only parses and validates.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ConfigError;
use crate::export::{RetryConfig, DEFAULT_MAX_TITLE_LENGTH};
use crate::observability::LogFormat;
use crate::search::DEFAULT_SEARCH_RADIUS_M;

/// Credentials for the external services.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    /// API key for geocoding and place search.
    #[serde(default)]
    pub maps_api_key: String,
    /// OAuth bearer token for the spreadsheet service.
    #[serde(default)]
    pub sheets_access_token: String,
}

/// Search and deadline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Result cap used when the request has none.
    #[serde(default = "default_max_results")]
    pub default_max_results: usize,
    /// Upper bound for any requested result cap.
    #[serde(default = "default_max_allowed")]
    pub max_allowed_results: usize,
    /// Budget for a task at the default result cap, in seconds.
    #[serde(default = "default_base_timeout")]
    pub base_timeout_secs: u64,
    /// Smallest budget any task gets, in seconds.
    #[serde(default = "default_min_timeout")]
    pub min_timeout_secs: u64,
    /// Largest budget any task gets, in seconds.
    #[serde(default = "default_max_timeout")]
    pub max_timeout_secs: u64,
    /// Place search radius in meters.
    #[serde(default = "default_radius")]
    pub search_radius_m: u32,
    /// Run postal-code tasks concurrently instead of one after another.
    #[serde(default)]
    pub parallel_tasks: bool,
}

fn default_max_results() -> usize {
    20
}

fn default_max_allowed() -> usize {
    100
}

fn default_base_timeout() -> u64 {
    60
}

fn default_min_timeout() -> u64 {
    15
}

fn default_max_timeout() -> u64 {
    300
}

fn default_radius() -> u32 {
    DEFAULT_SEARCH_RADIUS_M
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_max_results: default_max_results(),
            max_allowed_results: default_max_allowed(),
            base_timeout_secs: default_base_timeout(),
            min_timeout_secs: default_min_timeout(),
            max_timeout_secs: default_max_timeout(),
            search_radius_m: default_radius(),
            parallel_tasks: false,
        }
    }
}

impl SearchConfig {
    /// Sets the base timeout.
    #[must_use]
    pub fn with_base_timeout_secs(mut self, secs: u64) -> Self {
        self.base_timeout_secs = secs;
        self
    }

    /// Sets the timeout bounds.
    #[must_use]
    pub fn with_timeout_bounds(mut self, min_secs: u64, max_secs: u64) -> Self {
        self.min_timeout_secs = min_secs;
        self.max_timeout_secs = max_secs;
        self
    }

    /// Enables or disables concurrent postal-code tasks.
    #[must_use]
    pub fn with_parallel_tasks(mut self, parallel: bool) -> Self {
        self.parallel_tasks = parallel;
        self
    }
}

/// Website scraping settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Page fetch timeout in seconds.
    #[serde(default = "default_scrape_timeout")]
    pub timeout_seconds: f64,
    /// User agent sent with page fetches.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_scrape_timeout() -> f64 {
    5.0
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/91.0.4472.124 Safari/537.36"
        .to_string()
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_scrape_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl ScrapeConfig {
    /// Gets timeout as Duration.
    ///
    /// Values that are not a positive, representable number of seconds fall
    /// back to the 5 s default.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_seconds)
            .ok()
            .filter(|timeout| !timeout.is_zero())
            .unwrap_or_else(|| Duration::from_secs_f64(default_scrape_timeout()))
    }
}

/// Spreadsheet export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Identifier of the target spreadsheet.
    #[serde(default)]
    pub spreadsheet_id: String,
    /// Longest sheet title the service accepts.
    #[serde(default = "default_max_title")]
    pub max_title_length: usize,
    /// Retry policy for sheet creation.
    #[serde(default = "default_create_retry")]
    pub retry: RetryConfig,
}

fn default_max_title() -> usize {
    DEFAULT_MAX_TITLE_LENGTH
}

fn default_create_retry() -> RetryConfig {
    RetryConfig::default()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            max_title_length: default_max_title(),
            retry: default_create_retry(),
        }
    }
}

/// The complete finder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinderConfig {
    /// Service credentials.
    #[serde(default)]
    pub credentials: Credentials,
    /// Search settings.
    #[serde(default)]
    pub search: SearchConfig,
    /// Scrape settings.
    #[serde(default)]
    pub scrape: ScrapeConfig,
    /// Export settings.
    #[serde(default)]
    pub export: ExportConfig,
    /// Default log level when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Log output format.
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            search: SearchConfig::default(),
            scrape: ScrapeConfig::default(),
            export: ExportConfig::default(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

impl FinderConfig {
    /// Creates a configuration with defaults and the given credentials.
    #[must_use]
    pub fn new(
        maps_api_key: impl Into<String>,
        sheets_access_token: impl Into<String>,
        spreadsheet_id: impl Into<String>,
    ) -> Self {
        Self {
            credentials: Credentials {
                maps_api_key: maps_api_key.into(),
                sheets_access_token: sheets_access_token.into(),
            },
            export: ExportConfig {
                spreadsheet_id: spreadsheet_id.into(),
                ..ExportConfig::default()
            },
            ..Self::default()
        }
    }

    /// Parses a JSON document; missing sections take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Sets the search settings.
    #[must_use]
    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    /// Sets the sheet creation retry policy.
    #[must_use]
    pub fn with_export_retry(mut self, retry: RetryConfig) -> Self {
        self.export.retry = retry;
        self
    }

    /// Checks that credentials are present and bounds are consistent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.credentials.maps_api_key.trim().is_empty() {
            return Err(ConfigError::Missing("credentials.maps_api_key"));
        }
        if self.credentials.sheets_access_token.trim().is_empty() {
            return Err(ConfigError::Missing("credentials.sheets_access_token"));
        }
        if self.export.spreadsheet_id.trim().is_empty() {
            return Err(ConfigError::Missing("export.spreadsheet_id"));
        }
        self.validate_bounds()
    }

    fn validate_bounds(&self) -> Result<(), ConfigError> {
        let search = &self.search;
        if search.default_max_results == 0 {
            return Err(ConfigError::Invalid {
                field: "search.default_max_results",
                reason: "must be at least 1".to_string(),
            });
        }
        if search.default_max_results > search.max_allowed_results {
            return Err(ConfigError::Invalid {
                field: "search.default_max_results",
                reason: format!(
                    "{} exceeds max_allowed_results {}",
                    search.default_max_results, search.max_allowed_results
                ),
            });
        }
        if search.min_timeout_secs == 0 || search.min_timeout_secs > search.max_timeout_secs {
            return Err(ConfigError::Invalid {
                field: "search.min_timeout_secs",
                reason: format!(
                    "must be in 1..={} (max_timeout_secs)",
                    search.max_timeout_secs
                ),
            });
        }
        if search.base_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "search.base_timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.scrape.timeout_seconds <= 0.0 || !self.scrape.timeout_seconds.is_finite() {
            return Err(ConfigError::Invalid {
                field: "scrape.timeout_seconds",
                reason: "must be a positive number".to_string(),
            });
        }
        if self.export.max_title_length <= 10 {
            return Err(ConfigError::Invalid {
                field: "export.max_title_length",
                reason: "must leave room for a time suffix".to_string(),
            });
        }
        if self.export.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                field: "export.retry.max_attempts",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
