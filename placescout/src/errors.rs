//! Error types for placescout.
//!
//! Only [`ValidationError`] and [`ExportError`] ever reach the end caller as a
//! hard failure. Everything a single postal-code task can run into is a
//! [`SearchError`], which is recorded in the outcome's error list instead.

use std::collections::HashMap;
use thiserror::Error;

/// The top-level error type for placescout operations.
#[derive(Debug, Error)]
pub enum FinderError {
    /// The search request was rejected before any task started.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The export step failed.
    #[error("{0}")]
    Export(#[from] ExportError),

    /// The configuration is incomplete or inconsistent.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// The target spreadsheet could not be reached.
    #[error("Cannot access spreadsheet: {0}")]
    Sheets(#[from] SheetsError),
}

/// Error raised when a search request is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A postal code does not match its country's format.
    #[error("Invalid {label}: {postal_code}")]
    InvalidPostalCode {
        /// The offending postal code, as supplied.
        postal_code: String,
        /// Human label for the country's postal code format.
        label: &'static str,
    },

    /// The country code is not one of the supported ones.
    #[error("Unsupported country code: {0}")]
    UnsupportedCountry(String),

    /// A required list was empty.
    #[error("Missing {0}")]
    Missing(&'static str),

    /// A list exceeded its allowed length.
    #[error("Too many {field}: {actual} given, at most {max} allowed")]
    TooMany {
        /// Which list overflowed.
        field: &'static str,
        /// The maximum allowed length.
        max: usize,
        /// The supplied length.
        actual: usize,
    },
}

/// Failure talking to an external provider.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// The request never produced a response.
    #[error("Transport error calling {service}: {message}")]
    Transport {
        /// Service name.
        service: &'static str,
        /// Underlying error message.
        message: String,
    },

    /// The provider answered with a non-success HTTP status.
    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        /// Service name.
        service: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// The provider answered 200 but reported an API-level error.
    #[error("{service} API error {status}: {message}")]
    Api {
        /// Service name.
        service: &'static str,
        /// Provider status string (e.g. `REQUEST_DENIED`).
        status: String,
        /// Provider error message, if any.
        message: String,
    },

    /// The response could not be decoded.
    #[error("Failed to decode {service} response: {message}")]
    Decode {
        /// Service name.
        service: &'static str,
        /// Decoder error message.
        message: String,
    },
}

impl ProviderError {
    /// Creates a transport error.
    #[must_use]
    pub fn transport(service: &'static str, message: impl Into<String>) -> Self {
        Self::Transport {
            service,
            message: message.into(),
        }
    }

    /// Creates an HTTP status error.
    #[must_use]
    pub fn status(service: &'static str, status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            service,
            status,
            body: body.into(),
        }
    }

    /// Creates an API-level error.
    #[must_use]
    pub fn api(
        service: &'static str,
        status: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Api {
            service,
            status: status.into(),
            message: message.into(),
        }
    }

    /// Creates a decode error.
    #[must_use]
    pub fn decode(service: &'static str, message: impl Into<String>) -> Self {
        Self::Decode {
            service,
            message: message.into(),
        }
    }
}

/// A failure recorded for one postal-code task.
///
/// These never abort the request; they accumulate in
/// [`SearchOutcome::errors`](crate::search::SearchOutcome).
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    /// Geocoding returned no match for the postal code, or failed outright.
    #[error("Could not find location for {query}")]
    Resolution {
        /// The postal code being resolved.
        postal_code: String,
        /// The geocoding query that was sent.
        query: String,
        /// The provider failure, when there was one.
        #[source]
        cause: Option<ProviderError>,
    },

    /// The task's deadline elapsed before it salvaged any record.
    #[error("Search for {postal_code} timed out after {budget_ms}ms")]
    Timeout {
        /// The postal code being searched.
        postal_code: String,
        /// The planned budget in milliseconds.
        budget_ms: u64,
    },

    /// The worker ended abnormally (panic or join failure).
    #[error("Worker for {postal_code} ended abnormally: {message}")]
    Worker {
        /// The postal code being searched.
        postal_code: String,
        /// Description of the failure.
        message: String,
    },
}

impl SearchError {
    /// Stable identifier of the error category.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Resolution { .. } => "ResolutionError",
            Self::Timeout { .. } => "TimeoutError",
            Self::Worker { .. } => "WorkerError",
        }
    }

    /// The postal code of the task that recorded this error.
    #[must_use]
    pub fn postal_code(&self) -> &str {
        match self {
            Self::Resolution { postal_code, .. }
            | Self::Timeout { postal_code, .. }
            | Self::Worker { postal_code, .. } => postal_code,
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("type".to_string(), serde_json::json!(self.kind()));
        map.insert("postal_code".to_string(), serde_json::json!(self.postal_code()));
        match self {
            Self::Resolution { query, cause, .. } => {
                map.insert("query".to_string(), serde_json::json!(query));
                if let Some(cause) = cause {
                    map.insert("cause".to_string(), serde_json::json!(cause.to_string()));
                }
            }
            Self::Timeout { budget_ms, .. } => {
                map.insert("budget_ms".to_string(), serde_json::json!(budget_ms));
            }
            Self::Worker { .. } => {}
        }
        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        map
    }
}

/// Failure reported by a spreadsheet service.
#[derive(Debug, Clone, Error)]
pub enum SheetsError {
    /// A sheet with the requested title already exists.
    #[error("Sheet '{title}' already exists")]
    AlreadyExists {
        /// The colliding title.
        title: String,
    },

    /// Any other provider failure.
    #[error("{0}")]
    Provider(#[from] ProviderError),
}

impl SheetsError {
    /// Creates a name collision error.
    #[must_use]
    pub fn already_exists(title: impl Into<String>) -> Self {
        Self::AlreadyExists {
            title: title.into(),
        }
    }

    /// Whether this is a name collision.
    #[must_use]
    pub fn is_collision(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}

/// Errors surfaced by the export step.
#[derive(Debug, Clone, Error)]
pub enum ExportError {
    /// Every creation attempt collided with an existing sheet.
    #[error("Failed to create sheet after {attempts} attempts, last tried '{last_title}'")]
    CreateExhausted {
        /// How many creates were attempted.
        attempts: usize,
        /// The last title that collided.
        last_title: String,
    },

    /// Sheet creation failed for a reason other than a collision.
    #[error("Failed to create sheet '{title}': {source}")]
    Create {
        /// The title being created.
        title: String,
        /// The service failure.
        #[source]
        source: SheetsError,
    },

    /// Writing the header or the data rows failed.
    #[error("Failed to write range {range}: {source}")]
    Write {
        /// The A1 range being written.
        range: String,
        /// The service failure.
        #[source]
        source: SheetsError,
    },
}

/// Error raised when configuration is incomplete or inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required value is empty.
    #[error("Missing configuration value: {0}")]
    Missing(&'static str),

    /// A value is out of range or inconsistent with another.
    #[error("Invalid configuration value for {field}: {reason}")]
    Invalid {
        /// The offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// The configuration document could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_message_uses_country_label() {
        let err = ValidationError::InvalidPostalCode {
            postal_code: "1234".to_string(),
            label: "PIN code",
        };
        assert_eq!(err.to_string(), "Invalid PIN code: 1234");
    }

    #[test]
    fn test_search_error_to_dict() {
        let err = SearchError::Resolution {
            postal_code: "00000".to_string(),
            query: "00000, United States".to_string(),
            cause: None,
        };
        let dict = err.to_dict();

        assert_eq!(dict.get("type").unwrap(), "ResolutionError");
        assert_eq!(dict.get("postal_code").unwrap(), "00000");
        assert_eq!(
            dict.get("message").unwrap(),
            "Could not find location for 00000, United States"
        );
    }

    #[test]
    fn test_search_error_kinds() {
        let timeout = SearchError::Timeout {
            postal_code: "94105".to_string(),
            budget_ms: 60_000,
        };
        assert_eq!(timeout.kind(), "TimeoutError");
        assert_eq!(timeout.postal_code(), "94105");

        let failed = SearchError::Resolution {
            postal_code: "94105".to_string(),
            query: "94105, United States".to_string(),
            cause: Some(ProviderError::transport("geocoding", "connection reset")),
        };
        assert_eq!(failed.kind(), "ResolutionError");
        assert!(std::error::Error::source(&failed).is_some());
        assert!(failed.to_dict()["cause"]
            .as_str()
            .is_some_and(|c| c.contains("connection reset")));
    }

    #[test]
    fn test_sheets_error_collision() {
        assert!(SheetsError::already_exists("x").is_collision());
        let other = SheetsError::from(ProviderError::status("sheets", 500, "boom"));
        assert!(!other.is_collision());
    }

    #[test]
    fn test_finder_error_from_validation() {
        let err: FinderError = ValidationError::Missing("keywords").into();
        assert_eq!(err.to_string(), "Missing keywords");
    }
}
