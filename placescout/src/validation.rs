//! Request validation.
//!
//! Validation is all-or-nothing: a single malformed postal code rejects the
//! whole request before any provider is contacted.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::errors::ValidationError;
use crate::models::Country;

/// Maximum number of postal codes per request.
pub const MAX_POSTAL_CODES: usize = 5;

/// Maximum number of keywords per request.
pub const MAX_KEYWORDS: usize = 5;

#[allow(clippy::expect_used)]
static US_POSTAL_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}(-\d{4})?$").expect("valid US postal code pattern"));

#[allow(clippy::expect_used)]
static IN_POSTAL_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{6}$").expect("valid PIN code pattern"));

/// Checks a postal code against its country's format.
///
/// The code is matched as given; callers trim whitespace first.
#[must_use]
pub fn validate_postal_code(postal_code: &str, country: Country) -> bool {
    match country {
        Country::UnitedStates => US_POSTAL_CODE.is_match(postal_code),
        Country::India => IN_POSTAL_CODE.is_match(postal_code),
    }
}

/// A validated search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    postal_codes: Vec<String>,
    keywords: Vec<String>,
    country: Country,
    max_results: Option<usize>,
}

impl SearchRequest {
    /// Builds and validates a request.
    ///
    /// Postal codes and keywords are trimmed; blank keywords are dropped.
    pub fn new<P, K>(
        postal_codes: P,
        keywords: K,
        country: Country,
        max_results: Option<usize>,
    ) -> Result<Self, ValidationError>
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        K: IntoIterator,
        K::Item: AsRef<str>,
    {
        let postal_codes: Vec<String> = postal_codes
            .into_iter()
            .map(|code| code.as_ref().trim().to_string())
            .collect();
        let keywords: Vec<String> = keywords
            .into_iter()
            .map(|keyword| keyword.as_ref().trim().to_string())
            .filter(|keyword| !keyword.is_empty())
            .collect();

        if postal_codes.is_empty() {
            return Err(ValidationError::Missing("postal codes"));
        }
        if keywords.is_empty() {
            return Err(ValidationError::Missing("keywords"));
        }
        if postal_codes.len() > MAX_POSTAL_CODES {
            return Err(ValidationError::TooMany {
                field: "postal codes",
                max: MAX_POSTAL_CODES,
                actual: postal_codes.len(),
            });
        }
        if keywords.len() > MAX_KEYWORDS {
            return Err(ValidationError::TooMany {
                field: "keywords",
                max: MAX_KEYWORDS,
                actual: keywords.len(),
            });
        }

        if let Some(bad) = postal_codes
            .iter()
            .find(|code| !validate_postal_code(code, country))
        {
            return Err(ValidationError::InvalidPostalCode {
                postal_code: bad.clone(),
                label: country.postal_label(),
            });
        }

        Ok(Self {
            postal_codes,
            keywords,
            country,
            max_results,
        })
    }

    /// Parses the country code and then validates as [`SearchRequest::new`].
    pub fn parse<P, K>(
        postal_codes: P,
        keywords: K,
        country: &str,
        max_results: Option<usize>,
    ) -> Result<Self, ValidationError>
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        K: IntoIterator,
        K::Item: AsRef<str>,
    {
        Self::new(postal_codes, keywords, country.parse()?, max_results)
    }

    /// The postal codes, in request order.
    #[must_use]
    pub fn postal_codes(&self) -> &[String] {
        &self.postal_codes
    }

    /// The keywords, in request order.
    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// The country all postal codes belong to.
    #[must_use]
    pub fn country(&self) -> Country {
        self.country
    }

    /// The requested result cap, if any.
    #[must_use]
    pub fn max_results(&self) -> Option<usize> {
        self.max_results
    }

    /// Resolves the effective per-keyword result cap.
    ///
    /// Missing or zero falls back to `default`; anything larger than
    /// `max_allowed` is clamped to it.
    #[must_use]
    pub fn effective_max_results(&self, default: usize, max_allowed: usize) -> usize {
        match self.max_results {
            None | Some(0) => default.min(max_allowed),
            Some(n) => n.min(max_allowed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_us_postal_codes() {
        for valid in ["94105", "00000", "94105-1234"] {
            assert!(validate_postal_code(valid, Country::UnitedStates), "{valid}");
        }
        for invalid in [
            "9410", "941055", "94105-123", "94105-12345", "94105 1234", "abcde", "", " 94105",
            "941051234",
        ] {
            assert!(!validate_postal_code(invalid, Country::UnitedStates), "{invalid}");
        }
    }

    #[test]
    fn test_in_postal_codes() {
        assert!(validate_postal_code("110001", Country::India));
        for invalid in ["11000", "1100011", "110-001", "94105-1234", "abcdef"] {
            assert!(!validate_postal_code(invalid, Country::India), "{invalid}");
        }
    }

    #[test]
    fn test_request_trims_and_drops_blank_keywords() {
        let request =
            SearchRequest::new([" 94105 "], ["bakery", " ", " cafe"], Country::UnitedStates, None)
                .unwrap();

        assert_eq!(request.postal_codes(), ["94105".to_string()]);
        assert_eq!(request.keywords(), ["bakery".to_string(), "cafe".to_string()]);
    }

    #[test]
    fn test_request_rejects_any_malformed_code() {
        let err = SearchRequest::new(
            ["94105", "9410", "10001"],
            ["bakery"],
            Country::UnitedStates,
            None,
        )
        .unwrap_err();

        assert_eq!(
            err,
            ValidationError::InvalidPostalCode {
                postal_code: "9410".to_string(),
                label: "US postal code",
            }
        );
    }

    #[test]
    fn test_request_limits() {
        let codes = ["10001", "10002", "10003", "10004", "10005", "10006"];
        let err = SearchRequest::new(codes, ["bakery"], Country::UnitedStates, None).unwrap_err();
        assert!(matches!(err, ValidationError::TooMany { field: "postal codes", actual: 6, .. }));

        let err = SearchRequest::new(Vec::<String>::new(), ["bakery"], Country::India, None)
            .unwrap_err();
        assert_eq!(err, ValidationError::Missing("postal codes"));

        let err = SearchRequest::new(["110001"], [""], Country::India, None).unwrap_err();
        assert_eq!(err, ValidationError::Missing("keywords"));
    }

    #[test]
    fn test_request_parse_country() {
        let request = SearchRequest::parse(["110001"], ["tailor"], "IN", Some(10)).unwrap();
        assert_eq!(request.country(), Country::India);

        let err = SearchRequest::parse(["110001"], ["tailor"], "FR", None).unwrap_err();
        assert_eq!(err, ValidationError::UnsupportedCountry("FR".to_string()));
    }

    #[test]
    fn test_effective_max_results() {
        let build = |max| SearchRequest::new(["94105"], ["x"], Country::UnitedStates, max).unwrap();

        assert_eq!(build(None).effective_max_results(20, 100), 20);
        assert_eq!(build(Some(0)).effective_max_results(20, 100), 20);
        assert_eq!(build(Some(1)).effective_max_results(20, 100), 1);
        assert_eq!(build(Some(250)).effective_max_results(20, 100), 100);
    }
}
