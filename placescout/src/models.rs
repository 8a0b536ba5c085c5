//! Data models shared by search and export.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ValidationError;

/// Countries whose postal codes the finder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Country {
    /// United States (ZIP / ZIP+4).
    #[default]
    #[serde(rename = "US")]
    UnitedStates,
    /// India (6-digit PIN).
    #[serde(rename = "IN")]
    India,
}

impl Country {
    /// Two-letter country code.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::UnitedStates => "US",
            Self::India => "IN",
        }
    }

    /// Country name appended to geocoding queries.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::UnitedStates => "United States",
            Self::India => "India",
        }
    }

    /// What a postal code is called in this country.
    #[must_use]
    pub fn postal_label(self) -> &'static str {
        match self {
            Self::UnitedStates => "US postal code",
            Self::India => "PIN code",
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Country {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "US" => Ok(Self::UnitedStates),
            "IN" => Ok(Self::India),
            _ => Err(ValidationError::UnsupportedCountry(s.to_string())),
        }
    }
}

/// A geographic point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl Coordinate {
    /// Creates a new coordinate.
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// A place returned by a text search, before its details are fetched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CandidateRef {
    /// Provider place identifier.
    pub place_id: String,
    /// Display name from the search result.
    #[serde(default)]
    pub name: String,
}

impl CandidateRef {
    /// Creates a new candidate reference.
    #[must_use]
    pub fn new(place_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            place_id: place_id.into(),
            name: name.into(),
        }
    }
}

/// Contact and status fields for one place, as returned by the detail call.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaceDetails {
    /// Business name.
    pub name: String,
    /// Formatted street address.
    pub address: String,
    /// Formatted phone number.
    pub phone: String,
    /// Business website, empty when unknown.
    pub website: String,
    /// Link to the place on the map provider.
    pub maps_url: String,
    /// Operational status (e.g. `OPERATIONAL`).
    pub business_status: String,
}

impl PlaceDetails {
    /// Whether the place lists a website worth scraping.
    #[must_use]
    pub fn has_website(&self) -> bool {
        !self.website.trim().is_empty()
    }
}

/// One enriched business match.
///
/// Records are built once and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessRecord {
    /// Business name.
    pub name: String,
    /// Formatted street address.
    pub address: String,
    /// Formatted phone number.
    pub phone: String,
    /// Business website.
    pub website: String,
    /// Contact email scraped from the website.
    pub email: Option<String>,
    /// Link to the place on the map provider.
    pub maps_url: String,
    /// Operational status.
    pub status: String,
    /// Postal code the record was found under.
    pub postal_code: String,
    /// Keyword the record was found with.
    pub keyword: String,
}

impl BusinessRecord {
    /// Builds a record from fetched details plus the scraped email.
    #[must_use]
    pub fn from_details(
        details: PlaceDetails,
        email: Option<String>,
        postal_code: impl Into<String>,
        keyword: impl Into<String>,
    ) -> Self {
        Self {
            name: details.name,
            address: details.address,
            phone: details.phone,
            website: details.website,
            email,
            maps_url: details.maps_url,
            status: details.business_status,
            postal_code: postal_code.into(),
            keyword: keyword.into(),
        }
    }

    /// Renders the record as a sheet row, in header column order.
    #[must_use]
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.address.clone(),
            self.phone.clone(),
            self.website.clone(),
            self.email.clone().unwrap_or_default(),
            self.maps_url.clone(),
            self.status.clone(),
            self.postal_code.clone(),
            self.keyword.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_country_from_str() {
        assert_eq!("US".parse::<Country>().unwrap(), Country::UnitedStates);
        assert_eq!(" in ".parse::<Country>().unwrap(), Country::India);
        assert_eq!(
            "GB".parse::<Country>(),
            Err(ValidationError::UnsupportedCountry("GB".to_string()))
        );
    }

    #[test]
    fn test_country_serde_uses_codes() {
        let json = serde_json::to_string(&Country::India).unwrap();
        assert_eq!(json, "\"IN\"");
        let parsed: Country = serde_json::from_str("\"US\"").unwrap();
        assert_eq!(parsed, Country::UnitedStates);
    }

    #[test]
    fn test_record_row_order() {
        let details = PlaceDetails {
            name: "Tartine".to_string(),
            address: "600 Guerrero St".to_string(),
            phone: "(415) 487-2600".to_string(),
            website: "https://tartine.com".to_string(),
            maps_url: "https://maps.google.com/?cid=1".to_string(),
            business_status: "OPERATIONAL".to_string(),
        };
        let record = BusinessRecord::from_details(details, None, "94105", "bakery");

        assert_eq!(
            record.to_row(),
            vec![
                "Tartine",
                "600 Guerrero St",
                "(415) 487-2600",
                "https://tartine.com",
                "",
                "https://maps.google.com/?cid=1",
                "OPERATIONAL",
                "94105",
                "bakery",
            ]
        );
    }

    #[test]
    fn test_place_details_has_website() {
        let mut details = PlaceDetails::default();
        assert!(!details.has_website());
        details.website = "  ".to_string();
        assert!(!details.has_website());
        details.website = "https://example.com".to_string();
        assert!(details.has_website());
    }
}
