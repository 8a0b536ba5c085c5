//! Google Geocoding and Places (legacy web service) client.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::protocols::{Geocoder, PlacesProvider};
use crate::errors::ProviderError;
use crate::models::{CandidateRef, Coordinate, PlaceDetails};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";
const GEOCODING: &str = "geocoding";
const PLACES: &str = "places";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Coordinate,
}

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<CandidateRef>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,
    #[serde(default)]
    result: Option<DetailsResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DetailsResult {
    name: String,
    formatted_address: String,
    formatted_phone_number: String,
    website: String,
    url: String,
    business_status: String,
}

impl From<DetailsResult> for PlaceDetails {
    fn from(result: DetailsResult) -> Self {
        Self {
            name: result.name,
            address: result.formatted_address,
            phone: result.formatted_phone_number,
            website: result.website,
            maps_url: result.url,
            business_status: result.business_status,
        }
    }
}

/// `OK` and `ZERO_RESULTS` are successes; anything else is an API error.
fn check_status(
    service: &'static str,
    status: &str,
    error_message: Option<String>,
) -> Result<(), ProviderError> {
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        other => Err(ProviderError::api(
            service,
            other,
            error_message.unwrap_or_default(),
        )),
    }
}

fn parse_geocode(response: GeocodeResponse) -> Result<Vec<Coordinate>, ProviderError> {
    check_status(GEOCODING, &response.status, response.error_message)?;
    Ok(response
        .results
        .into_iter()
        .map(|result| result.geometry.location)
        .collect())
}

fn parse_text_search(response: TextSearchResponse) -> Result<Vec<CandidateRef>, ProviderError> {
    check_status(PLACES, &response.status, response.error_message)?;
    Ok(response.results)
}

fn parse_details(response: DetailsResponse) -> Result<PlaceDetails, ProviderError> {
    check_status(PLACES, &response.status, response.error_message)?;
    response
        .result
        .map(PlaceDetails::from)
        .ok_or_else(|| ProviderError::decode(PLACES, "details response has no result"))
}

/// Client for the Google Maps web services.
#[derive(Debug, Clone)]
pub struct GoogleMapsClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GoogleMapsClient {
    /// Creates a client against the public endpoint.
    #[must_use]
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Points the client at another host (e.g. a local stub server).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        service: &'static str,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| ProviderError::transport(service, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::status(service, status.as_u16(), body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::decode(service, e.to_string()))
    }
}

#[async_trait]
impl Geocoder for GoogleMapsClient {
    async fn geocode(&self, address: &str) -> Result<Vec<Coordinate>, ProviderError> {
        let response: GeocodeResponse = self
            .get_json(GEOCODING, "/maps/api/geocode/json", &[("address", address)])
            .await?;
        parse_geocode(response)
    }
}

#[async_trait]
impl PlacesProvider for GoogleMapsClient {
    async fn text_search(
        &self,
        query: &str,
        center: Coordinate,
        radius_m: u32,
    ) -> Result<Vec<CandidateRef>, ProviderError> {
        let location = center.to_string();
        let radius = radius_m.to_string();
        let response: TextSearchResponse = self
            .get_json(
                PLACES,
                "/maps/api/place/textsearch/json",
                &[("query", query), ("location", &location), ("radius", &radius)],
            )
            .await?;
        parse_text_search(response)
    }

    async fn place_details(
        &self,
        place_id: &str,
        fields: &[&str],
    ) -> Result<PlaceDetails, ProviderError> {
        let fields = fields.join(",");
        let response: DetailsResponse = self
            .get_json(
                PLACES,
                "/maps/api/place/details/json",
                &[("place_id", place_id), ("fields", &fields)],
            )
            .await?;
        parse_details(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_geocode() {
        let response: GeocodeResponse = serde_json::from_str(
            r#"{"status": "OK", "results": [
                {"geometry": {"location": {"lat": 37.789, "lng": -122.394}}, "place_id": "x"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(
            parse_geocode(response).unwrap(),
            vec![Coordinate::new(37.789, -122.394)]
        );
    }

    #[test]
    fn test_parse_geocode_zero_results_is_empty() {
        let response: GeocodeResponse =
            serde_json::from_str(r#"{"status": "ZERO_RESULTS", "results": []}"#).unwrap();
        assert!(parse_geocode(response).unwrap().is_empty());
    }

    #[test]
    fn test_parse_geocode_denied() {
        let response: GeocodeResponse = serde_json::from_str(
            r#"{"status": "REQUEST_DENIED", "error_message": "The provided API key is invalid."}"#,
        )
        .unwrap();

        let err = parse_geocode(response).unwrap_err();
        assert!(matches!(err, ProviderError::Api { ref status, .. } if status == "REQUEST_DENIED"));
        assert!(err.to_string().contains("API key is invalid"));
    }

    #[test]
    fn test_parse_text_search_keeps_order() {
        let response: TextSearchResponse = serde_json::from_str(
            r#"{"status": "OK", "results": [
                {"place_id": "a", "name": "Alpha", "rating": 4.5},
                {"place_id": "b", "name": "Beta"}
            ]}"#,
        )
        .unwrap();

        let candidates = parse_text_search(response).unwrap();
        assert_eq!(
            candidates,
            vec![CandidateRef::new("a", "Alpha"), CandidateRef::new("b", "Beta")]
        );
    }

    #[test]
    fn test_parse_details_missing_fields_default_empty() {
        let response: DetailsResponse = serde_json::from_str(
            r#"{"status": "OK", "result": {"name": "Corner Bakery", "url": "https://maps.google.com/?cid=9"}}"#,
        )
        .unwrap();

        let details = parse_details(response).unwrap();
        assert_eq!(details.name, "Corner Bakery");
        assert_eq!(details.maps_url, "https://maps.google.com/?cid=9");
        assert_eq!(details.website, "");
        assert_eq!(details.phone, "");
    }

    #[test]
    fn test_parse_details_without_result() {
        let response: DetailsResponse =
            serde_json::from_str(r#"{"status": "NOT_FOUND"}"#).unwrap();
        assert!(matches!(
            parse_details(response),
            Err(ProviderError::Api { .. })
        ));

        let response: DetailsResponse = serde_json::from_str(r#"{"status": "OK"}"#).unwrap();
        assert!(matches!(
            parse_details(response),
            Err(ProviderError::Decode { .. })
        ));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = GoogleMapsClient::new(reqwest::Client::new(), "key")
            .with_base_url("http://localhost:8080/");
        assert_eq!(client.base_url, "http://localhost:8080");
    }
}
