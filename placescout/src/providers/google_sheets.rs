//! Google Sheets v4 REST client.

use async_trait::async_trait;
use serde_json::json;

use super::protocols::SheetsService;
use crate::errors::{ProviderError, SheetsError};

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const SHEETS: &str = "sheets";

/// Maps a failed `addSheet` response to the right error.
fn classify_create_failure(title: &str, status: u16, body: String) -> SheetsError {
    if body.contains("already exists") {
        SheetsError::already_exists(title)
    } else {
        SheetsError::Provider(ProviderError::status(SHEETS, status, body))
    }
}

/// Client for one spreadsheet, authenticated with an OAuth bearer token.
#[derive(Debug, Clone)]
pub struct GoogleSheetsClient {
    client: reqwest::Client,
    access_token: String,
    spreadsheet_id: String,
    base_url: String,
}

impl GoogleSheetsClient {
    /// Creates a client for `spreadsheet_id`.
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        access_token: impl Into<String>,
        spreadsheet_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            access_token: access_token.into(),
            spreadsheet_id: spreadsheet_id.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Points the client at another host.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builds `<base>/<spreadsheet><suffix>/<segments...>` with each segment escaped.
    fn endpoint(&self, suffix: &str, segments: &[&str]) -> Result<reqwest::Url, SheetsError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ProviderError::transport(SHEETS, e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| ProviderError::transport(SHEETS, "base URL cannot carry a path"))?
            .push(&format!("{}{suffix}", self.spreadsheet_id))
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<(u16, String), SheetsError> {
        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| ProviderError::transport(SHEETS, e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::decode(SHEETS, e.to_string()))?;
        Ok((status, body))
    }

    /// Checks that the token can read the spreadsheet.
    pub async fn verify_access(&self) -> Result<(), SheetsError> {
        let url = self.endpoint("", &[])?;
        let (status, body) = self
            .send(self.client.get(url).query(&[("fields", "spreadsheetId")]))
            .await?;
        if (200..300).contains(&status) {
            Ok(())
        } else {
            Err(ProviderError::status(SHEETS, status, body).into())
        }
    }

    async fn write_values(
        &self,
        request: reqwest::RequestBuilder,
        rows: Vec<Vec<String>>,
    ) -> Result<(), SheetsError> {
        let (status, body) = self.send(request.json(&json!({ "values": rows }))).await?;
        if (200..300).contains(&status) {
            Ok(())
        } else {
            Err(ProviderError::status(SHEETS, status, body).into())
        }
    }
}

#[async_trait]
impl SheetsService for GoogleSheetsClient {
    async fn create_sheet(&self, title: &str) -> Result<(), SheetsError> {
        let url = self.endpoint(":batchUpdate", &[])?;
        let body = json!({
            "requests": [{ "addSheet": { "properties": { "title": title } } }]
        });
        let (status, body) = self.send(self.client.post(url).json(&body)).await?;
        if (200..300).contains(&status) {
            Ok(())
        } else {
            Err(classify_create_failure(title, status, body))
        }
    }

    async fn write_range(&self, range: &str, rows: Vec<Vec<String>>) -> Result<(), SheetsError> {
        let url = self.endpoint("", &["values", range])?;
        let request = self
            .client
            .put(url)
            .query(&[("valueInputOption", "RAW")]);
        self.write_values(request, rows).await
    }

    async fn append_range(&self, range: &str, rows: Vec<Vec<String>>) -> Result<(), SheetsError> {
        let segment = format!("{range}:append");
        let url = self.endpoint("", &["values", &segment])?;
        let request = self.client.post(url).query(&[
            ("valueInputOption", "RAW"),
            ("insertDataOption", "INSERT_ROWS"),
        ]);
        self.write_values(request, rows).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn client() -> GoogleSheetsClient {
        GoogleSheetsClient::new(reqwest::Client::new(), "token", "sheet-123")
    }

    #[test]
    fn test_classify_collision() {
        let body = r#"{"error": {"code": 400, "message": "Invalid requests[0].addSheet: A sheet with the name \"20240101_120000\" already exists. Please enter another name.", "status": "INVALID_ARGUMENT"}}"#;
        let err = classify_create_failure("20240101_120000", 400, body.to_string());
        assert!(err.is_collision());
    }

    #[test]
    fn test_classify_other_failure() {
        let err = classify_create_failure("x", 403, "PERMISSION_DENIED".to_string());
        assert!(matches!(
            err,
            SheetsError::Provider(ProviderError::Status { status: 403, .. })
        ));
    }

    #[test]
    fn test_endpoint_escapes_range() {
        let url = client().endpoint("", &["values", "'my sheet'!A1:I1"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/sheet-123/values/'my%20sheet'!A1:I1"
        );
    }

    #[test]
    fn test_endpoint_with_custom_base() {
        let url = client()
            .with_base_url("http://127.0.0.1:9000/v4/spreadsheets/")
            .endpoint(":batchUpdate", &[])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:9000/v4/spreadsheets/sheet-123:batchUpdate"
        );
    }
}
