//! Writes business records to a fresh sheet.

use std::sync::Arc;

use super::naming::{a1_range, sanitize_sheet_name, time_suffix, timestamp_name};
use super::retry::RetryConfig;
use crate::config::ExportConfig;
use crate::errors::ExportError;
use crate::models::BusinessRecord;
use crate::providers::SheetsService;
use crate::runtime::Sleeper;

/// Header row, in record column order.
pub const SHEET_HEADERS: [&str; 9] = [
    "Name",
    "Address",
    "Phone",
    "Website",
    "Email",
    "Maps URL",
    "Status",
    "Postal Code",
    "Keyword",
];

const HEADER_CELLS: &str = "A1:I1";

/// Exports records into a newly created sheet of one spreadsheet.
pub struct SheetExporter {
    sheets: Arc<dyn SheetsService>,
    sleeper: Arc<dyn Sleeper>,
    retry: RetryConfig,
    max_title_length: usize,
}

impl SheetExporter {
    /// Creates an exporter writing through `sheets`.
    #[must_use]
    pub fn new(
        config: &ExportConfig,
        sheets: Arc<dyn SheetsService>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            sheets,
            sleeper,
            retry: config.retry.clone(),
            max_title_length: config.max_title_length,
        }
    }

    /// Writes `records` to a new sheet and returns its final title.
    ///
    /// Without `suggested_name` the title is the current local timestamp.
    /// Returns `Ok(None)` without touching the service when there is nothing
    /// to export. A failure after the header write leaves a header-only
    /// sheet behind.
    pub async fn export(
        &self,
        records: &[BusinessRecord],
        suggested_name: Option<&str>,
    ) -> Result<Option<String>, ExportError> {
        if records.is_empty() {
            tracing::info!("No records to export");
            return Ok(None);
        }

        let requested = suggested_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map_or_else(timestamp_name, ToString::to_string);
        let sheet = self
            .create_sheet(sanitize_sheet_name(&requested, self.max_title_length))
            .await?;

        let header_range = a1_range(&sheet, HEADER_CELLS);
        let header = vec![SHEET_HEADERS.iter().map(ToString::to_string).collect()];
        self.sheets
            .write_range(&header_range, header)
            .await
            .map_err(|source| ExportError::Write {
                range: header_range.clone(),
                source,
            })?;

        let data_range = a1_range(&sheet, &format!("A2:I{}", records.len() + 1));
        let rows = records.iter().map(BusinessRecord::to_row).collect();
        self.sheets
            .append_range(&data_range, rows)
            .await
            .map_err(|source| ExportError::Write {
                range: data_range.clone(),
                source,
            })?;

        tracing::info!(sheet = %sheet, rows = records.len(), "Exported records");
        Ok(Some(sheet))
    }

    /// Creates `title`, renaming on collisions until the retry budget runs out.
    async fn create_sheet(&self, mut title: String) -> Result<String, ExportError> {
        let mut attempt = 0;

        loop {
            attempt += 1;
            tracing::debug!(sheet = %title, attempt, "Creating sheet");

            match self.sheets.create_sheet(&title).await {
                Ok(()) => {
                    tracing::info!(sheet = %title, attempt, "Created sheet");
                    return Ok(title);
                }
                Err(error) if error.is_collision() => {
                    if !self.retry.allows_retry_after(attempt) {
                        tracing::error!(
                            sheet = %title,
                            attempt,
                            "Sheet name collisions exhausted retries"
                        );
                        return Err(ExportError::CreateExhausted {
                            attempts: attempt,
                            last_title: title,
                        });
                    }

                    let delay = self.retry.delay_after(attempt);
                    tracing::warn!(
                        sheet = %title,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Sheet name already exists, retrying with a new name"
                    );
                    self.sleeper.sleep(delay).await;
                    title = sanitize_sheet_name(
                        &format!("{title}{}", time_suffix()),
                        self.max_title_length,
                    );
                }
                Err(source) => {
                    tracing::error!(
                        sheet = %title,
                        attempt,
                        error = %source,
                        "Failed to create sheet"
                    );
                    return Err(ExportError::Create { title, source });
                }
            }
        }
    }
}

impl std::fmt::Debug for SheetExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetExporter")
            .field("retry", &self.retry)
            .field("max_title_length", &self.max_title_length)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ProviderError, SheetsError};
    use crate::providers::MockSheetsService;
    use crate::testing::{sample_records, RecordingSheets, RecordingSleeper, SheetsCall};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn exporter(sheets: Arc<dyn SheetsService>) -> (SheetExporter, Arc<RecordingSleeper>) {
        let sleeper = Arc::new(RecordingSleeper::new());
        let exporter = SheetExporter::new(&ExportConfig::default(), sheets, sleeper.clone());
        (exporter, sleeper)
    }

    #[test]
    fn test_empty_export_makes_no_calls() {
        let mut sheets = MockSheetsService::new();
        sheets.expect_create_sheet().never();
        sheets.expect_write_range().never();
        sheets.expect_append_range().never();
        let (exporter, _) = exporter(Arc::new(sheets));

        let result = tokio_test::block_on(exporter.export(&[], Some("Leads")));
        assert_eq!(result.unwrap(), None);
    }

    #[tokio::test]
    async fn test_writes_header_then_rows() {
        let sheets = Arc::new(RecordingSheets::new());
        let (exporter, sleeper) = exporter(sheets.clone());
        let records = sample_records(3, "94105", "bakery");

        let sheet = exporter.export(&records, Some("Leads: SF")).await.unwrap();

        assert_eq!(sheet.as_deref(), Some("Leads_ SF"));
        assert!(sleeper.recorded().is_empty());

        let calls = sheets.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], SheetsCall::Create("Leads_ SF".to_string()));
        assert_eq!(
            calls[1],
            SheetsCall::Write {
                range: "'Leads_ SF'!A1:I1".to_string(),
                rows: vec![SHEET_HEADERS.iter().map(ToString::to_string).collect()],
            }
        );
        match &calls[2] {
            SheetsCall::Append { range, rows } => {
                assert_eq!(range, "'Leads_ SF'!A2:I4");
                assert_eq!(rows.len(), 3);
                assert_eq!(rows[0], records[0].to_row());
            }
            other => panic!("expected append, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_default_name_is_timestamp() {
        let sheets = Arc::new(RecordingSheets::new());
        let (exporter, _) = exporter(sheets.clone());

        let sheet = exporter
            .export(&sample_records(1, "94105", "gym"), None)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(sheet.len(), 15);
        assert!(sheet.chars().all(|c| c.is_ascii_digit() || c == '_'));
    }

    #[tokio::test]
    async fn test_collision_then_success_renames() {
        let sheets = Arc::new(RecordingSheets::new().with_collisions(2));
        let (exporter, sleeper) = exporter(sheets.clone());

        let sheet = exporter
            .export(&sample_records(2, "94105", "bakery"), Some("Leads"))
            .await
            .unwrap()
            .unwrap();

        let titles = sheets.created_titles();
        assert_eq!(titles.len(), 3);
        assert_eq!(titles[0], "Leads");
        assert!(titles[1].starts_with("Leads_") && titles[1].len() == "Leads".len() + 7);
        assert!(titles[2].starts_with(&titles[1]));
        assert_eq!(sheet, titles[2]);
        assert_eq!(
            sleeper.recorded(),
            vec![Duration::from_secs(4), Duration::from_secs(8)]
        );
        assert_eq!(sheets.calls().len(), 5);
    }

    #[tokio::test]
    async fn test_collisions_exhaust_retries() {
        let sheets = Arc::new(RecordingSheets::new().with_collisions(3));
        let (exporter, sleeper) = exporter(sheets.clone());

        let err = exporter
            .export(&sample_records(2, "94105", "bakery"), Some("Leads"))
            .await
            .unwrap_err();

        assert!(matches!(err, ExportError::CreateExhausted { attempts: 3, .. }));
        assert_eq!(sleeper.recorded().len(), 2);
        assert!(sheets
            .calls()
            .iter()
            .all(|call| matches!(call, SheetsCall::Create(_))));
    }

    #[tokio::test]
    async fn test_other_create_failure_is_immediate() {
        let denied = SheetsError::from(ProviderError::status("sheets", 403, "PERMISSION_DENIED"));
        let sheets = Arc::new(RecordingSheets::new().with_create_results([Err(denied)]));
        let (exporter, sleeper) = exporter(sheets.clone());

        let err = exporter
            .export(&sample_records(1, "94105", "bakery"), Some("Leads"))
            .await
            .unwrap_err();

        assert!(matches!(err, ExportError::Create { ref title, .. } if title == "Leads"));
        assert_eq!(sheets.calls().len(), 1);
        assert!(sleeper.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_write_failure_surfaces_range() {
        let sheets = Arc::new(
            RecordingSheets::new()
                .with_write_failure(ProviderError::status("sheets", 500, "backend").into()),
        );
        let (exporter, _) = exporter(sheets.clone());

        let err = exporter
            .export(&sample_records(1, "94105", "bakery"), Some("Leads"))
            .await
            .unwrap_err();

        assert!(matches!(err, ExportError::Write { ref range, .. } if range == "'Leads'!A1:I1"));
        assert_eq!(sheets.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_single_attempt_policy() {
        let sheets = Arc::new(RecordingSheets::new().with_collisions(1));
        let sleeper = Arc::new(RecordingSleeper::new());
        let config = ExportConfig {
            retry: RetryConfig::new().with_max_attempts(1),
            ..ExportConfig::default()
        };
        let exporter = SheetExporter::new(&config, sheets.clone(), sleeper.clone());

        let err = exporter
            .export(&sample_records(1, "94105", "bakery"), Some("Leads"))
            .await
            .unwrap_err();

        assert!(matches!(err, ExportError::CreateExhausted { attempts: 1, .. }));
        assert!(sleeper.recorded().is_empty());
    }
}
