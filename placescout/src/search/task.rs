//! Task lifecycle and aggregated search outcome.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use crate::errors::SearchError;
use crate::models::BusinessRecord;

/// Lifecycle of one postal-code task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started yet.
    #[default]
    Pending,
    /// Worker spawned, controller waiting.
    Running,
    /// The pipeline finished before the deadline.
    Completed,
    /// The deadline elapsed; whatever was produced so far was kept.
    TimedOut,
    /// The task ended with an error and no records.
    Failed,
}

impl TaskStatus {
    /// Whether the task has reached a final state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::TimedOut | Self::Failed)
    }

    /// Lowercase name used in logs and reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::TimedOut => "timed_out",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of one postal-code task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskReport {
    /// The postal code the task searched.
    pub postal_code: String,
    /// Final status.
    pub status: TaskStatus,
    /// Planned deadline in milliseconds.
    pub budget_ms: u64,
    /// Time the controller spent on the task, in milliseconds.
    pub elapsed_ms: f64,
    /// Records salvaged.
    pub records: usize,
}

impl TaskReport {
    /// The planned deadline.
    #[must_use]
    pub fn budget(&self) -> Duration {
        Duration::from_millis(self.budget_ms)
    }
}

/// Everything a search produced.
///
/// `records` empty with `errors` empty means nothing matched; `errors`
/// covering every postal code means the search failed everywhere.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Identifier attached to every log event of this search.
    pub run_id: Uuid,
    /// Records from every task, concatenated in postal-code order.
    pub records: Vec<BusinessRecord>,
    /// Failures recorded by tasks, in postal-code order.
    pub errors: Vec<SearchError>,
    /// One report per postal code, in request order.
    pub reports: Vec<TaskReport>,
}

impl SearchOutcome {
    /// Creates an empty outcome for `run_id`.
    #[must_use]
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            records: Vec::new(),
            errors: Vec::new(),
            reports: Vec::new(),
        }
    }

    /// Whether no record was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether any task recorded an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Whether every task failed.
    #[must_use]
    pub fn all_failed(&self) -> bool {
        !self.reports.is_empty()
            && self
                .reports
                .iter()
                .all(|report| report.status == TaskStatus::Failed)
    }

    /// Report for `postal_code`, if it was part of the request.
    #[must_use]
    pub fn report_for(&self, postal_code: &str) -> Option<&TaskReport> {
        self.reports
            .iter()
            .find(|report| report.postal_code == postal_code)
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("run_id".to_string(), serde_json::json!(self.run_id.to_string()));
        map.insert("records".to_string(), serde_json::json!(self.records));
        map.insert(
            "errors".to_string(),
            serde_json::json!(self
                .errors
                .iter()
                .map(SearchError::to_dict)
                .collect::<Vec<_>>()),
        );
        map.insert("reports".to_string(), serde_json::json!(self.reports));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn report(code: &str, status: TaskStatus) -> TaskReport {
        TaskReport {
            postal_code: code.to_string(),
            status,
            budget_ms: 15_000,
            elapsed_ms: 1.0,
            records: 0,
        }
    }

    #[test]
    fn test_status_terminal() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Running.is_terminal());
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::TimedOut.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert_eq!(TaskStatus::TimedOut.to_string(), "timed_out");
    }

    #[test]
    fn test_all_failed_distinguishes_no_results() {
        let mut outcome = SearchOutcome::new(Uuid::nil());
        assert!(!outcome.all_failed());

        outcome.reports.push(report("94105", TaskStatus::Completed));
        assert!(outcome.is_empty());
        assert!(!outcome.all_failed());

        outcome.reports = vec![
            report("00000", TaskStatus::Failed),
            report("00001", TaskStatus::Failed),
        ];
        assert!(outcome.all_failed());
    }

    #[test]
    fn test_to_dict() {
        let mut outcome = SearchOutcome::new(Uuid::nil());
        outcome.reports.push(report("94105", TaskStatus::TimedOut));
        outcome.errors.push(SearchError::Timeout {
            postal_code: "94105".to_string(),
            budget_ms: 15_000,
        });

        let dict = outcome.to_dict();
        assert_eq!(dict["errors"][0]["type"], "TimeoutError");
        assert_eq!(dict["reports"][0]["status"], "timed_out");
        assert_eq!(dict["records"], serde_json::json!([]));
        assert_eq!(
            outcome.report_for("94105").map(TaskReport::budget),
            Some(Duration::from_secs(15))
        );
    }
}
