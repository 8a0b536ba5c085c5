//! Deadline-bounded search across postal codes.
//!
//! Each postal code runs in its own spawned worker. The controller waits on
//! the worker's join handle for at most the planned budget; on expiry it
//! copies whatever the worker has appended to its [`RecordLog`] and moves on,
//! leaving the worker detached.

use futures::future::join_all;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use super::candidates::CandidateSearcher;
use super::details::DetailFetcher;
use super::email::EmailScraper;
use super::planner::TimeoutPlanner;
use super::record_log::RecordLog;
use super::resolver::AddressResolver;
use super::task::{SearchOutcome, TaskReport, TaskStatus};
use crate::config::{ScrapeConfig, SearchConfig};
use crate::errors::{SearchError, ValidationError};
use crate::models::{BusinessRecord, Country};
use crate::observability::TaskTimer;
use crate::providers::{Geocoder, PageFetcher, PlacesProvider};
use crate::runtime::{run_with_timeout, Sleeper, TimedResult};
use crate::validation::SearchRequest;

/// External services a search depends on.
#[derive(Clone)]
pub struct SearchServices {
    /// Postal code geocoding.
    pub geocoder: Arc<dyn Geocoder>,
    /// Place search and details.
    pub places: Arc<dyn PlacesProvider>,
    /// Website fetching for email extraction.
    pub fetcher: Arc<dyn PageFetcher>,
    /// Pauses between detail chunks.
    pub sleeper: Arc<dyn Sleeper>,
}

/// The per-task pipeline stages, shared by every worker.
struct TaskPipeline {
    resolver: AddressResolver,
    searcher: CandidateSearcher,
    details: DetailFetcher,
    scraper: EmailScraper,
}

/// One postal code's worker. Owns everything it touches so it can outlive
/// the controller's wait.
struct TaskWorker {
    pipeline: Arc<TaskPipeline>,
    postal_code: String,
    keywords: Arc<[String]>,
    country: Country,
    limit: usize,
    log: RecordLog,
}

impl TaskWorker {
    async fn run(self) -> Result<(), SearchError> {
        let pipeline = &self.pipeline;
        let coordinate = pipeline
            .resolver
            .resolve(&self.postal_code, self.country)
            .await?;

        let chunk_size = DetailFetcher::chunk_size(self.limit);

        for keyword in self.keywords.iter() {
            let candidates = pipeline
                .searcher
                .search(coordinate, keyword, &self.postal_code, self.limit)
                .await;

            for (index, chunk) in candidates.chunks(chunk_size).enumerate() {
                if index > 0 {
                    pipeline.details.pause(chunk_size).await;
                }

                for details in pipeline.details.fetch_chunk(chunk).await {
                    let email = if details.has_website() {
                        pipeline.scraper.extract(&details.website).await
                    } else {
                        None
                    };
                    self.log.append(BusinessRecord::from_details(
                        details,
                        email,
                        self.postal_code.as_str(),
                        keyword.as_str(),
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Result of one task as seen by the controller.
struct TaskRun {
    records: Vec<BusinessRecord>,
    error: Option<SearchError>,
    report: TaskReport,
}

/// Runs postal-code tasks under per-task deadlines and merges their output.
pub struct SearchOrchestrator {
    pipeline: Arc<TaskPipeline>,
    planner: TimeoutPlanner,
    config: SearchConfig,
}

impl SearchOrchestrator {
    /// Wires the pipeline stages onto `services`.
    #[must_use]
    pub fn new(search: SearchConfig, scrape: &ScrapeConfig, services: SearchServices) -> Self {
        let pipeline = TaskPipeline {
            resolver: AddressResolver::new(services.geocoder),
            searcher: CandidateSearcher::new(services.places.clone())
                .with_radius_m(search.search_radius_m),
            details: DetailFetcher::new(services.places, services.sleeper),
            scraper: EmailScraper::new(services.fetcher, scrape),
        };

        Self {
            pipeline: Arc::new(pipeline),
            planner: TimeoutPlanner::from_config(&search),
            config: search,
        }
    }

    /// The planner deciding per-task budgets.
    #[must_use]
    pub fn planner(&self) -> &TimeoutPlanner {
        &self.planner
    }

    /// Validates the inputs, then searches.
    ///
    /// Validation covers every postal code before any task starts; one bad
    /// code rejects the whole request. Task failures never surface here,
    /// they are collected in [`SearchOutcome::errors`].
    pub async fn search_businesses<P, K>(
        &self,
        postal_codes: P,
        keywords: K,
        country: Country,
        max_results: Option<usize>,
    ) -> Result<SearchOutcome, ValidationError>
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        K: IntoIterator,
        K::Item: AsRef<str>,
    {
        let request = SearchRequest::new(postal_codes, keywords, country, max_results)?;
        Ok(self.run(&request).await)
    }

    /// Searches an already validated request.
    pub async fn run(&self, request: &SearchRequest) -> SearchOutcome {
        let run_id = Uuid::now_v7();
        let limit = request.effective_max_results(
            self.config.default_max_results,
            self.config.max_allowed_results,
        );
        let keywords: Arc<[String]> = request.keywords().into();

        tracing::info!(
            %run_id,
            postal_codes = ?request.postal_codes(),
            keywords = ?request.keywords(),
            country = %request.country(),
            max_results = limit,
            parallel = self.config.parallel_tasks,
            "Starting business search"
        );

        let task = |postal_code: &String| {
            let span = tracing::info_span!("search_task", %run_id, postal_code = %postal_code);
            self.run_task(postal_code.clone(), keywords.clone(), request.country(), limit)
                .instrument(span)
        };

        let runs = if self.config.parallel_tasks {
            join_all(request.postal_codes().iter().map(task)).await
        } else {
            let mut runs = Vec::with_capacity(request.postal_codes().len());
            for postal_code in request.postal_codes() {
                runs.push(task(postal_code).await);
            }
            runs
        };

        let mut outcome = SearchOutcome::new(run_id);
        for run in runs {
            outcome.records.extend(run.records);
            outcome.errors.extend(run.error);
            outcome.reports.push(run.report);
        }

        tracing::info!(
            %run_id,
            records = outcome.records.len(),
            errors = outcome.errors.len(),
            "Search finished"
        );
        outcome
    }

    async fn run_task(
        &self,
        postal_code: String,
        keywords: Arc<[String]>,
        country: Country,
        limit: usize,
    ) -> TaskRun {
        let budget = self.planner.plan(limit);
        let budget_ms = u64::try_from(budget.as_millis()).unwrap_or(u64::MAX);
        let timer = TaskTimer::start(postal_code.as_str());
        let log = RecordLog::new();

        let worker = TaskWorker {
            pipeline: Arc::clone(&self.pipeline),
            postal_code: postal_code.clone(),
            keywords,
            country,
            limit,
            log: log.clone(),
        };

        tracing::debug!(status = %TaskStatus::Running, budget_ms, "Task started");
        let mut handle = tokio::spawn(worker.run().in_current_span());

        // Dropping the handle on timeout detaches the worker without aborting it.
        let (status, records, error) = match run_with_timeout(budget, &mut handle).await {
            TimedResult::Ok(Ok(())) => (TaskStatus::Completed, log.snapshot(), None),
            TimedResult::Ok(Err(error)) => Self::settle_failure(log.snapshot(), error),
            TimedResult::Err(join_error) => Self::settle_failure(
                log.snapshot(),
                SearchError::Worker {
                    postal_code: postal_code.to_string(),
                    message: join_error.to_string(),
                },
            ),
            TimedResult::Timeout => {
                let records = log.snapshot();
                let error = records.is_empty().then(|| SearchError::Timeout {
                    postal_code: postal_code.to_string(),
                    budget_ms,
                });
                (TaskStatus::TimedOut, records, error)
            }
        };

        let report = TaskReport {
            postal_code,
            status,
            budget_ms,
            elapsed_ms: timer.elapsed_ms(),
            records: records.len(),
        };
        Self::log_summary(&report, error.as_ref());

        TaskRun {
            records,
            error,
            report,
        }
    }

    fn settle_failure(
        records: Vec<BusinessRecord>,
        error: SearchError,
    ) -> (TaskStatus, Vec<BusinessRecord>, Option<SearchError>) {
        let status = if records.is_empty() {
            TaskStatus::Failed
        } else {
            TaskStatus::Completed
        };
        (status, records, Some(error))
    }

    fn log_summary(report: &TaskReport, error: Option<&SearchError>) {
        let error = error.map(ToString::to_string);
        match report.status {
            TaskStatus::Completed => tracing::info!(
                status = %report.status,
                records = report.records,
                elapsed_ms = report.elapsed_ms,
                error = error.as_deref(),
                "Task completed"
            ),
            TaskStatus::TimedOut => tracing::warn!(
                status = %report.status,
                records = report.records,
                budget_ms = report.budget_ms,
                error = error.as_deref(),
                "Task timed out, keeping partial results"
            ),
            TaskStatus::Failed | TaskStatus::Pending | TaskStatus::Running => tracing::error!(
                status = %report.status,
                elapsed_ms = report.elapsed_ms,
                error = error.as_deref(),
                "Task failed"
            ),
        }
    }
}

impl std::fmt::Debug for SearchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchOrchestrator")
            .field("planner", &self.planner)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
