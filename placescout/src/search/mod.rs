//! Business search by postal code.
//!
//! This module provides:
//! - Per-task deadline planning
//! - The resolve / search / detail / scrape pipeline stages
//! - The orchestrator running one deadline-bounded task per postal code

mod candidates;
mod details;
mod email;
mod orchestrator;
mod planner;
mod record_log;
mod resolver;
mod task;


pub use candidates::{CandidateSearcher, DEFAULT_SEARCH_RADIUS_M};
pub use details::{DetailFetcher, DETAIL_FIELDS};
pub use email::{find_email, find_email_in_html, EmailScraper};
pub use orchestrator::{SearchOrchestrator, SearchServices};
pub use planner::{TimeoutPlanner, REFERENCE_RESULTS};
pub use record_log::RecordLog;
pub use resolver::AddressResolver;
pub use task::{SearchOutcome, TaskReport, TaskStatus};
