//! Duplicate project finder for Snyk organizations
//!
//! This crate provides:
//! - Paginated retrieval of every project in an organization
//! - Grouping of projects by target and project name
//! - A JSON duplicate report

pub mod aggregator;
pub mod config;
pub mod errors;
pub mod fetcher;
pub mod finder;
pub mod models;
pub mod report;

pub use aggregator::{aggregate, find_duplicates, NameGroup, TargetGroup};
pub use config::FinderConfig;
pub use errors::{FinderError, Result};
pub use fetcher::{PageCursor, PageSource, ProjectCollector, ProjectFetcher, SnykProjectSource};
pub use finder::DuplicateFinder;
pub use models::{ProjectRecord, ProjectsPage};
pub use report::{DuplicateReport, NameDuplicates, TargetDuplicates};

/// Re-export transport configuration
pub use dupfinder_http::{HttpConfig, RetryConfig};
