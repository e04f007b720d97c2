//! Duplicate finder - fetch, aggregate, report

use tracing::info;

use crate::{
    aggregator,
    config::FinderConfig,
    errors::Result,
    fetcher::{PageSource, ProjectFetcher, SnykProjectSource},
    report::DuplicateReport,
};

/// Runs one duplicate scan for one organization
pub struct DuplicateFinder<S> {
    org_id: String,
    fetcher: ProjectFetcher<S>,
}

impl DuplicateFinder<SnykProjectSource> {
    /// Create a finder talking to the Snyk REST API
    pub fn new(config: &FinderConfig, org_id: &str, api_token: &str) -> Result<Self> {
        config.validate()?;
        let source = SnykProjectSource::new(config, org_id, api_token)?;
        Ok(Self::with_source(
            org_id,
            ProjectFetcher::new(source, config.http.retry_config()),
        ))
    }
}

impl<S: PageSource> DuplicateFinder<S> {
    /// Create a finder on top of an arbitrary page source
    pub fn with_source(org_id: impl Into<String>, fetcher: ProjectFetcher<S>) -> Self {
        Self {
            org_id: org_id.into(),
            fetcher,
        }
    }

    /// Organization being scanned
    pub fn org_id(&self) -> &str {
        &self.org_id
    }

    /// Fetch every project and build the duplicate report
    pub async fn run(&self) -> Result<DuplicateReport> {
        info!(org_id = %self.org_id, "Fetching projects for organization");
        let projects = self.fetcher.fetch_all().await?;

        info!("Analyzing for duplicates...");
        let report = aggregator::aggregate(&self.org_id, &projects)?;

        if report.is_empty() {
            info!("No duplicate projects found");
        } else {
            info!(
                "Found {} targets with duplicate projects ({} projects in total)",
                report.total_targets_with_duplicates, report.total_duplicate_projects
            );
        }

        Ok(report)
    }
}
