//! Project fetcher
//!
//! Pages through `GET /orgs/{org_id}/projects` one request at a time and turns
//! the raw JSON:API entries into [`ProjectRecord`]s. Retrieval is all or
//! nothing: any error aborts the whole listing.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use dupfinder_http::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    shared_client, HttpClientTrait, RetryConfig, RetryMiddleware,
};
use futures::{stream, Stream, TryStreamExt};
use tracing::{debug, info};
use url::Url;

use crate::{
    config::FinderConfig,
    errors::{FinderError, Result},
    models::{ApiProject, ProjectRecord, ProjectsPage, UNKNOWN_PROJECT_NAME},
};

/// JSON:API media type used by the Snyk REST API
pub const JSON_API_CONTENT_TYPE: &str = "application/vnd.api+json";

/// Position in the listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCursor {
    /// The first page, built from the org ID and query parameters
    First,
    /// A continuation link as returned in `links.next`
    Next(String),
}

/// Source of raw project pages
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch a single page; one attempt, no retries
    async fn fetch_page(&self, cursor: &PageCursor) -> Result<ProjectsPage>;
}

/// Page source backed by the Snyk REST API
pub struct SnykProjectSource {
    client: Arc<dyn HttpClientTrait>,
    base_url: Url,
    first_page: Url,
    headers: HeaderMap,
    org_id: String,
}

impl SnykProjectSource {
    /// Create a source with a production HTTP client
    pub fn new(config: &FinderConfig, org_id: &str, api_token: &str) -> Result<Self> {
        let client = shared_client(config.http.clone())?;
        Self::with_client(client, config, org_id, api_token)
    }

    /// Create a source on top of an existing HTTP client
    pub fn with_client(
        client: Arc<dyn HttpClientTrait>,
        config: &FinderConfig,
        org_id: &str,
        api_token: &str,
    ) -> Result<Self> {
        if org_id.trim().is_empty() {
            return Err(FinderError::config_error("organization ID is required"));
        }
        if api_token.is_empty() {
            return Err(FinderError::config_error("API token is required"));
        }

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| FinderError::config_error(format!("invalid base URL: {e}")))?;
        let first_page = first_page_url(&base_url, org_id, config)?;

        let mut auth = HeaderValue::from_str(&format!("{} {}", config.auth_scheme, api_token))
            .map_err(|_| FinderError::config_error("API token contains invalid characters"))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_API_CONTENT_TYPE));

        Ok(Self {
            client,
            base_url,
            first_page,
            headers,
            org_id: org_id.to_string(),
        })
    }

    /// URL of the first page
    pub fn first_page_url(&self) -> &Url {
        &self.first_page
    }

    /// Resolve a continuation link; relative links hang off the base URL's origin
    pub fn resolve_link(&self, link: &str) -> Result<Url> {
        self.base_url
            .join(link)
            .map_err(|e| FinderError::malformed(format!("invalid next link '{link}': {e}")))
    }
}

#[async_trait]
impl PageSource for SnykProjectSource {
    async fn fetch_page(&self, cursor: &PageCursor) -> Result<ProjectsPage> {
        let url = match cursor {
            PageCursor::First => self.first_page.clone(),
            PageCursor::Next(link) => self.resolve_link(link)?,
        };

        let body = self
            .client
            .get(url.as_str(), &self.headers)
            .await
            .map_err(|e| match FinderError::from(e) {
                FinderError::NotFound(_) => {
                    FinderError::NotFound(format!("organization '{}'", self.org_id))
                }
                other => other,
            })?;

        serde_json::from_str(&body)
            .map_err(|e| FinderError::malformed(format!("could not parse page from {url}: {e}")))
    }
}

fn first_page_url(base_url: &Url, org_id: &str, config: &FinderConfig) -> Result<Url> {
    let mut url = base_url.clone();
    url.path_segments_mut()
        .map_err(|_| FinderError::config_error("base URL cannot carry a path"))?
        .pop_if_empty()
        .extend(["orgs", org_id, "projects"]);
    url.query_pairs_mut()
        .append_pair("version", &config.api_version)
        .append_pair("expand", "target")
        .append_pair("limit", &config.page_limit.to_string());
    Ok(url)
}

/// Walks every page of the listing
pub struct ProjectFetcher<S> {
    source: S,
    retry: RetryMiddleware,
}

impl<S: PageSource> ProjectFetcher<S> {
    /// Create a fetcher with the given retry policy
    pub fn new(source: S, retry: RetryConfig) -> Self {
        Self {
            source,
            retry: RetryMiddleware::new(retry),
        }
    }

    /// Underlying page source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Lazy sequence of pages; each poll issues at most one page fetch (plus retries)
    pub fn pages(&self) -> impl Stream<Item = Result<ProjectsPage>> + '_ {
        stream::try_unfold(Some(PageCursor::First), move |cursor| self.advance(cursor))
    }

    async fn advance(
        &self,
        cursor: Option<PageCursor>,
    ) -> Result<Option<(ProjectsPage, Option<PageCursor>)>> {
        let Some(cursor) = cursor else {
            return Ok(None);
        };

        debug!(?cursor, "Fetching projects page");
        let page = self
            .retry
            .execute(|| self.source.fetch_page(&cursor))
            .await?;

        if let Some(errors) = &page.errors {
            let details: Vec<String> = errors.iter().map(|e| e.summary()).collect();
            return Err(FinderError::malformed(format!(
                "API returned errors: {}",
                details.join("; ")
            )));
        }

        let next = match page.next_link() {
            Some(link) if matches!(&cursor, PageCursor::Next(current) if current == link) => {
                return Err(FinderError::malformed(format!(
                    "next link repeats the current page: {link}"
                )));
            }
            Some(link) => Some(PageCursor::Next(link.to_string())),
            None => None,
        };

        Ok(Some((page, next)))
    }

    /// Fetch every project in the organization, in API order
    pub async fn fetch_all(&self) -> Result<Vec<ProjectRecord>> {
        let mut collector = ProjectCollector::default();

        let pages = self.pages();
        futures::pin_mut!(pages);
        while let Some(page) = pages.try_next().await? {
            let fetched = page.data.len();
            collector.absorb(page);
            info!(
                "Fetched {} projects... (Total: {})",
                fetched,
                collector.project_count()
            );
        }

        info!("Total projects fetched: {}", collector.project_count());
        info!("Total unique targets: {}", collector.target_count());
        collector.into_records()
    }
}

/// Accumulates raw entries and the target index across pages
#[derive(Debug, Default)]
pub struct ProjectCollector {
    projects: Vec<ApiProject>,
    targets: HashMap<String, String>,
}

impl ProjectCollector {
    /// Add one page worth of projects and included targets
    pub fn absorb(&mut self, page: ProjectsPage) {
        for target in page.included_targets() {
            let display_name = target
                .attributes
                .as_ref()
                .and_then(|a| a.display_name.clone())
                .unwrap_or_default();
            self.targets.insert(target.id.clone(), display_name);
        }
        self.projects.extend(page.data);
    }

    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Resolve every entry into a record
    pub fn into_records(self) -> Result<Vec<ProjectRecord>> {
        let targets = self.targets;
        self.projects
            .into_iter()
            .map(|project| to_record(project, &targets))
            .collect()
    }
}

fn to_record(project: ApiProject, targets: &HashMap<String, String>) -> Result<ProjectRecord> {
    let project_id = project
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| FinderError::malformed("project entry without an id"))?;

    let attributes = project.attributes;
    let target = project.relationships.target.and_then(|rel| rel.data);

    let (target_id, target_name) = match target {
        Some(target) => {
            let name = targets
                .get(&target.id)
                .filter(|name| !name.is_empty())
                .cloned()
                .or_else(|| target.attributes.and_then(|a| a.display_name))
                .unwrap_or_default();
            (target.id, name)
        }
        None => (String::new(), String::new()),
    };

    Ok(ProjectRecord {
        project_id,
        project_name: attributes
            .name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| UNKNOWN_PROJECT_NAME.to_string()),
        target_id,
        target_name,
        project_type: attributes.kind.unwrap_or_default(),
        origin: attributes.origin.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dupfinder_http::HttpClient;
    use serde_json::json;
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    /// Serves canned pages; `script[i]` answers the i-th call
    struct ScriptedSource {
        script: Vec<Result<serde_json::Value>>,
        calls: AtomicUsize,
        cursors: std::sync::Mutex<Vec<PageCursor>>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<serde_json::Value>>) -> Self {
            Self {
                script,
                calls: AtomicUsize::new(0),
                cursors: std::sync::Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PageSource for ScriptedSource {
        async fn fetch_page(&self, cursor: &PageCursor) -> Result<ProjectsPage> {
            self.cursors.lock().unwrap().push(cursor.clone());
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            match self.script.get(call) {
                Some(Ok(value)) => Ok(serde_json::from_value(value.clone())?),
                Some(Err(FinderError::TransientNetwork(msg))) => {
                    Err(FinderError::TransientNetwork(msg.clone()))
                }
                Some(Err(FinderError::Authentication(msg))) => {
                    Err(FinderError::Authentication(msg.clone()))
                }
                Some(Err(other)) => Err(FinderError::malformed(other.to_string())),
                None => panic!("unexpected page request #{call}"),
            }
        }
    }

    fn fast_retry() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            ..Default::default()
        }
    }

    fn project(id: &str, name: &str, target: &str) -> serde_json::Value {
        json!({
            "id": id,
            "type": "project",
            "attributes": {"name": name, "type": "npm", "origin": "github"},
            "relationships": {"target": {"data": {"id": target, "type": "target"}}}
        })
    }

    fn target(id: &str, display_name: &str) -> serde_json::Value {
        json!({"id": id, "type": "target", "attributes": {"display_name": display_name}})
    }

    fn page(
        data: Vec<serde_json::Value>,
        included: Vec<serde_json::Value>,
        next: Option<&str>,
    ) -> serde_json::Value {
        json!({"data": data, "included": included, "links": {"next": next}})
    }

    #[tokio::test]
    async fn test_three_pages_are_concatenated_in_order() {
        let source = ScriptedSource::new(vec![
            Ok(page(
                vec![project("p1", "a", "t1"), project("p2", "b", "t1")],
                vec![target("t1", "org/one")],
                Some("/rest/orgs/o/projects?starting_after=2"),
            )),
            Ok(page(
                vec![project("p3", "c", "t2")],
                vec![target("t2", "org/two")],
                Some("/rest/orgs/o/projects?starting_after=3"),
            )),
            Ok(page(vec![project("p4", "a", "t1")], vec![], None)),
        ]);

        let fetcher = ProjectFetcher::new(source, fast_retry());
        let records = fetcher.fetch_all().await.unwrap();

        let ids: Vec<&str> = records.iter().map(|r| r.project_id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2", "p3", "p4"]);
        assert_eq!(records[3].target_name, "org/one");
        assert_eq!(records[2].target_name, "org/two");

        let cursors = fetcher.source().cursors.lock().unwrap().clone();
        assert_eq!(
            cursors,
            vec![
                PageCursor::First,
                PageCursor::Next("/rest/orgs/o/projects?starting_after=2".to_string()),
                PageCursor::Next("/rest/orgs/o/projects?starting_after=3".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let source = ScriptedSource::new(vec![Ok(json!({"data": []}))]);
        let fetcher = ProjectFetcher::new(source, fast_retry());

        assert!(fetcher.fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pages_stream_is_lazy() {
        let source = ScriptedSource::new(vec![
            Ok(page(vec![project("p1", "a", "t1")], vec![], Some("/next"))),
            Ok(page(vec![project("p2", "a", "t1")], vec![], None)),
        ]);
        let fetcher = ProjectFetcher::new(source, fast_retry());

        let pages = fetcher.pages();
        futures::pin_mut!(pages);
        assert_eq!(fetcher.source().calls(), 0);

        let first = pages.try_next().await.unwrap().unwrap();
        assert_eq!(first.data.len(), 1);
        assert_eq!(fetcher.source().calls(), 1);

        assert!(pages.try_next().await.unwrap().is_some());
        assert!(pages.try_next().await.unwrap().is_none());
        assert_eq!(fetcher.source().calls(), 2);
    }

    #[tokio::test]
    async fn test_transient_error_is_retried() {
        let source = ScriptedSource::new(vec![
            Err(FinderError::TransientNetwork("HTTP 502".to_string())),
            Ok(page(vec![project("p1", "a", "t1")], vec![], None)),
        ]);
        let fetcher = ProjectFetcher::new(source, fast_retry());

        let records = fetcher.fetch_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(fetcher.source().calls(), 2);
    }

    #[tokio::test]
    async fn test_transient_error_gives_up_after_attempt_limit() {
        let source = ScriptedSource::new(vec![
            Err(FinderError::TransientNetwork("down".to_string())),
            Err(FinderError::TransientNetwork("down".to_string())),
            Err(FinderError::TransientNetwork("down".to_string())),
        ]);
        let fetcher = ProjectFetcher::new(source, fast_retry());

        let err = fetcher.fetch_all().await.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(fetcher.source().calls(), 3);
    }

    #[tokio::test]
    async fn test_auth_error_is_not_retried() {
        let source = ScriptedSource::new(vec![Err(FinderError::Authentication(
            "HTTP 401".to_string(),
        ))]);
        let fetcher = ProjectFetcher::new(source, fast_retry());

        let err = fetcher.fetch_all().await.unwrap_err();
        assert!(err.is_auth_error());
        assert_eq!(fetcher.source().calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_on_later_page_discards_everything() {
        let source = ScriptedSource::new(vec![
            Ok(page(vec![project("p1", "a", "t1")], vec![], Some("/next"))),
            Err(FinderError::malformed("truncated body")),
        ]);
        let fetcher = ProjectFetcher::new(source, fast_retry());

        let result = fetcher.fetch_all().await;
        assert!(matches!(result, Err(FinderError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_errors_document_is_malformed() {
        let source = ScriptedSource::new(vec![Ok(json!({
            "errors": [{"status": "400", "title": "Bad Request", "detail": "bad limit"}]
        }))]);
        let fetcher = ProjectFetcher::new(source, fast_retry());

        let err = fetcher.fetch_all().await.unwrap_err();
        assert!(err.to_string().contains("bad limit"));
        assert!(matches!(err, FinderError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_repeated_next_link_is_rejected() {
        let source = ScriptedSource::new(vec![
            Ok(page(vec![], vec![], Some("/same"))),
            Ok(page(vec![], vec![], Some("/same"))),
        ]);
        let fetcher = ProjectFetcher::new(source, fast_retry());

        let result = fetcher.fetch_all().await;
        assert!(matches!(result, Err(FinderError::MalformedResponse(_))));
    }

    #[test]
    fn test_target_name_resolution_fallbacks() {
        let mut collector = ProjectCollector::default();
        let raw = page(
            vec![
                project("p1", "a", "t1"),
                json!({
                    "id": "p2",
                    "attributes": {"name": "b"},
                    "relationships": {"target": {"data": {
                        "id": "t2", "type": "target",
                        "attributes": {"display_name": "inline/name"}
                    }}}
                }),
                project("p3", "c", "t3"),
                json!({"id": "p4", "attributes": {}}),
            ],
            vec![target("t1", "org/one")],
            None,
        );
        collector.absorb(serde_json::from_value(raw).unwrap());

        let records = collector.into_records().unwrap();
        assert_eq!(records[0].target_name, "org/one");
        assert_eq!(records[1].target_name, "inline/name");
        assert_eq!(records[2].target_name, "");
        assert_eq!(records[2].target_key(), "t3");
        assert_eq!(records[3].project_name, UNKNOWN_PROJECT_NAME);
        assert_eq!(records[3].target_key(), "unknown");
        assert_eq!(records[3].project_type, "");
    }

    #[test]
    fn test_empty_project_name_is_grouped_as_unknown() {
        let mut collector = ProjectCollector::default();
        let raw = page(
            vec![
                json!({
                    "id": "p1",
                    "attributes": {"name": ""},
                    "relationships": {"target": {"data": {"id": "t1", "type": "target"}}}
                }),
                project("p2", "a", "t1"),
                project("p3", "a", "t1"),
                json!({
                    "id": "p4",
                    "attributes": {},
                    "relationships": {"target": {"data": {"id": "t1", "type": "target"}}}
                }),
            ],
            vec![target("t1", "org/one")],
            None,
        );
        collector.absorb(serde_json::from_value(raw).unwrap());

        let records = collector.into_records().unwrap();
        assert_eq!(records[0].project_name, UNKNOWN_PROJECT_NAME);

        let report = crate::aggregator::aggregate("org", &records).unwrap();
        let names: Vec<&str> = report.duplicates_by_target[0]
            .duplicate_project_names
            .iter()
            .map(|n| n.project_name.as_str())
            .collect();
        assert_eq!(names, vec![UNKNOWN_PROJECT_NAME, "a"]);
        assert_eq!(report.total_duplicate_projects, 4);
    }

    #[test]
    fn test_project_without_id_is_malformed() {
        let mut collector = ProjectCollector::default();
        let raw = json!({"data": [{"attributes": {"name": "x"}}]});
        collector.absorb(serde_json::from_value(raw).unwrap());

        assert!(matches!(
            collector.into_records(),
            Err(FinderError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_first_page_url() {
        let config = FinderConfig::default();
        let client = Arc::new(HttpClient::with_defaults().unwrap());
        let source = SnykProjectSource::with_client(client, &config, "org-123", "secret").unwrap();

        assert_eq!(
            source.first_page_url().as_str(),
            "https://api.eu.snyk.io/rest/orgs/org-123/projects?version=2025-11-05&expand=target&limit=100"
        );
        assert_eq!(
            source
                .resolve_link("/rest/orgs/org-123/projects?starting_after=x")
                .unwrap()
                .as_str(),
            "https://api.eu.snyk.io/rest/orgs/org-123/projects?starting_after=x"
        );
        assert_eq!(
            source.resolve_link("https://other.example/x").unwrap().as_str(),
            "https://other.example/x"
        );
    }

    #[test]
    fn test_source_requires_org_and_token() {
        let config = FinderConfig::default();
        let client: Arc<dyn HttpClientTrait> = Arc::new(HttpClient::with_defaults().unwrap());

        assert!(SnykProjectSource::with_client(client.clone(), &config, "", "t").is_err());
        assert!(SnykProjectSource::with_client(client, &config, "org", "").is_err());
    }
}
