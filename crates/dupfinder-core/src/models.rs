//! Project data models
//!
//! `ProjectRecord` is the normalized descriptor the aggregator works on. The
//! remaining types mirror the JSON:API documents returned by the Snyk REST
//! `GET /orgs/{org_id}/projects` endpoint, with every member optional so that a
//! sparse page still parses.

use serde::{Deserialize, Deserializer, Serialize};

/// Grouping key used when a project carries no target relationship at all
pub const UNKNOWN_TARGET: &str = "unknown";

/// Project name used when the API omits one
pub const UNKNOWN_PROJECT_NAME: &str = "Unknown";

/// Normalized project descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    /// Project ID, unique within the organization
    pub project_id: String,
    /// Project name, e.g. `org/repo:package.json`
    pub project_name: String,
    /// ID of the scanned target
    pub target_id: String,
    /// Display name of the scanned target
    pub target_name: String,
    /// Project type, e.g. `npm`
    pub project_type: String,
    /// Integration the project came from, e.g. `github`
    pub origin: String,
}

impl ProjectRecord {
    /// Key the record is grouped under: display name, then target ID, then `unknown`
    pub fn target_key(&self) -> &str {
        if !self.target_name.is_empty() {
            &self.target_name
        } else if !self.target_id.is_empty() {
            &self.target_id
        } else {
            UNKNOWN_TARGET
        }
    }
}

/// One page of the projects listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectsPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<ApiProject>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub included: Vec<IncludedResource>,
    #[serde(default)]
    pub links: Option<PageLinks>,
    #[serde(default)]
    pub errors: Option<Vec<ApiErrorObject>>,
}

impl ProjectsPage {
    /// Continuation link, if another page follows
    pub fn next_link(&self) -> Option<&str> {
        self.links
            .as_ref()
            .and_then(|links| links.next.as_deref())
            .filter(|next| !next.is_empty())
    }

    /// Resources from `included` that describe targets
    pub fn included_targets(&self) -> impl Iterator<Item = &IncludedResource> {
        self.included.iter().filter(|item| item.kind == "target")
    }
}

/// Treat an explicit `null` like an absent member
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Pagination links
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageLinks {
    #[serde(default)]
    pub next: Option<String>,
}

/// Raw project entry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiProject {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: ProjectAttributes,
    #[serde(default, deserialize_with = "null_as_default")]
    pub relationships: ProjectRelationships,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectAttributes {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectRelationships {
    #[serde(default)]
    pub target: Option<Relationship>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Relationship {
    #[serde(default)]
    pub data: Option<ResourceRef>,
}

/// Reference to a related resource; `expand=target` may inline its attributes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceRef {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default)]
    pub attributes: Option<TargetAttributes>,
}

/// Entry of the top-level `included` array
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncludedResource {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default)]
    pub attributes: Option<TargetAttributes>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TargetAttributes {
    #[serde(default)]
    pub display_name: Option<String>,
}

/// JSON:API error object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ApiErrorObject {
    /// One-line summary
    pub fn summary(&self) -> String {
        let text = match (&self.title, &self.detail) {
            (Some(title), Some(detail)) => format!("{title}: {detail}"),
            (Some(text), None) | (None, Some(text)) => text.clone(),
            (None, None) => "unspecified error".to_string(),
        };
        match &self.status {
            Some(status) => format!("[{status}] {text}"),
            None => text,
        }
    }
}
