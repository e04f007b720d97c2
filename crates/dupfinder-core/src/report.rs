//! Duplicate report

use serde::{Deserialize, Serialize};

use crate::{aggregator::TargetGroup, errors::Result, models::ProjectRecord};

/// Final report for one organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateReport {
    pub org_id: String,
    pub total_targets_with_duplicates: usize,
    pub total_duplicate_projects: usize,
    pub duplicates_by_target: Vec<TargetDuplicates>,
}

/// Duplicated project names under one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDuplicates {
    pub target_name: String,
    pub duplicate_project_names: Vec<NameDuplicates>,
}

/// Projects sharing one name under one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameDuplicates {
    pub project_name: String,
    pub duplicate_count: usize,
    pub projects: Vec<ProjectRecord>,
}

impl DuplicateReport {
    /// Report with no duplicates
    pub fn empty(org_id: impl Into<String>) -> Self {
        Self {
            org_id: org_id.into(),
            total_targets_with_duplicates: 0,
            total_duplicate_projects: 0,
            duplicates_by_target: Vec::new(),
        }
    }

    /// Build the report from surviving duplicate groups
    pub fn generate(org_id: impl Into<String>, groups: Vec<TargetGroup>) -> Self {
        let duplicates_by_target: Vec<TargetDuplicates> = groups
            .into_iter()
            .map(|group| TargetDuplicates {
                target_name: group.target_name,
                duplicate_project_names: group
                    .names
                    .into_iter()
                    .map(|name| NameDuplicates {
                        project_name: name.project_name,
                        duplicate_count: name.projects.len(),
                        projects: name.projects,
                    })
                    .collect(),
            })
            .collect();

        let total_duplicate_projects = duplicates_by_target
            .iter()
            .flat_map(|target| &target.duplicate_project_names)
            .map(|name| name.duplicate_count)
            .sum();

        Self {
            org_id: org_id.into(),
            total_targets_with_duplicates: duplicates_by_target.len(),
            total_duplicate_projects,
            duplicates_by_target,
        }
    }

    /// True when no duplicates were found
    pub fn is_empty(&self) -> bool {
        self.duplicates_by_target.is_empty()
    }

    /// Pretty-printed JSON with two-space indentation
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
