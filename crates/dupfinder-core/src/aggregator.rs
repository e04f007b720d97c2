//! Duplicate aggregator
//!
//! Groups projects by target and then by project name. Keys compare by exact
//! string equality and groups keep the order in which their key first appeared.

use std::collections::HashMap;

use crate::{
    errors::{FinderError, Result},
    models::ProjectRecord,
    report::DuplicateReport,
};

/// Projects sharing a name within one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameGroup {
    pub project_name: String,
    pub projects: Vec<ProjectRecord>,
}

/// Duplicate name groups found under one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetGroup {
    pub target_name: String,
    pub names: Vec<NameGroup>,
}

/// Partition `items` by `key`, keeping first-seen key order and input order within a group
fn group_ordered<'a, I, F>(items: I, key: F) -> Vec<(String, Vec<&'a ProjectRecord>)>
where
    I: IntoIterator<Item = &'a ProjectRecord>,
    F: Fn(&ProjectRecord) -> &str,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<&'a ProjectRecord>)> = Vec::new();

    for item in items {
        let k = key(item);
        match index.get(k) {
            Some(&slot) => groups[slot].1.push(item),
            None => {
                index.insert(k.to_string(), groups.len());
                groups.push((k.to_string(), vec![item]));
            }
        }
    }

    groups
}

fn check_record(record: &ProjectRecord) -> Result<()> {
    if record.project_id.is_empty() {
        return Err(FinderError::invariant(format!(
            "project '{}' has no project_id",
            record.project_name
        )));
    }
    if record.project_name.is_empty() {
        return Err(FinderError::invariant(format!(
            "project {} has no project_name",
            record.project_id
        )));
    }
    Ok(())
}

/// Group projects by target, then by name, keeping only names with two or more projects
pub fn find_duplicates(projects: &[ProjectRecord]) -> Result<Vec<TargetGroup>> {
    projects.iter().try_for_each(check_record)?;

    let duplicates = group_ordered(projects, |p| p.target_key())
        .into_iter()
        .filter_map(|(target_name, members)| {
            let names: Vec<NameGroup> = group_ordered(members, |p| p.project_name.as_str())
                .into_iter()
                .filter(|(_, same_name)| same_name.len() > 1)
                .map(|(project_name, same_name)| NameGroup {
                    project_name,
                    projects: same_name.into_iter().cloned().collect(),
                })
                .collect();

            (!names.is_empty()).then_some(TargetGroup { target_name, names })
        })
        .collect();

    Ok(duplicates)
}

/// Run the whole aggregation and assemble the report
pub fn aggregate(org_id: &str, projects: &[ProjectRecord]) -> Result<DuplicateReport> {
    let groups = find_duplicates(projects)?;
    Ok(DuplicateReport::generate(org_id, groups))
}
