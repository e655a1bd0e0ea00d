//! Diff computation between two templates

use crate::template::Template;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Top-level resource keys compared besides `Properties`
const COMPARED_KEYS: &[&str] = &["Type", "DependsOn", "DeletionPolicy", "UpdateReplacePolicy"];

/// How a single resource or output changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Change {
    Added,
    Removed,
    /// Changed, with the names of the properties/attributes that differ
    Modified { fields: Vec<String> },
}

/// A diff between the deployed and the new version of a resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDiff {
    pub logical_id: String,
    /// Type of the new version (or the old one, for removals)
    pub resource_type: String,
    pub change: Change,
    pub before: Option<Value>,
    pub after: Option<Value>,
}

impl ResourceDiff {
    pub fn is_addition(&self) -> bool {
        matches!(self.change, Change::Added)
    }

    pub fn is_removal(&self) -> bool {
        matches!(self.change, Change::Removed)
    }

    pub fn is_modification(&self) -> bool {
        matches!(self.change, Change::Modified { .. })
    }

    /// A type change forces the engine to replace the resource
    pub fn is_replacement(&self) -> bool {
        matches!(&self.change, Change::Modified { fields } if fields.iter().any(|f| f == "Type"))
    }
}

/// Compute resource diffs from `old` to `new`
///
/// Returns only resources that differ, ordered by logical ID.
pub fn compute_diffs(old: &Template, new: &Template) -> Vec<ResourceDiff> {
    let ids: BTreeSet<&String> = old.resources.keys().chain(new.resources.keys()).collect();

    ids.into_iter()
        .filter_map(|id| {
            let before = old.resources.get(id);
            let after = new.resources.get(id);
            let change = match (before, after) {
                (None, Some(_)) => Change::Added,
                (Some(_), None) => Change::Removed,
                (Some(b), Some(a)) => {
                    let fields = changed_fields(b, a);
                    if fields.is_empty() {
                        return None;
                    }
                    Change::Modified { fields }
                }
                (None, None) => return None,
            };
            let resource_type = after
                .or(before)
                .and_then(|v| v["Type"].as_str())
                .unwrap_or("unknown")
                .to_string();
            Some(ResourceDiff {
                logical_id: id.clone(),
                resource_type,
                change,
                before: before.cloned(),
                after: after.cloned(),
            })
        })
        .collect()
}

/// Output diffs from `old` to `new`, by output name
pub fn compute_output_diffs(old: &Template, new: &Template) -> BTreeMap<String, Change> {
    let names: BTreeSet<&String> = old.outputs.keys().chain(new.outputs.keys()).collect();
    names
        .into_iter()
        .filter_map(|name| {
            let change = match (old.outputs.get(name), new.outputs.get(name)) {
                (None, Some(_)) => Change::Added,
                (Some(_), None) => Change::Removed,
                (Some(b), Some(a)) if b != a => Change::Modified {
                    fields: vec!["Value".to_string()],
                },
                _ => return None,
            };
            Some((name.clone(), change))
        })
        .collect()
}

fn changed_fields(before: &Value, after: &Value) -> Vec<String> {
    let mut fields = Vec::new();

    for key in COMPARED_KEYS {
        if before.get(key) != after.get(key) {
            fields.push((*key).to_string());
        }
    }

    let empty = serde_json::Map::new();
    let old_props = before["Properties"].as_object().unwrap_or(&empty);
    let new_props = after["Properties"].as_object().unwrap_or(&empty);
    let keys: BTreeSet<&String> = old_props.keys().chain(new_props.keys()).collect();
    for key in keys {
        if old_props.get(key) != new_props.get(key) {
            fields.push(key.clone());
        }
    }

    fields
}

/// Diff summary statistics
#[derive(Debug, Clone, Default)]
pub struct DiffSummary {
    pub additions: usize,
    pub removals: usize,
    pub modifications: usize,
    /// Modifications that replace the physical resource
    pub replacements: usize,
}

impl DiffSummary {
    pub fn from_diffs(diffs: &[ResourceDiff]) -> Self {
        let mut summary = Self::default();
        for diff in diffs {
            match diff.change {
                Change::Added => summary.additions += 1,
                Change::Removed => summary.removals += 1,
                Change::Modified { .. } => summary.modifications += 1,
            }
            if diff.is_replacement() {
                summary.replacements += 1;
            }
        }
        summary
    }

    /// Total number of changes
    pub fn total(&self) -> usize {
        self.additions + self.removals + self.modifications
    }

    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}

/// Group diffs by resource type, ordered by type name
pub fn group_by_type(diffs: &[ResourceDiff]) -> BTreeMap<String, Vec<&ResourceDiff>> {
    let mut groups: BTreeMap<String, Vec<&ResourceDiff>> = BTreeMap::new();
    for diff in diffs {
        groups
            .entry(diff.resource_type.clone())
            .or_default()
            .push(diff);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn template(resources: Value) -> Template {
        Template::from_json(&json!({ "Resources": resources }).to_string()).unwrap()
    }

    #[test]
    fn test_identical_templates_have_no_diff() {
        let t = template(json!({ "A": { "Type": "X", "Properties": { "P": 1 } } }));
        assert!(compute_diffs(&t, &t).is_empty());
    }

    #[test]
    fn test_added_removed_modified() {
        let old = template(json!({
            "Keep": { "Type": "X", "Properties": { "P": 1 } },
            "Gone": { "Type": "Y" },
            "Edit": { "Type": "Z", "Properties": { "P": 1, "Q": 2 } },
        }));
        let new = template(json!({
            "Keep": { "Type": "X", "Properties": { "P": 1 } },
            "New": { "Type": "W" },
            "Edit": { "Type": "Z", "Properties": { "P": 1, "Q": 3 }, "DeletionPolicy": "Delete" },
        }));

        let diffs = compute_diffs(&old, &new);
        assert_eq!(diffs.len(), 3);

        let by_id: HashMap<&str, &ResourceDiff> =
            diffs.iter().map(|d| (d.logical_id.as_str(), d)).collect();
        assert!(by_id["New"].is_addition());
        assert!(by_id["Gone"].is_removal());
        assert_eq!(by_id["Gone"].resource_type, "Y");
        assert_eq!(
            by_id["Edit"].change,
            Change::Modified {
                fields: vec!["DeletionPolicy".to_string(), "Q".to_string()]
            }
        );

        let summary = DiffSummary::from_diffs(&diffs);
        assert_eq!(summary.additions, 1);
        assert_eq!(summary.removals, 1);
        assert_eq!(summary.modifications, 1);
        assert_eq!(summary.replacements, 0);
        assert!(summary.has_changes());
    }

    #[test]
    fn test_type_change_is_replacement() {
        let old = template(json!({ "A": { "Type": "X" } }));
        let new = template(json!({ "A": { "Type": "Y" } }));
        let diffs = compute_diffs(&old, &new);
        assert!(diffs[0].is_replacement());
        assert_eq!(DiffSummary::from_diffs(&diffs).replacements, 1);
    }

    #[test]
    fn test_output_diffs() {
        let mut old = template(json!({}));
        let mut new = template(json!({}));
        old.outputs.insert("Url".into(), json!({ "Value": "a" }));
        old.outputs.insert("Old".into(), json!({ "Value": "x" }));
        new.outputs.insert("Url".into(), json!({ "Value": "b" }));
        new.outputs.insert("Fresh".into(), json!({ "Value": "y" }));

        let changes = compute_output_diffs(&old, &new);
        assert_eq!(changes["Old"], Change::Removed);
        assert_eq!(changes["Fresh"], Change::Added);
        assert!(matches!(changes["Url"], Change::Modified { .. }));
    }

    #[test]
    fn test_group_by_type() {
        let old = template(json!({}));
        let new = template(json!({
            "A": { "Type": "AWS::Lambda::Function" },
            "B": { "Type": "AWS::Lambda::Function" },
            "C": { "Type": "AWS::IAM::Role" },
        }));
        let diffs = compute_diffs(&old, &new);
        let groups = group_by_type(&diffs);
        assert_eq!(groups["AWS::Lambda::Function"].len(), 2);
        assert_eq!(groups["AWS::IAM::Role"].len(), 1);
    }
}
