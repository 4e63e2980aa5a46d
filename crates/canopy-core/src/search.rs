//! Flat search index over a converted hierarchy.
//!
//! The index is rebuilt whenever a new data model is selected. Queries are
//! case-insensitive substring matches on the display name, optionally
//! narrowed to groups or to variables of a declared type.

use crate::hierarchy::{NodePath, TreeNode};

/// Which side of the index a query runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Variables,
    Groups,
}

/// One searchable item: a variable or group somewhere in the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchEntry {
    /// Display name, the match target.
    pub name: String,

    /// Structural address in the canonical tree.
    pub path: NodePath,

    /// Human-readable ancestry, e.g. "Dementia > MRI > Left hippocampus".
    pub display_path: String,

    /// Declared value type; variables only.
    pub var_type: Option<String>,
}

/// Searchable flattening of one hierarchy.
#[derive(Debug, Default)]
pub struct SearchIndex {
    variables: Vec<SearchEntry>,
    groups: Vec<SearchEntry>,
    variable_types: Vec<String>,
}

impl SearchIndex {
    /// Flattens a tree into the index.
    pub fn build(root: &TreeNode) -> Self {
        let mut index = SearchIndex::default();
        index.collect(root, NodePath::root(), "");
        tracing::debug!(
            variables = index.variables.len(),
            groups = index.groups.len(),
            "built search index"
        );
        index
    }

    fn collect(&mut self, node: &TreeNode, path: NodePath, ancestry: &str) {
        let display_path = if ancestry.is_empty() {
            node.name.clone()
        } else {
            format!("{} > {}", ancestry, node.name)
        };

        if node.is_group() {
            self.groups.push(SearchEntry {
                name: node.name.clone(),
                path: path.clone(),
                display_path: display_path.clone(),
                var_type: None,
            });
            for (index, child) in node.children.iter().enumerate() {
                self.collect(child, path.child(index), &display_path);
            }
        } else {
            let var_type = node
                .attributes
                .as_ref()
                .and_then(|a| a.var_type.clone());
            if let Some(t) = &var_type {
                if !self.variable_types.contains(t) {
                    self.variable_types.push(t.clone());
                }
            }
            self.variables.push(SearchEntry {
                name: node.name.clone(),
                path,
                display_path,
                var_type,
            });
        }
    }

    /// Runs a substring query against one side of the index.
    ///
    /// An empty or whitespace-only query returns nothing: suggestions appear
    /// as the user types, never as a dump of the whole model.
    pub fn query(
        &self,
        text: &str,
        kind: SearchKind,
        type_filter: Option<&str>,
    ) -> Vec<&SearchEntry> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let pool = match kind {
            SearchKind::Variables => &self.variables,
            SearchKind::Groups => &self.groups,
        };

        pool.iter()
            .filter(|entry| entry.name.to_lowercase().contains(&needle))
            .filter(|entry| match (kind, type_filter) {
                (SearchKind::Variables, Some(t)) => entry.var_type.as_deref() == Some(t),
                _ => true,
            })
            .collect()
    }

    /// Distinct declared variable types, in first-seen order.
    pub fn variable_types(&self) -> &[String] {
        &self.variable_types
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DataModel, Group, Variable};
    use crate::hierarchy::build_hierarchy;
    use uuid::Uuid;

    fn typed_var(label: &str, var_type: &str) -> Variable {
        Variable {
            label: label.to_string(),
            var_type: Some(var_type.to_string()),
            ..Default::default()
        }
    }

    fn sample_index() -> SearchIndex {
        let model = DataModel {
            uuid: Uuid::nil(),
            label: "Root".into(),
            code: None,
            version: None,
            longitudinal: false,
            released: false,
            variables: vec![typed_var("Age", "integer")],
            groups: vec![Group {
                label: "Imaging".into(),
                code: None,
                variables: vec![
                    typed_var("Left hippocampus", "real"),
                    typed_var("Right hippocampus", "real"),
                ],
                groups: vec![],
            }],
        };
        SearchIndex::build(&build_hierarchy(&model).unwrap())
    }

    #[test]
    fn test_empty_query_returns_nothing() {
        let index = sample_index();
        assert!(index.query("", SearchKind::Variables, None).is_empty());
        assert!(index.query("   ", SearchKind::Groups, None).is_empty());
    }

    #[test]
    fn test_substring_match_is_case_insensitive() {
        let index = sample_index();
        let hits = index.query("HIPPO", SearchKind::Variables, None);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].display_path, "Root > Imaging > Left hippocampus");
    }

    #[test]
    fn test_type_filter_narrows_variables() {
        let index = sample_index();
        assert_eq!(index.query("a", SearchKind::Variables, Some("integer")).len(), 1);
        assert!(index.query("hippo", SearchKind::Variables, Some("integer")).is_empty());
    }

    #[test]
    fn test_group_query_ignores_variables() {
        let index = sample_index();
        let hits = index.query("imag", SearchKind::Groups, None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Imaging");

        // The root itself is a group and indexed as one.
        assert_eq!(index.query("root", SearchKind::Groups, None).len(), 1);
    }

    #[test]
    fn test_variable_types_are_distinct_first_seen() {
        let index = sample_index();
        assert_eq!(index.variable_types(), &["integer".to_string(), "real".to_string()]);
        assert_eq!(index.variable_count(), 3);
        assert_eq!(index.group_count(), 2);
    }
}
