//! Canonical tree representation of a data model.
//!
//! A document (nested groups and variables) converts into one `TreeNode`
//! hierarchy with derived per-group aggregate counts. The converted tree is
//! the single source of truth for navigation, search, and layout: it is
//! built once per loaded model and treated as read-only afterwards.
//!
//! Node identity is structural. Every node is addressed by a [`NodePath`],
//! the sequence of child indices from the root, so two siblings sharing a
//! label cannot be confused during path reconstruction. Names are for
//! display only.

use crate::document::{DataModel, Group, Variable, VariableAttributes};
use crate::error::{HierarchyError, Result};
use serde::{Deserialize, Serialize};

/// The kind of element a tree node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// An aggregate container of variables and sub-groups.
    Group,
    /// A leaf schema element.
    Variable,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Group => write!(f, "group"),
            Self::Variable => write!(f, "variable"),
        }
    }
}

/// Structural address of a node: child indices from the root.
///
/// The empty path addresses the root itself. Paths are cheap to clone and
/// compare, and they survive re-renders because the canonical tree never
/// changes shape while a model is loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// The path addressing the root node.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Builds a path from explicit child indices.
    pub fn from_indices(indices: impl Into<Vec<usize>>) -> Self {
        Self(indices.into())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of segments; equals the node's depth below the root.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn segments(&self) -> &[usize] {
        &self.0
    }

    /// The path extended by one child index.
    pub fn child(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(index);
        Self(segments)
    }

    /// The parent path, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// The path truncated to its first `depth` segments.
    pub fn truncated(&self, depth: usize) -> Self {
        Self(self.0.iter().copied().take(depth).collect())
    }

    /// Whether `self` lies on the path from the root to `other` (inclusive).
    pub fn is_ancestor_of(&self, other: &NodePath) -> bool {
        other.0.len() >= self.0.len() && other.0[..self.0.len()] == self.0[..]
    }
}

impl std::fmt::Display for NodePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.0 {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

/// One element of a converted data model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Display label.
    pub name: String,

    /// Stable machine identifier, when the document carries one.
    pub code: Option<String>,

    pub kind: NodeKind,

    /// Total number of variable leaves in this subtree. Present only for
    /// groups; computed bottom-up during conversion.
    pub variable_count: Option<usize>,

    /// Descriptive fields. Present only for variables.
    pub attributes: Option<VariableAttributes>,

    /// Converted variables first, then converted sub-groups, both in
    /// document order.
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn is_group(&self) -> bool {
        self.kind == NodeKind::Group
    }

    pub fn is_variable(&self) -> bool {
        self.kind == NodeKind::Variable
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Resolves a structural path to a node in this tree.
    pub fn at(&self, path: &NodePath) -> Option<&TreeNode> {
        let mut current = self;
        for &index in path.segments() {
            current = current.children.get(index)?;
        }
        Some(current)
    }

    /// The display names along a path, starting with this node's own name.
    ///
    /// This is exactly the breadcrumb for a node addressed by `path`.
    pub fn names_along(&self, path: &NodePath) -> Option<Vec<String>> {
        let mut names = vec![self.name.clone()];
        let mut current = self;
        for &index in path.segments() {
            current = current.children.get(index)?;
            names.push(current.name.clone());
        }
        Some(names)
    }

    /// Finds the first node with the given name in pre-order.
    ///
    /// Labels are not guaranteed unique across a model; the first match in
    /// document order wins, which keeps lookups deterministic.
    pub fn find_by_name(&self, name: &str) -> Option<NodePath> {
        fn walk(node: &TreeNode, path: NodePath, name: &str) -> Option<NodePath> {
            if node.name == name {
                return Some(path);
            }
            for (index, child) in node.children.iter().enumerate() {
                if let Some(found) = walk(child, path.child(index), name) {
                    return Some(found);
                }
            }
            None
        }
        walk(self, NodePath::root(), name)
    }

    /// Maximum nesting depth below this node. Zero for a leaf.
    pub fn max_depth(&self) -> usize {
        self.children
            .iter()
            .map(|c| 1 + c.max_depth())
            .max()
            .unwrap_or(0)
    }

    /// Counts variable leaves in this subtree by traversal.
    ///
    /// Used to cross-check the derived `variable_count` field; prefer the
    /// field for display.
    pub fn count_variable_leaves(&self) -> usize {
        if self.is_variable() {
            return 1;
        }
        self.children.iter().map(|c| c.count_variable_leaves()).sum()
    }
}

/// Converts a raw data-model document into the canonical tree.
///
/// Variables convert before sub-groups, both in document order. Each group
/// carries the total variable count of its subtree, computed post-order.
/// Empty groups and models are fine; they just carry a count of zero. The
/// only rejected shape is an element without a label.
pub fn build_hierarchy(model: &DataModel) -> Result<TreeNode> {
    if model.label.trim().is_empty() {
        return Err(HierarchyError::missing_root_label());
    }

    let mut children = Vec::with_capacity(model.variables.len() + model.groups.len());
    let mut count = 0;

    for variable in &model.variables {
        children.push(convert_variable(variable, &model.label)?);
        count += 1;
    }
    for group in &model.groups {
        let child = convert_group(group, &model.label)?;
        count += child.variable_count.unwrap_or(0);
        children.push(child);
    }

    tracing::debug!(
        model = %model.label,
        variables = count,
        "converted data model to hierarchy"
    );

    Ok(TreeNode {
        name: model.label.clone(),
        code: model.code.clone(),
        kind: NodeKind::Group,
        variable_count: Some(count),
        attributes: None,
        children,
    })
}

fn convert_variable(variable: &Variable, parent: &str) -> Result<TreeNode> {
    if variable.label.trim().is_empty() {
        return Err(HierarchyError::missing_label_in(parent));
    }
    Ok(TreeNode {
        name: variable.label.clone(),
        code: variable.code.clone(),
        kind: NodeKind::Variable,
        variable_count: None,
        attributes: Some(VariableAttributes::from_variable(variable)),
        children: Vec::new(),
    })
}

fn convert_group(group: &Group, parent: &str) -> Result<TreeNode> {
    if group.label.trim().is_empty() {
        return Err(HierarchyError::missing_label_in(parent));
    }

    let mut children = Vec::with_capacity(group.variables.len() + group.groups.len());
    let mut count = 0;

    for variable in &group.variables {
        children.push(convert_variable(variable, &group.label)?);
        count += 1;
    }
    for sub in &group.groups {
        let child = convert_group(sub, &group.label)?;
        count += child.variable_count.unwrap_or(0);
        children.push(child);
    }

    Ok(TreeNode {
        name: group.label.clone(),
        code: group.code.clone(),
        kind: NodeKind::Group,
        variable_count: Some(count),
        attributes: None,
        children,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn var(label: &str) -> Variable {
        Variable {
            label: label.to_string(),
            ..Default::default()
        }
    }

    fn model(label: &str, variables: Vec<Variable>, groups: Vec<Group>) -> DataModel {
        DataModel {
            uuid: Uuid::nil(),
            label: label.to_string(),
            code: None,
            version: None,
            longitudinal: false,
            released: false,
            variables,
            groups,
        }
    }

    /// Checks that every group's derived count equals its actual leaf count.
    fn assert_counts_consistent(node: &TreeNode) {
        if node.is_group() {
            assert_eq!(
                node.variable_count,
                Some(node.count_variable_leaves()),
                "count mismatch at '{}'",
                node.name
            );
        }
        for child in &node.children {
            assert_counts_consistent(child);
        }
    }

    #[test]
    fn test_mixed_variables_and_groups_counts_and_order() {
        let m = model(
            "Root",
            vec![var("V3")],
            vec![Group {
                label: "G1".into(),
                code: None,
                variables: vec![var("V1"), var("V2")],
                groups: vec![],
            }],
        );

        let root = build_hierarchy(&m).unwrap();
        assert_eq!(root.variable_count, Some(3));
        assert_eq!(root.children.len(), 2);

        // Variables before groups, document order preserved.
        assert_eq!(root.children[0].name, "V3");
        assert!(root.children[0].is_variable());
        assert_eq!(root.children[1].name, "G1");
        assert_eq!(root.children[1].variable_count, Some(2));
        assert_eq!(root.children[1].children[0].name, "V1");
        assert_eq!(root.children[1].children[1].name, "V2");

        assert_counts_consistent(&root);
    }

    #[test]
    fn test_nested_groups_count_bottom_up() {
        let m = model(
            "Root",
            vec![],
            vec![Group {
                label: "Outer".into(),
                code: None,
                variables: vec![var("a")],
                groups: vec![Group {
                    label: "Inner".into(),
                    code: None,
                    variables: vec![var("b"), var("c")],
                    groups: vec![],
                }],
            }],
        );

        let root = build_hierarchy(&m).unwrap();
        assert_eq!(root.variable_count, Some(3));
        assert_eq!(root.children[0].variable_count, Some(3));
        assert_eq!(root.children[0].children[1].variable_count, Some(2));
        assert_counts_consistent(&root);
    }

    #[test]
    fn test_empty_model_builds_with_zero_count() {
        let root = build_hierarchy(&model("Empty", vec![], vec![])).unwrap();
        assert_eq!(root.variable_count, Some(0));
        assert!(root.children.is_empty());
    }

    #[test]
    fn test_missing_root_label_is_rejected() {
        let err = build_hierarchy(&model("  ", vec![], vec![])).unwrap_err();
        assert!(err.to_string().contains("no label"));
    }

    #[test]
    fn test_missing_group_label_names_parent() {
        let m = model(
            "Root",
            vec![],
            vec![Group {
                label: "".into(),
                code: None,
                variables: vec![],
                groups: vec![],
            }],
        );
        let err = build_hierarchy(&m).unwrap_err();
        assert!(err.to_string().contains("Root"));
    }

    #[test]
    fn test_path_resolution_and_names() {
        let m = model(
            "Root",
            vec![var("V3")],
            vec![Group {
                label: "G1".into(),
                code: None,
                variables: vec![var("V1")],
                groups: vec![],
            }],
        );
        let root = build_hierarchy(&m).unwrap();

        let g1 = NodePath::from_indices(vec![1]);
        assert_eq!(root.at(&g1).unwrap().name, "G1");

        let v1 = g1.child(0);
        assert_eq!(root.at(&v1).unwrap().name, "V1");
        assert_eq!(
            root.names_along(&v1).unwrap(),
            vec!["Root".to_string(), "G1".to_string(), "V1".to_string()]
        );

        assert!(root.at(&NodePath::from_indices(vec![5])).is_none());
    }

    #[test]
    fn test_find_by_name_is_preorder_first_match() {
        let m = model(
            "Root",
            vec![var("dup")],
            vec![Group {
                label: "G1".into(),
                code: None,
                variables: vec![var("dup")],
                groups: vec![],
            }],
        );
        let root = build_hierarchy(&m).unwrap();

        // The direct child wins over the nested duplicate.
        assert_eq!(
            root.find_by_name("dup"),
            Some(NodePath::from_indices(vec![0]))
        );
        assert_eq!(root.find_by_name("absent"), None);
    }

    #[test]
    fn test_path_helpers() {
        let p = NodePath::from_indices(vec![1, 0, 2]);
        assert_eq!(p.depth(), 3);
        assert_eq!(p.parent(), Some(NodePath::from_indices(vec![1, 0])));
        assert_eq!(p.truncated(1), NodePath::from_indices(vec![1]));
        assert!(NodePath::root().is_ancestor_of(&p));
        assert!(NodePath::from_indices(vec![1]).is_ancestor_of(&p));
        assert!(!NodePath::from_indices(vec![0]).is_ancestor_of(&p));
        assert_eq!(NodePath::root().parent(), None);
        assert_eq!(p.to_string(), "/1/0/2");
    }

    #[test]
    fn test_max_depth() {
        let m = model(
            "Root",
            vec![],
            vec![Group {
                label: "G1".into(),
                code: None,
                variables: vec![],
                groups: vec![Group {
                    label: "G2".into(),
                    code: None,
                    variables: vec![var("leaf")],
                    groups: vec![],
                }],
            }],
        );
        let root = build_hierarchy(&m).unwrap();
        assert_eq!(root.max_depth(), 3);
        assert_eq!(root.at(&NodePath::from_indices(vec![0])).unwrap().max_depth(), 2);
    }
}
