//! Navigation state for one visualization session.
//!
//! Owns the canonical tree of the loaded model plus the current focus,
//! breadcrumb, depth limit, and highlight. Every operation restores the
//! central invariant before returning: the breadcrumb equals the display
//! names along the path from the logical root to the focus, and walking
//! that path resolves exactly to the focus node.
//!
//! The state lives as long as one model is shown and is replaced through
//! [`NavigationState::switch_model`], never mutated from outside.

use crate::error::{NavError, Result};
use canopy_core::{NodePath, TreeNode};

#[derive(Debug)]
pub struct NavigationState {
    /// Full converted hierarchy; read-only for this session.
    logical_root: TreeNode,

    /// Address of the subtree currently shown as the view root.
    focus: NodePath,

    /// Display names from the logical root to the focus, inclusive.
    breadcrumb: Vec<String>,

    /// Levels rendered below the focus; `None` shows everything.
    depth_limit: Option<usize>,

    /// Node emphasized in the next render, set by search jumps.
    highlighted: Option<NodePath>,
}

impl NavigationState {
    /// Starts a session on a freshly built hierarchy.
    ///
    /// A model with no variables and no groups cannot be visualized and
    /// yields [`NavError::EmptyHierarchy`]; the caller renders an explicit
    /// empty state instead.
    pub fn new(root: TreeNode) -> Result<Self> {
        if !root.has_children() {
            return Err(NavError::EmptyHierarchy);
        }
        let breadcrumb = vec![root.name.clone()];
        Ok(Self {
            logical_root: root,
            focus: NodePath::root(),
            breadcrumb,
            depth_limit: None,
            highlighted: None,
        })
    }

    pub fn logical_root(&self) -> &TreeNode {
        &self.logical_root
    }

    pub fn focus_path(&self) -> &NodePath {
        &self.focus
    }

    /// The focused subtree root. The invariant keeps the focus resolvable;
    /// if it ever were not, the logical root is the safe answer.
    pub fn focus_node(&self) -> &TreeNode {
        self.logical_root.at(&self.focus).unwrap_or(&self.logical_root)
    }

    pub fn breadcrumb(&self) -> &[String] {
        &self.breadcrumb
    }

    pub fn depth_limit(&self) -> Option<usize> {
        self.depth_limit
    }

    pub fn highlighted(&self) -> Option<&NodePath> {
        self.highlighted.as_ref()
    }

    /// How many depth-limit choices are meaningful for the current focus:
    /// the maximum nesting depth beneath it.
    pub fn max_useful_depth(&self) -> usize {
        self.focus_node().max_depth()
    }

    /// Re-roots the view on `path`.
    ///
    /// Fails with [`NavError::PathNotFound`] when the path does not
    /// resolve; the state is left untouched in that case.
    pub fn reroot(&mut self, path: &NodePath) -> Result<()> {
        let Some(names) = self.logical_root.names_along(path) else {
            return Err(NavError::PathNotFound(path.clone()));
        };
        self.focus = path.clone();
        self.breadcrumb = names;
        self.highlighted = None;
        tracing::debug!(focus = %self.focus, "re-rooted view");
        Ok(())
    }

    /// Jumps back to the breadcrumb segment at `index`.
    ///
    /// On a stale breadcrumb (a name along the truncated path no longer
    /// matches the tree), the state falls back to the logical root and
    /// [`NavError::StaleNavigation`] is returned so the view can tell the
    /// user why it reset.
    pub fn breadcrumb_click(&mut self, index: usize) -> Result<()> {
        if index >= self.breadcrumb.len() {
            self.reset_to_root();
            return Err(NavError::StaleNavigation);
        }

        let target = self.focus.truncated(index);
        match self.logical_root.names_along(&target) {
            Some(names) if names == self.breadcrumb[..index + 1] => {
                self.focus = target;
                self.breadcrumb = names;
                self.highlighted = None;
                Ok(())
            }
            _ => {
                self.reset_to_root();
                Err(NavError::StaleNavigation)
            }
        }
    }

    /// Jumps to the first node named `name`.
    ///
    /// A node with children becomes the new focus directly. A leaf cannot
    /// meaningfully be a view root, so the view re-roots on its parent,
    /// highlights the leaf, and narrows the depth limit to one level so
    /// the match stays visible without overwhelming context.
    pub fn search_jump(&mut self, name: &str) -> Result<()> {
        let Some(path) = self.logical_root.find_by_name(name) else {
            return Err(NavError::NodeNotFound(name.to_string()));
        };

        let node = self
            .logical_root
            .at(&path)
            .ok_or_else(|| NavError::PathNotFound(path.clone()))?;

        if node.has_children() {
            self.reroot(&path)
        } else {
            let parent = path.parent().unwrap_or_else(NodePath::root);
            self.reroot(&parent)?;
            self.highlighted = Some(path);
            self.depth_limit = Some(1);
            Ok(())
        }
    }

    /// Changes the depth limit for the next layout pass. Focus and
    /// breadcrumb are untouched.
    pub fn set_depth_limit(&mut self, limit: Option<usize>) {
        self.depth_limit = limit;
    }

    /// Replaces the session with a new model. The only operation allowed
    /// to change the logical root.
    pub fn switch_model(&mut self, new_root: TreeNode) -> Result<()> {
        if !new_root.has_children() {
            return Err(NavError::EmptyHierarchy);
        }
        self.breadcrumb = vec![new_root.name.clone()];
        self.logical_root = new_root;
        self.focus = NodePath::root();
        self.depth_limit = None;
        self.highlighted = None;
        tracing::debug!(model = %self.logical_root.name, "switched data model");
        Ok(())
    }

    fn reset_to_root(&mut self) {
        self.focus = NodePath::root();
        self.breadcrumb = vec![self.logical_root.name.clone()];
        self.highlighted = None;
    }

    /// Invariant check: the breadcrumb must equal the names along the
    /// focus path, and that path must resolve. Used by tests after every
    /// operation.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let names = self
            .logical_root
            .names_along(&self.focus)
            .expect("focus path must resolve");
        assert_eq!(self.breadcrumb, names, "breadcrumb out of sync with focus");
    }
}
