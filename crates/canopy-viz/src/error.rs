//! Error types for navigation.
//!
//! All of these are recoverable: the owning view surfaces a message and
//! falls back to a safe state instead of crashing the page.

use canopy_core::NodePath;
use thiserror::Error;

/// Convenience type for navigation operations.
pub type Result<T> = std::result::Result<T, NavError>;

/// Things that can go wrong while navigating a hierarchy.
#[derive(Error, Debug)]
pub enum NavError {
    /// The model has no variables and no groups; there is nothing to show.
    /// The view renders an explicit empty state for this.
    #[error("data model has no variables or groups to visualize")]
    EmptyHierarchy,

    /// A re-root target is not reachable from the logical root. Internal
    /// invariants should make this impossible; it is checked anyway.
    #[error("node at {0} is not reachable from the logical root")]
    PathNotFound(NodePath),

    /// The breadcrumb references a name that is no longer present, e.g.
    /// after the underlying data changed. The state has already been reset
    /// to the logical root when this is returned.
    #[error("navigation state no longer matches the loaded model")]
    StaleNavigation,

    /// A search or jump target does not exist in the current model.
    #[error("no item named '{0}' in the current model")]
    NodeNotFound(String),
}
