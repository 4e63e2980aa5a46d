//! Error types for hierarchy construction.
//!
//! Only documents that fail basic shape expectations are rejected here.
//! Everything else (empty groups, missing variables) converts cleanly
//! and is handled downstream.

use thiserror::Error;

/// Convenience type for functions that can fail while building a hierarchy.
pub type Result<T> = std::result::Result<T, HierarchyError>;

/// Things that can go wrong when converting a document into a tree.
#[derive(Error, Debug)]
pub enum HierarchyError {
    /// The document (or a nested group) has no usable label. The label is
    /// the display identity of a node, so there is nothing to render.
    #[error("document element has no label{0}")]
    MissingLabel(MissingLabelContext),

    /// The document could not be decoded at all.
    #[error("malformed data model document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Where a missing label was encountered, for actionable messages.
#[derive(Debug, Default)]
pub struct MissingLabelContext(pub Option<String>);

impl std::fmt::Display for MissingLabelContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(parent) => write!(f, " (inside group '{}')", parent),
            None => write!(f, " (document root)"),
        }
    }
}

impl HierarchyError {
    /// Creates a missing-label error for the document root.
    pub fn missing_root_label() -> Self {
        Self::MissingLabel(MissingLabelContext(None))
    }

    /// Creates a missing-label error for a nested group.
    pub fn missing_label_in(parent: impl Into<String>) -> Self {
        Self::MissingLabel(MissingLabelContext(Some(parent.into())))
    }
}
