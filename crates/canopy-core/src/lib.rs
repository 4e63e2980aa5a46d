//! Canopy Core - data model documents and hierarchy construction
//!
//! This crate provides the foundational types for Canopy. It converts raw
//! data-model documents (nested groups and variables, as served by the
//! catalog backend) into a canonical tree with derived aggregate counts,
//! and builds a flat search index over that tree.
//!
//! # Example
//!
//! ```no_run
//! use canopy_core::{build_hierarchy, DataModel};
//!
//! let json = std::fs::read_to_string("dementia_v0.5.json").unwrap();
//! let model: DataModel = serde_json::from_str(&json).unwrap();
//! let root = build_hierarchy(&model).unwrap();
//! println!("{}: {} variables", root.name, root.variable_count.unwrap_or(0));
//! ```

pub mod document;
pub mod error;
pub mod hierarchy;
pub mod search;
pub mod select;

pub use document::{DataModel, Enumeration, Federation, Group, Variable, VariableAttributes};
pub use error::{HierarchyError, Result};
pub use hierarchy::{build_hierarchy, NodeKind, NodePath, TreeNode};
pub use search::{SearchEntry, SearchIndex, SearchKind};
pub use select::{categorize, compare_versions, pick_selection, Categorized};
