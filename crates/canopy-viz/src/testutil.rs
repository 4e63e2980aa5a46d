//! Shared fixtures for the crate's tests.

use canopy_core::{build_hierarchy, DataModel, Group, TreeNode, Variable};
use uuid::Uuid;

pub(crate) fn var(label: &str) -> Variable {
    Variable {
        label: label.to_string(),
        ..Default::default()
    }
}

pub(crate) fn group(label: &str, variables: Vec<Variable>, groups: Vec<Group>) -> Group {
    Group {
        label: label.to_string(),
        code: None,
        variables,
        groups,
    }
}

pub(crate) fn model(label: &str, variables: Vec<Variable>, groups: Vec<Group>) -> DataModel {
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

/// Root with one direct variable and a nested group chain:
/// Root { V3, G1 { V1, V2, G2 { W1 } } }.
pub(crate) fn sample_tree() -> TreeNode {
    let doc = model(
        "Root",
        vec![var("V3")],
        vec![group(
            "G1",
            vec![var("V1"), var("V2")],
            vec![group("G2", vec![var("W1")], vec![])],
        )],
    );
    build_hierarchy(&doc).unwrap()
}
