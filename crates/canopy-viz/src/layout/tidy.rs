//! Cluster-style tidy tree, the canonical layout.
//!
//! Horizontal orientation: depth grows along x, siblings spread along y.
//! Leaves of the pruned view get consecutive breadth slots with fixed
//! spacing; each interior node is centered between its first and last
//! child, which is what keeps the tree tidy.

use super::{assemble, visible_nodes, Layout, LayoutOptions, LayoutStrategy, NodeShape, VisibleNode};
use canopy_core::{NodePath, TreeNode};

#[derive(Debug, Default, Clone, Copy)]
pub struct TidyTreeLayout;

impl LayoutStrategy for TidyTreeLayout {
    fn name(&self) -> &'static str {
        "Tidy tree"
    }

    fn layout(&self, subtree: &TreeNode, origin: &NodePath, options: &LayoutOptions) -> Layout {
        let arena = visible_nodes(subtree, origin, options.depth_limit);
        let mut positions = vec![(0.0, 0.0); arena.len()];
        let mut cursor = 0.0;
        place(&arena, 0, &mut cursor, &mut positions, options);

        let shapes = vec![NodeShape::Dot; arena.len()];
        assemble(&arena, &positions, shapes, true)
    }
}

/// Assigns positions bottom-up and returns the node's breadth coordinate.
fn place(
    arena: &[VisibleNode<'_>],
    index: usize,
    cursor: &mut f32,
    positions: &mut [(f32, f32)],
    options: &LayoutOptions,
) -> f32 {
    let visible = &arena[index];
    let x = visible.depth as f32 * options.level_spacing;

    let y = if visible.children.is_empty() {
        let slot = *cursor;
        *cursor += options.node_spacing;
        slot
    } else {
        let mut first = 0.0;
        let mut last = 0.0;
        for (position, &child) in visible.children.iter().enumerate() {
            let child_y = place(arena, child, cursor, positions, options);
            if position == 0 {
                first = child_y;
            }
            last = child_y;
        }
        (first + last) / 2.0
    };

    positions[index] = (x, y);
    y
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::sample_tree;
    use canopy_core::NodePath;

    fn layout_with(depth_limit: Option<usize>) -> Layout {
        let tree = sample_tree();
        let options = LayoutOptions {
            depth_limit,
            ..Default::default()
        };
        TidyTreeLayout.layout(&tree, &NodePath::root(), &options)
    }

    #[test]
    fn test_depth_maps_to_x_axis() {
        let layout = layout_with(None);
        for node in &layout.nodes {
            assert_eq!(node.x, node.depth as f32 * LayoutOptions::default().level_spacing);
        }
    }

    #[test]
    fn test_leaves_get_consecutive_slots() {
        let layout = layout_with(None);
        let spacing = LayoutOptions::default().node_spacing;

        let mut leaf_ys: Vec<f32> = layout
            .nodes
            .iter()
            .filter(|n| !n.has_children)
            .map(|n| n.y)
            .collect();
        leaf_ys.sort_by(|a, b| a.partial_cmp(b).unwrap());
        for pair in leaf_ys.windows(2) {
            assert!((pair[1] - pair[0] - spacing).abs() < 1e-4);
        }
    }

    #[test]
    fn test_parent_centered_between_first_and_last_child() {
        let layout = layout_with(None);
        let root = &layout.nodes[layout.find(&NodePath::root()).unwrap()];

        let child_ys: Vec<f32> = layout
            .edges
            .iter()
            .filter(|e| layout.nodes[e.from].path == NodePath::root())
            .map(|e| layout.nodes[e.to].y)
            .collect();
        let min = child_ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = child_ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        assert!((root.y - (min + max) / 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_layout_is_deterministic() {
        let a = layout_with(Some(1));
        let b = layout_with(Some(1));
        assert_eq!(a.nodes.len(), b.nodes.len());
        for (left, right) in a.nodes.iter().zip(&b.nodes) {
            assert_eq!(left.path, right.path);
            assert_eq!((left.x, left.y), (right.x, right.y));
        }
    }

    #[test]
    fn test_depth_limit_excludes_grandchildren() {
        let layout = layout_with(Some(1));
        assert!(layout.nodes.iter().all(|n| n.depth <= 1));
        let g1 = layout
            .nodes
            .iter()
            .find(|n| n.name == "G1")
            .unwrap();
        assert!(g1.has_hidden_children);
    }

    #[test]
    fn test_edges_connect_every_non_root_node() {
        let layout = layout_with(None);
        assert_eq!(layout.edges.len(), layout.nodes.len() - 1);
        for edge in &layout.edges {
            let parent = &layout.nodes[edge.from];
            let child = &layout.nodes[edge.to];
            assert!(parent.path.is_ancestor_of(&child.path));
            assert_eq!(child.depth, parent.depth + 1);
        }
    }

    #[test]
    fn test_single_node_subtree_has_usable_bounds() {
        let tree = sample_tree();
        // W1 is a leaf; lay out just that subtree.
        let path = tree.find_by_name("W1").unwrap();
        let leaf = tree.at(&path).unwrap();
        let layout = TidyTreeLayout.layout(leaf, &path, &LayoutOptions::default());

        assert_eq!(layout.nodes.len(), 1);
        assert!(layout.bounds.width() > 0.0);
        assert!(layout.bounds.height() > 0.0);
        assert!(layout.bounds.width().is_finite());
    }
}
