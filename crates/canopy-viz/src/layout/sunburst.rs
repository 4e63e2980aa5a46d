//! Radial sunburst layout.
//!
//! The subtree root sits at the center; each depth level forms a ring and
//! every node covers an angular span proportional to its leaf weight
//! within its parent's span. Arc geometry goes into the node shape; the
//! anchor is the arc centroid so hit-testing and labels work the same as
//! in the other strategies.

use super::{
    assemble, leaf_weight, visible_nodes, Layout, LayoutOptions, LayoutStrategy, NodeShape,
    VisibleNode,
};
use canopy_core::{NodePath, TreeNode};
use std::f32::consts::TAU;

#[derive(Debug, Default, Clone, Copy)]
pub struct SunburstLayout;

impl LayoutStrategy for SunburstLayout {
    fn name(&self) -> &'static str {
        "Sunburst"
    }

    fn layout(&self, subtree: &TreeNode, origin: &NodePath, options: &LayoutOptions) -> Layout {
        let arena = visible_nodes(subtree, origin, options.depth_limit);
        let ring = options.level_spacing;

        let mut positions = vec![(0.0, 0.0); arena.len()];
        let mut shapes = vec![NodeShape::Dot; arena.len()];

        // Center circle for the subtree root, arcs for everything below.
        shapes[0] = NodeShape::Circle { radius: ring * 0.4 };
        spread(&arena, 0, 0.0, TAU, ring, &mut positions, &mut shapes);

        assemble(&arena, &positions, shapes, false)
    }
}

/// Distributes `[start, end)` among the children of `index` by weight.
fn spread(
    arena: &[VisibleNode<'_>],
    index: usize,
    start: f32,
    end: f32,
    ring: f32,
    positions: &mut [(f32, f32)],
    shapes: &mut [NodeShape],
) {
    let visible = &arena[index];
    let total: f32 = visible
        .children
        .iter()
        .map(|&c| leaf_weight(arena[c].node))
        .sum();
    if total <= 0.0 {
        return;
    }

    let span = end - start;
    let mut angle = start;
    for &child in &visible.children {
        let child_visible = &arena[child];
        let child_span = span * leaf_weight(child_visible.node) / total;
        let (child_start, child_end) = (angle, angle + child_span);
        angle = child_end;

        let inner = child_visible.depth as f32 * ring;
        let outer = inner + ring;
        shapes[child] = NodeShape::Arc {
            start_angle: child_start,
            end_angle: child_end,
            inner_radius: inner,
            outer_radius: outer,
        };

        let mid_angle = (child_start + child_end) / 2.0;
        let mid_radius = (inner + outer) / 2.0;
        // Angles run clockwise from 12 o'clock.
        positions[child] = (mid_radius * mid_angle.sin(), -mid_radius * mid_angle.cos());

        spread(arena, child, child_start, child_end, ring, positions, shapes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::sample_tree;
    use canopy_core::NodePath;

    fn sample_layout() -> Layout {
        SunburstLayout.layout(&sample_tree(), &NodePath::root(), &LayoutOptions::default())
    }

    fn arc(layout: &Layout, name: &str) -> (f32, f32, f32, f32) {
        let node = layout.nodes.iter().find(|n| n.name == name).unwrap();
        match node.shape {
            NodeShape::Arc {
                start_angle,
                end_angle,
                inner_radius,
                outer_radius,
            } => (start_angle, end_angle, inner_radius, outer_radius),
            _ => panic!("{} is not an arc", name),
        }
    }

    #[test]
    fn test_root_is_center_circle() {
        let layout = sample_layout();
        let root = &layout.nodes[0];
        assert!(matches!(root.shape, NodeShape::Circle { .. }));
        assert_eq!((root.x, root.y), (0.0, 0.0));
    }

    #[test]
    fn test_top_level_spans_partition_full_circle() {
        let layout = sample_layout();
        // Root has 4 leaves: G1 carries 3, V3 carries 1.
        let (g1_start, g1_end, ..) = arc(&layout, "G1");
        let (v3_start, v3_end, ..) = arc(&layout, "V3");

        assert!((g1_start - 0.0).abs() < 1e-4);
        assert!(((g1_end - g1_start) - TAU * 0.75).abs() < 1e-4);
        assert!((v3_start - g1_end).abs() < 1e-4);
        assert!((v3_end - TAU).abs() < 1e-4);
    }

    #[test]
    fn test_children_nest_inside_parent_span() {
        let layout = sample_layout();
        let (g1_start, g1_end, g1_inner, g1_outer) = arc(&layout, "G1");
        for name in ["G2", "V1", "V2"] {
            let (start, end, inner, _) = arc(&layout, name);
            assert!(start >= g1_start - 1e-4 && end <= g1_end + 1e-4);
            assert!((inner - g1_outer).abs() < 1e-4);
            assert!(inner > g1_inner);
        }
    }

    #[test]
    fn test_rings_follow_depth() {
        let layout = sample_layout();
        let ring = LayoutOptions::default().level_spacing;
        for node in layout.nodes.iter().skip(1) {
            let (_, _, inner, outer) = match node.shape {
                NodeShape::Arc {
                    start_angle,
                    end_angle,
                    inner_radius,
                    outer_radius,
                } => (start_angle, end_angle, inner_radius, outer_radius),
                _ => continue,
            };
            assert_eq!(inner, node.depth as f32 * ring);
            assert_eq!(outer, inner + ring);
        }
    }

    #[test]
    fn test_deterministic() {
        let a = sample_layout();
        let b = sample_layout();
        for (left, right) in a.nodes.iter().zip(&b.nodes) {
            assert_eq!((left.x, left.y), (right.x, right.y));
            assert_eq!(left.shape, right.shape);
        }
    }
}
