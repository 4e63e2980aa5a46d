//! Nested circle-packing layout.
//!
//! Every group is a circle; its children sit inside it, placed on a
//! single interior ring in visit order, sized by the square root of their
//! leaf weight so area tracks variable count. Placement is deterministic:
//! no simulation, no randomness.

use super::{
    assemble, leaf_weight, visible_nodes, Layout, LayoutOptions, LayoutStrategy, NodeShape,
    VisibleNode,
};
use canopy_core::{NodePath, TreeNode};
use std::f32::consts::TAU;

/// Radius of the outermost circle, in world units.
const ROOT_RADIUS: f32 = 320.0;

/// Fraction of the parent radius the child ring sits on.
const RING_FRACTION: f32 = 0.58;

/// Hard cap on a child radius relative to its parent.
const MAX_CHILD_FRACTION: f32 = 0.38;

#[derive(Debug, Default, Clone, Copy)]
pub struct CirclePackingLayout;

impl LayoutStrategy for CirclePackingLayout {
    fn name(&self) -> &'static str {
        "Circle packing"
    }

    fn layout(&self, subtree: &TreeNode, origin: &NodePath, options: &LayoutOptions) -> Layout {
        let arena = visible_nodes(subtree, origin, options.depth_limit);

        let mut positions = vec![(0.0, 0.0); arena.len()];
        let mut shapes = vec![NodeShape::Dot; arena.len()];

        shapes[0] = NodeShape::Circle {
            radius: ROOT_RADIUS,
        };
        nest(&arena, 0, 0.0, 0.0, ROOT_RADIUS, &mut positions, &mut shapes);

        assemble(&arena, &positions, shapes, false)
    }
}

/// Places the children of `index` inside its circle.
fn nest(
    arena: &[VisibleNode<'_>],
    index: usize,
    cx: f32,
    cy: f32,
    radius: f32,
    positions: &mut [(f32, f32)],
    shapes: &mut [NodeShape],
) {
    positions[index] = (cx, cy);

    let children = &arena[index].children;
    if children.is_empty() {
        return;
    }

    let max_weight = children
        .iter()
        .map(|&c| leaf_weight(arena[c].node))
        .fold(0.0_f32, f32::max)
        .max(1.0);

    if children.len() == 1 {
        let child = children[0];
        let child_radius = radius * 0.6;
        shapes[child] = NodeShape::Circle {
            radius: child_radius,
        };
        nest(arena, child, cx, cy, child_radius, positions, shapes);
        return;
    }

    // All children share one ring; the slot count bounds their size so
    // neighbors cannot overlap and every child stays inside the parent.
    let count = children.len() as f32;
    let ring = radius * RING_FRACTION;
    let slot_limit = ring * (TAU / count / 2.0).sin();
    let base = slot_limit.min(radius * MAX_CHILD_FRACTION);

    for (slot, &child) in children.iter().enumerate() {
        let weight = leaf_weight(arena[child].node);
        let child_radius = base * (weight / max_weight).sqrt().max(0.35);

        let angle = TAU * slot as f32 / count;
        let (x, y) = (cx + ring * angle.sin(), cy - ring * angle.cos());

        shapes[child] = NodeShape::Circle {
            radius: child_radius,
        };
        nest(arena, child, x, y, child_radius, positions, shapes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::sample_tree;
    use canopy_core::NodePath;

    fn sample_layout() -> Layout {
        CirclePackingLayout.layout(&sample_tree(), &NodePath::root(), &LayoutOptions::default())
    }

    fn circle(layout: &Layout, name: &str) -> (f32, f32, f32) {
        let node = layout.nodes.iter().find(|n| n.name == name).unwrap();
        match node.shape {
            NodeShape::Circle { radius } => (node.x, node.y, radius),
            _ => panic!("{} is not a circle", name),
        }
    }

    #[test]
    fn test_every_node_is_a_circle() {
        let layout = sample_layout();
        assert!(layout
            .nodes
            .iter()
            .all(|n| matches!(n.shape, NodeShape::Circle { .. })));
    }

    #[test]
    fn test_children_contained_in_parent() {
        let layout = sample_layout();
        let (px, py, pr) = circle(&layout, "Root");
        for name in ["G1", "V3"] {
            let (x, y, r) = circle(&layout, name);
            let dist = ((x - px).powi(2) + (y - py).powi(2)).sqrt();
            assert!(
                dist + r <= pr + 1e-3,
                "{} escapes its parent: {} + {} > {}",
                name,
                dist,
                r,
                pr
            );
        }
    }

    #[test]
    fn test_siblings_do_not_overlap() {
        let layout = sample_layout();
        let names = ["G2", "V1", "V2"];
        for (i, a) in names.iter().enumerate() {
            for b in names.iter().skip(i + 1) {
                let (ax, ay, ar) = circle(&layout, a);
                let (bx, by, br) = circle(&layout, b);
                let dist = ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt();
                assert!(dist + 1e-3 >= ar + br, "{} overlaps {}", a, b);
            }
        }
    }

    #[test]
    fn test_heavier_sibling_gets_larger_circle() {
        let layout = sample_layout();
        // G1 carries three variables, V3 one.
        let (.., g1_r) = circle(&layout, "G1");
        let (.., v3_r) = circle(&layout, "V3");
        assert!(g1_r > v3_r);
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
