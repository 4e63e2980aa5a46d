//! Layout strategies over a focus subtree.
//!
//! Every strategy implements the same contract: given a subtree of the
//! canonical tree and layout options, produce an ephemeral list of
//! positioned nodes plus edges and a bounding box. The output is rebuilt
//! from scratch on every pass and never mutated in place, so a re-render
//! can never observe stale positions.
//!
//! Depth limiting happens during traversal, on a shared pruned view; the
//! canonical tree is never modified. All three strategies share that
//! traversal, which also fixes the sibling visit order: ascending lexical
//! by name, ties broken by child index so duplicate labels stay stable.

mod pack;
mod sunburst;
mod tidy;

pub use pack::CirclePackingLayout;
pub use sunburst::SunburstLayout;
pub use tidy::TidyTreeLayout;

use canopy_core::{NodeKind, NodePath, TreeNode};

/// Parameters for one layout pass.
#[derive(Debug, Clone)]
pub struct LayoutOptions {
    /// Spacing between adjacent leaves along the breadth axis.
    pub node_spacing: f32,

    /// Spacing between consecutive depth levels (ring thickness for the
    /// radial strategies).
    pub level_spacing: f32,

    /// Maximum depth rendered below the subtree root; `None` shows all.
    pub depth_limit: Option<usize>,

    /// Whether the view transform on top of this layout may zoom.
    pub zoom_enabled: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            node_spacing: 14.0,
            level_spacing: 180.0,
            depth_limit: None,
            zoom_enabled: false,
        }
    }
}

/// Geometry a node is drawn with. The anchor point in [`LayoutNode`] is
/// the hit-test and label position for every shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeShape {
    /// A plain marker at the anchor (tidy tree).
    Dot,
    /// An annular sector; angles in radians from 12 o'clock, clockwise.
    Arc {
        start_angle: f32,
        end_angle: f32,
        inner_radius: f32,
        outer_radius: f32,
    },
    /// A circle centered on the anchor.
    Circle { radius: f32 },
}

/// One positioned node, valid for a single render pass.
#[derive(Debug, Clone)]
pub struct LayoutNode {
    /// Address of the underlying node in the canonical tree.
    pub path: NodePath,

    pub name: String,

    pub kind: NodeKind,

    /// Depth relative to the laid-out subtree root.
    pub depth: usize,

    /// Anchor position in world coordinates.
    pub x: f32,
    pub y: f32,

    /// Whether the underlying node has children at all.
    pub has_children: bool,

    /// Whether this node has descendants hidden by the depth limit, so the
    /// view can mark where more detail exists.
    pub has_hidden_children: bool,

    pub shape: NodeShape,
}

/// An edge between two nodes, as indices into the layout's node list.
#[derive(Debug, Clone, Copy)]
pub struct LayoutEdge {
    pub from: usize,
    pub to: usize,
}

/// Axis-aligned bounding box of a layout, in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

/// Padding added around the content on every side.
const BOUNDS_PADDING: f32 = 40.0;

/// Minimum extent per axis so a single-node layout still yields a usable
/// view window.
const MIN_EXTENT: f32 = 120.0;

impl Bounds {
    fn collecting() -> Self {
        Self {
            min_x: f32::INFINITY,
            min_y: f32::INFINITY,
            max_x: f32::NEG_INFINITY,
            max_y: f32::NEG_INFINITY,
        }
    }

    fn include(&mut self, x: f32, y: f32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    /// Final, non-degenerate box: padded, floored to the minimum extent,
    /// and finite even when nothing was included.
    fn finish(mut self) -> Self {
        if !self.min_x.is_finite() {
            self = Self {
                min_x: 0.0,
                min_y: 0.0,
                max_x: 0.0,
                max_y: 0.0,
            };
        }
        self.min_x -= BOUNDS_PADDING;
        self.min_y -= BOUNDS_PADDING;
        self.max_x += BOUNDS_PADDING;
        self.max_y += BOUNDS_PADDING;

        let grow_x = (MIN_EXTENT - self.width()).max(0.0) / 2.0;
        let grow_y = (MIN_EXTENT - self.height()).max(0.0) / 2.0;
        self.min_x -= grow_x;
        self.max_x += grow_x;
        self.min_y -= grow_y;
        self.max_y += grow_y;
        self
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> (f32, f32) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

/// The positioned output of one layout pass.
#[derive(Debug, Clone)]
pub struct Layout {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
    pub bounds: Bounds,
}

impl Layout {
    /// Index of the node addressing `path`, if it is in this layout.
    pub fn find(&self, path: &NodePath) -> Option<usize> {
        self.nodes.iter().position(|n| &n.path == path)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A layout algorithm over the shared node/edge contract.
pub trait LayoutStrategy {
    /// Human-readable strategy name for selectors and logs.
    fn name(&self) -> &'static str;

    /// Lays out `subtree`, whose address in the canonical tree is
    /// `origin`. Pure: identical inputs yield identical output.
    fn layout(&self, subtree: &TreeNode, origin: &NodePath, options: &LayoutOptions) -> Layout;
}

/// One node of the depth-pruned traversal shared by all strategies.
pub(crate) struct VisibleNode<'a> {
    pub node: &'a TreeNode,
    /// Absolute path in the canonical tree.
    pub path: NodePath,
    /// Depth relative to the subtree root.
    pub depth: usize,
    pub parent: Option<usize>,
    /// Children as indices into the arena, in visit order.
    pub children: Vec<usize>,
    pub has_hidden_children: bool,
}

/// Flattens the subtree into a pre-order arena, pruning below the depth
/// limit without touching the canonical tree.
pub(crate) fn visible_nodes<'a>(
    subtree: &'a TreeNode,
    origin: &NodePath,
    depth_limit: Option<usize>,
) -> Vec<VisibleNode<'a>> {
    let mut arena = Vec::new();
    collect(subtree, origin.clone(), 0, None, depth_limit, &mut arena);
    arena
}

fn collect<'a>(
    node: &'a TreeNode,
    path: NodePath,
    depth: usize,
    parent: Option<usize>,
    depth_limit: Option<usize>,
    arena: &mut Vec<VisibleNode<'a>>,
) -> usize {
    let at_limit = depth_limit.is_some_and(|limit| depth >= limit);
    let index = arena.len();
    arena.push(VisibleNode {
        node,
        path: path.clone(),
        depth,
        parent,
        children: Vec::new(),
        has_hidden_children: at_limit && node.has_children(),
    });

    if at_limit {
        return index;
    }

    // Deterministic visit order: ascending name, child index as tie-break.
    let mut order: Vec<usize> = (0..node.children.len()).collect();
    order.sort_by(|&a, &b| {
        node.children[a]
            .name
            .cmp(&node.children[b].name)
            .then(a.cmp(&b))
    });

    let mut child_indices = Vec::with_capacity(order.len());
    for child_pos in order {
        let child = &node.children[child_pos];
        let child_index = collect(
            child,
            path.child(child_pos),
            depth + 1,
            Some(index),
            depth_limit,
            arena,
        );
        child_indices.push(child_index);
    }
    arena[index].children = child_indices;
    index
}

/// Weight used by the radial strategies: the number of variable leaves a
/// node stands for, floored at one so empty groups stay visible.
pub(crate) fn leaf_weight(node: &TreeNode) -> f32 {
    match node.kind {
        NodeKind::Variable => 1.0,
        NodeKind::Group => node.variable_count.unwrap_or(0).max(1) as f32,
    }
}

/// Builds the final layout from an arena and per-node anchors/shapes.
pub(crate) fn assemble(
    arena: &[VisibleNode<'_>],
    positions: &[(f32, f32)],
    shapes: Vec<NodeShape>,
    with_edges: bool,
) -> Layout {
    let mut bounds = Bounds::collecting();
    let mut nodes = Vec::with_capacity(arena.len());
    let mut edges = Vec::new();

    for (index, visible) in arena.iter().enumerate() {
        let (x, y) = positions[index];
        bounds.include(x, y);
        if let NodeShape::Circle { radius } = shapes[index] {
            bounds.include(x - radius, y - radius);
            bounds.include(x + radius, y + radius);
        }
        if let NodeShape::Arc { outer_radius, .. } = shapes[index] {
            // Radial layouts are centered on the origin.
            bounds.include(-outer_radius, -outer_radius);
            bounds.include(outer_radius, outer_radius);
        }

        nodes.push(LayoutNode {
            path: visible.path.clone(),
            name: visible.node.name.clone(),
            kind: visible.node.kind,
            depth: visible.depth,
            x,
            y,
            has_children: visible.node.has_children(),
            has_hidden_children: visible.has_hidden_children,
            shape: shapes[index],
        });

        if with_edges {
            if let Some(parent) = visible.parent {
                edges.push(LayoutEdge {
                    from: parent,
                    to: index,
                });
            }
        }
    }

    Layout {
        nodes,
        edges,
        bounds: bounds.finish(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::sample_tree;

    #[test]
    fn test_visible_nodes_sorted_by_name() {
        let tree = sample_tree();
        let arena = visible_nodes(&tree, &NodePath::root(), None);

        // Pre-order with name-sorted siblings: Root, G1, G2, W1, V1, V2, V3.
        let names: Vec<&str> = arena.iter().map(|v| v.node.name.as_str()).collect();
        assert_eq!(names, ["Root", "G1", "G2", "W1", "V1", "V2", "V3"]);

        // Paths stay structural (document order), not visit order.
        assert_eq!(arena[1].path, NodePath::from_indices(vec![1]));
        assert_eq!(arena[6].path, NodePath::from_indices(vec![0]));
    }

    #[test]
    fn test_depth_limit_prunes_and_marks_hidden() {
        let tree = sample_tree();
        let arena = visible_nodes(&tree, &NodePath::root(), Some(1));

        let names: Vec<&str> = arena.iter().map(|v| v.node.name.as_str()).collect();
        assert_eq!(names, ["Root", "G1", "V3"]);

        let g1 = &arena[1];
        assert!(g1.has_hidden_children);
        assert!(g1.children.is_empty());

        // The canonical tree is untouched.
        assert_eq!(tree.at(&NodePath::from_indices(vec![1])).unwrap().children.len(), 3);
    }

    #[test]
    fn test_origin_offsets_paths() {
        let tree = sample_tree();
        let origin = NodePath::from_indices(vec![1]);
        let g1 = tree.at(&origin).unwrap();
        let arena = visible_nodes(g1, &origin, None);

        assert_eq!(arena[0].path, origin);
        assert_eq!(arena[0].depth, 0);
        // G2 is child index 2 of G1 in document order.
        let g2 = arena.iter().find(|v| v.node.name == "G2").unwrap();
        assert_eq!(g2.path, NodePath::from_indices(vec![1, 2]));
    }

    #[test]
    fn test_bounds_floor_for_single_point() {
        let mut bounds = Bounds::collecting();
        bounds.include(5.0, 5.0);
        let done = bounds.finish();
        assert!(done.width() >= MIN_EXTENT);
        assert!(done.height() >= MIN_EXTENT);
        assert!(done.min_x.is_finite() && done.max_y.is_finite());
    }

    #[test]
    fn test_bounds_finite_without_points() {
        let done = Bounds::collecting().finish();
        assert!(done.width() > 0.0 && done.width().is_finite());
    }
}
