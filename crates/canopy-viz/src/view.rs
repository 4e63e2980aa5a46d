//! View-side state layered on top of a static layout.
//!
//! The viewport is a pure transform (pan offset + clamped zoom) between
//! world coordinates produced by a layout pass and screen coordinates;
//! changing it never re-runs layout. Transitions interpolate node
//! positions between two passes and carry a generation counter so a
//! completion from a superseded pass can never touch current state.

use crate::layout::{Layout, LayoutNode};
use canopy_core::{NodePath, TreeNode};
use std::collections::HashMap;

/// Zoom limits for the continuous pan-and-zoom view.
pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 2.0;

/// Pan/zoom transform between world and screen space.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub offset: (f32, f32),
    pub zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: (0.0, 0.0),
            zoom: 1.0,
        }
    }
}

impl Viewport {
    pub fn world_to_screen(&self, world: (f32, f32), center: (f32, f32)) -> (f32, f32) {
        (
            world.0 * self.zoom + self.offset.0 + center.0,
            world.1 * self.zoom + self.offset.1 + center.1,
        )
    }

    pub fn screen_to_world(&self, screen: (f32, f32), center: (f32, f32)) -> (f32, f32) {
        (
            (screen.0 - center.0 - self.offset.0) / self.zoom,
            (screen.1 - center.1 - self.offset.1) / self.zoom,
        )
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.offset.0 += dx;
        self.offset.1 += dy;
    }

    /// Scales around `cursor` (screen space) so the point under the
    /// pointer stays put. The zoom factor is clamped to the allowed range.
    pub fn zoom_by(&mut self, factor: f32, cursor: (f32, f32), center: (f32, f32)) {
        let anchor = self.screen_to_world(cursor, center);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let after = self.world_to_screen(anchor, center);
        self.offset.0 += cursor.0 - after.0;
        self.offset.1 += cursor.1 - after.1;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Animated interpolation between two layout passes.
///
/// Each call to [`TransitionState::begin`] supersedes whatever was in
/// flight: the generation advances and any completion tagged with an
/// older generation is ignored. This is what keeps a model switch from
/// letting a stale animation callback mutate the new view.
#[derive(Debug, Default)]
pub struct TransitionState {
    generation: u64,
    active: Option<ActiveTransition>,
}

#[derive(Debug)]
struct ActiveTransition {
    from: HashMap<NodePath, (f32, f32)>,
    progress: f32,
    duration: f32,
}

impl TransitionState {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Starts a transition away from `previous`, superseding any active
    /// one. Returns the new generation tag.
    pub fn begin(&mut self, previous: &Layout, duration: f32) -> u64 {
        self.generation += 1;
        let from = previous
            .nodes
            .iter()
            .map(|n| (n.path.clone(), (n.x, n.y)))
            .collect();
        self.active = Some(ActiveTransition {
            from,
            progress: 0.0,
            duration: duration.max(f32::EPSILON),
        });
        tracing::debug!(generation = self.generation, "render transition started");
        self.generation
    }

    /// Advances the clock. Returns true while an animation is running.
    pub fn advance(&mut self, dt: f32) -> bool {
        let Some(active) = &mut self.active else {
            return false;
        };
        active.progress = (active.progress + dt / active.duration).min(1.0);
        if active.progress >= 1.0 {
            self.active = None;
            return false;
        }
        true
    }

    /// Where to draw `node` right now: its target position, or a point on
    /// the way there while a transition is running.
    pub fn position_of(&self, node: &LayoutNode) -> (f32, f32) {
        match &self.active {
            Some(active) => match active.from.get(&node.path) {
                Some(&(fx, fy)) => {
                    let t = ease(active.progress);
                    (fx + (node.x - fx) * t, fy + (node.y - fy) * t)
                }
                // Nodes new to this pass appear in place.
                None => (node.x, node.y),
            },
            None => (node.x, node.y),
        }
    }

    /// Marks the pass tagged `generation` as finished. A stale tag is
    /// ignored and reported as such.
    pub fn finish(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            tracing::debug!(
                stale = generation,
                current = self.generation,
                "ignoring completion from superseded render pass"
            );
            return false;
        }
        self.active = None;
        true
    }
}

fn ease(t: f32) -> f32 {
    // Smoothstep.
    t * t * (3.0 - 2.0 * t)
}

/// Tooltip content for a node, shared by every layout strategy.
///
/// First line is the name, second the kind summary, then the attribute
/// pairs in their canonical order.
pub fn tooltip_lines(node: &TreeNode) -> Vec<String> {
    let mut lines = vec![node.name.clone()];

    if node.is_group() {
        let count = node.variable_count.unwrap_or(0);
        let noun = if count == 1 { "variable" } else { "variables" };
        lines.push(format!("group, {} {}", count, noun));
    } else {
        lines.push("variable".to_string());
    }

    if let Some(code) = &node.code {
        lines.push(format!("Code: {}", code));
    }
    if let Some(attributes) = &node.attributes {
        for (label, value) in attributes.pairs() {
            lines.push(format!("{}: {}", label, value));
        }
    }
    lines
}
