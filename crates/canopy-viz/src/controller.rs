//! Render-agnostic interaction handling.
//!
//! The controller owns the navigation state, the active layout strategy,
//! and the viewport for one visualization session. A front-end translates
//! raw pointer/widget input into [`ViewEvent`]s, calls
//! [`ViewerController::handle`], and reacts to the returned
//! [`ViewerOutput`]s (details panel update, breadcrumb display, depth
//! selector refresh, user-visible notices). Layout is recomputed only
//! when navigation state actually changed; hover never causes a relayout.

use crate::error::{NavError, Result};
use crate::layout::{Layout, LayoutOptions, LayoutStrategy};
use crate::navigation::NavigationState;
use crate::view::Viewport;
use canopy_core::{NodePath, TreeNode};

/// Abstract input events the controller understands.
#[derive(Debug, Clone)]
pub enum ViewEvent {
    /// Single click: select the node and notify collaborators.
    Click(NodePath),
    /// Double click: re-root the view on a group node.
    DoubleClick(NodePath),
    /// Pointer moved over a node, or off all nodes.
    Hover(Option<NodePath>),
    /// A breadcrumb segment was clicked.
    BreadcrumbClick(usize),
    /// A search suggestion was chosen.
    SearchSelect(String),
    /// The depth-limit selector changed.
    DepthChange(Option<usize>),
    /// The zoom toggle changed.
    ZoomToggle(bool),
}

/// What the surrounding UI must react to after an event.
#[derive(Debug, Clone)]
pub enum ViewerOutput {
    /// A node was selected; carries the full node including attributes.
    NodeSelected(TreeNode),
    /// The breadcrumb changed; carries the new display path.
    BreadcrumbChanged(Vec<String>),
    /// The focus subtree changed; carries its maximum useful depth so the
    /// UI can offer matching depth-limit choices.
    DepthOptionsChanged(usize),
    /// A recoverable problem the user should see. The state is already
    /// safe when this is emitted.
    Notice(String),
}

/// One visualization session: state, strategy, viewport.
pub struct ViewerController {
    nav: NavigationState,
    strategy: Box<dyn LayoutStrategy>,
    options: LayoutOptions,
    viewport: Viewport,
    layout: Layout,
    hovered: Option<NodePath>,
    selected: Option<NodePath>,
    /// Monotonic render pass counter; bumped on every relayout so views
    /// can discard work from superseded passes.
    generation: u64,
}

impl ViewerController {
    /// Starts a session on a built hierarchy.
    pub fn new(
        root: TreeNode,
        strategy: Box<dyn LayoutStrategy>,
        options: LayoutOptions,
    ) -> Result<Self> {
        let nav = NavigationState::new(root)?;
        let mut controller = Self {
            nav,
            strategy,
            options,
            viewport: Viewport::default(),
            layout: Layout {
                nodes: Vec::new(),
                edges: Vec::new(),
                bounds: empty_bounds(),
            },
            hovered: None,
            selected: None,
            generation: 0,
        };
        controller.relayout();
        Ok(controller)
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn nav(&self) -> &NavigationState {
        &self.nav
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn hovered(&self) -> Option<&NodePath> {
        self.hovered.as_ref()
    }

    pub fn selected(&self) -> Option<&NodePath> {
        self.selected.as_ref()
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Swaps the layout strategy; the same subtree is laid out anew.
    pub fn set_strategy(&mut self, strategy: Box<dyn LayoutStrategy>) {
        self.strategy = strategy;
        self.relayout();
    }

    /// Replaces the displayed model. Viewport and selection reset with it.
    pub fn switch_model(&mut self, root: TreeNode) -> Result<Vec<ViewerOutput>> {
        self.nav.switch_model(root)?;
        self.viewport.reset();
        self.hovered = None;
        self.selected = None;
        self.relayout();
        Ok(vec![
            ViewerOutput::BreadcrumbChanged(self.nav.breadcrumb().to_vec()),
            ViewerOutput::DepthOptionsChanged(self.nav.max_useful_depth()),
        ])
    }

    /// Applies one input event and returns what the UI must update.
    pub fn handle(&mut self, event: ViewEvent) -> Vec<ViewerOutput> {
        match event {
            ViewEvent::Click(path) => self.on_click(path),
            ViewEvent::DoubleClick(path) => self.on_double_click(path),
            ViewEvent::Hover(path) => {
                self.hovered = path;
                Vec::new()
            }
            ViewEvent::BreadcrumbClick(index) => self.on_breadcrumb_click(index),
            ViewEvent::SearchSelect(name) => self.on_search_select(&name),
            ViewEvent::DepthChange(limit) => {
                self.nav.set_depth_limit(limit);
                self.relayout();
                Vec::new()
            }
            ViewEvent::ZoomToggle(enabled) => {
                self.options.zoom_enabled = enabled;
                if !enabled {
                    self.viewport.reset();
                }
                Vec::new()
            }
        }
    }

    fn on_click(&mut self, path: NodePath) -> Vec<ViewerOutput> {
        match self.nav.logical_root().at(&path) {
            Some(node) => {
                self.selected = Some(path);
                vec![ViewerOutput::NodeSelected(node.clone())]
            }
            None => vec![ViewerOutput::Notice(
                "Selection is out of date; try again".to_string(),
            )],
        }
    }

    fn on_double_click(&mut self, path: NodePath) -> Vec<ViewerOutput> {
        // Double-clicking the displayed root has nowhere further to go.
        if &path == self.nav.focus_path() {
            return Vec::new();
        }
        let is_group = self
            .nav
            .logical_root()
            .at(&path)
            .is_some_and(|node| node.has_children());
        if !is_group {
            return Vec::new();
        }

        match self.nav.reroot(&path) {
            Ok(()) => {
                self.relayout();
                self.nav_outputs()
            }
            Err(err) => self.recover(err),
        }
    }

    fn on_breadcrumb_click(&mut self, index: usize) -> Vec<ViewerOutput> {
        match self.nav.breadcrumb_click(index) {
            Ok(()) => {
                self.relayout();
                self.nav_outputs()
            }
            Err(err) => self.recover(err),
        }
    }

    fn on_search_select(&mut self, name: &str) -> Vec<ViewerOutput> {
        match self.nav.search_jump(name) {
            Ok(()) => {
                self.relayout();
                self.nav_outputs()
            }
            Err(NavError::NodeNotFound(_)) => {
                // State untouched; just tell the user.
                vec![ViewerOutput::Notice("No matching item found".to_string())]
            }
            Err(err) => self.recover(err),
        }
    }

    /// Outputs after a successful navigation change.
    fn nav_outputs(&self) -> Vec<ViewerOutput> {
        vec![
            ViewerOutput::BreadcrumbChanged(self.nav.breadcrumb().to_vec()),
            ViewerOutput::DepthOptionsChanged(self.nav.max_useful_depth()),
        ]
    }

    /// A navigation operation failed; the state has already fallen back to
    /// a safe configuration. Re-render it and surface a message.
    fn recover(&mut self, err: NavError) -> Vec<ViewerOutput> {
        tracing::warn!(error = %err, "navigation fell back to a safe state");
        self.relayout();
        let mut outputs = self.nav_outputs();
        outputs.push(ViewerOutput::Notice(match err {
            NavError::StaleNavigation => "View reset due to data change".to_string(),
            other => other.to_string(),
        }));
        outputs
    }

    fn relayout(&mut self) {
        let mut options = self.options.clone();
        options.depth_limit = self.nav.depth_limit();
        self.layout = self
            .strategy
            .layout(self.nav.focus_node(), self.nav.focus_path(), &options);
        self.generation += 1;
        tracing::debug!(
            generation = self.generation,
            strategy = self.strategy.name(),
            nodes = self.layout.nodes.len(),
            "layout pass complete"
        );
    }
}

fn empty_bounds() -> crate::layout::Bounds {
    crate::layout::Bounds {
        min_x: 0.0,
        min_y: 0.0,
        max_x: 0.0,
        max_y: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::TidyTreeLayout;
    use crate::testutil::{group, model, sample_tree, var};
    use canopy_core::build_hierarchy;

    fn controller() -> ViewerController {
        ViewerController::new(
            sample_tree(),
            Box::new(TidyTreeLayout),
            LayoutOptions::default(),
        )
        .unwrap()
    }

    fn path_of(c: &ViewerController, name: &str) -> NodePath {
        c.nav().logical_root().find_by_name(name).unwrap()
    }

    fn breadcrumbs(outputs: &[ViewerOutput]) -> Option<Vec<String>> {
        outputs.iter().find_map(|o| match o {
            ViewerOutput::BreadcrumbChanged(path) => Some(path.clone()),
            _ => None,
        })
    }

    #[test]
    fn test_click_selects_and_reports_attributes() {
        let mut c = controller();
        let v1 = path_of(&c, "V1");
        let outputs = c.handle(ViewEvent::Click(v1.clone()));

        assert_eq!(outputs.len(), 1);
        match &outputs[0] {
            ViewerOutput::NodeSelected(node) => {
                assert_eq!(node.name, "V1");
                assert!(node.attributes.is_some());
            }
            other => panic!("unexpected output {:?}", other),
        }
        assert_eq!(c.selected(), Some(&v1));
    }

    #[test]
    fn test_double_click_group_reroots_and_bumps_generation() {
        let mut c = controller();
        let before = c.generation();
        let g1 = path_of(&c, "G1");

        let outputs = c.handle(ViewEvent::DoubleClick(g1));
        assert_eq!(
            breadcrumbs(&outputs).unwrap(),
            vec!["Root".to_string(), "G1".to_string()]
        );
        assert!(c.generation() > before);

        // The layout is now rooted at G1.
        assert_eq!(c.layout().nodes[0].name, "G1");
        assert_eq!(c.layout().nodes[0].depth, 0);
    }

    #[test]
    fn test_double_click_current_root_is_noop() {
        let mut c = controller();
        let before = c.generation();
        let outputs = c.handle(ViewEvent::DoubleClick(NodePath::root()));
        assert!(outputs.is_empty());
        assert_eq!(c.generation(), before);
    }

    #[test]
    fn test_double_click_leaf_is_noop() {
        let mut c = controller();
        let before = c.generation();
        let v3 = path_of(&c, "V3");
        let outputs = c.handle(ViewEvent::DoubleClick(v3));
        assert!(outputs.is_empty());
        assert_eq!(c.generation(), before);
        assert_eq!(c.nav().breadcrumb(), ["Root"]);
    }

    #[test]
    fn test_hover_does_not_relayout() {
        let mut c = controller();
        let before = c.generation();
        let v1 = path_of(&c, "V1");

        c.handle(ViewEvent::Hover(Some(v1.clone())));
        assert_eq!(c.hovered(), Some(&v1));
        c.handle(ViewEvent::Hover(None));
        assert_eq!(c.hovered(), None);
        assert_eq!(c.generation(), before);
    }

    #[test]
    fn test_search_select_leaf_narrows_depth_and_highlights() {
        let mut c = controller();
        let outputs = c.handle(ViewEvent::SearchSelect("W1".to_string()));

        assert_eq!(
            breadcrumbs(&outputs).unwrap(),
            vec!["Root".to_string(), "G1".to_string(), "G2".to_string()]
        );
        assert_eq!(c.nav().depth_limit(), Some(1));
        let highlighted = c.nav().highlighted().unwrap().clone();
        assert_eq!(c.nav().logical_root().at(&highlighted).unwrap().name, "W1");

        // The highlighted leaf is inside the rendered layout.
        assert!(c.layout().find(&highlighted).is_some());
    }

    #[test]
    fn test_search_select_missing_name_notices_without_reset() {
        let mut c = controller();
        c.handle(ViewEvent::DoubleClick(path_of(&c, "G1")));

        let outputs = c.handle(ViewEvent::SearchSelect("missing".to_string()));
        assert_eq!(outputs.len(), 1);
        assert!(matches!(&outputs[0], ViewerOutput::Notice(m) if m.contains("No matching")));
        assert_eq!(c.nav().breadcrumb(), ["Root", "G1"]);
    }

    #[test]
    fn test_breadcrumb_click_returns_to_ancestor() {
        let mut c = controller();
        c.handle(ViewEvent::SearchSelect("W1".to_string()));

        let outputs = c.handle(ViewEvent::BreadcrumbClick(0));
        assert_eq!(breadcrumbs(&outputs).unwrap(), vec!["Root".to_string()]);
        assert_eq!(c.layout().nodes[0].name, "Root");
    }

    #[test]
    fn test_stale_breadcrumb_click_resets_with_notice() {
        let mut c = controller();
        let outputs = c.handle(ViewEvent::BreadcrumbClick(5));

        assert!(outputs
            .iter()
            .any(|o| matches!(o, ViewerOutput::Notice(m) if m.contains("reset"))));
        assert_eq!(breadcrumbs(&outputs).unwrap(), vec!["Root".to_string()]);
    }

    #[test]
    fn test_depth_change_keeps_breadcrumb_but_relays_out() {
        let mut c = controller();
        let before = c.generation();

        let outputs = c.handle(ViewEvent::DepthChange(Some(1)));
        assert!(outputs.is_empty());
        assert!(c.generation() > before);
        assert!(c.layout().nodes.iter().all(|n| n.depth <= 1));
        assert_eq!(c.nav().breadcrumb(), ["Root"]);
    }

    #[test]
    fn test_zoom_toggle_off_resets_viewport() {
        let mut c = controller();
        c.handle(ViewEvent::ZoomToggle(true));
        c.viewport_mut().pan_by(50.0, 50.0);
        c.viewport_mut().zoom = 1.7;

        c.handle(ViewEvent::ZoomToggle(false));
        assert_eq!(c.viewport().zoom, 1.0);
        assert_eq!(c.viewport().offset, (0.0, 0.0));
        assert!(!c.options().zoom_enabled);
    }

    #[test]
    fn test_switch_model_resets_session() {
        let mut c = controller();
        c.handle(ViewEvent::SearchSelect("W1".to_string()));

        let other = build_hierarchy(&model(
            "Other",
            vec![var("X")],
            vec![group("H", vec![var("Y")], vec![])],
        ))
        .unwrap();
        let outputs = c.switch_model(other).unwrap();

        assert_eq!(breadcrumbs(&outputs).unwrap(), vec!["Other".to_string()]);
        assert_eq!(c.layout().nodes[0].name, "Other");
        assert_eq!(c.selected(), None);
        assert_eq!(c.nav().depth_limit(), None);
    }

    #[test]
    fn test_switch_to_empty_model_fails() {
        let mut c = controller();
        let empty = build_hierarchy(&model("Empty", vec![], vec![])).unwrap();
        assert!(matches!(
            c.switch_model(empty),
            Err(NavError::EmptyHierarchy)
        ));
    }

    #[test]
    fn test_strategy_swap_relays_out_same_focus() {
        let mut c = controller();
        c.handle(ViewEvent::DoubleClick(path_of(&c, "G1")));
        let before = c.generation();

        c.set_strategy(Box::new(crate::layout::SunburstLayout));
        assert!(c.generation() > before);
        assert_eq!(c.strategy_name(), "Sunburst");
        assert_eq!(c.layout().nodes[0].name, "G1");
        assert_eq!(c.nav().breadcrumb(), ["Root", "G1"]);
    }
}
