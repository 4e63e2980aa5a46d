//! Main application state and UI logic.

use canopy_client::CatalogClient;
use canopy_core::{
    build_hierarchy, DataModel, Federation, NodeKind, NodePath, SearchIndex, SearchKind, TreeNode,
};
use canopy_viz::{
    tooltip_lines, CirclePackingLayout, Layout, LayoutOptions, LayoutStrategy, NavError, NodeShape,
    SunburstLayout, TidyTreeLayout, TransitionState, ViewEvent, ViewerController, ViewerOutput,
};
use eframe::egui;
use std::path::PathBuf;
use tokio::runtime::Runtime;

/// Seconds a relayout transition animates for.
const TRANSITION_SECONDS: f32 = 0.35;

/// Node colors by role.
mod colors {
    use eframe::egui::Color32;

    /// The displayed subtree root.
    pub const ROOT: Color32 = Color32::from_rgb(76, 175, 80);
    pub const ROOT_STROKE: Color32 = Color32::from_rgb(46, 125, 50);
    /// Interior group nodes.
    pub const GROUP: Color32 = Color32::from_rgb(0, 122, 204);
    /// Variable leaves.
    pub const VARIABLE: Color32 = Color32::from_rgb(150, 150, 170);
    /// Ring marking nodes with more detail below the depth limit.
    pub const COLLAPSED: Color32 = Color32::from_rgb(255, 204, 0);
    /// Search-jump highlight.
    pub const HIGHLIGHT: Color32 = Color32::from_rgb(255, 184, 0);
    /// Edges between nodes.
    pub const EDGE: Color32 = Color32::from_rgba_premultiplied(100, 100, 120, 80);
    pub const CANVAS: Color32 = Color32::from_rgb(20, 20, 30);
    pub const FAINT_TEXT: Color32 = Color32::from_rgb(100, 100, 120);
}

/// Which layout strategy is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StrategyChoice {
    TidyTree,
    Sunburst,
    CirclePacking,
}

impl StrategyChoice {
    const ALL: [StrategyChoice; 3] = [
        StrategyChoice::TidyTree,
        StrategyChoice::Sunburst,
        StrategyChoice::CirclePacking,
    ];

    fn label(&self) -> &'static str {
        match self {
            StrategyChoice::TidyTree => "Tidy tree",
            StrategyChoice::Sunburst => "Sunburst",
            StrategyChoice::CirclePacking => "Circle packing",
        }
    }

    fn make(&self) -> Box<dyn LayoutStrategy> {
        match self {
            StrategyChoice::TidyTree => Box::new(TidyTreeLayout),
            StrategyChoice::Sunburst => Box::new(SunburstLayout),
            StrategyChoice::CirclePacking => Box::new(CirclePackingLayout),
        }
    }
}

/// Canopy GUI application state.
pub struct CanopyApp {
    runtime: Runtime,
    client: Option<CatalogClient>,

    federations: Vec<(Federation, Vec<DataModel>)>,
    selected_federation: Option<usize>,
    models: Vec<DataModel>,
    selected_model: Option<usize>,

    controller: Option<ViewerController>,
    search_index: Option<SearchIndex>,
    transition: TransitionState,
    prev_layout: Option<Layout>,
    last_generation: u64,

    strategy: StrategyChoice,
    depth_choice: Option<usize>,
    max_useful_depth: usize,
    zoom_enabled: bool,
    show_labels: bool,
    show_inspector: bool,
    dark_mode: bool,

    search_query: String,
    search_groups: bool,
    type_filter: Option<String>,

    breadcrumb: Vec<String>,
    selected_node: Option<TreeNode>,
    status: String,
    /// Set when the chosen model has nothing to visualize.
    empty_notice: Option<String>,
}

impl CanopyApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            runtime: Runtime::new().expect("failed to start tokio runtime"),
            client: None,
            federations: Vec::new(),
            selected_federation: None,
            models: Vec::new(),
            selected_model: None,
            controller: None,
            search_index: None,
            transition: TransitionState::default(),
            prev_layout: None,
            last_generation: 0,
            strategy: StrategyChoice::TidyTree,
            depth_choice: None,
            max_useful_depth: 0,
            zoom_enabled: false,
            show_labels: true,
            show_inspector: true,
            dark_mode: true,
            search_query: String::new(),
            search_groups: false,
            type_filter: None,
            breadcrumb: Vec::new(),
            selected_node: None,
            status: "Open a model file or connect to a backend.".to_string(),
            empty_notice: None,
        }
    }

    /// Connects to a catalog backend and loads its federations.
    pub fn connect(&mut self, url: String) {
        let client = match CatalogClient::new(&url) {
            Ok(client) => client,
            Err(e) => {
                self.status = format!("Failed to create client: {}", e);
                return;
            }
        };

        self.status = format!("Loading catalog from {}...", url);
        tracing::info!(%url, "connecting to catalog backend");
        match self.runtime.block_on(client.federations_with_models()) {
            Ok(federations) => {
                let models = self
                    .runtime
                    .block_on(client.list_data_models())
                    .unwrap_or_default();
                self.federations = federations;
                self.selected_federation = None;
                self.client = Some(client);
                self.set_models(models);
                self.status = format!(
                    "Loaded {} federations, {} models.",
                    self.federations.len(),
                    self.models.len()
                );
            }
            Err(e) => {
                self.status = format!("Failed to load catalog: {}", e);
            }
        }
    }

    /// Opens a local data-model JSON file.
    pub fn open_file(&mut self, path: PathBuf) {
        let loaded = std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|text| DataModel::from_json(&text).map_err(|e| e.to_string()));

        match loaded {
            Ok(model) => {
                tracing::info!(path = %path.display(), model = %model.label, "opened model file");
                self.status = format!("Opened {}.", path.display());
                self.set_models(vec![model]);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to open model file");
                self.status = format!("Failed to open {}: {}", path.display(), e);
            }
        }
    }

    /// Replaces the model list and shows the first entry.
    fn set_models(&mut self, models: Vec<DataModel>) {
        self.models = models;
        self.selected_model = None;
        if !self.models.is_empty() {
            self.select_model(0);
        }
    }

    /// Builds the hierarchy for one model and starts a fresh session on it.
    fn select_model(&mut self, index: usize) {
        let Some(model) = self.models.get(index) else {
            return;
        };

        let root = match build_hierarchy(model) {
            Ok(root) => root,
            Err(e) => {
                self.status = format!("Cannot load '{}': {}", model.label, e);
                return;
            }
        };

        self.selected_model = Some(index);
        self.search_index = Some(SearchIndex::build(&root));
        self.selected_node = None;
        self.search_query.clear();
        self.type_filter = None;
        self.empty_notice = None;
        self.depth_choice = None;

        let outcome = if let Some(controller) = self.controller.as_mut() {
            controller.switch_model(root)
        } else {
            match ViewerController::new(root, self.strategy.make(), self.layout_options()) {
                Ok(controller) => {
                    let outputs = vec![
                        ViewerOutput::BreadcrumbChanged(controller.nav().breadcrumb().to_vec()),
                        ViewerOutput::DepthOptionsChanged(controller.nav().max_useful_depth()),
                    ];
                    self.controller = Some(controller);
                    Ok(outputs)
                }
                Err(e) => Err(e),
            }
        };

        match outcome {
            Ok(outputs) => {
                self.transition = TransitionState::default();
                self.apply_outputs(outputs);
                self.prev_layout = None;
                self.last_generation = self
                    .controller
                    .as_ref()
                    .map(|c| c.generation())
                    .unwrap_or(0);
                self.status = format!("Showing '{}'.", self.models[index].label);
            }
            Err(NavError::EmptyHierarchy) => {
                self.controller = None;
                self.empty_notice = Some(format!(
                    "'{}' has no variables or groups to visualize.",
                    self.models[index].label
                ));
            }
            Err(e) => {
                self.status = format!("Cannot show '{}': {}", self.models[index].label, e);
            }
        }
    }

    fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            zoom_enabled: self.zoom_enabled,
            ..Default::default()
        }
    }

    /// Feeds one event to the controller and applies what comes back.
    fn dispatch(&mut self, event: ViewEvent) {
        let Some(controller) = self.controller.as_mut() else {
            return;
        };
        let outputs = controller.handle(event);
        self.apply_outputs(outputs);
    }

    fn apply_outputs(&mut self, outputs: Vec<ViewerOutput>) {
        for output in outputs {
            match output {
                ViewerOutput::NodeSelected(node) => {
                    self.selected_node = Some(node);
                }
                ViewerOutput::BreadcrumbChanged(path) => {
                    self.breadcrumb = path;
                }
                ViewerOutput::DepthOptionsChanged(max) => {
                    self.max_useful_depth = max;
                    self.depth_choice = self
                        .controller
                        .as_ref()
                        .and_then(|c| c.nav().depth_limit());
                }
                ViewerOutput::Notice(message) => {
                    self.status = message;
                }
            }
        }
    }

    /// Starts an animated transition whenever a new layout pass happened.
    fn sync_transition(&mut self) {
        let Some(controller) = self.controller.as_ref() else {
            return;
        };
        if controller.generation() != self.last_generation {
            if let Some(prev) = self.prev_layout.take() {
                self.transition.begin(&prev, TRANSITION_SECONDS);
            }
            self.last_generation = controller.generation();
        }
        self.prev_layout = Some(controller.layout().clone());
    }

    fn copy_selected_attributes(&self) {
        let Some(node) = &self.selected_node else {
            return;
        };
        let mut text = format!("{} ({})\n", node.name, node.kind);
        if let Some(code) = &node.code {
            text += &format!("Code: {}\n", code);
        }
        if let Some(count) = node.variable_count {
            text += &format!("Variables: {}\n", count);
        }
        if let Some(attributes) = &node.attributes {
            for (label, value) in attributes.pairs() {
                text += &format!("{}: {}\n", label, value);
            }
        }
        if let Ok(mut clipboard) = arboard::Clipboard::new() {
            let _ = clipboard.set_text(text);
        }
    }

    /// Render the top search bar with its suggestion dropdown.
    fn render_search_bar(&mut self, ui: &mut egui::Ui) {
        let mut selected_name: Option<String> = None;

        ui.horizontal(|ui| {
            ui.label("Search:");
            ui.add(
                egui::TextEdit::singleline(&mut self.search_query)
                    .hint_text("Find variables or groups...")
                    .desired_width(300.0),
            );

            ui.selectable_value(&mut self.search_groups, false, "Variables");
            ui.selectable_value(&mut self.search_groups, true, "Groups");

            if !self.search_groups {
                let types: Vec<String> = self
                    .search_index
                    .as_ref()
                    .map(|i| i.variable_types().to_vec())
                    .unwrap_or_default();
                if !types.is_empty() {
                    egui::ComboBox::from_id_salt("type_filter")
                        .selected_text(self.type_filter.as_deref().unwrap_or("Any type"))
                        .show_ui(ui, |ui| {
                            ui.selectable_value(&mut self.type_filter, None, "Any type");
                            for t in types {
                                ui.selectable_value(&mut self.type_filter, Some(t.clone()), t);
                            }
                        });
                }
            }
        });

        let kind = if self.search_groups {
            SearchKind::Groups
        } else {
            SearchKind::Variables
        };
        let matches: Vec<(String, String, Option<String>)> = self
            .search_index
            .as_ref()
            .map(|index| {
                index
                    .query(&self.search_query, kind, self.type_filter.as_deref())
                    .into_iter()
                    .take(20)
                    .map(|e| (e.name.clone(), e.display_path.clone(), e.var_type.clone()))
                    .collect()
            })
            .unwrap_or_default();

        if !matches.is_empty() {
            ui.separator();
            egui::ScrollArea::vertical().max_height(150.0).show(ui, |ui| {
                for (name, display_path, var_type) in &matches {
                    let type_note = var_type
                        .as_deref()
                        .map(|t| format!(" [{}]", t))
                        .unwrap_or_default();
                    let label = format!("{}{} — {}", name, type_note, display_path);
                    if ui.selectable_label(false, label).clicked() {
                        selected_name = Some(name.clone());
                    }
                }
            });
        }

        if let Some(name) = selected_name {
            self.search_query.clear();
            self.dispatch(ViewEvent::SearchSelect(name));
        }
    }

    /// Render the left sidebar: catalog selectors and view settings.
    fn render_sidebar(&mut self, ui: &mut egui::Ui) {
        ui.heading("Catalog");
        ui.separator();

        if !self.federations.is_empty() {
            let selected_text = self
                .selected_federation
                .and_then(|i| self.federations.get(i))
                .map(|(f, _)| f.title.clone())
                .unwrap_or_else(|| "All federations".to_string());

            let mut changed: Option<Option<usize>> = None;
            egui::ComboBox::from_label("Federation")
                .selected_text(selected_text)
                .show_ui(ui, |ui| {
                    if ui
                        .selectable_label(self.selected_federation.is_none(), "All federations")
                        .clicked()
                    {
                        changed = Some(None);
                    }
                    for (index, (federation, models)) in self.federations.iter().enumerate() {
                        let label =
                            format!("{} ({} models)", federation.title, models.len());
                        if ui
                            .selectable_label(self.selected_federation == Some(index), label)
                            .clicked()
                        {
                            changed = Some(Some(index));
                        }
                    }
                });

            if let Some(selection) = changed {
                self.selected_federation = selection;
                let models = match selection {
                    Some(index) => self.federations[index].1.clone(),
                    None => self
                        .client
                        .as_ref()
                        .map(|client| {
                            self.runtime
                                .block_on(client.list_data_models())
                                .unwrap_or_default()
                        })
                        .unwrap_or_default(),
                };
                self.set_models(models);
            }
        }

        let mut clicked_model: Option<usize> = None;
        for longitudinal in [false, true] {
            let section: Vec<usize> = (0..self.models.len())
                .filter(|&i| self.models[i].longitudinal == longitudinal)
                .collect();
            if section.is_empty() {
                continue;
            }
            ui.add_space(6.0);
            ui.label(
                egui::RichText::new(if longitudinal {
                    "Longitudinal"
                } else {
                    "Cross-sectional"
                })
                .small()
                .weak(),
            );
            for index in section {
                let model = &self.models[index];
                let marker = if model.released { "●" } else { "○" };
                let label = format!(
                    "{} {} {}",
                    marker,
                    model.label,
                    model.version.as_deref().unwrap_or("")
                );
                if ui
                    .selectable_label(self.selected_model == Some(index), label)
                    .clicked()
                {
                    clicked_model = Some(index);
                }
            }
        }
        if let Some(index) = clicked_model {
            self.select_model(index);
        }

        if self.models.is_empty() {
            ui.label("No data models loaded");
        }

        ui.add_space(10.0);
        if ui.button("Open model file...").clicked() {
            if let Some(path) = rfd::FileDialog::new()
                .add_filter("JSON", &["json"])
                .pick_file()
            {
                self.open_file(path);
            }
        }

        ui.add_space(20.0);
        ui.separator();
        ui.heading("View");
        ui.add_space(10.0);

        let mut strategy = self.strategy;
        egui::ComboBox::from_label("Layout")
            .selected_text(strategy.label())
            .show_ui(ui, |ui| {
                for choice in StrategyChoice::ALL {
                    ui.selectable_value(&mut strategy, choice, choice.label());
                }
            });
        if strategy != self.strategy {
            self.strategy = strategy;
            if let Some(controller) = self.controller.as_mut() {
                controller.set_strategy(strategy.make());
            }
        }

        // Depth choices follow the focus subtree's real nesting depth.
        if self.max_useful_depth > 0 {
            let mut choice = self.depth_choice;
            egui::ComboBox::from_label("Depth")
                .selected_text(match choice {
                    Some(d) => format!("{} levels", d),
                    None => "All levels".to_string(),
                })
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut choice, None, "All levels");
                    for depth in 1..=self.max_useful_depth {
                        ui.selectable_value(
                            &mut choice,
                            Some(depth),
                            format!("{} levels", depth),
                        );
                    }
                });
            if choice != self.depth_choice {
                self.depth_choice = choice;
                self.dispatch(ViewEvent::DepthChange(choice));
            }
        }

        let mut zoom_enabled = self.zoom_enabled;
        ui.checkbox(&mut zoom_enabled, "Pan and zoom");
        if zoom_enabled != self.zoom_enabled {
            self.zoom_enabled = zoom_enabled;
            self.dispatch(ViewEvent::ZoomToggle(zoom_enabled));
        }

        ui.checkbox(&mut self.show_labels, "Show labels");
        ui.checkbox(&mut self.show_inspector, "Show details");
        ui.checkbox(&mut self.dark_mode, "Dark mode");

        if let Some(controller) = self.controller.as_ref() {
            ui.add_space(10.0);
            ui.label(format!("Zoom: {:.1}x", controller.viewport().zoom));
        }
        if ui.button("Reset view").clicked() {
            if let Some(controller) = self.controller.as_mut() {
                controller.viewport_mut().reset();
            }
        }
    }

    /// Render the node details panel.
    fn render_inspector(&mut self, ui: &mut egui::Ui) {
        ui.heading("Details");
        ui.separator();

        let Some(node) = self.selected_node.clone() else {
            ui.label("Click a node to inspect it");
            return;
        };

        ui.strong(&node.name);
        ui.horizontal(|ui| {
            ui.label("Kind:");
            let color = match node.kind {
                NodeKind::Group => colors::GROUP,
                NodeKind::Variable => colors::VARIABLE,
            };
            ui.colored_label(color, node.kind.to_string());
        });
        if let Some(code) = &node.code {
            ui.horizontal(|ui| {
                ui.label("Code:");
                ui.monospace(code);
            });
        }
        if let Some(count) = node.variable_count {
            ui.horizontal(|ui| {
                ui.label("Variables:");
                ui.label(count.to_string());
            });
        }
        if let Some(attributes) = &node.attributes {
            ui.add_space(6.0);
            for (label, value) in attributes.pairs() {
                ui.horizontal_wrapped(|ui| {
                    ui.label(egui::RichText::new(format!("{}:", label)).strong());
                    ui.label(value);
                });
            }
        }

        ui.add_space(10.0);
        if ui.button("📋 Copy attributes").clicked() {
            self.copy_selected_attributes();
        }
    }

    /// Render the breadcrumb strip above the canvas.
    fn render_breadcrumb(&mut self, ui: &mut egui::Ui) {
        let mut clicked: Option<usize> = None;
        ui.horizontal(|ui| {
            for (index, crumb) in self.breadcrumb.iter().enumerate() {
                if index > 0 {
                    ui.label(egui::RichText::new("›").weak());
                }
                let last = index + 1 == self.breadcrumb.len();
                if last {
                    ui.label(egui::RichText::new(crumb).strong());
                } else if ui.link(crumb).clicked() {
                    clicked = Some(index);
                }
            }
        });
        if let Some(index) = clicked {
            self.dispatch(ViewEvent::BreadcrumbClick(index));
        }
    }

    /// Render the bottom status bar.
    fn render_status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(&self.status);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if let Some(controller) = self.controller.as_ref() {
                    let root = controller.nav().logical_root();
                    ui.label(format!(
                        "{} | {} variables",
                        root.name,
                        root.variable_count.unwrap_or(0)
                    ));
                }
            });
        });
    }

    /// Render the main canvas and translate pointer input into events.
    fn render_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let rect = response.rect;
        let center = rect.center();

        painter.rect_filled(rect, 0.0, colors::CANVAS);

        if let Some(notice) = &self.empty_notice {
            painter.text(
                center,
                egui::Align2::CENTER_CENTER,
                notice,
                egui::FontId::proportional(20.0),
                colors::FAINT_TEXT,
            );
            return;
        }
        if self.controller.is_none() {
            painter.text(
                center,
                egui::Align2::CENTER_CENTER,
                "Select a data model to visualize",
                egui::FontId::proportional(24.0),
                colors::FAINT_TEXT,
            );
            return;
        }

        let mut events: Vec<ViewEvent> = Vec::new();
        let prev_hovered = self
            .controller
            .as_ref()
            .and_then(|c| c.hovered().cloned());

        // Pan and zoom are view transforms only; the layout never moves.
        if self.zoom_enabled {
            if response.dragged_by(egui::PointerButton::Primary) && prev_hovered.is_none() {
                let delta = response.drag_delta();
                if let Some(c) = self.controller.as_mut() {
                    c.viewport_mut().pan_by(delta.x, delta.y);
                }
            }
            if let Some(hover_pos) = response.hover_pos() {
                let scroll = ui.input(|i| i.raw_scroll_delta.y);
                if scroll != 0.0 {
                    let factor = 1.0 + scroll * 0.001;
                    if let Some(c) = self.controller.as_mut() {
                        c.viewport_mut().zoom_by(
                            factor,
                            (hover_pos.x, hover_pos.y),
                            (center.x, center.y),
                        );
                    }
                }
            }
        }

        let Some(controller) = self.controller.as_ref() else {
            return;
        };
        let layout = controller.layout();
        let viewport = *controller.viewport();
        let highlighted = controller.nav().highlighted().cloned();
        let selected = controller.selected().cloned();
        let hovered = prev_hovered;

        // Fit the layout bounds into the canvas, then apply pan/zoom.
        let bounds = layout.bounds;
        let (bounds_cx, bounds_cy) = bounds.center();
        let fit = (rect.width() / bounds.width())
            .min(rect.height() / bounds.height())
            .min(1.0);
        let to_screen = |x: f32, y: f32| -> egui::Pos2 {
            let fitted = ((x - bounds_cx) * fit, (y - bounds_cy) * fit);
            let (sx, sy) = viewport.world_to_screen(fitted, (center.x, center.y));
            egui::pos2(sx, sy)
        };
        let scale = fit * viewport.zoom;

        // Animated positions for this frame.
        let positions: Vec<egui::Pos2> = layout
            .nodes
            .iter()
            .map(|node| {
                let (x, y) = self.transition.position_of(node);
                to_screen(x, y)
            })
            .collect();

        // Edges first, then shapes, then markers and labels on top.
        for edge in &layout.edges {
            painter.line_segment(
                [positions[edge.from], positions[edge.to]],
                egui::Stroke::new(1.0, colors::EDGE),
            );
        }

        let canvas_center = to_screen(0.0, 0.0);
        for (index, node) in layout.nodes.iter().enumerate() {
            match node.shape {
                NodeShape::Arc {
                    start_angle,
                    end_angle,
                    inner_radius,
                    outer_radius,
                } => {
                    let mid_radius = (inner_radius + outer_radius) / 2.0 * scale;
                    let thickness = (outer_radius - inner_radius) * scale * 0.9;
                    let points = arc_points(canvas_center, mid_radius, start_angle, end_angle);
                    let color = fill_for(node, &highlighted);
                    painter.add(egui::Shape::line(
                        points,
                        egui::Stroke::new(thickness, color),
                    ));
                }
                NodeShape::Circle { radius } => {
                    let screen_radius = radius * scale;
                    if node.has_children && !node.has_hidden_children {
                        painter.circle_stroke(
                            positions[index],
                            screen_radius,
                            egui::Stroke::new(1.5, fill_for(node, &highlighted)),
                        );
                    } else {
                        painter.circle_filled(
                            positions[index],
                            screen_radius,
                            fill_for(node, &highlighted).gamma_multiply(0.6),
                        );
                    }
                }
                NodeShape::Dot => {}
            }
        }

        // Hit-testing runs on anchor markers for every strategy.
        let marker_scale = viewport.zoom.sqrt();
        let mut new_hovered: Option<NodePath> = None;
        for (index, node) in layout.nodes.iter().enumerate() {
            let pos = positions[index];
            if !rect.expand(40.0).contains(pos) {
                continue;
            }

            let is_root = node.depth == 0;
            let is_highlighted = highlighted.as_ref() == Some(&node.path);
            let is_selected = selected.as_ref() == Some(&node.path);
            let is_hovered = hovered.as_ref() == Some(&node.path);

            let radius = marker_radius(node) * marker_scale;
            if let Some(hover_pos) = response.hover_pos() {
                if (hover_pos - pos).length() < radius + 4.0 {
                    new_hovered = Some(node.path.clone());
                }
            }

            if matches!(node.shape, NodeShape::Dot) {
                painter.circle_filled(pos, radius, fill_for(node, &highlighted));
                if is_root {
                    painter.circle_stroke(
                        pos,
                        radius + 1.5,
                        egui::Stroke::new(2.0, colors::ROOT_STROKE),
                    );
                }
                if node.has_hidden_children {
                    painter.circle_stroke(
                        pos,
                        radius + 2.5,
                        egui::Stroke::new(1.5, colors::COLLAPSED),
                    );
                }
            }
            if is_selected || is_highlighted {
                painter.circle_stroke(
                    pos,
                    radius + 4.0,
                    egui::Stroke::new(2.0, egui::Color32::WHITE),
                );
            }

            let draw_label = self.show_labels
                && (layout.nodes.len() <= 150 || is_hovered || is_selected || is_root);
            if draw_label {
                let font = if is_root {
                    egui::FontId::proportional(14.0)
                } else {
                    egui::FontId::proportional(11.0 * marker_scale.max(0.8))
                };
                painter.text(
                    pos + egui::vec2(radius + 4.0, 0.0),
                    egui::Align2::LEFT_CENTER,
                    &node.name,
                    font,
                    egui::Color32::WHITE,
                );
            }
        }

        // Tooltip with the node's attributes, shared across strategies.
        if let Some(path) = &new_hovered {
            if let Some(node) = controller.nav().logical_root().at(path) {
                let lines = tooltip_lines(node);
                response.clone().on_hover_ui_at_pointer(|ui| {
                    for (index, line) in lines.iter().enumerate() {
                        if index == 0 {
                            ui.strong(line);
                        } else {
                            ui.label(line);
                        }
                    }
                });
            }
        }

        if new_hovered != hovered {
            events.push(ViewEvent::Hover(new_hovered.clone()));
        }
        if response.double_clicked() {
            if let Some(path) = new_hovered.clone() {
                events.push(ViewEvent::DoubleClick(path));
            }
        } else if response.clicked() {
            if let Some(path) = new_hovered {
                events.push(ViewEvent::Click(path));
            }
        }

        for event in events {
            self.dispatch(event);
        }
    }
}

/// Anchor marker radius by role, before zoom scaling.
fn marker_radius(node: &canopy_viz::LayoutNode) -> f32 {
    if node.depth == 0 {
        8.0
    } else if node.has_hidden_children {
        5.0
    } else if node.kind == NodeKind::Group {
        4.5
    } else {
        3.0
    }
}

/// Fill color by role, with the search highlight winning.
fn fill_for(node: &canopy_viz::LayoutNode, highlighted: &Option<NodePath>) -> egui::Color32 {
    if highlighted.as_ref() == Some(&node.path) {
        return colors::HIGHLIGHT;
    }
    if node.depth == 0 {
        colors::ROOT
    } else if node.kind == NodeKind::Group {
        colors::GROUP
    } else {
        colors::VARIABLE
    }
}

/// Samples an arc centerline into screen points. Angles run clockwise
/// from 12 o'clock, matching the layout's convention.
fn arc_points(center: egui::Pos2, radius: f32, start: f32, end: f32) -> Vec<egui::Pos2> {
    let steps = (((end - start).abs() * 24.0).ceil() as usize).clamp(2, 96);
    (0..=steps)
        .map(|i| {
            let t = start + (end - start) * i as f32 / steps as f32;
            egui::pos2(center.x + radius * t.sin(), center.y - radius * t.cos())
        })
        .collect()
}

impl eframe::App for CanopyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.dark_mode {
            ctx.set_visuals(egui::Visuals::dark());
        } else {
            ctx.set_visuals(egui::Visuals::light());
        }

        // Drive the relayout animation; keep repainting while it runs.
        let dt = ctx.input(|i| i.stable_dt).min(0.1);
        if self.transition.advance(dt) {
            ctx.request_repaint();
        }

        egui::TopBottomPanel::top("search_bar").show(ctx, |ui| {
            self.render_search_bar(ui);
        });

        egui::SidePanel::left("sidebar")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.render_sidebar(ui);
                });
            });

        if self.show_inspector {
            egui::SidePanel::right("inspector")
                .resizable(true)
                .default_width(230.0)
                .show(ctx, |ui| {
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        self.render_inspector(ui);
                    });
                });
        }

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.render_status_bar(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if !self.breadcrumb.is_empty() {
                self.render_breadcrumb(ui);
                ui.separator();
            }
            self.render_canvas(ui);
        });

        self.sync_transition();
    }
}
