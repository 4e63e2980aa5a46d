//! Canopy Viz - layout and navigation over data-model hierarchies
//!
//! This crate turns a canonical tree from `canopy-core` into positioned,
//! renderable geometry and keeps the navigation state (focus, breadcrumb,
//! depth limit, highlight) consistent through every interaction.
//!
//! Nothing here draws. The [`controller::ViewerController`] consumes
//! abstract pointer events and returns abstract outputs; a front-end (the
//! egui app, or a test) maps real input to events and renders the
//! resulting [`layout::Layout`] through a [`view::Viewport`].

pub mod controller;
pub mod error;
pub mod layout;
pub mod navigation;
pub mod view;

#[cfg(test)]
pub(crate) mod testutil;

pub use controller::{ViewEvent, ViewerController, ViewerOutput};
pub use error::{NavError, Result};
pub use layout::{
    Bounds, CirclePackingLayout, Layout, LayoutEdge, LayoutNode, LayoutOptions, LayoutStrategy,
    NodeShape, SunburstLayout, TidyTreeLayout,
};
pub use navigation::NavigationState;
pub use view::{tooltip_lines, TransitionState, Viewport};
