//! Canopy GUI - interactive data-model hierarchy viewer
//!
//! Browse federations, pick a model, and explore its variable/group
//! hierarchy as a tidy tree, sunburst, or circle packing.

use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;

fn main() -> eframe::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Either a local model file to open, or nothing: the backend URL comes
    // from CANOPY_BACKEND_URL when set.
    let initial_file = std::env::args().nth(1).map(std::path::PathBuf::from);
    let backend_url = std::env::var("CANOPY_BACKEND_URL").ok();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Canopy"),
        ..Default::default()
    };

    eframe::run_native(
        "Canopy",
        options,
        Box::new(move |cc| {
            let mut app = app::CanopyApp::new(cc);
            if let Some(path) = initial_file {
                app.open_file(path);
            } else if let Some(url) = backend_url {
                app.connect(url);
            }
            Ok(Box::new(app))
        }),
    )
}
