//! Texpad - LaTeX editor with PDF preview
//!
//! A Rust-based LaTeX editor with working-copy compilation, autosave and PDF export.

mod app;
mod core;
mod ui;

use app::TexpadApp;
use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::LevelFilter::INFO)
        .init();

    tracing::info!("Starting Texpad...");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Texpad"),
        ..Default::default()
    };

    eframe::run_native(
        "Texpad",
        native_options,
        Box::new(|cc| Ok(Box::new(TexpadApp::new(cc)))),
    )
}
