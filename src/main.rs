mod app;
mod config;
mod layout;
mod report;
mod session;

use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::Parser;
use tracing::info;

use crate::config::LayoutConfig;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Link report to open on startup.
    report: Option<PathBuf>,

    /// JSON file overriding the diagram geometry.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .init();

    let config = match &args.config {
        Some(path) => LayoutConfig::load(path)
            .with_context(|| format!("cannot use layout config {}", path.display()))?,
        None => LayoutConfig::default(),
    };
    info!(?config, "layout configuration");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1440.0, 920.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    let initial_report = args.report;
    eframe::run_native(
        "workbook-links",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::ReportViewerApp::new(
                cc,
                config,
                initial_report,
            )))
        }),
    )
    .map_err(|error| anyhow!("viewer exited with an error: {error}"))
}
