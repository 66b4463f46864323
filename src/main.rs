//! Bike Sharing Dashboard - interactive usage analytics over a static dataset.

use anyhow::{anyhow, Context, Result};
use bike_dashboard::gui::DashboardApp;
use bike_dashboard::DashboardConfig;
use eframe::egui;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config = DashboardConfig::discover().context("loading dashboard config")?;
    info!(
        data = %config.data_path.display(),
        weather = ?config.weather_aggregation,
        "starting dashboard"
    );

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 700.0])
            .with_title(&config.window_title),
        ..Default::default()
    };

    let title = config.window_title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, config)))),
    )
    .map_err(|e| anyhow!("dashboard window failed: {e}"))
}
