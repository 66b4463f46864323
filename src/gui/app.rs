//! Bike Sharing Dashboard Main Application
//! Main window with control panel and chart viewer.

use crate::charts::StaticChartRenderer;
use crate::config::DashboardConfig;
use crate::data::{validate, DataLoader, Dataset, ValidationReport};
use crate::error::DashboardError;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::stats::{self, DashboardData, RenderInputs};
use egui::SidePanel;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::thread;
use tracing::{error, warn};

/// CSV loading result from background thread
enum LoadResult {
    Complete {
        dataset: Dataset,
        validation: Option<ValidationReport>,
    },
    Error(DashboardError),
}

/// Main application window.
pub struct DashboardApp {
    config: DashboardConfig,
    dataset: Option<Dataset>,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async CSV loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        let mut app = Self {
            control_panel: ControlPanel::new(config.weather_aggregation),
            config,
            dataset: None,
            chart_viewer: ChartViewer::new(),
            load_rx: None,
            is_loading: false,
        };
        let initial = app.config.data_path.clone();
        app.start_load(initial);
        app
    }

    /// Load a CSV on a background thread; the UI keeps running meanwhile.
    fn start_load(&mut self, path: PathBuf) {
        if self.is_loading {
            return;
        }

        self.control_panel.settings.csv_path = Some(path.clone());
        self.control_panel.set_status("Loading CSV file...");
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        let date_format = self.config.date_format.clone();
        let run_validation = self.config.validate_input;

        thread::spawn(move || {
            let result = match DataLoader::load_csv(&path, &date_format) {
                Ok(dataset) => {
                    let validation = if run_validation {
                        match validate(&dataset) {
                            Ok(report) => Some(report),
                            Err(e) => {
                                warn!(error = %e, "validation could not run");
                                None
                            }
                        }
                    } else {
                        None
                    };
                    LoadResult::Complete {
                        dataset,
                        validation,
                    }
                }
                Err(e) => LoadResult::Error(e.into()),
            };
            let _ = tx.send(result);
        });
    }

    /// Handle CSV file selection
    fn handle_browse_csv(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.start_load(path);
        }
    }

    /// Check for CSV loading results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    LoadResult::Complete {
                        dataset,
                        validation,
                    } => {
                        self.control_panel.set_bounds(dataset.bounds());
                        self.control_panel.set_validation(validation.as_ref());
                        self.control_panel
                            .set_status(&format!("Loaded {} rows", dataset.row_count()));
                        self.dataset = Some(dataset);
                        self.is_loading = false;
                        should_keep_receiver = false;
                        self.recompute();
                    }
                    LoadResult::Error(err) => {
                        error!(error = %err, "dataset load failed");
                        self.dataset = None;
                        self.chart_viewer.clear();
                        self.control_panel.bounds = None;
                        self.control_panel.export_enabled = false;
                        self.control_panel.set_status(&format!("Error: {}", err));
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
        }
    }

    /// Re-run the aggregation pipeline for the current selection.
    fn recompute(&mut self) {
        let Some(dataset) = &self.dataset else {
            return;
        };

        let inputs = RenderInputs {
            selection: self.control_panel.selection(),
            weather: self.control_panel.settings.weather,
            parallel: self.config.parallel,
        };

        match stats::compute(dataset, &inputs) {
            Ok(data) => {
                self.control_panel.export_enabled = true;
                self.control_panel.set_status(&format!(
                    "{} records from {} to {}",
                    data.row_count,
                    data.range.start(),
                    data.range.end()
                ));
                self.chart_viewer.set_data(data);
            }
            Err(e) => {
                warn!(error = %e, "pipeline failed");
                self.chart_viewer.clear();
                self.control_panel.export_enabled = false;
                self.control_panel.set_status(&format!("Error: {}", e));
            }
        }
    }

    fn export_png(&self, data: &DashboardData, path: &Path) -> Result<(), DashboardError> {
        StaticChartRenderer::save_png(
            data,
            path,
            self.config.export_width,
            self.config.export_height,
        )?;
        Ok(())
    }

    /// Handle PNG export of the current dashboard
    fn handle_export_png(&mut self) {
        let Some(data) = &self.chart_viewer.data else {
            self.control_panel.set_status("Nothing to export");
            return;
        };

        let output_path = match rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name("bike_sharing_dashboard.png")
            .save_file()
        {
            Some(path) => path,
            None => return, // User cancelled
        };

        let status = match self.export_png(data, &output_path) {
            Ok(()) => format!("Exported {}", output_path.display()),
            Err(e) => {
                error!(error = %e, "export failed");
                format!("Export error: {}", e)
            }
        };
        self.control_panel.set_status(&status);
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        if self.is_loading {
            ctx.request_repaint();
        }

        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::SelectionChanged => self.recompute(),
                        ControlPanelAction::ExportPng => self.handle_export_png(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui);
        });
    }
}
