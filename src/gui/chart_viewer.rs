//! Chart Viewer Widget
//! Central scrollable panel with the summary metrics and dashboard charts.

use crate::charts::ChartPlotter;
use crate::stats::DashboardData;
use egui::{RichText, ScrollArea};

const CHART_SPACING: f32 = 15.0;
const CHART_HEIGHT: f32 = 320.0;
/// Below this width the paired charts stack vertically.
const TWO_COLUMN_MIN_WIDTH: f32 = 1100.0;

/// Displays the latest pipeline output.
#[derive(Default)]
pub struct ChartViewer {
    pub data: Option<DashboardData>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.data = None;
    }

    pub fn set_data(&mut self, data: DashboardData) {
        self.data = Some(data);
    }

    fn section(ui: &mut egui::Ui, title: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
        egui::Frame::none()
            .rounding(8.0)
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.label(RichText::new(title).size(17.0).strong());
                ui.add_space(6.0);
                add_contents(ui);
            });
        ui.add_space(CHART_SPACING);
    }

    /// Draw the metrics and charts
    pub fn show(&mut self, ui: &mut egui::Ui) {
        let Some(data) = &self.data else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        let tables = &data.tables;
        let two_columns = ui.available_width() >= TWO_COLUMN_MIN_WIDTH;

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading("Bike Sharing Dashboard 🚲");
                ui.label(format!(
                    "{} to {}  ·  {} hourly records",
                    data.range.start(),
                    data.range.end(),
                    data.row_count
                ));
                ui.add_space(10.0);

                ui.columns(3, |cols| {
                    ChartPlotter::draw_metric(&mut cols[0], "Total Users", data.totals.total);
                    ChartPlotter::draw_metric(
                        &mut cols[1],
                        "Total Registered",
                        data.totals.registered,
                    );
                    ChartPlotter::draw_metric(&mut cols[2], "Total Casual", data.totals.casual);
                });
                ui.add_space(CHART_SPACING);

                Self::section(ui, "Daily Rent", |ui| {
                    ChartPlotter::draw_daily_chart(ui, tables, CHART_HEIGHT);
                });

                let weather_title = format!("{} Rentals by Weather", data.weather_mode.label());
                let pairs: [(&str, &str); 2] = [
                    ("Hourly Rent", "Seasonal Rentals"),
                    (weather_title.as_str(), "Working Day Rentals"),
                ];
                for (row, (left, right)) in pairs.into_iter().enumerate() {
                    let draw_left = |ui: &mut egui::Ui| match row {
                        0 => {
                            ChartPlotter::draw_hourly_chart(ui, &tables.hourly_total, CHART_HEIGHT)
                        }
                        _ => ChartPlotter::draw_weather_chart(ui, &tables.weather, CHART_HEIGHT),
                    };
                    let draw_right = |ui: &mut egui::Ui| match row {
                        0 => ChartPlotter::draw_split_chart(
                            ui,
                            "season_rent",
                            &tables.seasonal_split,
                            CHART_HEIGHT,
                        ),
                        _ => ChartPlotter::draw_split_chart(
                            ui,
                            "working_day_rent",
                            &tables.working_day_split,
                            CHART_HEIGHT,
                        ),
                    };

                    if two_columns {
                        ui.columns(2, |cols| {
                            Self::section(&mut cols[0], left, draw_left);
                            Self::section(&mut cols[1], right, draw_right);
                        });
                    } else {
                        Self::section(ui, left, draw_left);
                        Self::section(ui, right, draw_right);
                    }
                }

                Self::section(ui, "Monthly Trend", |ui| {
                    ChartPlotter::draw_monthly_chart(ui, &tables.monthly_trend, CHART_HEIGHT);
                });
            });
    }
}
