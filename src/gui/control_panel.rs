//! Control Panel Widget
//! Left side panel with the data source, date range and display options.

use crate::data::{DateBounds, DateSelection, ValidationReport};
use crate::stats::WeatherAggregation;
use chrono::{Duration, NaiveDate};
use egui::{Color32, RichText};
use std::path::PathBuf;

/// User settings for the dashboard
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UserSettings {
    pub csv_path: Option<PathBuf>,
    pub weather: WeatherAggregation,
    /// Days after the first date of the dataset.
    pub start_offset: i64,
    pub end_offset: i64,
}

/// Actions requested by the control panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    SelectionChanged,
    ExportPng,
}

/// Left side control panel with file selection and range controls.
pub struct ControlPanel {
    pub settings: UserSettings,
    pub bounds: Option<DateBounds>,
    pub status: String,
    pub validation: Option<String>,
    pub export_enabled: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            settings: UserSettings::default(),
            bounds: None,
            status: "Ready".to_string(),
            validation: None,
            export_enabled: false,
        }
    }
}

impl ControlPanel {
    pub fn new(weather: WeatherAggregation) -> Self {
        let mut panel = Self::default();
        panel.settings.weather = weather;
        panel
    }

    /// Reset the range controls to cover a newly loaded dataset.
    pub fn set_bounds(&mut self, bounds: DateBounds) {
        self.bounds = Some(bounds);
        self.settings.start_offset = 0;
        self.settings.end_offset = bounds.span_days() - 1;
    }

    pub fn set_validation(&mut self, report: Option<&ValidationReport>) {
        self.validation = report.map(ValidationReport::summary);
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    /// Current date selection; unset when no dataset is loaded.
    pub fn selection(&self) -> DateSelection {
        match self.bounds {
            Some(bounds) => DateSelection::new(
                bounds.min + Duration::days(self.settings.start_offset),
                bounds.min + Duration::days(self.settings.end_offset),
            ),
            None => DateSelection::default(),
        }
    }

    fn date_slider(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut i64,
        min: NaiveDate,
        last: i64,
    ) -> bool {
        ui.horizontal(|ui| {
            ui.add_sized([45.0, 20.0], egui::Label::new(label));
            ui.add(
                egui::Slider::new(value, 0..=last)
                    .show_value(true)
                    .custom_formatter(move |n, _| {
                        (min + Duration::days(n as i64)).format("%Y-%m-%d").to_string()
                    }),
            )
            .changed()
        })
        .inner
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🚲 Bike Sharing")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(RichText::new("Usage Dashboard").size(11.0).color(Color32::GRAY));
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .settings
                        .csv_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(
                        if self.settings.csv_path.is_some() {
                            Color32::WHITE
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = ControlPanelAction::BrowseCsv;
                        }
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Date Range Section =====
        ui.label(RichText::new("📅 Date Range").size(14.0).strong());
        ui.add_space(8.0);

        match self.bounds {
            Some(bounds) => {
                let last = bounds.span_days() - 1;
                let start_changed = Self::date_slider(
                    ui,
                    "Start:",
                    &mut self.settings.start_offset,
                    bounds.min,
                    last,
                );
                let end_changed =
                    Self::date_slider(ui, "End:", &mut self.settings.end_offset, bounds.min, last);

                // Keep start <= end by moving the other handle.
                if start_changed && self.settings.start_offset > self.settings.end_offset {
                    self.settings.end_offset = self.settings.start_offset;
                }
                if end_changed && self.settings.end_offset < self.settings.start_offset {
                    self.settings.start_offset = self.settings.end_offset;
                }
                if start_changed || end_changed {
                    action = ControlPanelAction::SelectionChanged;
                }

                ui.add_space(5.0);
                if ui.button("↺ Full Range").clicked() {
                    self.set_bounds(bounds);
                    action = ControlPanelAction::SelectionChanged;
                }
            }
            None => {
                ui.label(RichText::new("Load a dataset first").color(Color32::GRAY));
            }
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Weather Section =====
        ui.label(RichText::new("🌦 Weather Aggregate").size(14.0).strong());
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            let before = self.settings.weather;
            ui.radio_value(&mut self.settings.weather, WeatherAggregation::Sum, "Sum");
            ui.radio_value(&mut self.settings.weather, WeatherAggregation::Mean, "Mean");
            if before != self.settings.weather {
                action = ControlPanelAction::SelectionChanged;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export Section =====
        ui.add_enabled_ui(self.export_enabled, |ui| {
            if ui
                .add_sized([ui.available_width(), 32.0], egui::Button::new("🖼 Export PNG"))
                .clicked()
            {
                action = ControlPanelAction::ExportPng;
            }
        });

        ui.add_space(10.0);

        // ===== Status Section =====
        ui.label(RichText::new(&self.status).size(12.0).color(Color32::LIGHT_GRAY));
        if let Some(validation) = &self.validation {
            ui.label(RichText::new(validation).size(11.0).color(Color32::from_rgb(243, 156, 18)));
        }

        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> DateBounds {
        DateBounds {
            min: NaiveDate::from_ymd_opt(2011, 1, 1).unwrap(),
            max: NaiveDate::from_ymd_opt(2012, 12, 31).unwrap(),
        }
    }

    #[test]
    fn test_set_bounds_selects_full_range() {
        let mut panel = ControlPanel::new(WeatherAggregation::Mean);
        panel.set_bounds(bounds());

        let selection = panel.selection();
        assert_eq!(selection.start, Some(bounds().min));
        assert_eq!(selection.end, Some(bounds().max));
        assert_eq!(panel.settings.weather, WeatherAggregation::Mean);
    }

    #[test]
    fn test_selection_unset_without_bounds() {
        let panel = ControlPanel::new(WeatherAggregation::Sum);
        assert_eq!(panel.selection(), DateSelection::default());
    }

    #[test]
    fn test_offsets_map_to_dates() {
        let mut panel = ControlPanel::new(WeatherAggregation::Sum);
        panel.set_bounds(bounds());
        panel.settings.start_offset = 31;
        panel.settings.end_offset = 58;

        let selection = panel.selection();
        assert_eq!(selection.start, NaiveDate::from_ymd_opt(2011, 2, 1));
        assert_eq!(selection.end, NaiveDate::from_ymd_opt(2011, 2, 28));
    }
}
