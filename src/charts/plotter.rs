//! Chart Plotter Module
//! Interactive dashboard charts drawn with egui_plot.

use crate::charts::category_label;
use crate::stats::{DerivedTable, DerivedTables, MonthYear, UserSplit};
use chrono::{Datelike, NaiveDate};
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

pub const TOTAL_COLOR: Color32 = Color32::from_rgb(52, 152, 219); // Blue
pub const REGISTERED_COLOR: Color32 = Color32::from_rgb(31, 119, 180); // tab:blue
pub const CASUAL_COLOR: Color32 = Color32::from_rgb(255, 127, 14); // tab:orange

pub const PALETTE: [Color32; 6] = [
    Color32::from_rgb(31, 119, 180),  // Blue
    Color32::from_rgb(255, 127, 14),  // Orange
    Color32::from_rgb(44, 160, 44),   // Green
    Color32::from_rgb(214, 39, 40),   // Red
    Color32::from_rgb(148, 103, 189), // Purple
    Color32::from_rgb(140, 86, 75),   // Brown
];

/// Width of one bar within a grouped pair.
const BAR_WIDTH: f64 = 0.38;

/// Format a count with thousands separators, e.g. `3,292,679`.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Plot x coordinate of a calendar day.
pub fn date_to_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

/// Inverse of [`date_to_x`] for axis labels.
pub fn x_to_date(x: f64) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

/// Draws the dashboard charts.
pub struct ChartPlotter;

impl ChartPlotter {
    /// One summary metric: caption above a large number.
    pub fn draw_metric(ui: &mut egui::Ui, caption: &str, value: u64) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(8.0)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.label(RichText::new(caption).size(13.0).color(Color32::GRAY));
                    ui.label(RichText::new(format_count(value)).size(26.0).strong());
                });
            });
    }

    /// Daily total, registered and casual rentals as three lines.
    pub fn draw_daily_chart(ui: &mut egui::Ui, tables: &DerivedTables, height: f32) {
        let series = [
            ("Total", &tables.daily_total, TOTAL_COLOR),
            ("Registered", &tables.daily_registered, REGISTERED_COLOR),
            ("Casual", &tables.daily_casual, CASUAL_COLOR),
        ];

        Plot::new("daily_rent")
            .height(height)
            .legend(Legend::default())
            .allow_scroll(false)
            .y_axis_label("Rentals")
            .x_axis_formatter(|mark, _range| {
                x_to_date(mark.value)
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                for (name, table, color) in series {
                    let points: PlotPoints = table
                        .iter()
                        .map(|(date, count)| [date_to_x(*date), *count as f64])
                        .collect();
                    plot_ui.line(Line::new(points).color(color).width(1.5).name(name));
                }
            });
    }

    /// Rentals per hour of day with markers, as in the hourly panel.
    pub fn draw_hourly_chart(ui: &mut egui::Ui, table: &DerivedTable<u8, u64>, height: f32) {
        let values: Vec<[f64; 2]> = table
            .iter()
            .map(|(hour, count)| [*hour as f64, *count as f64])
            .collect();

        Plot::new("hourly_rent")
            .height(height)
            .allow_scroll(false)
            .x_axis_label("Hour")
            .y_axis_label("Rentals")
            .include_x(0.0)
            .include_x(23.0)
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(PlotPoints::from_iter(values.iter().copied()))
                        .color(TOTAL_COLOR)
                        .width(2.0)
                        .name("Total"),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from_iter(values.iter().copied()))
                        .radius(4.0)
                        .color(TOTAL_COLOR),
                );
            });
    }

    /// Registered and casual bars side by side for each category.
    pub fn draw_split_chart(
        ui: &mut egui::Ui,
        id: &str,
        table: &DerivedTable<String, UserSplit>,
        height: f32,
    ) {
        let labels: Vec<String> = table.keys().cloned().collect();
        let mut registered = Vec::with_capacity(table.len());
        let mut casual = Vec::with_capacity(table.len());

        for (i, (key, split)) in table.iter().enumerate() {
            let x = i as f64;
            registered.push(
                Bar::new(x - BAR_WIDTH / 2.0, split.registered as f64)
                    .width(BAR_WIDTH)
                    .name(format!("{} registered", key)),
            );
            casual.push(
                Bar::new(x + BAR_WIDTH / 2.0, split.casual as f64)
                    .width(BAR_WIDTH)
                    .name(format!("{} casual", key)),
            );
        }

        Plot::new(id)
            .height(height)
            .legend(Legend::default())
            .allow_scroll(false)
            .allow_drag(false)
            .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(
                    BarChart::new(registered)
                        .color(REGISTERED_COLOR)
                        .name("Registered"),
                );
                plot_ui.bar_chart(BarChart::new(casual).color(CASUAL_COLOR).name("Casual"));
            });
    }

    /// One bar per weather situation.
    pub fn draw_weather_chart(ui: &mut egui::Ui, table: &DerivedTable<String, f64>, height: f32) {
        let labels: Vec<String> = table.keys().cloned().collect();

        Plot::new("weather_rent")
            .height(height)
            .allow_scroll(false)
            .allow_drag(false)
            .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
            .show(ui, |plot_ui| {
                for (i, (key, value)) in table.iter().enumerate() {
                    let bar = Bar::new(i as f64, *value).width(0.6).name(key);
                    plot_ui.bar_chart(
                        BarChart::new(vec![bar])
                            .color(PALETTE[i % PALETTE.len()])
                            .name(key),
                    );
                }
            });
    }

    /// Monthly totals in calendar order.
    pub fn draw_monthly_chart(
        ui: &mut egui::Ui,
        table: &DerivedTable<MonthYear, u64>,
        height: f32,
    ) {
        let labels: Vec<String> = table.keys().map(|m| m.to_string()).collect();
        let values: Vec<[f64; 2]> = table
            .values()
            .enumerate()
            .map(|(i, count)| [i as f64, *count as f64])
            .collect();

        Plot::new("monthly_rent")
            .height(height)
            .allow_scroll(false)
            .y_axis_label("Rentals")
            .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(PlotPoints::from_iter(values.iter().copied()))
                        .color(TOTAL_COLOR)
                        .width(2.0)
                        .name("Total"),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from_iter(values.iter().copied()))
                        .radius(3.5)
                        .color(TOTAL_COLOR),
                );
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(3292679), "3,292,679");
    }

    #[test]
    fn test_date_axis_round_trip() {
        let date = NaiveDate::from_ymd_opt(2012, 2, 29).unwrap();
        assert_eq!(x_to_date(date_to_x(date)), Some(date));
    }
}
