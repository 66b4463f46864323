//! Static Chart Renderer
//! Renders the dashboard panels into a single PNG with plotters.
//!
//! Layout, three rows by two columns:
//! 1. Daily rentals (total/registered/casual) | Hourly rentals
//! 2. Seasonal split (registered vs casual)   | Weather aggregate
//! 3. Working-day split                        | Monthly trend

use crate::charts::category_label;
use crate::stats::{DashboardData, DerivedTable, UserSplit};
use chrono::{Duration, NaiveDate};
use image::{ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;
use tracing::info;

const TOTAL: RGBColor = RGBColor(52, 152, 219);
const REGISTERED: RGBColor = RGBColor(31, 119, 180);
const CASUAL: RGBColor = RGBColor(255, 127, 14);
const WEATHER: [RGBColor; 4] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
];

const FONT: &str = "sans-serif";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing failed: {0}")]
    Drawing(String),
    #[error("Unsupported image size {width}x{height}")]
    Size { width: u32, height: u32 },
    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("Failed to write image: {0}")]
    Io(#[from] std::io::Error),
}

fn drawing_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Drawing(e.to_string())
}

/// Upper bound of a value axis: the maximum plus headroom, never zero.
pub fn axis_max(values: impl IntoIterator<Item = f64>) -> f64 {
    let max = values.into_iter().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        1.0
    } else {
        max * 1.1
    }
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render the whole dashboard to PNG bytes.
    pub fn render_png(
        data: &DashboardData,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, RenderError> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(3))
            .filter(|len| *len > 0)
            .ok_or_else(|| RenderError::Size { width, height })?;
        let mut buffer = vec![0u8; len];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(drawing_err)?;

            let title = format!(
                "Bike Sharing Dashboard  {} to {}",
                data.range.start(),
                data.range.end()
            );
            let root = root.titled(&title, (FONT, 28)).map_err(drawing_err)?;
            let panels = root.split_evenly((3, 2));
            let tables = &data.tables;

            Self::draw_daily(&panels[0], data)?;
            Self::draw_hourly(&panels[1], &tables.hourly_total)?;
            Self::draw_split(&panels[2], "Seasonal Rentals", &tables.seasonal_split)?;
            Self::draw_weather(
                &panels[3],
                &format!("{} Rentals by Weather", data.weather_mode.label()),
                &tables.weather,
            )?;
            Self::draw_split(&panels[4], "Working Day Rentals", &tables.working_day_split)?;
            Self::draw_monthly(&panels[5], data)?;

            root.present().map_err(drawing_err)?;
        }

        let image = RgbImage::from_raw(width, height, buffer)
            .ok_or_else(|| RenderError::Drawing("pixel buffer size mismatch".to_string()))?;
        let mut png = Vec::new();
        image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        Ok(png)
    }

    /// Render and write the PNG to `path`.
    pub fn save_png(
        data: &DashboardData,
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        let png = Self::render_png(data, width, height)?;
        std::fs::write(path, &png)?;
        info!(path = %path.display(), bytes = png.len(), "exported dashboard image");
        Ok(())
    }

    fn draw_daily(
        area: &DrawingArea<BitMapBackend, Shift>,
        data: &DashboardData,
    ) -> Result<(), RenderError> {
        let tables = &data.tables;
        let (start, end) = (data.range.start(), data.range.end());
        let y_max = axis_max(tables.daily_total.values().map(|v| *v as f64));

        let mut chart = ChartBuilder::on(area)
            .caption("Daily Rentals", (FONT, 20))
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(60)
            .build_cartesian_2d(start..end + Duration::days(1), 0.0..y_max)
            .map_err(drawing_err)?;
        chart
            .configure_mesh()
            .x_labels(5)
            .x_label_formatter(&|d: &NaiveDate| d.format("%Y-%m-%d").to_string())
            .draw()
            .map_err(drawing_err)?;

        let series: [(&str, &DerivedTable<NaiveDate, u64>, RGBColor); 3] = [
            ("Total", &tables.daily_total, TOTAL),
            ("Registered", &tables.daily_registered, REGISTERED),
            ("Casual", &tables.daily_casual, CASUAL),
        ];
        for (name, table, color) in series {
            chart
                .draw_series(LineSeries::new(
                    table.iter().map(|(d, v)| (*d, *v as f64)),
                    &color,
                ))
                .map_err(drawing_err)?
                .label(name)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], color));
        }
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(drawing_err)?;
        Ok(())
    }

    fn draw_hourly(
        area: &DrawingArea<BitMapBackend, Shift>,
        table: &DerivedTable<u8, u64>,
    ) -> Result<(), RenderError> {
        let y_max = axis_max(table.values().map(|v| *v as f64));
        let mut chart = ChartBuilder::on(area)
            .caption("Hourly Rentals", (FONT, 20))
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(60)
            .build_cartesian_2d(0.0..23.0, 0.0..y_max)
            .map_err(drawing_err)?;
        chart
            .configure_mesh()
            .x_labels(12)
            .x_desc("Hour")
            .draw()
            .map_err(drawing_err)?;

        let points: Vec<(f64, f64)> = table.iter().map(|(h, v)| (*h as f64, *v as f64)).collect();
        chart
            .draw_series(LineSeries::new(points.iter().copied(), &TOTAL))
            .map_err(drawing_err)?;
        chart
            .draw_series(points.iter().map(|p| Circle::new(*p, 4, TOTAL.filled())))
            .map_err(drawing_err)?;
        Ok(())
    }

    fn draw_split(
        area: &DrawingArea<BitMapBackend, Shift>,
        caption: &str,
        table: &DerivedTable<String, UserSplit>,
    ) -> Result<(), RenderError> {
        let labels: Vec<String> = table.keys().cloned().collect();
        let y_max = axis_max(
            table
                .values()
                .flat_map(|s| [s.registered as f64, s.casual as f64]),
        );
        let n = table.len().max(1) as f64;

        let mut chart = ChartBuilder::on(area)
            .caption(caption, (FONT, 20))
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5..n - 0.5, 0.0..y_max)
            .map_err(drawing_err)?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(table.len().max(1))
            .x_label_formatter(&|x: &f64| category_label(&labels, *x))
            .draw()
            .map_err(drawing_err)?;

        chart
            .draw_series(table.values().enumerate().map(|(i, s)| {
                let x = i as f64;
                Rectangle::new([(x - 0.4, 0.0), (x, s.registered as f64)], REGISTERED.filled())
            }))
            .map_err(drawing_err)?
            .label("Registered")
            .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], REGISTERED.filled()));
        chart
            .draw_series(table.values().enumerate().map(|(i, s)| {
                let x = i as f64;
                Rectangle::new([(x, 0.0), (x + 0.4, s.casual as f64)], CASUAL.filled())
            }))
            .map_err(drawing_err)?
            .label("Casual")
            .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], CASUAL.filled()));
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(drawing_err)?;
        Ok(())
    }

    fn draw_weather(
        area: &DrawingArea<BitMapBackend, Shift>,
        caption: &str,
        table: &DerivedTable<String, f64>,
    ) -> Result<(), RenderError> {
        let labels: Vec<String> = table.keys().cloned().collect();
        let y_max = axis_max(table.values().copied());
        let n = table.len().max(1) as f64;

        let mut chart = ChartBuilder::on(area)
            .caption(caption, (FONT, 20))
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5..n - 0.5, 0.0..y_max)
            .map_err(drawing_err)?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(table.len().max(1))
            .x_label_formatter(&|x: &f64| category_label(&labels, *x))
            .draw()
            .map_err(drawing_err)?;

        chart
            .draw_series(table.values().enumerate().map(|(i, v)| {
                let x = i as f64;
                let color = WEATHER[i % WEATHER.len()];
                Rectangle::new([(x - 0.3, 0.0), (x + 0.3, *v)], color.filled())
            }))
            .map_err(drawing_err)?;
        Ok(())
    }

    fn draw_monthly(
        area: &DrawingArea<BitMapBackend, Shift>,
        data: &DashboardData,
    ) -> Result<(), RenderError> {
        let table = &data.tables.monthly_trend;
        let labels: Vec<String> = table.keys().map(|m| m.to_string()).collect();
        let y_max = axis_max(table.values().map(|v| *v as f64));
        let n = table.len().max(1) as f64;

        let mut chart = ChartBuilder::on(area)
            .caption("Monthly Trend", (FONT, 20))
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5..n - 0.5, 0.0..y_max)
            .map_err(drawing_err)?;
        chart
            .configure_mesh()
            .x_labels(table.len().clamp(1, 12))
            .x_label_formatter(&|x: &f64| category_label(&labels, *x))
            .draw()
            .map_err(drawing_err)?;

        let points: Vec<(f64, f64)> = table
            .values()
            .enumerate()
            .map(|(i, v)| (i as f64, *v as f64))
            .collect();
        chart
            .draw_series(LineSeries::new(points.iter().copied(), &TOTAL))
            .map_err(drawing_err)?;
        chart
            .draw_series(points.iter().map(|p| Circle::new(*p, 3, TOTAL.filled())))
            .map_err(drawing_err)?;
        Ok(())
    }
}
