//! Charts module - Interactive and static chart rendering

mod plotter;
mod renderer;

pub use plotter::{format_count, ChartPlotter};
pub use renderer::{RenderError, StaticChartRenderer};

/// Label of the category at axis position `x`, empty between categories.
pub(crate) fn category_label(labels: &[String], x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}
