use eframe::egui::Ui;
use egui_plot::{GridMark, Legend, Line, Plot, PlotPoints};

use crate::color::SeriesColors;
use crate::error::DashboardError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Split-difference chart (bottom panel)
// ---------------------------------------------------------------------------

/// Render the split-time differences of every visible run against the
/// selected reference run, one line per run.
pub fn split_chart(ui: &mut Ui, state: &AppState) {
    let long = match state.chart_data() {
        Ok(long) => long,
        Err(DashboardError::InvalidSelection { .. }) => {
            ui.label("Select a row in the table to compare split times.");
            return;
        }
        Err(DashboardError::InsufficientChartData) => {
            ui.label("Not enough data for a split chart (need at least two segment columns).");
            return;
        }
        Err(e) => {
            ui.label(e.to_string());
            return;
        }
    };

    // Group long-form points into one polyline per series, keeping the
    // series in first-appearance order so colours stay stable.
    let mut series: Vec<(String, Vec<[f64; 2]>)> = Vec::new();
    for point in &long.points {
        let x = long
            .segment_order
            .iter()
            .position(|s| s == &point.segment)
            .unwrap_or(0) as f64;
        match series.iter_mut().find(|(label, _)| label == &point.series) {
            Some((_, pts)) => pts.push([x, point.value]),
            None => series.push((point.series.clone(), vec![[x, point.value]])),
        }
    }

    let colors = SeriesColors::new(series.iter().map(|(label, _)| label.clone()));
    let segment_names = long.segment_order.clone();

    Plot::new("split_chart")
        .legend(Legend::default())
        .x_axis_label("Segment")
        .y_axis_label("Δ Zeit (s)")
        .x_axis_formatter(move |mark: GridMark, _range| {
            // Categorical axis: segment names at integer positions only.
            let rounded = mark.value.round();
            if (mark.value - rounded).abs() > 1e-3 || rounded < 0.0 {
                return String::new();
            }
            segment_names
                .get(rounded as usize)
                .cloned()
                .unwrap_or_default()
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (label, points) in &series {
                let line = Line::new(PlotPoints::from(points.clone()))
                    .name(label)
                    .color(colors.color_for(label))
                    .width(1.5);
                plot_ui.line(line);
            }
        });
}
