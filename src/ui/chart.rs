use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::color::series_color;
use crate::data::chart::ChartSeries;

// ---------------------------------------------------------------------------
// Bar chart of numeric columns
// ---------------------------------------------------------------------------

/// Grouped bars, one group per row, one bar per series. Missing cells draw
/// no bar.
pub fn bar_chart(ui: &mut Ui, id: &str, series: &[ChartSeries]) {
    if series.is_empty() {
        ui.weak("No numeric columns to chart.");
        return;
    }

    let count = series.len();
    let bar_width = 0.8 / count as f64;

    Plot::new(("bar_chart", id))
        .legend(Legend::default())
        .height(260.0)
        .x_axis_label("Row")
        .allow_scroll(false)
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            for (idx, s) in series.iter().enumerate() {
                let offset = (idx as f64 - (count - 1) as f64 / 2.0) * bar_width;
                let bars: Vec<Bar> = s
                    .values
                    .iter()
                    .enumerate()
                    .filter_map(|(row, value)| {
                        value.map(|y| Bar::new(row as f64 + offset, y).width(bar_width))
                    })
                    .collect();

                let chart = BarChart::new(bars)
                    .name(&s.name)
                    .color(series_color(idx, count));
                plot_ui.bar_chart(chart);
            }
        });
}
