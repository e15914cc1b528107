use eframe::egui::Ui;
use egui_plot::{Line, Plot, PlotPoints};

// ---------------------------------------------------------------------------
// Trend chart – summed metric per period (sales dataset)
// ---------------------------------------------------------------------------

/// Render the grouped trend series as a line chart.
pub fn trend_plot(ui: &mut Ui, series: &[(f64, f64)], title: &str) {
    let points: PlotPoints = series.iter().map(|&(x, y)| [x, y]).collect();
    let line = Line::new(points).name(title).width(1.5);

    Plot::new("trend_plot")
        .height(260.0)
        .x_axis_label("Release Year")
        .y_axis_label("Global Sales (millions)")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(line);
        });
}

// ---------------------------------------------------------------------------
// Price chart – price over time (robot dataset)
// ---------------------------------------------------------------------------

/// Render the robot log's price-over-time series.
pub fn price_plot(ui: &mut Ui, series: &[(f64, f64)]) {
    let points: PlotPoints = series.iter().map(|&(x, y)| [x, y]).collect();
    let line = Line::new(points).name("Price").width(1.5);

    Plot::new("price_plot")
        .height(260.0)
        .x_axis_label("Date (unix time)")
        .y_axis_label("Price")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(line);
        });
}
