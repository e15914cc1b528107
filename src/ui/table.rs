use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::FilteredView;
use crate::data::stats::{ColumnStats, CorrelationMatrix};

/// Preview at most this many rows; the export always contains all of them.
const PREVIEW_ROWS: usize = 100;

// ---------------------------------------------------------------------------
// Filtered-data preview
// ---------------------------------------------------------------------------

/// Render the first rows of the filtered view as a striped table.
pub fn preview_table(ui: &mut Ui, view: &FilteredView) {
    if view.table.columns.is_empty() {
        ui.label("No columns selected.");
        return;
    }

    let n_rows = view.len().min(PREVIEW_ROWS);
    TableBuilder::new(ui)
        .striped(true)
        .columns(Column::auto().resizable(true), view.table.columns.len())
        .header(20.0, |mut header| {
            for name in &view.table.columns {
                header.col(|ui: &mut Ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, n_rows, |mut row| {
                let idx = row.index();
                for cell in &view.table.rows[idx] {
                    row.col(|ui: &mut Ui| {
                        ui.label(cell.to_string());
                    });
                }
            });
        });

    if view.len() > PREVIEW_ROWS {
        ui.label(format!(
            "Showing {PREVIEW_ROWS} of {} rows.",
            view.len()
        ));
    }
}

// ---------------------------------------------------------------------------
// Descriptive-statistics grid
// ---------------------------------------------------------------------------

/// Render per-column count/mean/std/min/quartiles/max.
pub fn stats_grid(ui: &mut Ui, stats: &[ColumnStats]) {
    if stats.is_empty() {
        ui.label("No numeric data in the current selection.");
        return;
    }

    egui::Grid::new("stats_grid").striped(true).show(ui, |ui: &mut Ui| {
        for header in ["column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"] {
            ui.strong(header);
        }
        ui.end_row();

        for s in stats {
            ui.label(&s.column);
            ui.label(s.count.to_string());
            ui.label(fmt(s.mean));
            ui.label(fmt(s.std));
            ui.label(fmt(s.min));
            ui.label(fmt(s.q25));
            ui.label(fmt(s.median));
            ui.label(fmt(s.q75));
            ui.label(fmt(s.max));
            ui.end_row();
        }
    });
}

// ---------------------------------------------------------------------------
// Correlation grid
// ---------------------------------------------------------------------------

/// Render the pairwise Pearson correlation matrix.
pub fn correlation_grid(ui: &mut Ui, matrix: &CorrelationMatrix) {
    egui::Grid::new("correlation_grid")
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            ui.strong("");
            for name in &matrix.columns {
                ui.strong(name);
            }
            ui.end_row();

            for (i, name) in matrix.columns.iter().enumerate() {
                ui.strong(name);
                for value in &matrix.values[i] {
                    ui.label(fmt(*value));
                }
                ui.end_row();
            }
        });
}

fn fmt(v: f64) -> String {
    if v.is_nan() {
        "-".to_string()
    } else {
        format!("{v:.4}")
    }
}
