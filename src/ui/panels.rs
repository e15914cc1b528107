use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::model::{COL_GAME_NAME, COL_PLATFORM, DatasetKind};
use crate::state::{AppState, MailStatus};
use crate::ui::{plot, table};

// ---------------------------------------------------------------------------
// Top bar – dataset selector, row counts, status
// ---------------------------------------------------------------------------

/// Render the top toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.strong("Dataset");
        egui::ComboBox::from_id_salt("dataset_kind")
            .selected_text(state.kind.label())
            .show_ui(ui, |ui: &mut Ui| {
                for kind in DatasetKind::ALL {
                    if ui.selectable_label(state.kind == kind, kind.label()).clicked() {
                        state.select_dataset(kind);
                    }
                }
            });

        ui.separator();

        if let (Some(tbl), Some(view)) = (&state.table, &state.view) {
            ui.label(format!("{} rows loaded, {} after filters", tbl.len(), view.len()));
        }

        ui.separator();

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – filter widgets + send-report form
// ---------------------------------------------------------------------------

/// Render the filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(dataset) = state.table.clone() else {
        ui.label("Dataset not loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Column projection ----
            let columns = dataset.columns.clone();
            let header = format!(
                "Columns  ({}/{})",
                state.selected_columns.len(),
                columns.len()
            );
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("columns")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.select_all_columns();
                        }
                        if ui.small_button("None").clicked() {
                            state.select_no_columns();
                        }
                    });
                    for col in &columns {
                        let mut checked = state.selected_columns.contains(col);
                        if ui.checkbox(&mut checked, col).changed() {
                            state.toggle_column(col);
                        }
                    }
                });

            // ---- Sales-only predicates ----
            if state.kind.has_row_predicates() {
                ui.separator();
                ui.strong("Game");
                let games = dataset.unique_values(COL_GAME_NAME);
                let current = state
                    .selected_game
                    .as_ref()
                    .map(|g| g.to_string())
                    .unwrap_or_default();
                egui::ComboBox::from_id_salt("game_select")
                    .selected_text(&current)
                    .show_ui(ui, |ui: &mut Ui| {
                        for game in &games {
                            let label = game.to_string();
                            if ui.selectable_label(current == label, label).clicked() {
                                state.set_game(game.clone());
                            }
                        }
                    });

                let platforms = dataset.unique_values(COL_PLATFORM);
                let header = format!(
                    "Platforms  ({}/{})",
                    state.selected_platforms.len(),
                    platforms.len()
                );
                egui::CollapsingHeader::new(RichText::new(header).strong())
                    .id_salt("platforms")
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all_platforms();
                            }
                            if ui.small_button("None").clicked() {
                                state.select_no_platforms();
                            }
                        });
                        for platform in &platforms {
                            let mut checked = state.selected_platforms.contains(platform);
                            if ui.checkbox(&mut checked, platform.to_string()).changed() {
                                state.toggle_platform(platform);
                            }
                        }
                    });
            }

            // ---- Send report by email ----
            ui.separator();
            ui.strong("Send report by email");
            ui.text_edit_singleline(&mut state.recipient);
            if ui.button("Send").clicked() {
                // Blocking send; the interaction completes when it returns.
                state.send_report();
            }
            match &state.mail_status {
                Some(MailStatus::Sent(msg)) => {
                    ui.label(RichText::new(msg).color(Color32::DARK_GREEN));
                }
                Some(MailStatus::Failed(msg)) => {
                    ui.label(RichText::new(msg).color(Color32::RED));
                }
                None => {}
            }
        });
}

// ---------------------------------------------------------------------------
// Central panel – preview, statistics, charts
// ---------------------------------------------------------------------------

/// Render the preview, statistics, and the kind-specific derived views.
pub fn central_panel(ui: &mut Ui, state: &AppState) {
    let Some(view) = &state.view else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Select a dataset to begin.");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading(state.kind.title());
            ui.add_space(4.0);

            ui.strong("Filtered Data");
            ui.push_id("preview", |ui: &mut Ui| {
                table::preview_table(ui, view);
            });
            ui.add_space(8.0);

            ui.strong("Summary Statistics");
            table::stats_grid(ui, &state.report.stats);
            ui.add_space(8.0);

            match state.kind {
                DatasetKind::Sales => sales_section(ui, state),
                DatasetKind::Robot => robot_section(ui, state),
                DatasetKind::Trading => {}
            }
        });
}

fn sales_section(ui: &mut Ui, state: &AppState) {
    let game = state
        .selected_game
        .as_ref()
        .map(|g| g.to_string())
        .unwrap_or_default();

    ui.strong(format!("Global sales over time: {game}"));
    match &state.report.trend {
        Some(series) if !series.is_empty() => {
            plot::trend_plot(ui, series, &game);
            ui.add_space(4.0);
            ui.label(format!(
                "The chart above shows the global sales of {game} per release year. \
Rises and falls across periods reflect platform, region, and popularity effects.",
            ));
        }
        Some(_) => {
            ui.label("No rows left after filtering.");
        }
        None => {
            ui.label(
                "The columns 'Release Year' and 'Global Sales (millions)' are not part of \
the current selection.",
            );
        }
    }
}

fn robot_section(ui: &mut Ui, state: &AppState) {
    ui.strong("Price over time");
    match &state.report.price_series {
        Some(series) if !series.is_empty() => plot::price_plot(ui, series),
        _ => {
            ui.label("The columns 'Date' and 'Price' are not part of the current selection.");
        }
    }
    ui.add_space(8.0);

    ui.strong("Correlation between numeric columns");
    match &state.report.correlation {
        Some(matrix) => table::correlation_grid(ui, matrix),
        None => {
            ui.label("Not enough numeric columns selected for a correlation matrix.");
        }
    }
}
