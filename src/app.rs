use eframe::egui;

use crate::config;
use crate::data::catalog::Catalog;
use crate::state::AppState;
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DataDeckApp {
    pub state: AppState,
}

impl Default for DataDeckApp {
    fn default() -> Self {
        let paths = config::load_data_paths().into_catalog_paths();
        Self {
            state: AppState::new(Catalog::with_system_clock(paths)),
        }
    }
}

impl eframe::App for DataDeckApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: dataset selector + status ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters + mail form ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: preview, statistics, charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::central_panel(ui, &self.state);
        });
    }
}
