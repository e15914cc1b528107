/// UI layer: egui panels, grids, and charts over [`crate::state::AppState`].
pub mod panels;
pub mod plot;
pub mod table;
