use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::MailConfig;
use crate::data::catalog::Catalog;
use crate::data::filter::{self, FilterCriteria, Predicate};
use crate::data::model::{
    COL_GAME_NAME, COL_PLATFORM, CellValue, DatasetKind, FilteredView, Table,
};
use crate::data::stats::{self, Report};
use crate::export;
use crate::mail::Mailer;

// ---------------------------------------------------------------------------
// Mail status – independent of the pipeline status line
// ---------------------------------------------------------------------------

/// Outcome of the last send attempt. Kept separate from `status_message` so a
/// failed delivery never disturbs the displayed data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailStatus {
    Sent(String),
    Failed(String),
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering. Each user interaction runs
/// one synchronous pass catalog → filter → report through `refresh`.
pub struct AppState {
    pub catalog: Catalog,

    /// Currently selected dataset kind.
    pub kind: DatasetKind,

    /// Loaded table for `kind` (None while the source is unavailable).
    pub table: Option<Arc<Table>>,

    /// Column projection for the current table.
    pub selected_columns: BTreeSet<String>,

    /// Sales only: the exact record selected in the game selectbox.
    pub selected_game: Option<CellValue>,

    /// Sales only: platform membership filter.
    pub selected_platforms: BTreeSet<CellValue>,

    /// Last successfully computed view and its report. Kept in place when a
    /// later pass fails, so the screen never goes blank on an error.
    pub view: Option<FilteredView>,
    pub report: Report,

    /// Pipeline status / error message shown in the top bar.
    pub status_message: Option<String>,

    /// Recipient text-field contents.
    pub recipient: String,

    /// Outcome of the last mail attempt.
    pub mail_status: Option<MailStatus>,
}

impl AppState {
    pub fn new(catalog: Catalog) -> Self {
        let mut state = AppState {
            catalog,
            kind: DatasetKind::Trading,
            table: None,
            selected_columns: BTreeSet::new(),
            selected_game: None,
            selected_platforms: BTreeSet::new(),
            view: None,
            report: Report::default(),
            status_message: None,
            recipient: String::new(),
            mail_status: None,
        };
        state.select_dataset(DatasetKind::Trading);
        state
    }

    /// Switch dataset kind: load through the catalog, reset the criteria to
    /// the widget defaults (all columns, all platforms, first game), refilter.
    pub fn select_dataset(&mut self, kind: DatasetKind) {
        self.kind = kind;
        self.mail_status = None;

        match self.catalog.load(kind) {
            Ok(table) => {
                self.selected_columns = table.columns.iter().cloned().collect();
                if kind.has_row_predicates() {
                    self.selected_game = table.unique_values(COL_GAME_NAME).into_iter().next();
                    self.selected_platforms = table.unique_values(COL_PLATFORM);
                } else {
                    self.selected_game = None;
                    self.selected_platforms = BTreeSet::new();
                }
                self.table = Some(table);
                self.status_message = None;
                self.refresh();
            }
            Err(e) => {
                log::error!("failed to load {kind:?}: {e}");
                self.table = None;
                self.view = None;
                self.report = Report::default();
                self.status_message = Some(e.to_string());
            }
        }
    }

    /// The criteria implied by the current widget selections.
    pub fn criteria(&self) -> FilterCriteria {
        let mut criteria = FilterCriteria {
            selected_columns: self.selected_columns.clone(),
            predicates: Vec::new(),
        };
        if self.kind.has_row_predicates() {
            if let Some(game) = &self.selected_game {
                criteria = criteria.with_predicate(Predicate::Equals {
                    column: COL_GAME_NAME.to_string(),
                    value: game.clone(),
                });
            }
            criteria = criteria.with_predicate(Predicate::IsIn {
                column: COL_PLATFORM.to_string(),
                values: self.selected_platforms.clone(),
            });
        }
        criteria
    }

    /// Re-run filter + report for the current criteria. A filtering error
    /// surfaces as a status message and leaves the previously rendered view
    /// and report untouched.
    pub fn refresh(&mut self) {
        let Some(table) = &self.table else {
            return;
        };
        match filter::apply(table, &self.criteria()) {
            Ok(view) => {
                self.report = stats::build_report(self.kind, &view);
                self.view = Some(view);
                self.status_message = None;
            }
            Err(e) => {
                log::error!("filtering failed: {e}");
                self.status_message = Some(e.to_string());
            }
        }
    }

    // ---- Column projection ----

    pub fn toggle_column(&mut self, column: &str) {
        if !self.selected_columns.remove(column) {
            self.selected_columns.insert(column.to_string());
        }
        self.refresh();
    }

    pub fn select_all_columns(&mut self) {
        if let Some(table) = &self.table {
            self.selected_columns = table.columns.iter().cloned().collect();
        }
        self.refresh();
    }

    pub fn select_no_columns(&mut self) {
        self.selected_columns.clear();
        self.refresh();
    }

    // ---- Sales predicates ----

    pub fn set_game(&mut self, game: CellValue) {
        self.selected_game = Some(game);
        self.refresh();
    }

    pub fn toggle_platform(&mut self, platform: &CellValue) {
        if !self.selected_platforms.remove(platform) {
            self.selected_platforms.insert(platform.clone());
        }
        self.refresh();
    }

    pub fn select_all_platforms(&mut self) {
        if let Some(table) = &self.table {
            self.selected_platforms = table.unique_values(COL_PLATFORM);
        }
        self.refresh();
    }

    pub fn select_no_platforms(&mut self) {
        self.selected_platforms.clear();
        self.refresh();
    }

    // ---- Mail ----

    /// Export the current view and send it to `self.recipient`. One attempt;
    /// the outcome lands in `mail_status` and never touches the shown data.
    pub fn send_report(&mut self) {
        let Some(view) = &self.view else {
            self.mail_status = Some(MailStatus::Failed("nothing to send yet".to_string()));
            return;
        };

        let subject = self.report_subject();
        let body = format!("Attached is the {}.", self.report_name());
        let filename = self.report_filename();

        let result = export::to_xlsx(view).and_then(|artifact| {
            let config = MailConfig::from_env()
                .map_err(|e| crate::error::DeckError::Transport(format!("{e:#}")))?;
            Mailer::new(config).send(&self.recipient, &subject, &body, artifact, &filename)
        });

        self.mail_status = Some(match result {
            Ok(()) => MailStatus::Sent(format!("Report sent to {}", self.recipient.trim())),
            Err(e) => {
                log::error!("sending report failed: {e}");
                MailStatus::Failed(e.to_string())
            }
        });
    }

    fn report_name(&self) -> String {
        match &self.selected_game {
            Some(game) if self.kind.has_row_predicates() => format!("report for {game}"),
            _ => format!("report for {}", self.kind.label()),
        }
    }

    fn report_subject(&self) -> String {
        match &self.selected_game {
            Some(game) if self.kind.has_row_predicates() => format!("Sales report - {game}"),
            _ => format!("Data report - {}", self.kind.label()),
        }
    }

    fn report_filename(&self) -> String {
        let stem = match &self.selected_game {
            Some(game) if self.kind.has_row_predicates() => game.to_string(),
            _ => self.kind.label().to_string(),
        };
        let stem: String = stem
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        format!("report_{stem}.xlsx")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::io::Write;

    use super::*;
    use crate::data::catalog::{CachePolicy, Catalog, SystemClock};

    const SALES_CSV: &str = "\
Rank,Name,Platform,Year,Genre,Publisher,NA_Sales,EU_Sales,JP_Sales,Other_Sales,Global_Sales
1,X,PC,2000,Action,Acme,1.0,0.5,0.1,0.1,1.7
2,X,PS4,2001,Action,Acme,2.0,1.0,0.2,0.2,3.4
3,X,XBOX,2001,Action,Acme,0.5,0.2,0.0,0.0,0.7
4,Y,PC,2005,Sports,Bmax,1.0,1.0,1.0,1.0,4.0
";

    fn sales_state(dir: &tempfile::TempDir) -> AppState {
        let path = dir.path().join("vgsales.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(SALES_CSV.as_bytes()).unwrap();

        let mut paths = BTreeMap::new();
        paths.insert(DatasetKind::Sales, path);
        let catalog = Catalog::new(paths, CachePolicy::default(), Box::new(SystemClock));

        let mut state = AppState::new(catalog);
        state.select_dataset(DatasetKind::Sales);
        state
    }

    #[test]
    fn sales_defaults_select_first_game_and_all_platforms() {
        let dir = tempfile::tempdir().unwrap();
        let state = sales_state(&dir);

        assert_eq!(state.selected_game, Some(CellValue::String("X".into())));
        assert_eq!(state.selected_platforms.len(), 3);
        // Three "X" rows pass the default filter.
        assert_eq!(state.view.as_ref().unwrap().len(), 3);
        assert!(state.report.trend.is_some());
    }

    #[test]
    fn platform_subset_keeps_only_matching_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = sales_state(&dir);

        state.toggle_platform(&CellValue::String("XBOX".into()));

        let view = state.view.as_ref().unwrap();
        assert_eq!(view.len(), 2);
        let platforms = view.table.column_values(COL_PLATFORM).unwrap();
        assert_eq!(
            platforms,
            vec![
                &CellValue::String("PC".into()),
                &CellValue::String("PS4".into())
            ]
        );
    }

    #[test]
    fn failing_pass_keeps_the_previous_view() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = sales_state(&dir);
        let before = state.view.clone().unwrap();

        state.selected_columns.insert("Nonexistent".to_string());
        state.refresh();

        assert!(state.status_message.is_some());
        assert_eq!(state.view.as_ref().unwrap(), &before);
    }

    #[test]
    fn deselecting_trend_columns_degrades_gracefully() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = sales_state(&dir);

        state.toggle_column(crate::data::model::COL_RELEASE_YEAR);

        assert!(state.status_message.is_none());
        assert!(state.report.trend.is_none());
        assert!(state.view.is_some());
    }
}
