use std::collections::BTreeSet;

use super::model::{CellValue, FilteredView, Table};
use crate::error::DeckError;

// ---------------------------------------------------------------------------
// Predicates – column-scoped row conditions
// ---------------------------------------------------------------------------

/// A single column-scoped filter condition. All predicates of a request are
/// ANDed together.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Row passes when its value for `column` equals `value` exactly.
    Equals { column: String, value: CellValue },
    /// Row passes when its value for `column` is a member of `values`.
    /// An empty set matches nothing, never "no filter".
    IsIn {
        column: String,
        values: BTreeSet<CellValue>,
    },
}

impl Predicate {
    pub fn column(&self) -> &str {
        match self {
            Predicate::Equals { column, .. } | Predicate::IsIn { column, .. } => column,
        }
    }

    fn matches(&self, value: &CellValue) -> bool {
        match self {
            Predicate::Equals { value: expected, .. } => value == expected,
            Predicate::IsIn { values, .. } => values.contains(value),
        }
    }
}

// ---------------------------------------------------------------------------
// FilterCriteria – one user interaction's worth of filtering
// ---------------------------------------------------------------------------

/// Column projection plus row predicates, built fresh per interaction.
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    /// Display names of the columns to keep. Must be a subset of the table's
    /// columns; projection order follows the table, not this set.
    pub selected_columns: BTreeSet<String>,
    pub predicates: Vec<Predicate>,
}

impl FilterCriteria {
    /// Criteria selecting every column of `table` with no predicates.
    pub fn all_columns(table: &Table) -> Self {
        FilterCriteria {
            selected_columns: table.columns.iter().cloned().collect(),
            predicates: Vec::new(),
        }
    }

    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }
}

// ---------------------------------------------------------------------------
// apply – projection + ANDed predicates → FilteredView
// ---------------------------------------------------------------------------

/// Apply `criteria` to `table`.
///
/// * The result holds exactly the selected columns, in table order.
/// * A selected or predicate column absent from the projection is an
///   [`DeckError::UnknownColumn`].
/// * Zero predicates passes all rows; row order is always preserved.
pub fn apply(table: &Table, criteria: &FilterCriteria) -> Result<FilteredView, DeckError> {
    for col in &criteria.selected_columns {
        if table.column_index(col).is_none() {
            return Err(DeckError::UnknownColumn { column: col.clone() });
        }
    }

    // Projected column indices, in source order.
    let projection: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .filter(|(_, name)| criteria.selected_columns.contains(*name))
        .map(|(idx, _)| idx)
        .collect();

    // Predicates evaluate against the projected view, so their columns must
    // survive the projection.
    let mut predicate_indices = Vec::with_capacity(criteria.predicates.len());
    for pred in &criteria.predicates {
        let idx = table.column_index(pred.column()).filter(|_| {
            criteria.selected_columns.contains(pred.column())
        });
        match idx {
            Some(idx) => predicate_indices.push((idx, pred)),
            None => {
                return Err(DeckError::UnknownColumn {
                    column: pred.column().to_string(),
                });
            }
        }
    }

    let columns: Vec<String> = projection
        .iter()
        .map(|&idx| table.columns[idx].clone())
        .collect();

    let rows: Vec<Vec<CellValue>> = table
        .rows
        .iter()
        .filter(|row| {
            predicate_indices
                .iter()
                .all(|(idx, pred)| pred.matches(&row[*idx]))
        })
        .map(|row| projection.iter().map(|&idx| row[idx].clone()).collect())
        .collect();

    Ok(FilteredView {
        table: Table::new(columns, rows),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{COL_GAME_NAME, COL_PLATFORM};

    fn sales_table() -> Table {
        let columns = vec![
            COL_GAME_NAME.to_string(),
            COL_PLATFORM.to_string(),
            "Rank".to_string(),
        ];
        let rows = vec![
            vec![s("X"), s("PC"), CellValue::Integer(1)],
            vec![s("X"), s("PS4"), CellValue::Integer(2)],
            vec![s("X"), s("XBOX"), CellValue::Integer(3)],
            vec![s("Y"), s("PC"), CellValue::Integer(4)],
        ];
        Table::new(columns, rows)
    }

    fn s(v: &str) -> CellValue {
        CellValue::String(v.to_string())
    }

    #[test]
    fn empty_predicates_keep_all_rows_and_selected_columns() {
        let table = sales_table();
        let criteria = FilterCriteria {
            selected_columns: [COL_GAME_NAME.to_string(), "Rank".to_string()].into(),
            predicates: Vec::new(),
        };

        let view = apply(&table, &criteria).unwrap();
        assert_eq!(view.table.columns, vec![COL_GAME_NAME, "Rank"]);
        assert_eq!(view.len(), 4);
        // Row order preserved.
        let ranks: Vec<CellValue> = view
            .table
            .column_values("Rank")
            .unwrap()
            .into_iter()
            .cloned()
            .collect();
        let expected: Vec<CellValue> = (1..=4).map(CellValue::Integer).collect();
        assert_eq!(ranks, expected);
    }

    #[test]
    fn empty_membership_set_matches_nothing() {
        let table = sales_table();
        let criteria = FilterCriteria::all_columns(&table).with_predicate(Predicate::IsIn {
            column: COL_PLATFORM.to_string(),
            values: BTreeSet::new(),
        });

        let view = apply(&table, &criteria).unwrap();
        assert!(view.is_empty());
    }

    #[test]
    fn equals_and_membership_are_conjoined() {
        let table = sales_table();
        let criteria = FilterCriteria::all_columns(&table)
            .with_predicate(Predicate::Equals {
                column: COL_GAME_NAME.to_string(),
                value: s("X"),
            })
            .with_predicate(Predicate::IsIn {
                column: COL_PLATFORM.to_string(),
                values: [s("PC"), s("PS4")].into(),
            });

        let view = apply(&table, &criteria).unwrap();
        assert_eq!(view.len(), 2);
        let platforms = view.table.column_values(COL_PLATFORM).unwrap();
        assert_eq!(platforms, vec![&s("PC"), &s("PS4")]);
    }

    #[test]
    fn unknown_selected_column_is_rejected() {
        let table = sales_table();
        let criteria = FilterCriteria {
            selected_columns: ["Nonexistent".to_string()].into(),
            predicates: Vec::new(),
        };

        let err = apply(&table, &criteria).unwrap_err();
        assert!(matches!(err, DeckError::UnknownColumn { column } if column == "Nonexistent"));
    }

    #[test]
    fn predicate_on_deselected_column_is_rejected() {
        let table = sales_table();
        let criteria = FilterCriteria {
            selected_columns: ["Rank".to_string()].into(),
            predicates: vec![Predicate::Equals {
                column: COL_GAME_NAME.to_string(),
                value: s("X"),
            }],
        };

        let err = apply(&table, &criteria).unwrap_err();
        assert!(matches!(err, DeckError::UnknownColumn { column } if column == COL_GAME_NAME));
    }

    #[test]
    fn projection_order_follows_the_table() {
        let table = sales_table();
        // Selection sets are sorted alphabetically; the view must still use
        // table order (Game Name, Platform, Rank).
        let criteria = FilterCriteria {
            selected_columns: ["Rank".to_string(), COL_GAME_NAME.to_string()].into(),
            predicates: Vec::new(),
        };

        let view = apply(&table, &criteria).unwrap();
        assert_eq!(view.table.columns, vec![COL_GAME_NAME, "Rank"]);
    }
}
