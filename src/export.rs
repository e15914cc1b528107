use rust_xlsxwriter::{Workbook, XlsxError};

use crate::data::model::{CellValue, FilteredView};
use crate::error::DeckError;

/// Sheet name of the exported artifact.
pub const SHEET_NAME: &str = "Filtered Data";

// ---------------------------------------------------------------------------
// FilteredView → single-sheet xlsx bytes
// ---------------------------------------------------------------------------

/// Serialize a filtered view as a single-sheet xlsx workbook: one header row
/// with the view's column names, then one row per record, columns in view
/// order. Pure; the only failure mode is [`DeckError::Serialization`].
pub fn to_xlsx(view: &FilteredView) -> Result<Vec<u8>, DeckError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME).map_err(ser)?;

    for (col, name) in view.table.columns.iter().enumerate() {
        sheet.write_string(0, col as u16, name).map_err(ser)?;
    }

    for (row_no, row) in view.table.rows.iter().enumerate() {
        let xlsx_row = (row_no + 1) as u32;
        for (col_no, cell) in row.iter().enumerate() {
            let xlsx_col = col_no as u16;
            match cell {
                CellValue::String(s) | CellValue::Date(s) => {
                    sheet.write_string(xlsx_row, xlsx_col, s).map_err(ser)?;
                }
                CellValue::Integer(i) => {
                    sheet.write_number(xlsx_row, xlsx_col, *i as f64).map_err(ser)?;
                }
                CellValue::Float(v) => {
                    sheet.write_number(xlsx_row, xlsx_col, *v).map_err(ser)?;
                }
                CellValue::Bool(b) => {
                    sheet.write_boolean(xlsx_row, xlsx_col, *b).map_err(ser)?;
                }
                // Null cells stay blank.
                CellValue::Null => {}
            }
        }
    }

    workbook.save_to_buffer().map_err(ser)
}

fn ser(err: XlsxError) -> DeckError {
    DeckError::Serialization(err.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use calamine::{Data, Reader, Xlsx};

    use super::*;
    use crate::data::model::Table;

    fn sample_view() -> FilteredView {
        FilteredView {
            table: Table::new(
                vec!["Game Name".to_string(), "Global Sales (millions)".to_string()],
                vec![
                    vec![
                        CellValue::String("X".to_string()),
                        CellValue::Float(1.5),
                    ],
                    vec![
                        CellValue::String("Y".to_string()),
                        CellValue::Float(2.25),
                    ],
                ],
            ),
        }
    }

    #[test]
    fn export_round_trips_through_a_spreadsheet_reader() {
        let view = sample_view();
        let bytes = to_xlsx(&view).unwrap();

        let cursor = std::io::Cursor::new(bytes);
        let mut workbook: Xlsx<_> = Xlsx::new(cursor).unwrap();
        let range = workbook.worksheet_range(SHEET_NAME).unwrap();

        let rows: Vec<&[Data]> = range.rows().collect();
        assert_eq!(rows.len(), 3);

        // Header row matches the view's columns, in order.
        assert_eq!(rows[0][0], Data::String("Game Name".to_string()));
        assert_eq!(
            rows[0][1],
            Data::String("Global Sales (millions)".to_string())
        );

        // Data rows match values and order.
        assert_eq!(rows[1][0], Data::String("X".to_string()));
        assert_eq!(rows[1][1], Data::Float(1.5));
        assert_eq!(rows[2][0], Data::String("Y".to_string()));
        assert_eq!(rows[2][1], Data::Float(2.25));
    }

    #[test]
    fn empty_view_still_produces_a_header_row() {
        let view = FilteredView {
            table: Table::new(vec!["Rank".to_string()], Vec::new()),
        };
        let bytes = to_xlsx(&view).unwrap();

        let cursor = std::io::Cursor::new(bytes);
        let mut workbook: Xlsx<_> = Xlsx::new(cursor).unwrap();
        let range = workbook.worksheet_range(SHEET_NAME).unwrap();
        let rows: Vec<&[Data]> = range.rows().collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], Data::String("Rank".to_string()));
    }
}
