use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell in a table column
// ---------------------------------------------------------------------------

/// A dynamically-typed table cell mirroring common dataframe dtypes.
/// Using `BTreeMap` / `BTreeSet` downstream so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Date kept as text; parsed on demand by the correlation view.
    Date(String),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
                Date(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) | (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) | CellValue::Date(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64` for aggregation.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Table – named equal-length columns, row-major storage
// ---------------------------------------------------------------------------

/// An in-memory table: ordered unique column names plus one `Vec<CellValue>`
/// per row, every row exactly `columns.len()` cells long.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Table { columns, rows }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a display column name, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column, in row order. `None` if the column is absent.
    pub fn column_values(&self, name: &str) -> Option<Vec<&CellValue>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// Sorted set of distinct values in a column (empty set if absent).
    pub fn unique_values(&self, name: &str) -> BTreeSet<CellValue> {
        match self.column_index(name) {
            Some(idx) => self.rows.iter().map(|r| r[idx].clone()).collect(),
            None => BTreeSet::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// FilteredView – projection + row-predicate result
// ---------------------------------------------------------------------------

/// A `Table` restricted to the user's selected columns and to the rows that
/// pass all active predicates. Column order follows the source table; row
/// order is preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView {
    pub table: Table,
}

impl FilteredView {
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

// ---------------------------------------------------------------------------
// DatasetKind – the closed set of supported dataset shapes
// ---------------------------------------------------------------------------

/// Display name of the record-identifying column of the sales dataset.
pub const COL_GAME_NAME: &str = "Game Name";
/// Display name of the categorical platform column of the sales dataset.
pub const COL_PLATFORM: &str = "Platform";
/// Period column for the sales trend series.
pub const COL_RELEASE_YEAR: &str = "Release Year";
/// Metric column for the sales trend series.
pub const COL_GLOBAL_SALES: &str = "Global Sales (millions)";
/// Date column of the robot trading log.
pub const COL_DATE: &str = "Date";
/// Price column of the robot trading log.
pub const COL_PRICE: &str = "Price";

/// One variant per supported dataset shape. Each kind carries its own rename
/// mapping and derived-view capabilities, so dispatch happens on a single
/// tagged variant instead of repeated string comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DatasetKind {
    /// BTC/USD minute bars (csv).
    Trading,
    /// Video-game sales records (csv).
    Sales,
    /// Network trading-robot log (xlsx).
    Robot,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 3] =
        [DatasetKind::Trading, DatasetKind::Sales, DatasetKind::Robot];

    /// Human-readable name shown in the dataset selector.
    pub fn label(&self) -> &'static str {
        match self {
            DatasetKind::Trading => "Trading (BTC/USD)",
            DatasetKind::Sales => "Video-game sales",
            DatasetKind::Robot => "Robot trading log",
        }
    }

    /// Title shown above the preview.
    pub fn title(&self) -> &'static str {
        match self {
            DatasetKind::Trading => "Currency Analysis: BTC/USD",
            DatasetKind::Sales => "Data Analysis: Video-game Sales",
            DatasetKind::Robot => "Data Analysis: Trading Robot",
        }
    }

    /// Fixed (source name → display name) pairs applied once at load time.
    /// Source columns not listed here pass through unrenamed; a listed source
    /// column absent from the file is a schema mismatch.
    pub fn rename_mapping(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            DatasetKind::Trading => &[
                ("Open time", "Open Time"),
                ("Open", "Open"),
                ("High", "High"),
                ("Low", "Low"),
                ("Close", "Close"),
                ("Quote asset volume", "Quote Asset Volume"),
                ("Number of trades", "Number of Trades"),
                ("Taker buy base asset volume", "Taker Buy Base Volume"),
                ("Taker buy quote asset volume", "Taker Buy Quote Volume"),
                ("Ignore", "Ignore"),
            ],
            DatasetKind::Sales => &[
                ("Rank", "Rank"),
                ("Name", COL_GAME_NAME),
                ("Platform", COL_PLATFORM),
                ("Year", COL_RELEASE_YEAR),
                ("Genre", "Genre"),
                ("Publisher", "Publisher"),
                ("NA_Sales", "NA Sales (millions)"),
                ("EU_Sales", "EU Sales (millions)"),
                ("JP_Sales", "JP Sales (millions)"),
                ("Other_Sales", "Other Sales (millions)"),
                ("Global_Sales", COL_GLOBAL_SALES),
            ],
            // The robot log is used with its source headers as-is.
            DatasetKind::Robot => &[],
        }
    }

    /// Whether this kind defines row predicates (record selectbox + category
    /// multiselect).
    pub fn has_row_predicates(&self) -> bool {
        matches!(self, DatasetKind::Sales)
    }

    /// Whether the grouped trend series applies.
    pub fn has_trend_series(&self) -> bool {
        matches!(self, DatasetKind::Sales)
    }

    /// Whether the date/price chart and correlation matrix apply.
    pub fn has_correlation(&self) -> bool {
        matches!(self, DatasetKind::Robot)
    }
}
