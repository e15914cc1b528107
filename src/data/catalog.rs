use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use calamine::{Data, Reader, Xlsx};

use super::model::{CellValue, DatasetKind, Table};
use crate::error::DeckError;

// ---------------------------------------------------------------------------
// Clock – injectable time source so cache expiry is testable
// ---------------------------------------------------------------------------

pub trait Clock {
    fn now(&self) -> Instant;
}

/// The real wall clock used by the application.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

// ---------------------------------------------------------------------------
// Cache policy
// ---------------------------------------------------------------------------

/// Bound and lifetime of cached tables. Oldest entry is evicted first once
/// `max_entries` is exceeded; an entry older than `ttl` is reloaded on next
/// access.
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    pub max_entries: usize,
    pub ttl: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        CachePolicy {
            max_entries: 8,
            ttl: Duration::from_secs(3600),
        }
    }
}

struct CacheEntry {
    table: Arc<Table>,
    loaded_at: Instant,
}

// ---------------------------------------------------------------------------
// Catalog – dataset id → loaded, renamed, cached Table
// ---------------------------------------------------------------------------

/// Maps each [`DatasetKind`] to its source file and serves loaded tables out
/// of a bounded, time-expiring cache.
pub struct Catalog {
    paths: BTreeMap<DatasetKind, PathBuf>,
    policy: CachePolicy,
    clock: Box<dyn Clock>,
    cache: BTreeMap<DatasetKind, CacheEntry>,
    /// Insertion order, oldest first. Drives eviction.
    order: Vec<DatasetKind>,
}

impl Catalog {
    pub fn new(
        paths: BTreeMap<DatasetKind, PathBuf>,
        policy: CachePolicy,
        clock: Box<dyn Clock>,
    ) -> Self {
        Catalog {
            paths,
            policy,
            clock,
            cache: BTreeMap::new(),
            order: Vec::new(),
        }
    }

    pub fn with_system_clock(paths: BTreeMap<DatasetKind, PathBuf>) -> Self {
        Self::new(paths, CachePolicy::default(), Box::new(SystemClock))
    }

    /// Load a dataset, serving a cached table while it is still fresh.
    pub fn load(&mut self, kind: DatasetKind) -> Result<Arc<Table>, DeckError> {
        let now = self.clock.now();

        if let Some(entry) = self.cache.get(&kind) {
            if now.duration_since(entry.loaded_at) < self.policy.ttl {
                return Ok(Arc::clone(&entry.table));
            }
            log::debug!("cache entry for {kind:?} expired, reloading");
        }

        let path = self
            .paths
            .get(&kind)
            .cloned()
            .ok_or_else(|| DeckError::SourceUnavailable(anyhow!("no source path configured for {kind:?}")))?;

        let table = Arc::new(load_dataset(kind, &path)?);
        log::info!(
            "loaded {kind:?} from {}: {} rows, {} columns",
            path.display(),
            table.len(),
            table.columns.len()
        );
        self.insert(kind, Arc::clone(&table), now);
        Ok(table)
    }

    fn insert(&mut self, kind: DatasetKind, table: Arc<Table>, loaded_at: Instant) {
        self.order.retain(|k| *k != kind);
        self.order.push(kind);
        self.cache.insert(kind, CacheEntry { table, loaded_at });

        while self.order.len() > self.policy.max_entries {
            let oldest = self.order.remove(0);
            self.cache.remove(&oldest);
            log::debug!("evicted {oldest:?} from the dataset cache");
        }
    }
}

// ---------------------------------------------------------------------------
// Loading – per-kind source parsing + rename mapping
// ---------------------------------------------------------------------------

/// Read the kind's source file and apply its rename mapping.
fn load_dataset(kind: DatasetKind, path: &Path) -> Result<Table, DeckError> {
    let raw = match kind {
        DatasetKind::Trading | DatasetKind::Sales => load_csv(path),
        DatasetKind::Robot => load_xlsx(path),
    }
    .map_err(DeckError::SourceUnavailable)?;

    apply_rename(raw, kind.rename_mapping())
}

/// Apply the fixed (source → display) mapping. Unmapped source columns pass
/// through unrenamed; a mapped source column absent from the table is a
/// [`DeckError::SchemaMismatch`].
fn apply_rename(
    mut table: Table,
    mapping: &[(&str, &str)],
) -> Result<Table, DeckError> {
    for (source, display) in mapping {
        match table.column_index(source) {
            Some(idx) => table.columns[idx] = (*display).to_string(),
            None => {
                return Err(DeckError::SchemaMismatch {
                    column: (*source).to_string(),
                });
            }
        }
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per line. Cell types
/// are guessed per value (int, float, bool, else string).
fn load_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() != columns.len() {
            anyhow::bail!(
                "CSV row {row_no}: has {} fields, expected {}",
                record.len(),
                columns.len()
            );
        }
        rows.push(record.iter().map(guess_cell_type).collect());
    }

    Ok(Table::new(columns, rows))
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// XLSX loader
// ---------------------------------------------------------------------------

/// Load the first worksheet of an xlsx workbook. The first row is taken as
/// the header; date cells become [`CellValue::Date`] text so the correlation
/// view can parse them later.
fn load_xlsx(path: &Path) -> Result<Table> {
    let mut workbook: Xlsx<_> = calamine::open_workbook(path).context("opening xlsx")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("xlsx has no worksheets")?
        .context("reading first worksheet")?;

    let mut row_iter = range.rows();
    let columns: Vec<String> = row_iter
        .next()
        .context("xlsx missing header row")?
        .iter()
        .map(|c| c.to_string())
        .collect();

    let mut rows = Vec::new();
    for row in row_iter {
        let mut cells: Vec<CellValue> = row.iter().map(xlsx_cell).collect();
        // Ragged trailing cells are padded so the table invariant holds.
        cells.resize(columns.len(), CellValue::Null);
        cells.truncate(columns.len());
        rows.push(cells);
    }

    Ok(Table::new(columns, rows))
}

fn xlsx_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => CellValue::Date(naive.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => CellValue::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) => CellValue::Date(s.clone()),
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::io::Write;
    use std::rc::Rc;

    use super::*;
    use crate::data::model::{COL_GAME_NAME, COL_RELEASE_YEAR};

    struct FakeClock(Rc<Cell<Instant>>);

    impl Clock for FakeClock {
        fn now(&self) -> Instant {
            self.0.get()
        }
    }

    const SALES_CSV: &str = "\
Rank,Name,Platform,Year,Genre,Publisher,NA_Sales,EU_Sales,JP_Sales,Other_Sales,Global_Sales
1,X,PC,2000,Action,Acme,1.0,0.5,0.1,0.1,1.7
2,X,PS4,2001,Action,Acme,2.0,1.0,0.2,0.2,3.4
";

    fn write_sales_csv(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join("vgsales.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn catalog_with(
        paths: BTreeMap<DatasetKind, PathBuf>,
        policy: CachePolicy,
    ) -> (Catalog, Rc<Cell<Instant>>) {
        let now = Rc::new(Cell::new(Instant::now()));
        let catalog = Catalog::new(paths, policy, Box::new(FakeClock(Rc::clone(&now))));
        (catalog, now)
    }

    #[test]
    fn load_applies_rename_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = BTreeMap::new();
        paths.insert(DatasetKind::Sales, write_sales_csv(dir.path(), SALES_CSV));

        let (mut catalog, _) = catalog_with(paths, CachePolicy::default());
        let table = catalog.load(DatasetKind::Sales).unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.column_index(COL_GAME_NAME).is_some());
        assert!(table.column_index(COL_RELEASE_YEAR).is_some());
        assert!(table.column_index("Name").is_none());
    }

    #[test]
    fn missing_mapped_column_is_schema_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vgsales.csv");
        std::fs::write(&path, "Rank,Name\n1,X\n").unwrap();
        let mut paths = BTreeMap::new();
        paths.insert(DatasetKind::Sales, path);

        let (mut catalog, _) = catalog_with(paths, CachePolicy::default());
        let err = catalog.load(DatasetKind::Sales).unwrap_err();
        assert!(matches!(err, DeckError::SchemaMismatch { column } if column == "Platform"));
    }

    #[test]
    fn missing_file_is_source_unavailable() {
        let mut paths = BTreeMap::new();
        paths.insert(DatasetKind::Sales, PathBuf::from("/nonexistent/vgsales.csv"));

        let (mut catalog, _) = catalog_with(paths, CachePolicy::default());
        let err = catalog.load(DatasetKind::Sales).unwrap_err();
        assert!(matches!(err, DeckError::SourceUnavailable(_)));
    }

    #[test]
    fn fresh_entry_is_served_from_cache_until_ttl() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sales_csv(dir.path(), SALES_CSV);
        let mut paths = BTreeMap::new();
        paths.insert(DatasetKind::Sales, path.clone());

        let policy = CachePolicy {
            max_entries: 8,
            ttl: Duration::from_secs(60),
        };
        let (mut catalog, now) = catalog_with(paths, policy);

        assert_eq!(catalog.load(DatasetKind::Sales).unwrap().len(), 2);

        // Shrink the file on disk; a fresh cache entry must mask the change.
        let one_row = SALES_CSV.lines().take(2).collect::<Vec<_>>().join("\n");
        std::fs::write(&path, one_row).unwrap();
        assert_eq!(catalog.load(DatasetKind::Sales).unwrap().len(), 2);

        // Past the TTL the table is reloaded from disk.
        now.set(now.get() + Duration::from_secs(61));
        assert_eq!(catalog.load(DatasetKind::Sales).unwrap().len(), 1);
    }

    #[test]
    fn capacity_overflow_evicts_oldest_entry() {
        let dir = tempfile::tempdir().unwrap();
        let sales_path = write_sales_csv(dir.path(), SALES_CSV);
        let trading_path = dir.path().join("btc.csv");
        std::fs::write(
            &trading_path,
            "Open time,Open,High,Low,Close,Quote asset volume,Number of trades,\
Taker buy base asset volume,Taker buy quote asset volume,Ignore\n\
1,2.0,3.0,1.0,2.5,10.0,5,4.0,4.5,0\n",
        )
        .unwrap();

        let mut paths = BTreeMap::new();
        paths.insert(DatasetKind::Sales, sales_path.clone());
        paths.insert(DatasetKind::Trading, trading_path);

        let policy = CachePolicy {
            max_entries: 1,
            ttl: Duration::from_secs(3600),
        };
        let (mut catalog, _) = catalog_with(paths, policy);

        catalog.load(DatasetKind::Sales).unwrap();
        catalog.load(DatasetKind::Trading).unwrap();

        // Sales was evicted: a changed file is picked up immediately even
        // though the TTL has not elapsed.
        let one_row = SALES_CSV.lines().take(2).collect::<Vec<_>>().join("\n");
        std::fs::write(&sales_path, one_row).unwrap();
        assert_eq!(catalog.load(DatasetKind::Sales).unwrap().len(), 1);
    }
}
