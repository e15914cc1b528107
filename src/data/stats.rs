use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};

use super::model::{
    COL_DATE, COL_GLOBAL_SALES, COL_PRICE, COL_RELEASE_YEAR, CellValue, DatasetKind, FilteredView,
};

// ---------------------------------------------------------------------------
// Report – the derived views computed from one FilteredView
// ---------------------------------------------------------------------------

/// All derived views for one pass of the pipeline. The three parts are
/// independent: any of them may be absent without affecting the others.
#[derive(Debug, Clone, Default)]
pub struct Report {
    /// Descriptive statistics per numeric column. Empty when the view has no
    /// numeric data.
    pub stats: Vec<ColumnStats>,
    /// (period, summed metric) pairs, ascending by period. Sales kind only;
    /// `None` when either required column is filtered out.
    pub trend: Option<Vec<(f64, f64)>>,
    /// (timestamp, price) pairs in row order. Robot kind only.
    pub price_series: Option<Vec<(f64, f64)>>,
    /// Pairwise Pearson correlation of the numeric columns. Robot kind only.
    pub correlation: Option<CorrelationMatrix>,
}

/// Build the full report for a dataset kind. Derived views that do not apply
/// to the kind, or whose required columns are filtered out, are omitted
/// rather than reported as errors.
pub fn build_report(kind: DatasetKind, view: &FilteredView) -> Report {
    Report {
        stats: describe(view),
        trend: kind
            .has_trend_series()
            .then(|| trend_series(view, COL_RELEASE_YEAR, COL_GLOBAL_SALES))
            .flatten(),
        price_series: kind.has_correlation().then(|| price_series(view)).flatten(),
        correlation: kind.has_correlation().then(|| correlation(view)).flatten(),
    }
}

// ---------------------------------------------------------------------------
// Descriptive statistics
// ---------------------------------------------------------------------------

/// count / mean / std / min / quartiles / max of one numeric column.
#[derive(Debug, Clone)]
pub struct ColumnStats {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n − 1 denominator); NaN below two samples.
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Per-column descriptive statistics. Non-numeric columns are skipped; null
/// and non-numeric cells inside a column are ignored. A zero-row view yields
/// an empty list, never an error.
pub fn describe(view: &FilteredView) -> Vec<ColumnStats> {
    let table = &view.table;
    let mut out = Vec::new();

    for (idx, name) in table.columns.iter().enumerate() {
        let mut values: Vec<f64> = table
            .rows
            .iter()
            .filter_map(|row| row[idx].as_f64())
            .filter(|v| v.is_finite())
            .collect();
        if values.is_empty() {
            continue;
        }
        values.sort_by(f64::total_cmp);

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        } else {
            f64::NAN
        };

        out.push(ColumnStats {
            column: name.clone(),
            count,
            mean,
            std,
            min: values[0],
            q25: percentile(&values, 0.25),
            median: percentile(&values, 0.50),
            q75: percentile(&values, 0.75),
            max: values[count - 1],
        });
    }

    out
}

/// Linearly interpolated percentile over a sorted slice.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

// ---------------------------------------------------------------------------
// Trend series – group by period, sum metric
// ---------------------------------------------------------------------------

/// Group rows by `period_col`, sum `metric_col` within each group, ascending
/// by period. `None` when either column is absent from the view; rows whose
/// period or metric is not numeric are skipped.
pub fn trend_series(
    view: &FilteredView,
    period_col: &str,
    metric_col: &str,
) -> Option<Vec<(f64, f64)>> {
    let period_idx = view.table.column_index(period_col)?;
    let metric_idx = view.table.column_index(metric_col)?;

    let mut groups: BTreeMap<CellValue, f64> = BTreeMap::new();
    for row in &view.table.rows {
        let (Some(period), Some(metric)) = (row[period_idx].as_f64(), row[metric_idx].as_f64())
        else {
            continue;
        };
        if !period.is_finite() || !metric.is_finite() {
            continue;
        }
        *groups.entry(row[period_idx].clone()).or_insert(0.0) += metric;
    }

    let mut series: Vec<(f64, f64)> = groups
        .into_iter()
        .filter_map(|(period, sum)| period.as_f64().map(|p| (p, sum)))
        .collect();
    series.sort_by(|a, b| a.0.total_cmp(&b.0));
    Some(series)
}

// ---------------------------------------------------------------------------
// Price-over-time series (robot log)
// ---------------------------------------------------------------------------

/// (timestamp, price) pairs in row order. Rows with an unparseable date or a
/// non-numeric price are dropped, not errors. `None` when either column is
/// filtered out.
pub fn price_series(view: &FilteredView) -> Option<Vec<(f64, f64)>> {
    let date_idx = view.table.column_index(COL_DATE)?;
    let price_idx = view.table.column_index(COL_PRICE)?;

    let series = view
        .table
        .rows
        .iter()
        .filter_map(|row| {
            let ts = cell_timestamp(&row[date_idx])?;
            let price = row[price_idx].as_f64().filter(|v| v.is_finite())?;
            Some((ts, price))
        })
        .collect();
    Some(series)
}

/// Coerce a cell to a unix timestamp. Accepts `Date`/`String` cells in a few
/// common formats and numeric cells as-is; anything else is a missing value.
fn cell_timestamp(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Date(s) | CellValue::String(s) => parse_date(s),
        other => other.as_f64().filter(|v| v.is_finite()),
    }
}

fn parse_date(s: &str) -> Option<f64> {
    const DATETIME_FORMATS: [&str; 3] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc().timestamp() as f64);
        }
    }
    for fmt in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            let dt = d.and_hms_opt(0, 0, 0)?;
            return Some(dt.and_utc().timestamp() as f64);
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Correlation matrix
// ---------------------------------------------------------------------------

/// Pairwise Pearson correlation over the numeric columns of a view.
/// `values[i][j]` correlates `columns[i]` with `columns[j]`; undefined pairs
/// (fewer than two shared samples, or zero variance) are NaN.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

/// Correlation across all columns with numeric content. Date columns are
/// coerced to timestamps first; unparseable dates become missing values and
/// their rows are dropped pairwise rather than raising. `None` when fewer
/// than two columns have any numeric content.
pub fn correlation(view: &FilteredView) -> Option<CorrelationMatrix> {
    let table = &view.table;

    // Row-aligned numeric series per column, None for missing values.
    let mut columns: Vec<String> = Vec::new();
    let mut series: Vec<Vec<Option<f64>>> = Vec::new();
    for (idx, name) in table.columns.iter().enumerate() {
        let values: Vec<Option<f64>> = table
            .rows
            .iter()
            .map(|row| cell_numeric(&row[idx]))
            .collect();
        if values.iter().any(Option::is_some) {
            columns.push(name.clone());
            series.push(values);
        }
    }
    if columns.len() < 2 {
        return None;
    }

    let n = columns.len();
    let mut values = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = pearson_pairwise(&series[i], &series[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Some(CorrelationMatrix { columns, values })
}

fn cell_numeric(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Date(_) => cell_timestamp(cell),
        other => other.as_f64().filter(|v| v.is_finite()),
    }
}

/// Pearson r over the rows where both series have a value.
fn pearson_pairwise(xs: &[Option<f64>], ys: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys.iter())
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Table;

    fn view(columns: &[&str], rows: Vec<Vec<CellValue>>) -> FilteredView {
        FilteredView {
            table: Table::new(columns.iter().map(|c| c.to_string()).collect(), rows),
        }
    }

    #[test]
    fn describe_on_empty_view_is_empty() {
        let v = view(&["a", "b"], Vec::new());
        assert!(describe(&v).is_empty());
    }

    #[test]
    fn describe_skips_non_numeric_columns() {
        let v = view(
            &["name", "score"],
            vec![
                vec![CellValue::String("a".into()), CellValue::Float(1.0)],
                vec![CellValue::String("b".into()), CellValue::Float(2.0)],
                vec![CellValue::String("c".into()), CellValue::Float(3.0)],
                vec![CellValue::String("d".into()), CellValue::Float(4.0)],
            ],
        );

        let stats = describe(&v);
        assert_eq!(stats.len(), 1);
        let s = &stats[0];
        assert_eq!(s.column, "score");
        assert_eq!(s.count, 4);
        assert!((s.mean - 2.5).abs() < 1e-12);
        assert!((s.std - 1.2909944487358056).abs() < 1e-12);
        assert_eq!(s.min, 1.0);
        assert!((s.q25 - 1.75).abs() < 1e-12);
        assert!((s.median - 2.5).abs() < 1e-12);
        assert!((s.q75 - 3.25).abs() < 1e-12);
        assert_eq!(s.max, 4.0);
    }

    #[test]
    fn trend_groups_sums_and_sorts_ascending() {
        let v = view(
            &[COL_RELEASE_YEAR, COL_GLOBAL_SALES],
            vec![
                vec![CellValue::Integer(2000), CellValue::Float(1.0)],
                vec![CellValue::Integer(2001), CellValue::Float(2.0)],
                vec![CellValue::Integer(2000), CellValue::Float(3.0)],
            ],
        );

        let series = trend_series(&v, COL_RELEASE_YEAR, COL_GLOBAL_SALES).unwrap();
        assert_eq!(series, vec![(2000.0, 4.0), (2001.0, 2.0)]);
    }

    #[test]
    fn trend_is_omitted_when_a_column_is_filtered_out() {
        let v = view(
            &[COL_GLOBAL_SALES],
            vec![vec![CellValue::Float(1.0)]],
        );
        assert!(trend_series(&v, COL_RELEASE_YEAR, COL_GLOBAL_SALES).is_none());
    }

    #[test]
    fn correlation_of_linear_columns_is_one() {
        let v = view(
            &["a", "b"],
            vec![
                vec![CellValue::Float(1.0), CellValue::Float(2.0)],
                vec![CellValue::Float(2.0), CellValue::Float(4.0)],
                vec![CellValue::Float(3.0), CellValue::Float(6.0)],
            ],
        );

        let m = correlation(&v).unwrap();
        assert_eq!(m.columns, vec!["a", "b"]);
        assert!((m.values[0][1] - 1.0).abs() < 1e-12);
        assert!((m.values[1][0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn unparseable_dates_are_dropped_pairwise() {
        let v = view(
            &[COL_DATE, COL_PRICE],
            vec![
                vec![CellValue::Date("2024-01-01".into()), CellValue::Float(10.0)],
                vec![CellValue::Date("not a date".into()), CellValue::Float(11.0)],
                vec![CellValue::Date("2024-01-03".into()), CellValue::Float(12.0)],
            ],
        );

        // Price chart keeps only the parseable rows.
        let series = price_series(&v).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].1, 10.0);
        assert_eq!(series[1].1, 12.0);

        // Correlation still succeeds over the shared rows.
        let m = correlation(&v).unwrap();
        assert!((m.values[0][1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn report_gates_derived_views_by_kind() {
        let v = view(
            &[COL_RELEASE_YEAR, COL_GLOBAL_SALES],
            vec![vec![CellValue::Integer(2000), CellValue::Float(1.0)]],
        );

        let sales = build_report(DatasetKind::Sales, &v);
        assert!(sales.trend.is_some());
        assert!(sales.correlation.is_none());

        let trading = build_report(DatasetKind::Trading, &v);
        assert!(trading.trend.is_none());
        assert!(trading.correlation.is_none());
    }
}
