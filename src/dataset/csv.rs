//! Numbered CSV dataset loading
//!
//! One file per repetition, named by substituting 1, 2, 3, ... for `%d` in
//! a pattern. Columns are `[t, yf, ycf, mu0, mu1, x...]` with no header.

use std::path::{Path, PathBuf};

use ndarray::{s, Array2, Array3, ArrayView2};
use tracing::{debug, info};

use super::Dataset;
use crate::{Error, Result};

/// Test fraction used when a test split is requested without one.
pub const DEFAULT_CSV_TEST_FRACTION: f64 = 0.1;

/// ATE reported for CSV data; these files carry no `ate` field.
pub const CSV_DEFAULT_ATE: f64 = 4.0;

/// `t, yf, ycf, mu0, mu1` precede the covariates.
const LEADING_COLUMNS: usize = 5;

/// Load every numbered file matching `pattern` and split rows into a train
/// prefix and test suffix. A `test_fraction` of 0 yields no test set.
///
/// # Errors
///
/// - `Error::NoData` if no file matches
/// - `Error::InvalidInput` for a bad pattern or fraction
/// - `Error::Shape` if files disagree on rows/columns or have no covariates
/// - `Error::Csv`/`Error::Parse` for malformed files
pub fn load_data_csvs(pattern: &str, test_fraction: f64) -> Result<(Dataset, Option<Dataset>)> {
    if !(0.0..1.0).contains(&test_fraction) {
        return Err(Error::InvalidInput(format!(
            "test fraction must be in [0, 1), got {test_fraction}"
        )));
    }

    let paths = numbered_paths(pattern)?;
    if paths.is_empty() {
        return Err(Error::NoData {
            pattern: pattern.to_string(),
        });
    }
    info!(pattern, repetitions = paths.len(), "loading csv data");

    let tables = paths
        .iter()
        .map(|path| read_table(path))
        .collect::<Result<Vec<_>>>()?;

    let (n, cols) = tables[0].dim();
    if cols <= LEADING_COLUMNS {
        return Err(Error::Shape(format!(
            "{}: expected more than {LEADING_COLUMNS} columns, found {cols}",
            paths[0].display()
        )));
    }
    for (path, table) in paths.iter().zip(&tables).skip(1) {
        if table.dim() != (n, cols) {
            return Err(Error::Shape(format!(
                "{}: expected {n}x{cols} table, found {}x{}",
                path.display(),
                table.nrows(),
                table.ncols()
            )));
        }
    }

    let dim = cols - LEADING_COLUMNS;
    let reps = tables.len();
    let n_train = train_rows(n, test_fraction);
    debug!(rows = n, n_train, dim, "splitting csv data");

    let mut train = Columns::zeros(n_train, dim, reps);
    let mut test = (test_fraction > 0.0).then(|| Columns::zeros(n - n_train, dim, reps));
    for (rep, table) in tables.iter().enumerate() {
        train.fill(rep, table.slice(s![..n_train, ..]));
        if let Some(test) = test.as_mut() {
            test.fill(rep, table.slice(s![n_train.., ..]));
        }
    }

    Ok((train.into_dataset(), test.map(Columns::into_dataset)))
}

/// Existing files for `pattern % 1, 2, ...`, stopping at the first gap.
///
/// # Errors
///
/// `Error::InvalidInput` unless the pattern holds exactly one `%d`
pub fn numbered_paths(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    loop {
        let path = PathBuf::from(format_pattern(pattern, paths.len() + 1)?);
        if !path.is_file() {
            return Ok(paths);
        }
        paths.push(path);
    }
}

fn format_pattern(pattern: &str, index: usize) -> Result<String> {
    if pattern.matches("%d").count() != 1 {
        return Err(Error::InvalidInput(format!(
            "data pattern must contain exactly one %d: {pattern}"
        )));
    }
    Ok(pattern.replacen("%d", &index.to_string(), 1))
}

/// `round(n * (1 - f))`, halves away from zero.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn train_rows(n: usize, test_fraction: f64) -> usize {
    let rows = (n as f64 * (1.0 - test_fraction)).round();
    (rows.max(0.0) as usize).min(n)
}

#[allow(clippy::cast_possible_truncation)]
fn read_table(path: &Path) -> Result<Array2<f64>> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .trim(::csv::Trim::All)
        .from_path(path)?;

    let mut values = Vec::new();
    let mut rows = 0;
    let mut cols = 0;
    for record in reader.records() {
        let record = record?;
        cols = record.len();
        for field in &record {
            let value = field.parse::<f64>().map_err(|_| Error::Parse {
                line: record.position().map_or(0, |p| p.line() as usize),
                message: format!("{}: invalid number '{field}'", path.display()),
            })?;
            values.push(value);
        }
        rows += 1;
    }

    Array2::from_shape_vec((rows, cols), values).map_err(|e| Error::Shape(e.to_string()))
}

/// Per-split arrays indexed by repetition on the last axis.
struct Columns {
    t: Array2<f64>,
    yf: Array2<f64>,
    ycf: Array2<f64>,
    mu0: Array2<f64>,
    mu1: Array2<f64>,
    x: Array3<f64>,
}

impl Columns {
    fn zeros(rows: usize, dim: usize, reps: usize) -> Self {
        Self {
            t: Array2::zeros((rows, reps)),
            yf: Array2::zeros((rows, reps)),
            ycf: Array2::zeros((rows, reps)),
            mu0: Array2::zeros((rows, reps)),
            mu1: Array2::zeros((rows, reps)),
            x: Array3::zeros((rows, dim, reps)),
        }
    }

    fn fill(&mut self, rep: usize, rows: ArrayView2<'_, f64>) {
        self.t.column_mut(rep).assign(&rows.column(0));
        self.yf.column_mut(rep).assign(&rows.column(1));
        self.ycf.column_mut(rep).assign(&rows.column(2));
        self.mu0.column_mut(rep).assign(&rows.column(3));
        self.mu1.column_mut(rep).assign(&rows.column(4));
        self.x
            .slice_mut(s![.., .., rep])
            .assign(&rows.slice(s![.., LEADING_COLUMNS..]));
    }

    // Truth and density are not detected for CSV input
    fn into_dataset(self) -> Dataset {
        Dataset {
            x: self.x.into_dyn(),
            t: self.t.into_dyn(),
            yf: self.yf.into_dyn(),
            ycf: Some(self.ycf.into_dyn()),
            mu0: Some(self.mu0.into_dyn()),
            mu1: Some(self.mu1.into_dyn()),
            e: None,
            ate: Some(CSV_DEFAULT_ATE),
            y_mul: 1.0,
            y_add: 0.0,
            have_truth: true,
            sparse: false,
        }
    }
}
