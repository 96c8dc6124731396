//! Training/evaluation datasets
//!
//! Two on-disk encodings are normalised into one [`Dataset`] record:
//!
//! - a single `.npz` archive per split ([`load_data_npz`])
//! - numbered CSV files, one per repetition, split by row fraction
//!   ([`load_data_csvs`])
//!
//! Column and field conventions follow the CFR data files:
//! `x` covariates, `t` treatment, `yf` factual outcome, `ycf` counterfactual
//! outcome, `mu0`/`mu1` noiseless potential outcomes.

mod csv;
mod npz;

use std::path::Path;

use ndarray::ArrayD;

use crate::{Error, Result};

pub use self::csv::{load_data_csvs, numbered_paths, CSV_DEFAULT_ATE, DEFAULT_CSV_TEST_FRACTION};
pub use self::npz::load_data_npz;

/// Normalised dataset record.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Covariates: `(n, d)`, `(n, d, reps)`, or 1-D when sparse
    pub x: ArrayD<f64>,
    /// Treatment assignment
    pub t: ArrayD<f64>,
    /// Factual outcome
    pub yf: ArrayD<f64>,
    /// Counterfactual outcome
    pub ycf: Option<ArrayD<f64>>,
    /// Potential outcome under control
    pub mu0: Option<ArrayD<f64>>,
    /// Potential outcome under treatment
    pub mu1: Option<ArrayD<f64>>,
    /// Randomization indicator
    pub e: Option<ArrayD<f64>>,
    /// Average treatment effect (`ATE`)
    pub ate: Option<f64>,
    /// Outcome scale factor (`YMUL`)
    pub y_mul: f64,
    /// Outcome offset (`YADD`)
    pub y_add: f64,
    /// `ycf`, `mu0`, and `mu1` are all present (`HAVE_TRUTH`)
    pub have_truth: bool,
    /// `x` uses the flattened 1-D encoding (`SPARSE`)
    pub sparse: bool,
}

impl Dataset {
    /// Rows along axis 0 of `t`.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.t.shape().first().copied().unwrap_or(0)
    }

    /// Length of the repetition axis; 1 for a single-repetition layout.
    #[must_use]
    pub fn n_repetitions(&self) -> usize {
        match self.t.shape() {
            [_, reps] => *reps,
            _ => 1,
        }
    }

    /// Covariate dimension, `None` for the sparse encoding.
    #[must_use]
    pub fn n_covariates(&self) -> Option<usize> {
        if self.sparse {
            return None;
        }
        self.x.shape().get(1).copied()
    }
}

/// Load train and optional test data, dispatching on the train path suffix.
///
/// A CSV pattern is split with [`DEFAULT_CSV_TEST_FRACTION`] when `test` is
/// given, and not split otherwise.
///
/// # Errors
///
/// `Error::UnsupportedFormat` for unknown suffixes, plus any loader error
pub fn load_train_test_data(
    train: &Path,
    test: Option<&Path>,
) -> Result<(Dataset, Option<Dataset>)> {
    let fraction = if test.is_some() {
        DEFAULT_CSV_TEST_FRACTION
    } else {
        0.0
    };
    load_train_test_data_with_fraction(train, test, fraction)
}

/// Like [`load_train_test_data`] with an explicit CSV test fraction.
///
/// `test_fraction` is ignored for `.npz` inputs, where `test` names the
/// test archive directly.
///
/// # Errors
///
/// `Error::UnsupportedFormat` for unknown suffixes, plus any loader error
pub fn load_train_test_data_with_fraction(
    train: &Path,
    test: Option<&Path>,
    test_fraction: f64,
) -> Result<(Dataset, Option<Dataset>)> {
    match train.extension().and_then(|ext| ext.to_str()) {
        Some("csv") => {
            let pattern = train.to_str().ok_or_else(|| {
                Error::InvalidInput(format!("non UTF-8 data path: {}", train.display()))
            })?;
            load_data_csvs(pattern, test_fraction)
        }
        Some("npz") => {
            let train_data = load_data_npz(train)?;
            let test_data = test.map(load_data_npz).transpose()?;
            Ok((train_data, test_data))
        }
        _ => Err(Error::UnsupportedFormat(train.to_path_buf())),
    }
}
