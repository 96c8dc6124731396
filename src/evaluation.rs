//! Evaluation input preparation
//!
//! An evaluation config names the trainer's output directory and the data
//! the runs were trained on:
//!
//! ```text
//! outdir='results/ihdp'
//! datadir='data'
//! dataform='ihdp_npci_1-100.train.npz'
//! data_test='ihdp_npci_1-100.test.npz'
//! loss='l2'
//! ```
//!
//! [`prepare_evaluation`] resolves it into loaded results plus datasets.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::{load_eval_config, EvalConfig, Literal};
use crate::dataset::{load_train_test_data, Dataset};
use crate::experiment::{scan_results, ResultSet};
use crate::{Error, Result};

/// Loss name that marks binary outcomes.
pub const BINARY_LOSS: &str = "log";

/// Resolved evaluation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationSettings {
    /// Trainer output directory
    pub output_dir: PathBuf,
    /// `datadir/dataform`
    pub train_data: PathBuf,
    /// `datadir/data_test`, if configured
    pub test_data: Option<PathBuf>,
    /// Outcomes are binary (`loss='log'`)
    pub binary: bool,
}

impl EvaluationSettings {
    /// Resolve settings from a parsed evaluation config.
    ///
    /// # Errors
    ///
    /// `MissingKey`/`TypeMismatch` for `outdir`, `datadir`, or `dataform`;
    /// `TypeMismatch` if `data_test` or `loss` is set to a non-string
    pub fn from_config(config: &EvalConfig) -> Result<Self> {
        let output_dir = PathBuf::from(config.get_str("outdir")?);
        let datadir = Path::new(config.get_str("datadir")?);
        let train_data = datadir.join(config.get_str("dataform")?);
        let test_data = optional_str(config, "data_test")?.map(|name| datadir.join(name));
        let binary = optional_str(config, "loss")? == Some(BINARY_LOSS);

        Ok(Self {
            output_dir,
            train_data,
            test_data,
            binary,
        })
    }
}

/// `None` when absent or literally `None`.
fn optional_str<'a>(config: &'a EvalConfig, key: &str) -> Result<Option<&'a str>> {
    match config.get(key) {
        None | Some(Literal::None) => Ok(None),
        Some(_) => config.get_str(key).map(Some),
    }
}

/// Everything an evaluation needs, fully loaded.
#[derive(Debug, Clone)]
pub struct EvaluationInputs {
    /// Resolved settings
    pub settings: EvaluationSettings,
    /// Experiment results, with skips
    pub results: ResultSet,
    /// Train dataset
    pub train: Dataset,
    /// Test dataset, if configured
    pub test: Option<Dataset>,
}

/// Load an evaluation config and everything it points at.
///
/// # Errors
///
/// - `Error::ConfigNotFound` if `config_file` does not exist
/// - `Error::OutputNotFound` if the configured `outdir` does not exist
/// - any config, result-scan, or dataset loading error
pub fn prepare_evaluation<P: AsRef<Path>>(config_file: P) -> Result<EvaluationInputs> {
    let config_file = config_file.as_ref();
    if !config_file.is_file() {
        return Err(Error::ConfigNotFound(config_file.to_path_buf()));
    }

    let config = load_eval_config(config_file)?;
    let settings = EvaluationSettings::from_config(&config)?;
    if !settings.output_dir.is_dir() {
        return Err(Error::OutputNotFound(settings.output_dir.clone()));
    }

    let results = scan_results(&settings.output_dir)?;
    let (train, test) =
        load_train_test_data(&settings.train_data, settings.test_data.as_deref())?;
    info!(
        results = results.len(),
        binary = settings.binary,
        "evaluation inputs ready"
    );

    Ok(EvaluationInputs {
        settings,
        results,
        train,
        test,
    })
}
