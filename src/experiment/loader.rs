//! Result Loader - discovery and validation of experiment directories
//!
//! ## Directory Layout
//!
//! ```text
//! output_dir/
//! ├── <experiment-a>/
//! │   ├── config.txt
//! │   ├── result.npz
//! │   └── result.test.npz   (optional)
//! └── <experiment-b>/ ...
//! ```
//!
//! Per-experiment problems are never fatal: they become a [`LoadOutcome`]
//! skip with a `warn!`. Only a missing `output_dir` aborts the scan.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::{ExperimentResult, LoadOutcome, ResultSet};
use crate::archive::Archive;
use crate::config::{load_config, ExperimentConfig};
use crate::{Error, Result};

/// Experiment config file name.
pub const CONFIG_FILE: &str = "config.txt";

/// Train result archive name.
pub const TRAIN_RESULT_FILE: &str = "result.npz";

/// Test result archive name.
pub const TEST_RESULT_FILE: &str = "result.test.npz";

/// Combined top-level archive (not supported).
pub const COMBINED_RESULTS_FILE: &str = "results.npz";

/// `pred` layout: (samples, outputs, repetitions, iterations)
const PRED_MIN_DIMS: usize = 4;
pub(crate) const PRED_REPETITION_AXIS: usize = 2;

/// Load and validate one experiment directory. Never fails; see [`LoadOutcome`].
pub fn load_single_result<P: AsRef<Path>>(dir: P) -> LoadOutcome {
    let dir = dir.as_ref();
    debug!(dir = %dir.display(), "loading experiment");

    let config_path = dir.join(CONFIG_FILE);
    if !config_path.is_file() {
        warn!(dir = %dir.display(), "could not find {CONFIG_FILE}, skipping");
        return LoadOutcome::SkippedNoConfig {
            dir: dir.to_path_buf(),
        };
    }
    let config = match load_config(&config_path) {
        Ok(config) => config,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "could not read {CONFIG_FILE}, skipping");
            return LoadOutcome::SkippedNoConfig {
                dir: dir.to_path_buf(),
            };
        }
    };

    let train = match Archive::load(dir.join(TRAIN_RESULT_FILE)) {
        Ok(archive) => archive,
        Err(e) => return unreadable(dir, format!("could not load {TRAIN_RESULT_FILE}: {e}")),
    };

    let required = match required_repetitions(&config) {
        Ok(required) => required,
        Err(e) => return unreadable(dir, e.to_string()),
    };

    let found = train
        .get("pred")
        .filter(|pred| pred.ndim() >= PRED_MIN_DIMS)
        .map(|pred| pred.shape()[PRED_REPETITION_AXIS]);
    if found.map_or(true, |n| n < required) {
        warn!(
            dir = %dir.display(),
            required,
            found = ?found,
            "experiment appears not to have finished, skipping"
        );
        return LoadOutcome::SkippedIncomplete {
            dir: dir.to_path_buf(),
            required,
            found,
        };
    }

    let test_path = dir.join(TEST_RESULT_FILE);
    let test = if test_path.is_file() {
        match Archive::load(&test_path) {
            Ok(archive) => Some(archive),
            Err(e) => return unreadable(dir, format!("could not load {TEST_RESULT_FILE}: {e}")),
        }
    } else {
        None
    };

    LoadOutcome::Loaded(ExperimentResult::new(dir, config, train, test))
}

/// Scan `output_dir` and load every experiment subdirectory, keeping skips.
///
/// # Errors
///
/// `Error::OutputNotFound` if `output_dir` is not a directory, `Error::Io`
/// if it cannot be listed
pub fn scan_results<P: AsRef<Path>>(output_dir: P) -> Result<ResultSet> {
    let output_dir = output_dir.as_ref();
    debug!(dir = %output_dir.display(), "loading results");

    let dirs = experiment_dirs(output_dir)?;
    info!(count = dirs.len(), "found experiment configurations");

    let set: ResultSet = dirs.iter().map(load_single_result).collect();
    if !set.skipped().is_empty() {
        info!(
            loaded = set.len(),
            skipped = set.skipped().len(),
            "finished loading results"
        );
    }
    Ok(set)
}

/// Scan `output_dir`, returning only the experiments that loaded.
///
/// # Errors
///
/// See [`scan_results`]
pub fn load_results<P: AsRef<Path>>(output_dir: P) -> Result<Vec<ExperimentResult>> {
    scan_results(output_dir).map(ResultSet::into_results)
}

/// Immediate subdirectories holding a train archive, sorted by name.
///
/// # Errors
///
/// `Error::OutputNotFound` if `output_dir` is not a directory
pub fn experiment_dirs(output_dir: &Path) -> Result<Vec<PathBuf>> {
    if !output_dir.is_dir() {
        return Err(Error::OutputNotFound(output_dir.to_path_buf()));
    }
    if output_dir.join(COMBINED_RESULTS_FILE).is_file() {
        debug!(
            dir = %output_dir.display(),
            "combined {COMBINED_RESULTS_FILE} layout is not supported, ignoring"
        );
    }

    let mut dirs = Vec::new();
    for entry in fs::read_dir(output_dir)? {
        let path = entry?.path();
        if path.is_dir() && path.join(TRAIN_RESULT_FILE).is_file() {
            dirs.push(path);
        }
    }
    dirs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(dirs)
}

/// `max(repetitions, experiments)`. Both keys must be present.
///
/// # Errors
///
/// `MissingKey` if either key is absent, `TypeMismatch` for non-numeric
/// values, `InvalidInput` for non-finite or negative counts
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn required_repetitions(config: &ExperimentConfig) -> Result<usize> {
    let repetitions = config.get_float("repetitions")?;
    let experiments = config.get_float("experiments")?;
    let required = repetitions.max(experiments);
    if !required.is_finite() || required < 0.0 {
        return Err(Error::InvalidInput(format!(
            "repetition count must be a non-negative number, got {required}"
        )));
    }
    Ok(required.ceil() as usize)
}

fn unreadable(dir: &Path, reason: String) -> LoadOutcome {
    warn!(dir = %dir.display(), %reason, "skipping experiment");
    LoadOutcome::SkippedUnreadable {
        dir: dir.to_path_buf(),
        reason,
    }
}
