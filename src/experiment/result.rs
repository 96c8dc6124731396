//! Experiment Result - one completed training run

use std::path::{Path, PathBuf};

use ndarray::ArrayD;

use super::loader::PRED_REPETITION_AXIS;
use crate::archive::Archive;
use crate::config::ExperimentConfig;

/// One loaded experiment directory.
///
/// Only constructed after the run passed validation, so `pred` is present
/// with at least the required number of repetitions on axis 2.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentResult {
    name: String,
    dir: PathBuf,
    config: ExperimentConfig,
    train: Archive,
    test: Option<Archive>,
}

impl ExperimentResult {
    /// Assemble a result from its parts.
    #[must_use]
    pub fn new(
        dir: impl Into<PathBuf>,
        config: ExperimentConfig,
        train: Archive,
        test: Option<Archive>,
    ) -> Self {
        let dir = dir.into();
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            dir,
            config,
            train,
            test,
        }
    }

    /// Directory name, e.g. `results_20170101_120000`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Experiment directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Parsed `config.txt`.
    #[must_use]
    pub const fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Train archive (`result.npz`).
    #[must_use]
    pub const fn train(&self) -> &Archive {
        &self.train
    }

    /// Test archive (`result.test.npz`), if one was written.
    #[must_use]
    pub const fn test(&self) -> Option<&Archive> {
        self.test.as_ref()
    }

    /// Train predictions.
    #[must_use]
    pub fn predictions(&self) -> Option<&ArrayD<f64>> {
        self.train.get("pred")
    }

    /// Length of the repetition axis of `pred`.
    #[must_use]
    pub fn repetitions(&self) -> usize {
        self.predictions()
            .and_then(|pred| pred.shape().get(PRED_REPETITION_AXIS).copied())
            .unwrap_or(0)
    }
}
