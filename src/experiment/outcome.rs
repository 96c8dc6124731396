//! Load outcomes and skip bookkeeping

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::ExperimentResult;

/// Why an experiment directory was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SkipReason {
    /// `pred` is missing or has too few repetitions.
    Incomplete,
    /// An archive could not be read, or the config holds bad values.
    Unreadable,
    /// `config.txt` is missing or unreadable.
    NoConfig,
}

/// Outcome of loading a single experiment directory.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Passed validation.
    Loaded(ExperimentResult),
    /// Run appears not to have finished.
    SkippedIncomplete {
        /// Experiment directory
        dir: PathBuf,
        /// `max(repetitions, experiments)`
        required: usize,
        /// Axis-2 length of `pred`, if it had at least 4 dims
        found: Option<usize>,
    },
    /// Archive or config value could not be used.
    SkippedUnreadable {
        /// Experiment directory
        dir: PathBuf,
        /// Human-readable cause
        reason: String,
    },
    /// No usable `config.txt`.
    SkippedNoConfig {
        /// Experiment directory
        dir: PathBuf,
    },
}

impl LoadOutcome {
    /// The loaded result, dropping any skip.
    #[must_use]
    pub fn into_result(self) -> Option<ExperimentResult> {
        match self {
            Self::Loaded(result) => Some(result),
            _ => None,
        }
    }

    /// True for `Loaded`.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    /// Skip reason, `None` for `Loaded`.
    #[must_use]
    pub const fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Self::Loaded(_) => None,
            Self::SkippedIncomplete { .. } => Some(SkipReason::Incomplete),
            Self::SkippedUnreadable { .. } => Some(SkipReason::Unreadable),
            Self::SkippedNoConfig { .. } => Some(SkipReason::NoConfig),
        }
    }

    /// Experiment directory this outcome refers to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        match self {
            Self::Loaded(result) => result.dir(),
            Self::SkippedIncomplete { dir, .. }
            | Self::SkippedUnreadable { dir, .. }
            | Self::SkippedNoConfig { dir } => dir.as_path(),
        }
    }
}

/// A dropped experiment directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedExperiment {
    /// Experiment directory
    pub dir: PathBuf,
    /// Why it was dropped
    pub reason: SkipReason,
}

/// Every outcome of a directory scan, in directory-name order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    results: Vec<ExperimentResult>,
    skipped: Vec<SkippedExperiment>,
}

impl ResultSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one outcome.
    pub fn push(&mut self, outcome: LoadOutcome) {
        if let Some(reason) = outcome.skip_reason() {
            self.skipped.push(SkippedExperiment {
                dir: outcome.dir().to_path_buf(),
                reason,
            });
        } else if let LoadOutcome::Loaded(result) = outcome {
            self.results.push(result);
        }
    }

    /// Loaded results.
    #[must_use]
    pub fn results(&self) -> &[ExperimentResult] {
        &self.results
    }

    /// Dropped directories.
    #[must_use]
    pub fn skipped(&self) -> &[SkippedExperiment] {
        &self.skipped
    }

    /// Number of loaded results.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// True if nothing loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Candidates seen, loaded or not.
    #[must_use]
    pub fn candidates(&self) -> usize {
        self.results.len() + self.skipped.len()
    }

    /// Skip count per reason.
    #[must_use]
    pub fn skip_counts(&self) -> BTreeMap<SkipReason, usize> {
        let mut counts = BTreeMap::new();
        for skipped in &self.skipped {
            *counts.entry(skipped.reason).or_insert(0) += 1;
        }
        counts
    }

    /// Consume the set, keeping only loaded results.
    #[must_use]
    pub fn into_results(self) -> Vec<ExperimentResult> {
        self.results
    }
}

impl FromIterator<LoadOutcome> for ResultSet {
    fn from_iter<I: IntoIterator<Item = LoadOutcome>>(iter: I) -> Self {
        let mut set = Self::new();
        for outcome in iter {
            set.push(outcome);
        }
        set
    }
}
