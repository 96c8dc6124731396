//! Experiment results produced by the CFR trainer
//!
//! One directory per configured training run. Loading pairs each run with
//! its config, checks it actually finished, and reports every dropped
//! directory with the reason it was dropped.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cfr_results::experiment::{scan_results, SkipReason};
//!
//! let set = scan_results("results/ihdp")?;
//! for result in set.results() {
//!     println!("{}: {} repetitions", result.name(), result.repetitions());
//! }
//! let unfinished = set.skip_counts().get(&SkipReason::Incomplete).copied();
//! println!("unfinished runs: {}", unfinished.unwrap_or(0));
//! # Ok::<(), cfr_results::Error>(())
//! ```

mod loader;
mod outcome;
mod result;

pub use loader::{
    experiment_dirs, load_results, load_single_result, required_repetitions, scan_results,
    COMBINED_RESULTS_FILE, CONFIG_FILE, TEST_RESULT_FILE, TRAIN_RESULT_FILE,
};
pub use outcome::{LoadOutcome, ResultSet, SkipReason, SkippedExperiment};
pub use result::ExperimentResult;
