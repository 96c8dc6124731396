//! # cfr-results: CFR Experiment Result Loading
//!
//! Loads and normalizes the outputs of a counterfactual-regression (CFR)
//! training pipeline so they can be evaluated and compared across
//! hyperparameter settings.
//!
//! ## Components
//!
//! - [`experiment`]: scan an output directory, pair each run with its
//!   `config.txt`, and drop unfinished or unreadable runs with a reason
//! - [`dataset`]: normalize `.npz` archives and numbered CSV files into one
//!   [`dataset::Dataset`] record
//! - [`config`]: `key: value` experiment configs and `key=value`
//!   evaluation configs, both with typed accessors
//! - [`evaluation`]: resolve an evaluation config into loaded inputs
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use cfr_results::experiment::scan_results;
//! use cfr_results::dataset::load_data_npz;
//!
//! let results = scan_results("results/ihdp")?;
//! println!("{} runs loaded, {} skipped", results.len(), results.skipped().len());
//!
//! let train = load_data_npz("data/ihdp_npci_1-100.train.npz")?;
//! println!("{} samples x {} repetitions", train.n_samples(), train.n_repetitions());
//! # Ok::<(), cfr_results::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod archive;
pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod experiment;
pub mod telemetry;

pub use error::{Error, Result};
