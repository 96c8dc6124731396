//! Error types for cfr-results
//!
//! Two classes of failure exist. Per-experiment problems (missing config,
//! unreadable archive, unfinished run) never surface here; they are reported
//! as [`crate::experiment::LoadOutcome`] skips. Everything in this enum is
//! fatal to the operation that raised it.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// cfr-results error types
#[derive(Error, Debug)]
pub enum Error {
    /// Config key not present
    #[error("Missing config key: {0}")]
    MissingKey(String),

    /// Config key present with an unexpected value type
    #[error("Type mismatch for config key '{key}': expected {expected}, found {found}")]
    TypeMismatch {
        /// Offending key
        key: String,
        /// Type the caller asked for
        expected: &'static str,
        /// Type actually stored
        found: &'static str,
    },

    /// Archive lacks a required array field
    #[error("Missing array field '{field}' in {}", .path.display())]
    MissingField {
        /// Field name
        field: String,
        /// Archive path
        path: PathBuf,
    },

    /// Evaluation config literal could not be parsed
    #[error("Parse error on line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What went wrong
        message: String,
    },

    /// Array or table has an unexpected shape
    #[error("Shape error: {0}")]
    Shape(String),

    /// Caller passed an invalid argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Data file suffix is neither `.npz` nor `.csv`
    #[error("Unsupported data format: {}\nExpected a .npz archive or a numbered .csv pattern", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Numbered CSV pattern matched no files
    #[error("No data found at {pattern}")]
    NoData {
        /// The `%d` pattern that was probed
        pattern: String,
    },

    /// Output directory does not exist
    #[error("Could not find output at path: {}", .0.display())]
    OutputNotFound(PathBuf),

    /// Evaluation config file does not exist
    #[error("Could not find config file at path: {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// NPZ archive error
    #[error("NPZ error: {0}")]
    Npz(#[from] ndarray_npy::ReadNpzError),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
