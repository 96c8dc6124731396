//! Experiment configuration (`config.txt`)
//!
//! Each training run writes one `key: value` pair per line. There is no
//! schema: values are inferred per line as a float, then a `True`/`False`
//! boolean, then a raw string.
//!
//! ## Usage
//!
//! ```rust
//! use cfr_results::config::parse_config;
//!
//! let config = parse_config("p_alpha: 0.5\nuse_bn: True\nloss: log\n");
//!
//! assert_eq!(config.get_float("p_alpha")?, 0.5);
//! assert!(config.get_bool("use_bn")?);
//! assert_eq!(config.get_string("loss")?, "log");
//! assert_eq!(config.get("missing"), None);
//! # Ok::<(), cfr_results::Error>(())
//! ```

pub mod eval;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub use eval::{load_eval_config, parse_eval_config, EvalConfig, Literal};

/// A single inferred config value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// Anything `f64::from_str` accepts
    Float(f64),
    /// The literals `True` / `False`
    Bool(bool),
    /// Fallback
    Str(String),
}

impl ConfigValue {
    /// Infer a value from its textual form.
    #[must_use]
    pub fn infer(raw: &str) -> Self {
        if let Ok(value) = raw.parse::<f64>() {
            return Self::Float(value);
        }
        match raw {
            "True" => Self::Bool(true),
            "False" => Self::Bool(false),
            other => Self::Str(other.to_string()),
        }
    }

    /// Name of the stored type, for error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Str(_) => "string",
        }
    }
}

/// Schema-less experiment config with typed accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExperimentConfig {
    values: BTreeMap<String, ConfigValue>,
}

impl ExperimentConfig {
    /// Create an empty config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if no key was parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Insert or overwrite a value.
    pub fn insert(&mut self, key: impl Into<String>, value: ConfigValue) {
        self.values.insert(key.into(), value);
    }

    /// Untyped lookup.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    /// True if the key was present in the file.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Iterate over `(key, value)` in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Get a float value.
    ///
    /// # Errors
    ///
    /// `MissingKey` if absent, `TypeMismatch` if not a float
    pub fn get_float(&self, key: &str) -> Result<f64> {
        match self.require(key)? {
            ConfigValue::Float(value) => Ok(*value),
            other => Err(mismatch(key, "float", other)),
        }
    }

    /// Get a boolean value.
    ///
    /// # Errors
    ///
    /// `MissingKey` if absent, `TypeMismatch` if not a bool
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        match self.require(key)? {
            ConfigValue::Bool(value) => Ok(*value),
            other => Err(mismatch(key, "bool", other)),
        }
    }

    /// Get a string value.
    ///
    /// # Errors
    ///
    /// `MissingKey` if absent, `TypeMismatch` if not a string
    pub fn get_string(&self, key: &str) -> Result<&str> {
        match self.require(key)? {
            ConfigValue::Str(value) => Ok(value),
            other => Err(mismatch(key, "string", other)),
        }
    }

    fn require(&self, key: &str) -> Result<&ConfigValue> {
        self.values
            .get(key)
            .ok_or_else(|| Error::MissingKey(key.to_string()))
    }
}

impl FromIterator<(String, ConfigValue)> for ExperimentConfig {
    fn from_iter<I: IntoIterator<Item = (String, ConfigValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

fn mismatch(key: &str, expected: &'static str, found: &ConfigValue) -> Error {
    Error::TypeMismatch {
        key: key.to_string(),
        expected,
        found: found.type_name(),
    }
}

/// Parse one line. `None` unless splitting on `:` yields exactly two parts.
fn parse_line(line: &str) -> Option<(String, ConfigValue)> {
    let mut parts = line.split(':');
    let key = parts.next()?.trim();
    let value = parts.next()?.trim();
    if parts.next().is_some() {
        return None;
    }
    Some((key.to_string(), ConfigValue::infer(value)))
}

/// Parse config text already in memory. Malformed lines are ignored.
#[must_use]
pub fn parse_config(text: &str) -> ExperimentConfig {
    text.lines().filter_map(parse_line).collect()
}

/// Read and parse a `config.txt` file.
///
/// Bytes that are not valid UTF-8 are replaced, so one bad line does not
/// hide the rest of the file.
///
/// # Errors
///
/// Returns `Error::Io` if the file cannot be opened or read
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ExperimentConfig> {
    let bytes = fs::read(path.as_ref())?;
    Ok(parse_config(&String::from_utf8_lossy(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_float() {
        assert_eq!(ConfigValue::infer("0.5"), ConfigValue::Float(0.5));
        assert_eq!(ConfigValue::infer("1e-4"), ConfigValue::Float(1e-4));
        assert_eq!(ConfigValue::infer("100"), ConfigValue::Float(100.0));
    }

    #[test]
    fn test_infer_bool_and_string() {
        assert_eq!(ConfigValue::infer("True"), ConfigValue::Bool(true));
        assert_eq!(ConfigValue::infer("False"), ConfigValue::Bool(false));
        // Case-sensitive, like the files the trainer writes
        assert_eq!(ConfigValue::infer("true"), ConfigValue::Str("true".into()));
        assert_eq!(ConfigValue::infer("log"), ConfigValue::Str("log".into()));
    }

    #[test]
    fn test_parse_line_requires_two_parts() {
        assert!(parse_line("no separator").is_none());
        assert!(parse_line("outdir: C:/results").is_some());
        assert!(parse_line("url: http://host:8080").is_none());
        let (key, value) = parse_line("  n_in :  3 ").unwrap();
        assert_eq!(key, "n_in");
        assert_eq!(value, ConfigValue::Float(3.0));
    }

    #[test]
    fn test_typed_accessors() {
        let config = parse_config("p_alpha: 0.5\nuse_bn: True\nloss: log\n");
        assert!((config.get_float("p_alpha").unwrap() - 0.5).abs() < f64::EPSILON);
        assert!(config.get_bool("use_bn").unwrap());
        assert_eq!(config.get_string("loss").unwrap(), "log");
    }

    #[test]
    fn test_missing_key() {
        let config = ExperimentConfig::new();
        let err = config.get_float("repetitions").unwrap_err();
        assert!(matches!(err, Error::MissingKey(ref k) if k == "repetitions"));
    }

    #[test]
    fn test_type_mismatch() {
        let config = parse_config("loss: log");
        let err = config.get_float("loss").unwrap_err();
        match err {
            Error::TypeMismatch {
                key,
                expected,
                found,
            } => {
                assert_eq!(key, "loss");
                assert_eq!(expected, "float");
                assert_eq!(found, "string");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_later_line_wins() {
        let config = parse_config("lr: 0.1\nlr: 0.2");
        assert_eq!(config.len(), 1);
        assert!((config.get_float("lr").unwrap() - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_serialize_untagged() {
        let config = parse_config("p_alpha: 0.5\nuse_bn: True\nloss: log");
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"loss": "log", "p_alpha": 0.5, "use_bn": true})
        );
    }

    #[test]
    fn test_load_config_tolerates_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.txt");
        let mut bytes = b"repetitions: 10\nexperiments: 1\n".to_vec();
        bytes.extend_from_slice(b"note: caf\xe9\n");
        bytes.extend_from_slice(b"loss: log\n");
        fs::write(&path, bytes).unwrap();

        let config = load_config(&path).unwrap();
        assert!((config.get_float("repetitions").unwrap() - 10.0).abs() < f64::EPSILON);
        assert_eq!(config.get_string("loss").unwrap(), "log");
        assert_eq!(config.get_string("note").unwrap(), "caf\u{fffd}");
    }

    #[test]
    fn test_load_config_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(dir.path().join("config.txt")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
