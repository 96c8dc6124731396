//! Evaluation config (`key=value`)
//!
//! The right-hand side of each line is a literal from a small, closed
//! grammar: quoted strings, integers, floats, `True`/`False`/`None`, and
//! bracketed lists of those. Nothing is evaluated.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A parsed right-hand-side literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    /// `None`
    None,
    /// `True` / `False`
    Bool(bool),
    /// Integer without fraction or exponent
    Int(i64),
    /// Any other number
    Float(f64),
    /// Single- or double-quoted string
    Str(String),
    /// `[a, b, ...]`
    List(Vec<Literal>),
}

impl Literal {
    /// Name of the stored type, for error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::List(_) => "list",
        }
    }
}

/// Evaluation config: ordered `key -> Literal` map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvalConfig {
    entries: BTreeMap<String, Literal>,
}

impl EvalConfig {
    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no key was parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Untyped lookup.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Literal> {
        self.entries.get(key)
    }

    /// Get a string value.
    ///
    /// # Errors
    ///
    /// `MissingKey` if absent, `TypeMismatch` if not a string
    pub fn get_str(&self, key: &str) -> Result<&str> {
        match self.require(key)? {
            Literal::Str(value) => Ok(value),
            other => Err(mismatch(key, "string", other)),
        }
    }

    /// Get a numeric value; integers are widened.
    ///
    /// # Errors
    ///
    /// `MissingKey` if absent, `TypeMismatch` if not numeric
    #[allow(clippy::cast_precision_loss)]
    pub fn get_float(&self, key: &str) -> Result<f64> {
        match self.require(key)? {
            Literal::Float(value) => Ok(*value),
            Literal::Int(value) => Ok(*value as f64),
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
            Literal::Bool(value) => Ok(*value),
            other => Err(mismatch(key, "bool", other)),
        }
    }

    /// Get a list value.
    ///
    /// # Errors
    ///
    /// `MissingKey` if absent, `TypeMismatch` if not a list
    pub fn get_list(&self, key: &str) -> Result<&[Literal]> {
        match self.require(key)? {
            Literal::List(items) => Ok(items),
            other => Err(mismatch(key, "list", other)),
        }
    }

    fn require(&self, key: &str) -> Result<&Literal> {
        self.entries
            .get(key)
            .ok_or_else(|| Error::MissingKey(key.to_string()))
    }
}

fn mismatch(key: &str, expected: &'static str, found: &Literal) -> Error {
    Error::TypeMismatch {
        key: key.to_string(),
        expected,
        found: found.type_name(),
    }
}

/// Parse evaluation config text.
///
/// # Errors
///
/// Returns `Error::Parse` with the 1-based line number of the first
/// malformed value
pub fn parse_eval_config(text: &str) -> Result<EvalConfig> {
    let mut entries = BTreeMap::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let literal = parse_literal(value).map_err(|message| Error::Parse {
            line: idx + 1,
            message,
        })?;
        entries.insert(key.trim().to_string(), literal);
    }
    Ok(EvalConfig { entries })
}

/// Read and parse an evaluation config file.
///
/// # Errors
///
/// `Error::Io` on read failure, `Error::Parse` on a malformed value
pub fn load_eval_config<P: AsRef<Path>>(path: P) -> Result<EvalConfig> {
    parse_eval_config(&fs::read_to_string(path.as_ref())?)
}

/// Parse a complete literal; trailing input is an error.
pub(crate) fn parse_literal(input: &str) -> std::result::Result<Literal, String> {
    let mut parser = LiteralParser::new(input);
    let literal = parser.literal()?;
    parser.skip_ws();
    if let Some(c) = parser.peek() {
        return Err(format!("unexpected '{c}' after literal"));
    }
    Ok(literal)
}

struct LiteralParser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> LiteralParser<'a> {
    const fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn literal(&mut self) -> std::result::Result<Literal, String> {
        self.skip_ws();
        match self.peek() {
            None => Err("expected a value".to_string()),
            Some(q @ ('\'' | '"')) => self.string(q),
            Some('[') => self.list(),
            Some(_) => self.atom(),
        }
    }

    fn string(&mut self, quote: char) -> std::result::Result<Literal, String> {
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err("unterminated string".to_string()),
                Some(c) if c == quote => return Ok(Literal::Str(out)),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(c @ ('\\' | '\'' | '"')) => out.push(c),
                    Some(c) => return Err(format!("unknown escape '\\{c}'")),
                    None => return Err("unterminated string".to_string()),
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn list(&mut self) -> std::result::Result<Literal, String> {
        self.bump();
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(']') {
                self.bump();
                return Ok(Literal::List(items));
            }
            items.push(self.literal()?);
            self.skip_ws();
            match self.bump() {
                Some(',') => {}
                Some(']') => return Ok(Literal::List(items)),
                Some(c) => return Err(format!("expected ',' or ']', found '{c}'")),
                None => return Err("unterminated list".to_string()),
            }
        }
    }

    fn atom(&mut self) -> std::result::Result<Literal, String> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| !c.is_whitespace() && c != ',' && c != ']')
        {
            self.bump();
        }
        let word = &self.src[start..self.pos];
        match word {
            "True" => Ok(Literal::Bool(true)),
            "False" => Ok(Literal::Bool(false)),
            "None" => Ok(Literal::None),
            _ => parse_number(word).ok_or_else(|| format!("invalid literal '{word}'")),
        }
    }
}

fn parse_number(word: &str) -> Option<Literal> {
    if let Ok(value) = word.parse::<i64>() {
        return Some(Literal::Int(value));
    }
    // f64::from_str also takes "infinity"; only digits, '.', inf and nan qualify
    let unsigned = word.trim_start_matches(['+', '-']);
    let numeric = unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        || matches!(unsigned, "inf" | "nan");
    if !numeric {
        return None;
    }
    word.parse::<f64>().ok().map(Literal::Float)
}
