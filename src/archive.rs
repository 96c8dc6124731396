//! Named-array archives (`.npz`)
//!
//! Every member is materialised eagerly and widened to `f64`, so callers see
//! one element type regardless of what the trainer saved.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use ndarray::{ArrayD, IxDyn, OwnedRepr};
use ndarray_npy::{NpzReader, ReadNpzError};

use crate::{Error, Result};

/// In-memory archive: field name -> n-d array.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Archive {
    path: PathBuf,
    fields: BTreeMap<String, ArrayD<f64>>,
}

impl Archive {
    /// Build an archive from fields already in memory.
    #[must_use]
    pub fn from_fields(
        path: impl Into<PathBuf>,
        fields: impl IntoIterator<Item = (String, ArrayD<f64>)>,
    ) -> Self {
        Self {
            path: path.into(),
            fields: fields.into_iter().collect(),
        }
    }

    /// Load every array in an `.npz` file.
    ///
    /// # Errors
    ///
    /// `Error::Io` if the file cannot be opened, `Error::Npz` if it is not a
    /// valid archive or holds an array with an unsupported dtype
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = NpzReader::new(File::open(path)?)?;
        let mut fields = BTreeMap::new();
        for name in reader.names()? {
            let array = read_as_f64(&mut reader, &name)?;
            let key = name.strip_suffix(".npy").unwrap_or(&name).to_string();
            fields.insert(key, array);
        }
        Ok(Self {
            path: path.to_path_buf(),
            fields,
        })
    }

    /// Source path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the archive holds no arrays.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in sorted order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// True if the field exists.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Optional lookup.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&ArrayD<f64>> {
        self.fields.get(field)
    }

    /// Required lookup.
    ///
    /// # Errors
    ///
    /// `Error::MissingField` if the field is absent
    pub fn require(&self, field: &str) -> Result<&ArrayD<f64>> {
        self.fields.get(field).ok_or_else(|| Error::MissingField {
            field: field.to_string(),
            path: self.path.clone(),
        })
    }

    /// Remove a field, transferring ownership.
    pub fn take(&mut self, field: &str) -> Option<ArrayD<f64>> {
        self.fields.remove(field)
    }
}

/// Try each supported dtype in turn; the last error wins.
#[allow(clippy::cast_precision_loss)]
fn read_as_f64<R: Read + Seek>(reader: &mut NpzReader<R>, name: &str) -> Result<ArrayD<f64>> {
    if let Ok(array) = reader.by_name::<OwnedRepr<f64>, IxDyn>(name) {
        return Ok(array);
    }
    if let Ok(array) = reader.by_name(name).map(|a: ArrayD<f32>| a.mapv(f64::from)) {
        return Ok(array);
    }
    if let Ok(array) = reader.by_name(name).map(|a: ArrayD<i64>| a.mapv(|v| v as f64)) {
        return Ok(array);
    }
    if let Ok(array) = reader.by_name(name).map(|a: ArrayD<i32>| a.mapv(f64::from)) {
        return Ok(array);
    }
    if let Ok(array) = reader.by_name(name).map(|a: ArrayD<u8>| a.mapv(f64::from)) {
        return Ok(array);
    }
    let array: std::result::Result<ArrayD<bool>, ReadNpzError> = reader.by_name(name);
    Ok(array?.mapv(|b| f64::from(u8::from(b))))
}
