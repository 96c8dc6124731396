//! `.npz` dataset loading

use std::path::Path;

use ndarray::ArrayD;
use tracing::info;

use super::Dataset;
use crate::archive::Archive;
use crate::{Error, Result};

/// Load one dataset archive.
///
/// `x`, `t`, and `yf` are required. Every other field is optional and
/// defaults independently.
///
/// # Errors
///
/// `Error::Io`/`Error::Npz` if the archive cannot be read,
/// `Error::MissingField` if a required field is absent
pub fn load_data_npz<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let path = path.as_ref();
    let mut archive = Archive::load(path)?;

    let x = take_required(&mut archive, "x")?;
    let t = take_required(&mut archive, "t")?;
    let yf = take_required(&mut archive, "yf")?;
    let sparse = x.ndim() == 1;

    let e = archive.take("e");
    let ate = archive.take("ate").and_then(|ate| ate.mean());
    let (y_mul, y_add) = scaling(&archive);

    let (ycf, mu0, mu1) = match (archive.take("ycf"), archive.take("mu0"), archive.take("mu1")) {
        (Some(ycf), Some(mu0), Some(mu1)) => (Some(ycf), Some(mu0), Some(mu1)),
        _ => {
            info!(path = %path.display(), "couldn't find ground truth, proceeding");
            (None, None, None)
        }
    };
    let have_truth = ycf.is_some();

    Ok(Dataset {
        x,
        t,
        yf,
        ycf,
        mu0,
        mu1,
        e,
        ate,
        y_mul,
        y_add,
        have_truth,
        sparse,
    })
}

fn take_required(archive: &mut Archive, field: &str) -> Result<ArrayD<f64>> {
    archive.take(field).ok_or_else(|| Error::MissingField {
        field: field.to_string(),
        path: archive.path().to_path_buf(),
    })
}

/// First element of `ymul`/`yadd`; identity unless both are present.
fn scaling(archive: &Archive) -> (f64, f64) {
    let first = |field: &str| archive.get(field).and_then(|a| a.iter().next().copied());
    match (first("ymul"), first("yadd")) {
        (Some(mul), Some(add)) => (mul, add),
        _ => (1.0, 0.0),
    }
}
