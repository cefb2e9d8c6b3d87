//! Artifact persistence: every artifact is one rectangular `.npy` array
//! with frequency (or time) as the leading axis. Loads validate the shape
//! the run expects instead of truncating or padding.

use std::path::Path;

use ndarray::{Array1, Array2};

use ndarray_npy::{read_npy, write_npy};

use num::complex::Complex;

use crate::{error::SimError, fringe::Baseline};

fn check_shape<T>(
    what: &'static str,
    expected: (usize, usize),
    data: &Array2<T>,
) -> Result<(), SimError> {
    if data.shape() != [expected.0, expected.1] {
        return Err(SimError::ShapeMismatch {
            what,
            expected,
            actual: (data.shape()[0], data.shape()[1]),
        });
    }
    Ok(())
}

pub fn save_real_stack<P: AsRef<Path>>(path: P, data: &Array2<f64>) -> Result<(), SimError> {
    write_npy(path, data)?;
    Ok(())
}

pub fn load_real_stack<P: AsRef<Path>>(
    path: P,
    what: &'static str,
    expected: (usize, usize),
) -> Result<Array2<f64>, SimError> {
    let data: Array2<f64> = read_npy(path)?;
    check_shape(what, expected, &data)?;
    Ok(data)
}

pub fn save_complex_stack<P: AsRef<Path>>(
    path: P,
    data: &Array2<Complex<f64>>,
) -> Result<(), SimError> {
    write_npy(path, data)?;
    Ok(())
}

pub fn load_complex_stack<P: AsRef<Path>>(
    path: P,
    what: &'static str,
    expected: (usize, usize),
) -> Result<Array2<Complex<f64>>, SimError> {
    let data: Array2<Complex<f64>> = read_npy(path)?;
    check_shape(what, expected, &data)?;
    Ok(data)
}

/// Polynomial beam coefficient stack; only the pixel axis is constrained.
pub fn load_poly_coeffs<P: AsRef<Path>>(path: P, npix: usize) -> Result<Array2<f64>, SimError> {
    let data: Array2<f64> = read_npy(path)?;
    if data.shape()[1] != npix {
        return Err(SimError::ShapeMismatch {
            what: "beam coefficients",
            expected: (data.shape()[0], npix),
            actual: (data.shape()[0], data.shape()[1]),
        });
    }
    Ok(data)
}

pub fn load_map<P: AsRef<Path>>(path: P, npix: usize) -> Result<Vec<f64>, SimError> {
    let data: Array1<f64> = read_npy(path)?;
    if data.len() != npix {
        return Err(SimError::ShapeMismatch {
            what: "sky map",
            expected: (1, npix),
            actual: (1, data.len()),
        });
    }
    Ok(data.to_vec())
}

pub fn beam_maps_name(pol: &str, nside: usize) -> String {
    format!("{}_beam_maps_nside{}.npy", pol, nside)
}

pub fn sky_alm_name(label: &str, nside: usize) -> String {
    format!("{}_skymap_nside{}.npy", label, nside)
}

pub fn fringe_alm_name(baseline: &Baseline, pol: &str) -> String {
    format!(
        "blm_u{}_v{}_w{}_{}.npy",
        baseline.u, baseline.v, baseline.w, pol
    )
}
