use std::f64::consts::PI;

use ndarray::{Array1, Array2, ArrayView2, Axis};

use num::complex::Complex;

use rayon::prelude::*;

use crate::{
    constants::{LST_BIN_SAMPLES, LST_BIN_SPAN_RAD, TRANSIT_SAMPLES},
    error::SimError,
    sht::{alm_orders, n_alm},
};

/// Sidereal rotation angle sequence: the published LST-binned cadence, or
/// a full transit from -pi to pi.
pub fn rotation_angles(lst_binned: bool) -> Vec<f64> {
    if lst_binned {
        Array1::linspace(0.0, LST_BIN_SPAN_RAD, LST_BIN_SAMPLES).to_vec()
    } else {
        Array1::linspace(-PI, PI, TRANSIT_SAMPLES).to_vec()
    }
}

/// One complex visibility per (time step, channel). Advancing sidereal
/// time by theta only multiplies each order-m coefficient by
/// `exp(-i*m*theta)`, so every time step is a weighted sum over modes
/// instead of a re-gridded sky.
pub fn integrate(
    sky_alm: ArrayView2<Complex<f64>>,
    fringe_alm: ArrayView2<Complex<f64>>,
    angles: &[f64],
    lmax: usize,
) -> Result<Array2<Complex<f64>>, SimError> {
    if sky_alm.shape() != fringe_alm.shape() {
        return Err(SimError::ShapeMismatch {
            what: "beam*fringe coefficients",
            expected: (sky_alm.shape()[0], sky_alm.shape()[1]),
            actual: (fringe_alm.shape()[0], fringe_alm.shape()[1]),
        });
    }
    if sky_alm.shape()[1] != n_alm(lmax) {
        return Err(SimError::ShapeMismatch {
            what: "sky coefficients",
            expected: (sky_alm.shape()[0], n_alm(lmax)),
            actual: (sky_alm.shape()[0], sky_alm.shape()[1]),
        });
    }
    let nfreq = sky_alm.shape()[0];
    let ms = alm_orders(lmax);
    let mut vis = Array2::<Complex<f64>>::zeros((angles.len(), nfreq));
    vis.axis_iter_mut(Axis(0))
        .into_par_iter()
        .zip(angles.par_iter())
        .for_each(|(mut row, &theta)| {
            let phase: Vec<Complex<f64>> = (0..=lmax)
                .map(|m| Complex::from_polar(1.0, -(m as f64) * theta))
                .collect();
            for (f, v) in row.iter_mut().enumerate() {
                let mut acc = Complex::new(0.0, 0.0);
                for (k, &m) in ms.iter().enumerate() {
                    acc += sky_alm[(f, k)] * fringe_alm[(f, k)] * phase[m];
                }
                *v = acc;
            }
        });
    Ok(vis)
}
