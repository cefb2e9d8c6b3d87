use std::f64::consts::PI;

use log::debug;

use ndarray::{Array2, ArrayView2, Axis};

use num::complex::Complex;

use rayon::prelude::*;

use scorus::coordinates::Vec3d;

use crate::{
    constants::LIGHT_SPEED,
    error::SimError,
    grid::SphericalGrid,
    sht::HarmonicTransform,
};

/// Spatial displacement between the two antennas, in meters.
#[derive(Clone, Debug)]
pub struct Baseline {
    pub u: f64,
    pub v: f64,
    pub w: f64,
}

impl Baseline {
    /// Geometric path-length difference along a sky direction.
    pub fn delay(&self, dir: &Vec3d<f64>) -> f64 {
        self.u * dir.x + self.v * dir.y + self.w * dir.z
    }
}

/// Per-frequency harmonic coefficients of the beam * fringe product.
/// The fringe is the unit-magnitude phase `exp(i*2*pi*(b.s)*f/c)` of each
/// sky direction's path-length difference.
pub fn build_fringe_alm(
    freqs: &[f64],
    grid: &SphericalGrid,
    baseline: &Baseline,
    beams: ArrayView2<f64>,
    sht: &HarmonicTransform,
    n_iter: usize,
) -> Result<Array2<Complex<f64>>, SimError> {
    let npix = grid.npix();
    if beams.shape() != [freqs.len(), npix] {
        return Err(SimError::ShapeMismatch {
            what: "beam maps",
            expected: (freqs.len(), npix),
            actual: (beams.shape()[0], beams.shape()[1]),
        });
    }
    let delays: Vec<f64> = (0..npix)
        .map(|ipix| baseline.delay(&grid.pixel_direction(ipix)))
        .collect();
    let mut alm = Array2::<Complex<f64>>::zeros((freqs.len(), sht.n_coeffs()));
    alm.axis_iter_mut(Axis(0))
        .into_par_iter()
        .zip(beams.axis_iter(Axis(0)).into_par_iter())
        .zip(freqs.par_iter())
        .for_each(|((mut row, beam), &freq)| {
            debug!("beam*fringe a_lm at {} MHz", freq / 1e6);
            let product: Vec<Complex<f64>> = beam
                .iter()
                .zip(delays.iter())
                .map(|(&b, &d)| Complex::from_polar(b, 2.0 * PI * d * freq / LIGHT_SPEED))
                .collect();
            for (r, c) in row.iter_mut().zip(sht.map2alm_complex(&product, n_iter).iter()) {
                *r = *c;
            }
        });
    Ok(alm)
}
