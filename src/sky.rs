use std::f64::consts::FRAC_PI_2;

use log::debug;

use ndarray::{Array2, Axis};

use num::complex::Complex;

use rand::Rng;

use rayon::prelude::*;

use scorus::coordinates::SphCoord;

use crate::{
    constants::{FREQ_REF_HZ, POINT_SOURCE_TEMP, SPECTRAL_INDEX, UNIFORM_SKY_TEMP},
    error::SimError,
    grid::{Rotation, SphericalGrid},
    sht::HarmonicTransform,
};

/// Sky brightness-temperature selection.
pub enum SkySpec {
    /// Uniform 100 K background.
    Uniform,
    /// 500 K near-delta source: the pixel at (theta = pi/2, phi = 0) plus
    /// its neighbours, resampled to the site's sky orientation.
    PointSource,
    /// Externally supplied pixel map, as-is.
    Map(Vec<f64>),
}

/// Frequency-independent base temperature map.
pub fn base_map(
    grid: &SphericalGrid,
    spec: &SkySpec,
    orientation: &Rotation,
) -> Result<Vec<f64>, SimError> {
    let npix = grid.npix();
    match spec {
        SkySpec::Uniform => Ok(vec![UNIFORM_SKY_TEMP; npix]),
        SkySpec::PointSource => {
            let mut map = vec![0.0; npix];
            let dir = SphCoord::new(FRAC_PI_2, 0.0);
            map[grid.nearest_pixel(dir)] = POINT_SOURCE_TEMP;
            for ipix in grid.neighbours(dir) {
                map[ipix] = POINT_SOURCE_TEMP;
            }
            Ok(grid.resample_table(orientation).apply(&map))
        }
        SkySpec::Map(m) => {
            if m.len() != npix {
                return Err(SimError::ShapeMismatch {
                    what: "sky map",
                    expected: (1, npix),
                    actual: (1, m.len()),
                });
            }
            Ok(m.clone())
        }
    }
}

/// Per-frequency sky harmonic coefficients: the base map scaled by the
/// power-law spectral index, decomposed channel by channel.
pub fn build_sky_alm(
    freqs: &[f64],
    grid: &SphericalGrid,
    spec: &SkySpec,
    orientation: &Rotation,
    noise_level: Option<f64>,
    sht: &HarmonicTransform,
    n_iter: usize,
) -> Result<Array2<Complex<f64>>, SimError> {
    let mut base = base_map(grid, spec, orientation)?;
    if let Some(level) = noise_level {
        if level <= 0.0 {
            return Err(SimError::BadNoiseLevel(level));
        }
        let mut rng = rand::thread_rng();
        for t in base.iter_mut() {
            *t += rng.gen_range(-level..level);
        }
    }
    let mut alm = Array2::<Complex<f64>>::zeros((freqs.len(), sht.n_coeffs()));
    alm.axis_iter_mut(Axis(0))
        .into_par_iter()
        .zip(freqs.par_iter())
        .for_each(|(mut row, &freq)| {
            debug!("sky a_lm at {} MHz", freq / 1e6);
            let scale = (freq / FREQ_REF_HZ).powf(SPECTRAL_INDEX);
            let scaled: Vec<f64> = base.iter().map(|&t| t * scale).collect();
            for (r, c) in row.iter_mut().zip(sht.map2alm(&scaled, n_iter).iter()) {
                *r = *c;
            }
        });
    Ok(alm)
}
