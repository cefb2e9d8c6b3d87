use log::debug;

use ndarray::{Array2, Axis};

use rayon::prelude::*;

use crate::{
    error::SimError,
    grid::{Rotation, SphericalGrid},
};

/// Pluggable antenna description: raw directional field amplitude per
/// pixel at one frequency. Its parameters and evaluation are opaque to
/// the pipeline.
pub trait BeamPattern: Sync {
    fn response(&self, freq_hz: f64) -> Vec<f64>;
}

/// Degree-bounded polynomial beam: each coefficient is a pixel map and
/// the polynomial variable is the frequency in GHz, highest degree first.
pub struct PolyBeam {
    coeffs: Array2<f64>,
}

impl PolyBeam {
    pub fn new(coeffs: Array2<f64>) -> Self {
        PolyBeam { coeffs }
    }
}

impl BeamPattern for PolyBeam {
    fn response(&self, freq_hz: f64) -> Vec<f64> {
        let x = freq_hz * 1e-9;
        let mut out = vec![0.0; self.coeffs.shape()[1]];
        for row in self.coeffs.rows() {
            for (o, &c) in out.iter_mut().zip(row.iter()) {
                *o = *o * x + c;
            }
        }
        out
    }
}

/// Per-frequency normalized power beams: evaluate the pattern, zero the
/// hemisphere below the horizon, normalize to unit peak, square the field
/// amplitude and resample by the site orientation offset.
pub fn build_beam_maps(
    freqs: &[f64],
    grid: &SphericalGrid,
    pattern: &dyn BeamPattern,
    orientation: &Rotation,
) -> Result<Array2<f64>, SimError> {
    let npix = grid.npix();
    let resample = grid.resample_table(orientation);
    let up: Vec<bool> = (0..npix)
        .map(|ipix| grid.pixel_direction(ipix).z >= 0.0)
        .collect();
    let mut maps = Array2::<f64>::zeros((freqs.len(), npix));
    maps.axis_iter_mut(Axis(0))
        .into_par_iter()
        .zip(freqs.par_iter())
        .try_for_each(|(mut row, &freq)| {
            debug!("beam map at {} MHz", freq / 1e6);
            let mut amp = pattern.response(freq);
            if amp.len() != npix {
                return Err(SimError::ShapeMismatch {
                    what: "beam pattern response",
                    expected: (1, npix),
                    actual: (1, amp.len()),
                });
            }
            for (a, &keep) in amp.iter_mut().zip(up.iter()) {
                if !keep {
                    *a = 0.0;
                }
            }
            let peak = amp.iter().cloned().fold(f64::MIN, f64::max);
            if peak <= 0.0 {
                return Err(SimError::DegenerateBeam { freq_hz: freq });
            }
            for a in amp.iter_mut() {
                *a /= peak;
                *a *= *a;
            }
            for (r, &v) in row.iter_mut().zip(resample.apply(&amp).iter()) {
                *r = v;
            }
            Ok(())
        })?;
    Ok(maps)
}
