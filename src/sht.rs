//! Spherical-harmonic analysis and synthesis on the RING pixelization.
//!
//! Coefficients are kept for m in [0, lmax], l in [m, lmax], stored
//! m-major (flat index `m*(2*lmax+1-m)/2 + l`), fully normalized with the
//! Condon-Shortley phase. Per ring, the azimuthal sum is a forward FFT:
//! order m lands in bin `m % n_ring` exactly, because the ring samples
//! are equally spaced in azimuth.

use std::f64::consts::PI;

use num::complex::Complex;

use rustfft::FftPlanner;

use scorus::{
    coordinates::SphCoord,
    healpix::{
        pix::{pix2ring_ring, pix2vec_ring, ring2z_ring},
        utils::nside2nring,
    },
};

use crate::grid::SphericalGrid;

/// Maximum degree used by the pipeline for a given resolution.
pub fn degree_bound(nside: usize) -> usize {
    3 * nside - 1
}

/// Number of (l, m) coefficients kept up to `lmax`.
pub fn n_alm(lmax: usize) -> usize {
    (lmax + 1) * (lmax + 2) / 2
}

/// Order m of every flat coefficient index.
pub fn alm_orders(lmax: usize) -> Vec<usize> {
    let mut ms = Vec::with_capacity(n_alm(lmax));
    for m in 0..=lmax {
        for _l in m..=lmax {
            ms.push(m);
        }
    }
    ms
}

struct Ring {
    start: usize,
    count: usize,
    z: f64,
    phi0: f64,
}

pub struct HarmonicTransform {
    lmax: usize,
    npix: usize,
    rings: Vec<Ring>,
}

impl HarmonicTransform {
    pub fn new(grid: &SphericalGrid, lmax: usize) -> Self {
        let nside = grid.nside();
        let npix = grid.npix();
        let mut rings: Vec<Ring> = Vec::with_capacity(nside2nring(nside));
        for ipix in 0..npix {
            let iring = pix2ring_ring(nside, ipix);
            if iring > rings.len() {
                let v = pix2vec_ring::<f64>(nside, ipix);
                rings.push(Ring {
                    start: ipix,
                    count: 0,
                    z: ring2z_ring::<f64>(nside, iring),
                    phi0: SphCoord::from_xyz(v.x, v.y, v.z).az,
                });
            }
            rings.last_mut().unwrap().count += 1;
        }
        HarmonicTransform { lmax, npix, rings }
    }

    pub fn lmax(&self) -> usize {
        self.lmax
    }

    pub fn n_coeffs(&self) -> usize {
        n_alm(self.lmax)
    }

    /// Forward transform with `n_iter` residual refinement passes.
    pub fn map2alm(&self, map: &[f64], n_iter: usize) -> Vec<Complex<f64>> {
        let mut alm = self.analyze(map);
        for _ in 0..n_iter {
            let recon = self.alm2map(&alm);
            let resid: Vec<f64> = map
                .iter()
                .zip(recon.iter())
                .map(|(&a, &b)| a - b)
                .collect();
            let corr = self.analyze(&resid);
            for (a, c) in alm.iter_mut().zip(corr.iter()) {
                *a += *c;
            }
        }
        alm
    }

    /// Analysis is linear, so a complex map decomposes component-wise.
    pub fn map2alm_complex(&self, map: &[Complex<f64>], n_iter: usize) -> Vec<Complex<f64>> {
        let re: Vec<f64> = map.iter().map(|c| c.re).collect();
        let im: Vec<f64> = map.iter().map(|c| c.im).collect();
        let alm_re = self.map2alm(&re, n_iter);
        let alm_im = self.map2alm(&im, n_iter);
        alm_re
            .iter()
            .zip(alm_im.iter())
            .map(|(&a, &b)| a + Complex::<f64>::i() * b)
            .collect()
    }

    fn analyze(&self, map: &[f64]) -> Vec<Complex<f64>> {
        assert_eq!(map.len(), self.npix);
        let domega = 4.0 * PI / self.npix as f64;
        let mut alm = vec![Complex::new(0.0, 0.0); self.n_coeffs()];
        let mut plm = vec![0.0; self.n_coeffs()];
        let mut planner = FftPlanner::new();
        for ring in &self.rings {
            let mut buf: Vec<Complex<f64>> = map[ring.start..ring.start + ring.count]
                .iter()
                .map(|&x| Complex::new(x, 0.0))
                .collect();
            planner.plan_fft_forward(ring.count).process(&mut buf);
            legendre_table(self.lmax, ring.z, &mut plm);
            let mut k = 0;
            for m in 0..=self.lmax {
                let g = buf[m % ring.count] * Complex::from_polar(domega, -(m as f64) * ring.phi0);
                for _l in m..=self.lmax {
                    alm[k] += g * plm[k];
                    k += 1;
                }
            }
        }
        alm
    }

    /// Synthesis of a real field from m >= 0 coefficients.
    pub fn alm2map(&self, alm: &[Complex<f64>]) -> Vec<f64> {
        assert_eq!(alm.len(), self.n_coeffs());
        let mut map = vec![0.0; self.npix];
        let mut plm = vec![0.0; self.n_coeffs()];
        for ring in &self.rings {
            legendre_table(self.lmax, ring.z, &mut plm);
            let mut h = vec![Complex::new(0.0, 0.0); self.lmax + 1];
            let mut k = 0;
            for m in 0..=self.lmax {
                for _l in m..=self.lmax {
                    h[m] += alm[k] * plm[k];
                    k += 1;
                }
            }
            let dphi = 2.0 * PI / ring.count as f64;
            for j in 0..ring.count {
                let phi = ring.phi0 + j as f64 * dphi;
                let step = Complex::from_polar(1.0, phi);
                let mut ph = step;
                let mut val = h[0].re;
                for m in 1..=self.lmax {
                    val += 2.0 * (h[m] * ph).re;
                    ph *= step;
                }
                map[ring.start + j] = val;
            }
        }
        map
    }
}

/// Fully normalized associated Legendre values at `x = cos(theta)`, filled
/// in the m-major coefficient layout. Three-term recurrence in l after
/// seeding the diagonal.
fn legendre_table(lmax: usize, x: f64, out: &mut [f64]) {
    assert_eq!(out.len(), n_alm(lmax));
    let sth = (1.0 - x * x).max(0.0).sqrt();
    let mut pmm = (0.25 / PI).sqrt();
    let mut k = 0;
    for m in 0..=lmax {
        if m > 0 {
            pmm *= -sth * ((2 * m + 1) as f64 / (2 * m) as f64).sqrt();
        }
        out[k] = pmm;
        k += 1;
        if m < lmax {
            let mut pl_prev = pmm;
            let mut pl = x * ((2 * m + 3) as f64).sqrt() * pmm;
            out[k] = pl;
            k += 1;
            for l in (m + 2)..=lmax {
                let lf = l as f64;
                let mf = m as f64;
                let a = ((4.0 * lf * lf - 1.0) / (lf * lf - mf * mf)).sqrt();
                let b = (((lf - 1.0) * (lf - 1.0) - mf * mf)
                    / (4.0 * (lf - 1.0) * (lf - 1.0) - 1.0))
                    .sqrt();
                let pl_next = a * (x * pl - b * pl_prev);
                out[k] = pl_next;
                k += 1;
                pl_prev = pl;
                pl = pl_next;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::grid::SphericalGrid;

    fn rms(a: &[f64], b: &[f64]) -> f64 {
        let s: f64 = a
            .iter()
            .zip(b.iter())
            .map(|(&x, &y)| (x - y) * (x - y))
            .sum();
        (s / a.len() as f64).sqrt()
    }

    #[test]
    fn constant_map_is_pure_monopole() {
        let grid = SphericalGrid::new(8);
        let sht = HarmonicTransform::new(&grid, degree_bound(8));
        let map = vec![100.0; grid.npix()];
        let alm = sht.map2alm(&map, 3);
        let a00 = 100.0 * (4.0 * PI).sqrt();
        assert_abs_diff_eq!(alm[0].re, a00, epsilon = 1e-6 * a00);
        assert_abs_diff_eq!(alm[0].im, 0.0, epsilon = 1e-9);
        let spill = alm[1..]
            .iter()
            .map(|c| c.norm())
            .fold(0.0, f64::max);
        assert!(spill < 1e-3 * a00);
    }

    #[test]
    fn dipole_coefficient_matches_closed_form() {
        let grid = SphericalGrid::new(16);
        let lmax = degree_bound(16);
        let sht = HarmonicTransform::new(&grid, lmax);
        let map: Vec<f64> = (0..grid.npix())
            .map(|i| grid.pixel_direction(i).z)
            .collect();
        let alm = sht.map2alm(&map, 3);
        // f = z => a_10 = sqrt(4*pi/3), everything else ~ 0
        let a10 = (4.0 * PI / 3.0).sqrt();
        assert_abs_diff_eq!(alm[1].re, a10, epsilon = 1e-3);
        assert_abs_diff_eq!(alm[0].re, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn refinement_shrinks_reconstruction_error() {
        let grid = SphericalGrid::new(16);
        let sht = HarmonicTransform::new(&grid, degree_bound(16));
        let map: Vec<f64> = (0..grid.npix())
            .map(|i| {
                let z = grid.pixel_direction(i).z;
                1.0 + 0.5 * z + 0.3 * (1.5 * z * z - 0.5)
            })
            .collect();
        let rms0 = rms(&sht.alm2map(&sht.map2alm(&map, 0)), &map);
        let rms3 = rms(&sht.alm2map(&sht.map2alm(&map, 3)), &map);
        assert!(rms3 < rms0);
        assert!(rms3 < 1e-3);
    }

    #[test]
    fn complex_path_agrees_with_real_path_on_real_input() {
        let grid = SphericalGrid::new(8);
        let sht = HarmonicTransform::new(&grid, degree_bound(8));
        let map: Vec<f64> = (0..grid.npix())
            .map(|i| 1.0 + grid.pixel_direction(i).x)
            .collect();
        let as_complex: Vec<Complex<f64>> =
            map.iter().map(|&x| Complex::new(x, 0.0)).collect();
        let real_path = sht.map2alm(&map, 2);
        let complex_path = sht.map2alm_complex(&as_complex, 2);
        for (a, b) in real_path.iter().zip(complex_path.iter()) {
            assert_abs_diff_eq!(a.re, b.re, epsilon = 1e-12);
            assert_abs_diff_eq!(a.im, b.im, epsilon = 1e-12);
        }
    }
}
