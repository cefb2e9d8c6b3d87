use scorus::{
    coordinates::{rotation3d::RotMatrix, SphCoord, Vec3d},
    healpix::{interp::get_interpol_ring, pix::pix2vec_ring, utils::nside2npix},
};

use crate::error::SimError;

/// Fixed equal-area pixelization of the sphere, RING ordering.
pub struct SphericalGrid {
    nside: usize,
    npix: usize,
}

impl SphericalGrid {
    /// The ring layout requires a positive power-of-two resolution.
    pub fn check_nside(nside: usize) -> Result<(), SimError> {
        if nside == 0 || !nside.is_power_of_two() {
            return Err(SimError::BadResolution(nside));
        }
        Ok(())
    }

    pub fn new(nside: usize) -> Self {
        SphericalGrid {
            nside,
            npix: nside2npix(nside),
        }
    }

    pub fn nside(&self) -> usize {
        self.nside
    }

    pub fn npix(&self) -> usize {
        self.npix
    }

    pub fn pixel_direction(&self, ipix: usize) -> Vec3d<f64> {
        pix2vec_ring::<f64>(self.nside, ipix)
    }

    pub fn pixel_angles(&self, ipix: usize) -> SphCoord<f64> {
        let v = self.pixel_direction(ipix);
        SphCoord::from_xyz(v.x, v.y, v.z)
    }

    /// The ring-interpolation pixel of maximum weight, i.e. the pixel
    /// containing the direction.
    pub fn nearest_pixel(&self, dir: SphCoord<f64>) -> usize {
        let (pix, wgt) = get_interpol_ring(self.nside, dir);
        let mut best = 0;
        for i in 1..wgt.len() {
            if wgt[i] > wgt[best] {
                best = i;
            }
        }
        pix[best]
    }

    /// Pixels immediately surrounding a direction.
    pub fn neighbours(&self, dir: SphCoord<f64>) -> Vec<usize> {
        let (pix, _wgt) = get_interpol_ring(self.nside, dir);
        pix.iter().copied().collect()
    }

    /// Precompute the nearest-pixel index map of a rigid rotation: output
    /// pixel p takes the value of the input pixel nearest to `rot`
    /// applied to p's direction. Build once per distinct rotation.
    pub fn resample_table(&self, rot: &Rotation) -> ResampleTable {
        let table = (0..self.npix)
            .map(|ipix| {
                let v = rot.apply(self.pixel_direction(ipix));
                self.nearest_pixel(SphCoord::from_xyz(v.x, v.y, v.z))
            })
            .collect();
        ResampleTable { table }
    }
}

/// Rigid rotation of sky coordinates.
#[derive(Clone)]
pub struct Rotation {
    mat: RotMatrix<f64>,
}

impl Rotation {
    pub fn identity() -> Self {
        Rotation {
            mat: RotMatrix::about_axis_by_angle(&Vec3d::new(0.0, 0.0, 1.0), 0.0),
        }
    }

    /// `Rz(lon)*Ry(-lat)`: (0, 0) keeps the pole at the pole, (0, 90)
    /// resamples the polar region onto the equator.
    pub fn from_lonlat_deg(lon: f64, lat: f64) -> Self {
        let mat = RotMatrix::about_axis_by_angle(&Vec3d::new(0.0, 0.0, 1.0), lon.to_radians())
            * RotMatrix::about_axis_by_angle(&Vec3d::new(0.0, 1.0, 0.0), -lat.to_radians());
        Rotation { mat }
    }

    pub fn apply(&self, v: Vec3d<f64>) -> Vec3d<f64> {
        self.mat.clone() * v
    }
}

/// Nearest-pixel resampling table. This is the grid's only resampling
/// primitive; it is deliberately not an interpolation.
pub struct ResampleTable {
    table: Vec<usize>,
}

impl ResampleTable {
    pub fn apply<T: Copy>(&self, map: &[T]) -> Vec<T> {
        assert_eq!(map.len(), self.table.len());
        self.table.iter().map(|&ipix| map[ipix]).collect()
    }
}
