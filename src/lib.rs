pub mod beam;
pub mod cfg;
pub mod constants;
pub mod error;
pub mod fringe;
pub mod grid;
pub mod io;
pub mod sht;
pub mod sky;
pub mod visibility;

pub use crate::{
    beam::{build_beam_maps, BeamPattern, PolyBeam},
    constants::LIGHT_SPEED,
    error::SimError,
    fringe::{build_fringe_alm, Baseline},
    grid::{ResampleTable, Rotation, SphericalGrid},
    sht::{degree_bound, HarmonicTransform},
    sky::{build_sky_alm, SkySpec},
    visibility::{integrate, rotation_angles},
};
