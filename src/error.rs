use std::num::{ParseFloatError, ParseIntError};

use ndarray_npy::{ReadNpyError, WriteNpyError};

use thiserror::Error;

/// Every failure aborts the run; artifacts already written stay on disk so
/// a rerun can pick them up through the load paths.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid integer argument: {0}")]
    BadIntArgument(#[from] ParseIntError),

    #[error("invalid numeric argument: {0}")]
    BadFloatArgument(#[from] ParseFloatError),

    #[error("missing input: {0}")]
    MissingInput(&'static str),

    #[error("{what} has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("beam map at {freq_hz} Hz has a non-positive maximum")]
    DegenerateBeam { freq_hz: f64 },

    #[error("noise level {0} must be positive")]
    BadNoiseLevel(f64),

    #[error("nside {0} is not a positive power of two")]
    BadResolution(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    ReadNpy(#[from] ReadNpyError),

    #[error(transparent)]
    WriteNpy(#[from] WriteNpyError),

    #[error("bad site config: {0}")]
    SiteConfig(#[from] serde_yaml::Error),
}
