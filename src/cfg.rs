use std::{fs::File, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    constants::{BEAM_ORIENTATION_DEG, SKY_ORIENTATION_DEG},
    error::SimError,
};

/// Site orientation offsets in (lon, lat) degrees.
#[derive(Clone, Serialize, Deserialize)]
pub struct SiteCfg {
    pub beam_orientation_deg: (f64, f64),
    pub sky_orientation_deg: (f64, f64),
}

impl Default for SiteCfg {
    fn default() -> Self {
        SiteCfg {
            beam_orientation_deg: BEAM_ORIENTATION_DEG,
            sky_orientation_deg: SKY_ORIENTATION_DEG,
        }
    }
}

impl SiteCfg {
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, SimError> {
        let f = File::open(path)?;
        Ok(serde_yaml::from_reader(f)?)
    }
}
