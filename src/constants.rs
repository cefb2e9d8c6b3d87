pub const LIGHT_SPEED: f64 = 2.99792458E8;

/// Reference frequency of the sky power-law scaling.
pub const FREQ_REF_HZ: f64 = 150e6;
pub const SPECTRAL_INDEX: f64 = -0.7;

pub const UNIFORM_SKY_TEMP: f64 = 100.0;
pub const POINT_SOURCE_TEMP: f64 = 500.0;

/// Orientation offsets in (lon, lat) degrees aligning the beam model pole
/// and the reference sky direction with the assumed observing site. These
/// are supplied constants, not derived from a site parameter.
pub const BEAM_ORIENTATION_DEG: (f64, f64) = (21.0, 120.0);
pub const SKY_ORIENTATION_DEG: (f64, f64) = (180.0, 0.0);

/// Simulated band, kept away from the band edges.
pub const FREQ_START_HZ: f64 = 117e6;
pub const FREQ_STOP_HZ: f64 = 182e6;
pub const N_FREQ: usize = 131;

/// Refinement passes of the forward harmonic transform.
pub const ALM_ITER: usize = 3;

/// LST-binned cadence of the published power-spectrum range.
pub const LST_BIN_SPAN_RAD: f64 = 5.0592;
pub const LST_BIN_SAMPLES: usize = 1632;
/// Full sidereal transit, 4 samples per degree.
pub const TRANSIT_SAMPLES: usize = 360 * 4;
