use ndarray::Array2;

use num::complex::Complex;

use vis_simulator::{
    build_beam_maps, build_fringe_alm, build_sky_alm,
    degree_bound,
    io::{load_complex_stack, load_real_stack, save_complex_stack, save_real_stack},
    sky::{self, SkySpec},
    Baseline, HarmonicTransform, PolyBeam, Rotation, SimError, SphericalGrid,
};

const NSIDE: usize = 8;

fn flat_pattern(grid: &SphericalGrid) -> PolyBeam {
    PolyBeam::new(Array2::ones((1, grid.npix())))
}

fn domega(grid: &SphericalGrid) -> f64 {
    4.0 * std::f64::consts::PI / grid.npix() as f64
}

#[test]
fn uniform_sky_with_zero_baseline_gives_a_constant_series() {
    let grid = SphericalGrid::new(NSIDE);
    let lmax = degree_bound(NSIDE);
    let sht = HarmonicTransform::new(&grid, lmax);
    let freqs = [150e6, 170e6];

    let beams = build_beam_maps(&freqs, &grid, &flat_pattern(&grid), &Rotation::identity())
        .unwrap();
    let sky_alm = build_sky_alm(
        &freqs,
        &grid,
        &SkySpec::Uniform,
        &Rotation::identity(),
        None,
        &sht,
        3,
    )
    .unwrap();
    let baseline = Baseline {
        u: 0.0,
        v: 0.0,
        w: 0.0,
    };
    let fringe_alm =
        build_fringe_alm(&freqs, &grid, &baseline, beams.view(), &sht, 3).unwrap();

    let angles = vis_simulator::rotation_angles(false);
    let vis = vis_simulator::integrate(sky_alm.view(), fringe_alm.view(), &angles, lmax).unwrap();

    let sky = sky::base_map(&grid, &SkySpec::Uniform, &Rotation::identity()).unwrap();
    for f in 0..freqs.len() {
        let first = vis[(0, f)];
        assert!(first.norm() > 0.0);
        for t in 0..angles.len() {
            assert!((vis[(t, f)] - first).norm() < 1e-3 * first.norm());
        }
        if f == 0 {
            // at the reference frequency the series equals the
            // beam-weighted sky integral
            let expected: f64 = beams
                .row(0)
                .iter()
                .zip(sky.iter())
                .map(|(&b, &t)| b * t)
                .sum::<f64>()
                * domega(&grid);
            assert!((first.re - expected).abs() < 1e-2 * expected);
            assert!(first.im.abs() < 1e-2 * expected);
        }
    }
}

#[test]
fn polar_point_source_with_zero_baseline_has_no_fringe_modulation() {
    let grid = SphericalGrid::new(NSIDE);
    let lmax = degree_bound(NSIDE);
    let sht = HarmonicTransform::new(&grid, lmax);
    let freqs = [150e6];

    // park the reference source on the pole, under the beam peak
    let sky_orientation = Rotation::from_lonlat_deg(0.0, -90.0);
    let beams = build_beam_maps(&freqs, &grid, &flat_pattern(&grid), &Rotation::identity())
        .unwrap();
    let sky_alm = build_sky_alm(
        &freqs,
        &grid,
        &SkySpec::PointSource,
        &sky_orientation,
        None,
        &sht,
        3,
    )
    .unwrap();
    let baseline = Baseline {
        u: 0.0,
        v: 0.0,
        w: 0.0,
    };
    let fringe_alm =
        build_fringe_alm(&freqs, &grid, &baseline, beams.view(), &sht, 3).unwrap();

    let angles = vis_simulator::rotation_angles(false);
    let vis = vis_simulator::integrate(sky_alm.view(), fringe_alm.view(), &angles, lmax).unwrap();

    let mags: Vec<f64> = (0..angles.len()).map(|t| vis[(t, 0)].norm()).collect();
    let mean = mags.iter().sum::<f64>() / mags.len() as f64;
    let std = (mags.iter().map(|m| (m - mean) * (m - mean)).sum::<f64>()
        / mags.len() as f64)
        .sqrt();
    assert!(std < 0.05 * mean);

    let sky = sky::base_map(&grid, &SkySpec::PointSource, &sky_orientation).unwrap();
    let expected: f64 = beams
        .row(0)
        .iter()
        .zip(sky.iter())
        .map(|(&b, &t)| b * t)
        .sum::<f64>()
        * domega(&grid);
    assert!((mean - expected).abs() < 0.2 * expected);
}

#[test]
fn opposite_baselines_give_conjugate_series() {
    let grid = SphericalGrid::new(NSIDE);
    let lmax = degree_bound(NSIDE);
    let sht = HarmonicTransform::new(&grid, lmax);
    let freqs = [150e6];

    let beams = build_beam_maps(&freqs, &grid, &flat_pattern(&grid), &Rotation::identity())
        .unwrap();
    let sky_alm = build_sky_alm(
        &freqs,
        &grid,
        &SkySpec::Uniform,
        &Rotation::identity(),
        None,
        &sht,
        3,
    )
    .unwrap();

    let fwd = Baseline {
        u: 2.0,
        v: 1.0,
        w: 0.5,
    };
    let rev = Baseline {
        u: -fwd.u,
        v: -fwd.v,
        w: -fwd.w,
    };
    let blm_fwd = build_fringe_alm(&freqs, &grid, &fwd, beams.view(), &sht, 3).unwrap();
    let blm_rev = build_fringe_alm(&freqs, &grid, &rev, beams.view(), &sht, 3).unwrap();

    let angles = vis_simulator::rotation_angles(false);
    let vis_fwd =
        vis_simulator::integrate(sky_alm.view(), blm_fwd.view(), &angles, lmax).unwrap();
    let vis_rev =
        vis_simulator::integrate(sky_alm.view(), blm_rev.view(), &angles, lmax).unwrap();

    let peak = vis_fwd.iter().map(|v| v.norm()).fold(0.0, f64::max);
    for (a, b) in vis_fwd.iter().zip(vis_rev.iter()) {
        assert!((a.conj() - b).norm() < 1e-2 * peak);
    }
}

#[test]
fn artifacts_round_trip_exactly_and_reject_wrong_shapes() {
    let dir = tempfile::tempdir().unwrap();

    let real = Array2::from_shape_fn((3, 7), |(i, j)| (i * 7 + j) as f64 * 0.25);
    let real_path = dir.path().join("beams.npy");
    save_real_stack(&real_path, &real).unwrap();
    assert_eq!(load_real_stack(&real_path, "beam maps", (3, 7)).unwrap(), real);

    let complex =
        Array2::from_shape_fn((2, 5), |(i, j)| Complex::new(i as f64, j as f64 - 2.0));
    let complex_path = dir.path().join("alm.npy");
    save_complex_stack(&complex_path, &complex).unwrap();
    assert_eq!(
        load_complex_stack(&complex_path, "sky coefficients", (2, 5)).unwrap(),
        complex
    );

    let err = load_real_stack(&real_path, "beam maps", (3, 8)).unwrap_err();
    assert!(matches!(err, SimError::ShapeMismatch { .. }));
}
