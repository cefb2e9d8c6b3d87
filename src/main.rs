use std::path::Path;

use clap::{Arg, ArgMatches, Command};

use log::{error, info, LevelFilter};

use ndarray::{Array1, Array2};

use vis_simulator::{
    build_beam_maps, build_fringe_alm, build_sky_alm,
    cfg::SiteCfg,
    constants::{ALM_ITER, FREQ_START_HZ, FREQ_STOP_HZ, N_FREQ},
    degree_bound, integrate,
    io::{
        beam_maps_name, fringe_alm_name, load_complex_stack, load_map, load_poly_coeffs,
        load_real_stack, save_complex_stack, save_real_stack, sky_alm_name,
    },
    rotation_angles, Baseline, HarmonicTransform, PolyBeam, Rotation, SimError, SkySpec,
    SphericalGrid,
};

fn main() {
    let matches = Command::new("vis_simulator")
        .about("simulate the visibilities of a single baseline")
        .arg(
            Arg::new("nside")
                .long("nside")
                .takes_value(true)
                .value_name("nside")
                .default_value("128")
                .help("healpix resolution"),
        )
        .arg(
            Arg::new("u")
                .short('u')
                .takes_value(true)
                .value_name("u in m")
                .default_value("30")
                .allow_hyphen_values(true)
                .help("baseline u component in m"),
        )
        .arg(
            Arg::new("v")
                .short('v')
                .takes_value(true)
                .value_name("v in m")
                .default_value("0")
                .allow_hyphen_values(true)
                .help("baseline v component in m"),
        )
        .arg(
            Arg::new("w")
                .short('w')
                .takes_value(true)
                .value_name("w in m")
                .default_value("0")
                .allow_hyphen_values(true)
                .help("baseline w component in m"),
        )
        .arg(
            Arg::new("pol")
                .short('p')
                .long("pol")
                .takes_value(true)
                .value_name("pol")
                .default_value("XX")
                .help("polarization label, used for artifact names only"),
        )
        .arg(
            Arg::new("map")
                .long("map")
                .takes_value(true)
                .value_name("sky")
                .help("\"point\" or a .npy pixel map; absent means a uniform 100 K background"),
        )
        .arg(
            Arg::new("map_alm")
                .long("map-alm")
                .takes_value(true)
                .value_name("npy")
                .help("sky a_lm stack saved by a previous run, overrides --map"),
        )
        .arg(
            Arg::new("beam")
                .short('b')
                .long("beam")
                .takes_value(true)
                .value_name("npy")
                .help("polynomial beam coefficient stack, ncoef x npix"),
        )
        .arg(
            Arg::new("beam_maps")
                .long("beam-maps")
                .takes_value(true)
                .value_name("npy")
                .help("beam map stack saved by a previous run, overrides --beam"),
        )
        .arg(
            Arg::new("fringe_alm")
                .long("fringe-alm")
                .takes_value(true)
                .value_name("npy")
                .help("beam*fringe a_lm stack saved by a previous run, overrides -u -v -w"),
        )
        .arg(
            Arg::new("site")
                .long("site")
                .takes_value(true)
                .value_name("yaml")
                .help("site orientation config"),
        )
        .arg(
            Arg::new("noise")
                .long("noise")
                .takes_value(true)
                .value_name("level in K")
                .help("add uniform noise in +-level to the sky map"),
        )
        .arg(
            Arg::new("lst_bin")
                .long("lst-bin")
                .help("use the LST-binned cadence instead of a full transit"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("only report errors"),
        )
        .arg(
            Arg::new("out")
                .short('o')
                .long("out")
                .takes_value(true)
                .value_name("outfile")
                .required(true)
                .help("output visibility file (.npy, time x freq)"),
        )
        .get_matches();

    env_logger::Builder::from_default_env()
        .filter_level(if matches.is_present("quiet") {
            LevelFilter::Error
        } else {
            LevelFilter::Info
        })
        .init();

    if let Err(e) = run(&matches) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<(), SimError> {
    let nside = matches.value_of("nside").unwrap().parse::<usize>()?;
    SphericalGrid::check_nside(nside)?;
    let grid = SphericalGrid::new(nside);
    let npix = grid.npix();
    let lmax = degree_bound(nside);
    let sht = HarmonicTransform::new(&grid, lmax);
    let freqs = Array1::linspace(FREQ_START_HZ, FREQ_STOP_HZ, N_FREQ).to_vec();
    let pol = matches.value_of("pol").unwrap();
    let site = match matches.value_of("site") {
        Some(path) => SiteCfg::from_yaml(path)?,
        None => SiteCfg::default(),
    };

    let beams = if let Some(path) = matches.value_of("beam_maps") {
        info!("loading beam maps from {}", path);
        load_real_stack(path, "beam maps", (freqs.len(), npix))?
    } else if let Some(path) = matches.value_of("beam") {
        let pattern = PolyBeam::new(load_poly_coeffs(path, npix)?);
        let orientation =
            Rotation::from_lonlat_deg(site.beam_orientation_deg.0, site.beam_orientation_deg.1);
        info!("calculating beam maps");
        let maps = build_beam_maps(&freqs, &grid, &pattern, &orientation)?;
        let name = beam_maps_name(pol, nside);
        info!("saving beam maps to {}", name);
        save_real_stack(&name, &maps)?;
        maps
    } else {
        return Err(SimError::MissingInput(
            "either --beam or --beam-maps is required",
        ));
    };

    let n_coeffs = sht.n_coeffs();
    let sky_alm: Array2<_> = if let Some(path) = matches.value_of("map_alm") {
        info!("loading sky a_lm values from {}", path);
        load_complex_stack(path, "sky coefficients", (freqs.len(), n_coeffs))?
    } else {
        let (spec, label) = match matches.value_of("map") {
            None => (SkySpec::Uniform, "uniform".to_string()),
            Some("point") => (SkySpec::PointSource, "point".to_string()),
            Some(path) => {
                let label = Path::new(path)
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("map")
                    .to_string();
                (SkySpec::Map(load_map(path, npix)?), label)
            }
        };
        let noise = match matches.value_of("noise") {
            Some(s) => Some(s.parse::<f64>()?),
            None => None,
        };
        let orientation =
            Rotation::from_lonlat_deg(site.sky_orientation_deg.0, site.sky_orientation_deg.1);
        info!("calculating sky a_lm values");
        let alm = build_sky_alm(&freqs, &grid, &spec, &orientation, noise, &sht, ALM_ITER)?;
        let name = sky_alm_name(&label, nside);
        info!("saving sky a_lm values to {}", name);
        save_complex_stack(&name, &alm)?;
        alm
    };

    let fringe_alm = if let Some(path) = matches.value_of("fringe_alm") {
        info!("loading beam*fringe a_lm values from {}", path);
        load_complex_stack(path, "beam*fringe coefficients", (freqs.len(), n_coeffs))?
    } else {
        let baseline = Baseline {
            u: matches.value_of("u").unwrap().parse()?,
            v: matches.value_of("v").unwrap().parse()?,
            w: matches.value_of("w").unwrap().parse()?,
        };
        info!("calculating beam*fringe a_lm values for {:?}", baseline);
        let alm = build_fringe_alm(&freqs, &grid, &baseline, beams.view(), &sht, ALM_ITER)?;
        let name = fringe_alm_name(&baseline, pol);
        info!("saving beam*fringe a_lm values to {}", name);
        save_complex_stack(&name, &alm)?;
        alm
    };

    let angles = rotation_angles(matches.is_present("lst_bin"));
    info!("calculating visibilities over {} time steps", angles.len());
    let vis = integrate(sky_alm.view(), fringe_alm.view(), &angles, lmax)?;
    let out = matches.value_of("out").unwrap();
    info!("saving visibilities to {}", out);
    save_complex_stack(out, &vis)?;
    Ok(())
}
