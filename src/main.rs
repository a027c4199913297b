use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use seisnorm::config::{NormalizationConfig, NormalizationMode};
use seisnorm::data::loader;
use seisnorm::export::{self, MatrixLayout};
use seisnorm::render;
use seisnorm::state::Session;

#[derive(Parser, Debug)]
#[command(
    name = "seisnorm",
    version,
    about = "Weight a dispersion spectrum toward picked curves and normalize each frequency column."
)]
struct Args {
    /// Spectrum table: one row per velocity sample, one column per frequency.
    #[arg(long)]
    spectrum: PathBuf,

    /// Picked points: `frequency velocity [mode]` per line.
    #[arg(long)]
    picks: Option<PathBuf>,

    /// JSON config file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Normalization mode.
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Kernel width scale factor.
    #[arg(long)]
    sigma: Option<f64>,

    /// Frequency axis range covered by the table columns.
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"], default_values_t = [0.0, 0.8], allow_negative_numbers = true)]
    f_range: Vec<f64>,

    /// Velocity axis range covered by the table rows.
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"], default_values_t = [2.5, 5.0], allow_negative_numbers = true)]
    v_range: Vec<f64>,

    /// Output matrix path. Defaults to `normalized_spectrum_sigma_<sigma>.txt`.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Line orientation of the output matrix.
    #[arg(long, value_enum, default_value_t = LayoutArg::Velocity)]
    layout: LayoutArg,

    /// Also render the normalized spectrum to this PNG.
    #[arg(long)]
    png: Option<PathBuf>,

    /// Pixels per grid cell in the PNG.
    #[arg(long, default_value_t = 4)]
    png_scale: u32,

    /// Write the reference curves with their kernel bands as JSON.
    #[arg(long)]
    overlay: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Simple,
    Gaussian,
    Triangular,
}

impl From<ModeArg> for NormalizationMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Simple => NormalizationMode::Simple,
            ModeArg::Gaussian => NormalizationMode::WeightedGaussian,
            ModeArg::Triangular => NormalizationMode::WeightedTriangular,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LayoutArg {
    /// One line per velocity sample.
    Velocity,
    /// One line per frequency sample.
    Frequency,
}

impl From<LayoutArg> for MatrixLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Velocity => MatrixLayout::VelocityRows,
            LayoutArg::Frequency => MatrixLayout::FrequencyRows,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => NormalizationConfig::from_json_file(path)?,
        None => NormalizationConfig::default(),
    };
    if let Some(mode) = args.mode {
        config.mode = mode.into();
    }
    if let Some(sigma) = args.sigma {
        config.sigma_factor = sigma;
    }
    config.validate().context("normalization settings")?;

    let spectrum = loader::load_spectrum_in_ranges(
        &args.spectrum,
        (args.f_range[0], args.f_range[1]),
        (args.v_range[0], args.v_range[1]),
    )?;
    let picks = match &args.picks {
        Some(path) => loader::load_picks(path)?,
        None => Vec::new(),
    };
    if picks.is_empty() && config.mode != NormalizationMode::Simple {
        log::warn!("No picks given; weighted mode reduces to column-max normalization");
    }

    log::info!("Mode: {}, sigma factor {}", config.mode, config.sigma_factor);
    let mut session = Session::new(spectrum, picks, config)?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(export::default_output_name(&config)));
    export::write_matrix(&output, session.normalized(), args.layout.into())?;

    if let Some(path) = &args.overlay {
        let f_axis = session.spectrum().f_axis().clone();
        let overlay = export::curve_overlay(session.curves(), &f_axis, &config);
        export::write_overlay_json(path, &overlay)?;
    }

    if let Some(path) = &args.png {
        let curves = session.curves().clone();
        render::save_png(path, session.normalized(), Some(&curves), args.png_scale)?;
    }

    Ok(())
}
