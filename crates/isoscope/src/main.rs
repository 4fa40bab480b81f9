//! isoscope - interactive iso-surface and volume viewer
//!
//! Loads a scalar field from a MetaImage file or a 16-bit slice series and
//! opens a window showing it.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, ValueEnum};

use isoscope::{bound_keys, Options, Result, Session, Variant};

#[derive(Parser, Debug)]
#[command(name = "isoscope")]
#[command(version, about = "Explore a 3D scalar field as iso-surfaces or a volume", long_about = None)]
struct Cli {
    /// Input volume: a .mhd/.mha file or a slice-series prefix such as
    /// `headsq/quarter` (default depends on the variant)
    file: Option<PathBuf>,

    /// Which viewer to run
    #[arg(long, value_enum)]
    variant: Option<VariantArg>,

    /// JSON options file; missing fields come from the variant's preset
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Lower bound for the sample step size after each key press
    #[arg(long)]
    min_step_size: Option<f32>,

    /// Print the effective options as JSON and exit
    #[arg(long)]
    print_options: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum VariantArg {
    /// Skin/bone surfaces with a switchable iso-surface volume
    Surface,
    /// Composite volume only
    Volume,
}

impl From<VariantArg> for Variant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Surface => Variant::SurfaceAndVolume,
            VariantArg::Volume => Variant::VolumeOnly,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    isoscope::init_logging();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn load_options(cli: &Cli) -> Result<Options> {
    let variant = cli.variant.map(Variant::from);
    let options = match &cli.config {
        Some(path) => Options::from_json_file_as(path, variant)?,
        None => Options::for_variant(variant.unwrap_or_default()),
    };
    Ok(match cli.min_step_size {
        Some(floor) => options.with_min_sample_step_size(Some(floor)),
        None => options,
    })
}

fn run(cli: Cli) -> Result<()> {
    let options = load_options(&cli)?;
    if cli.print_options {
        println!("{}", options.to_json()?);
        return Ok(());
    }

    let path = cli
        .file
        .unwrap_or_else(|| PathBuf::from(&options.default_input));
    let field = isoscope_io::read_scalar_field(&path, &options)?;
    log::info!(
        "loaded {} ({} samples, range {:?})",
        path.display(),
        field.num_samples(),
        field.scalar_range()
    );
    log::info!("keys: {}", bound_keys(options.variant).join(", "));

    let session = Session::new(Arc::new(field), options);
    isoscope::run_app(session)
}
