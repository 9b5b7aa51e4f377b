/// network_graph - Network graph of BLAST hits, queries and organisms
///
/// Joins the normalized BLAST table with a query-to-organism mapping,
/// keeps hits inside the length window and draws subject, query and
/// organism nodes around a shared "Queries" anchor.
use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

use blastnet::layout::SpringLayout;
use blastnet::logging::init_logging;
use blastnet::pipeline::{output_timestamp, run_network, NetworkConfig};
use blastnet::render::{ImageFormat, SvgRenderer};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Png,
    Svg,
}

impl From<Format> for ImageFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Png => ImageFormat::Png,
            Format::Svg => ImageFormat::Svg,
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "network_graph",
    version,
    about = "Network graph of BLAST hits, queries and organisms",
    after_help = "Length filters take two dashes (--filter-max/--filter-min, or \
                  --filter_max/--filter_min); the single-dash -filter_max form is not \
                  accepted. Version is -V/--version."
)]
struct Args {
    /// Normalized BLAST output (first six columns are used)
    #[clap(value_name = "BLAST_OUT")]
    blast_out: PathBuf,

    /// Query id to organism mapping (two columns)
    #[clap(value_name = "ID_MAPPING")]
    id_mapping: PathBuf,

    /// Data type of input, only used in naming of outputs
    #[clap(value_name = "DATA_TYPE")]
    data_type: String,

    /// Maximum hit length (inclusive); must be >= 1 and above the minimum
    #[clap(long = "filter-max", alias = "filter_max", default_value = "1000000", allow_negative_numbers = true)]
    filter_max: i64,

    /// Minimum hit length (inclusive)
    #[clap(long = "filter-min", alias = "filter_min", default_value = "0", allow_negative_numbers = true)]
    filter_min: i64,

    /// Image format of the output
    #[clap(long = "format", value_enum, default_value = "png")]
    format: Format,

    /// Directory for the output image
    #[clap(short = 'o', long = "outdir", default_value = ".")]
    outdir: PathBuf,

    /// Seed colors, jitter and layout for reproducible images
    #[clap(long = "seed")]
    seed: Option<u64>,

    /// Quiet mode (warnings only)
    #[clap(short = 'q', long = "quiet")]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.quiet, None)?;
    info!("--- Starting to Generate Network Graph for BLAST results ---");

    let config = NetworkConfig {
        data_type: args.data_type,
        filter_max: args.filter_max,
        filter_min: args.filter_min,
        format: args.format.into(),
        output_dir: args.outdir,
        timestamp: output_timestamp(),
    };

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let written = run_network(
        &config,
        &args.blast_out,
        &args.id_mapping,
        &SpringLayout::default(),
        &SvgRenderer::default(),
        &mut rng,
    )?;

    if let Some(path) = written {
        info!("Wrote {}", path.display());
    }
    Ok(())
}
