use anyhow::Result;
use clap::Parser;
use log::info;
use std::path::PathBuf;

use blastnet::logging::init_logging;
use blastnet::normalize::NormalizeConfig;
use blastnet::pipeline::run_normalize;

/// filter_blast - Reformat concatenated BLAST output
///
/// Keeps hits above an identity threshold, rounds identity, infers strand
/// from subject coordinates, splits query ids into two identifiers and
/// writes a sorted 8-column table named {ID}-{DTYPE}-filtered90.tsv
/// (or {ID}-{DTYPE}-EMPTY.tsv for an empty input).
#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about,
    long_about = None,
    after_help = "Version is -V/--version; -v is not accepted."
)]
struct Args {
    /// ID for the input file
    #[clap(value_name = "ID")]
    id: String,

    /// Data type of the BLASTed contents
    #[clap(value_name = "DTYPE")]
    dtype: String,

    /// BLAST output in -outfmt 6 (optionally bgzipped)
    #[clap(value_name = "TSV")]
    tsv: PathBuf,

    /// Keep hits with percent identity strictly above this
    #[clap(value_name = "FILT_PERCENT")]
    filt_percent: f64,

    /// Directory for the output table
    #[clap(short = 'o', long = "outdir", default_value = ".")]
    outdir: PathBuf,

    /// Write the log to this file instead of stderr
    #[clap(long = "log-file")]
    log_file: Option<PathBuf>,

    /// Quiet mode (warnings only)
    #[clap(short = 'q', long = "quiet")]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.quiet, args.log_file.as_deref())?;
    info!("Running: {}", args.tsv.display());
    info!("Options: {args:?}");

    let config = NormalizeConfig {
        id: args.id,
        dtype: args.dtype,
        identity_threshold: args.filt_percent,
        output_dir: args.outdir,
    };

    run_normalize(&config, &args.tsv)?;
    Ok(())
}
