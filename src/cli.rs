//! Command line argument parser
use std::path::PathBuf;

use crate::apportion::ScoreFormat;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about = "Interval statistics for Hi-C and ChIP tracks")]
pub struct ArgParser {
    /// verbose logging
    #[arg(long, global = true, default_value_t = false)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Summarise bed/bedgraph scores per target region
    Score(ScoreArgs),
    /// Z-scored sums of up, down and all fold changes per bin
    Directional(DirectionalArgs),
    /// Randomly place fixed-length intervals inside BED regions
    Sample(SampleArgs),
    /// Contacts per bin of a contact matrix
    Coverage(CoverageArgs),
}

#[derive(Args)]
pub struct ScoreArgs {
    /// bed/bedgraph interval file to rescale
    pub bedgraph: PathBuf,

    /// bed file of regions to score (chrom\tstart\tend)
    pub bed: PathBuf,

    /// input format, which decides the score column
    #[arg(value_enum, long)]
    pub format: ScoreFormat,

    /// output json file
    #[arg(short, long)]
    pub out: PathBuf,

    /// name stored with the scores (defaults to the input path)
    #[arg(long)]
    pub name: Option<String>,
}

/// Parsed contact matrix tables
#[derive(Args)]
pub struct MatrixArgs {
    /// long-form matrix (region\tbinStart\tbinEnd\tscore)
    pub matrix: PathBuf,

    /// region positions (region\tchrom\tstart\tend)
    #[arg(long)]
    pub positions: Option<PathBuf>,

    /// bin size of the matrix
    #[arg(long = "bin-size")]
    pub bin_size: u64,
}

#[derive(Args)]
pub struct DirectionalArgs {
    #[command(flatten)]
    pub matrix: MatrixArgs,

    /// only consider interactions separated by at most this distance
    /// (0 keeps only contacts within the same bin)
    #[arg(long = "max-distance")]
    pub max_distance: Option<f64>,

    /// output bedgraph of all interactions
    #[arg(long = "all-out")]
    pub all_out: PathBuf,

    /// output bedgraph of up interactions
    #[arg(long = "up-out")]
    pub up_out: PathBuf,

    /// output bedgraph of down interactions
    #[arg(long = "down-out")]
    pub down_out: PathBuf,
}

#[derive(Args)]
pub struct SampleArgs {
    /// bed intervals within which regions will be sampled
    pub bed: PathBuf,

    /// length of the intervals to generate
    #[arg(long, default_value_t = 1)]
    pub length: u64,

    /// number of intervals to generate
    #[arg(long = "n-repeats", default_value_t = 100_000)]
    pub n_repeats: u64,

    /// seed for random number generation
    #[arg(long)]
    pub seed: Option<u64>,

    /// output bed file (default stdout)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct CoverageArgs {
    #[command(flatten)]
    pub matrix: MatrixArgs,

    /// output tsv (chrom\tstart\tend\tcontacts)
    #[arg(short, long)]
    pub out: PathBuf,
}

fn check_file(path: &std::path::Path, what: &str) -> bool {
    if !path.is_file() {
        error!("{} file {} doesn't exist", what, path.display());
        return false;
    }
    true
}

impl MatrixArgs {
    pub fn validate(&self) -> bool {
        let mut is_ok = check_file(&self.matrix, "matrix");
        if let Some(p) = &self.positions {
            is_ok &= check_file(p, "--positions");
        }
        if self.bin_size < 1 {
            error!("--bin-size must be at least 1");
            is_ok = false;
        }
        is_ok
    }
}

impl Command {
    /// Validate command line arguments
    pub fn validate(&self) -> bool {
        match self {
            Command::Score(a) => check_file(&a.bedgraph, "bedgraph") & check_file(&a.bed, "bed"),
            Command::Directional(a) => {
                let mut is_ok = a.matrix.validate();
                if let Some(m) = a.max_distance {
                    if m.is_nan() || m < 0.0 {
                        error!("--max-distance must be a non-negative number");
                        is_ok = false;
                    }
                }
                let outs = [&a.all_out, &a.up_out, &a.down_out];
                if outs[0] == outs[1] || outs[0] == outs[2] || outs[1] == outs[2] {
                    error!("--all-out, --up-out and --down-out must differ");
                    is_ok = false;
                }
                is_ok
            }
            Command::Sample(a) => {
                let mut is_ok = check_file(&a.bed, "bed");
                if a.length < 1 {
                    warn!("--length of 0 will produce empty intervals");
                }
                if a.seed.is_none() {
                    warn!("no --seed given, output won't be reproducible");
                }
                if a.n_repeats < 1 {
                    error!("--n-repeats must be at least 1");
                    is_ok = false;
                }
                is_ok
            }
            Command::Coverage(a) => a.matrix.validate(),
        }
    }
}
