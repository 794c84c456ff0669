extern crate pretty_env_logger;
#[macro_use]
extern crate log;

use std::io::Write;

use clap::Parser;

mod apportion;
mod cli;
mod contacts;
mod directional;
mod error;
mod index;
mod io;
mod sampler;
mod stats;

use crate::apportion::OverlapApportioner;
use crate::cli::{ArgParser, Command, CoverageArgs, DirectionalArgs, SampleArgs, ScoreArgs};
use crate::contacts::ContactMatrix;
use crate::directional::DirectionalAggregator;
use crate::error::{Error, Result};
use crate::index::IntervalIndex;
use crate::sampler::WeightedIntervalSampler;

fn run_score(args: &ScoreArgs) -> Result<()> {
    let index = IntervalIndex::from_bed(&args.bed)?;
    if index.is_empty() {
        warn!("no regions in {}, scores will be empty", args.bed.display());
    }
    let name = args
        .name
        .clone()
        .unwrap_or_else(|| args.bedgraph.display().to_string());
    let result = OverlapApportioner::new(&index).score_file(&args.bedgraph, args.format, name)?;

    let json_str = serde_json::to_string(&result)?;
    let mut file = io::create_output(Some(&args.out))?;
    file.write_all(json_str.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|e| Error::io(e, &args.out))
}

fn run_directional(args: &DirectionalArgs) -> Result<()> {
    let m = &args.matrix;
    let matrix = ContactMatrix::load(&m.matrix, m.positions.as_deref(), m.bin_size)?;
    let tracks = DirectionalAggregator::new(args.max_distance).run(&matrix);
    io::write_bedgraph(&args.all_out, &tracks.all)?;
    io::write_bedgraph(&args.up_out, &tracks.up)?;
    io::write_bedgraph(&args.down_out, &tracks.down)
}

fn run_sample(args: &SampleArgs) -> Result<()> {
    let sampler = WeightedIntervalSampler::from_bed(&args.bed)?;
    let out_name = match &args.out {
        Some(p) => p.display().to_string(),
        None => "<stdout>".to_string(),
    };
    let mut out = io::create_output(args.out.as_deref())?;
    for iv in sampler.draws(args.n_repeats, args.length, args.seed)? {
        writeln!(out, "{}\t{}\t{}", iv.chrom, iv.start, iv.end)
            .map_err(|e| Error::io(e, &out_name))?;
    }
    out.flush().map_err(|e| Error::io(e, &out_name))?;
    info!("wrote {} intervals", args.n_repeats);
    Ok(())
}

fn run_coverage(args: &CoverageArgs) -> Result<()> {
    let m = &args.matrix;
    let matrix = ContactMatrix::load(&m.matrix, m.positions.as_deref(), m.bin_size)?;
    io::write_bedgraph(&args.out, &contacts::contacts_per_bin(&matrix))
}

fn main() {
    let args = ArgParser::parse();
    let level = if args.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    pretty_env_logger::formatted_timed_builder()
        .filter_level(level)
        .init();

    if !args.command.validate() {
        error!("please fix arguments");
        std::process::exit(1);
    }

    let result = match &args.command {
        Command::Score(a) => run_score(a),
        Command::Directional(a) => run_directional(a),
        Command::Sample(a) => run_sample(a),
        Command::Coverage(a) => run_coverage(a),
    };
    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
    info!("finished");
}
