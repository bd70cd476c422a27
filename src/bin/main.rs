//! Command-line entry point: parse arguments, load transactions, mine the
//! top-K informative subsets, and write the pattern and statistics streams.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;

use depminer::cli::{Cli, ScorerChoice};
use depminer::io::{load_transactions, write_results};
use depminer::miner::{scorer_factory, BranchAndBoundMiner};
use depminer::scorer::ScorerKind;
use depminer::stats::Statistics;
use depminer::Result;

fn run(cli: Cli) -> Result<()> {
    let started = Instant::now();

    let partitions = match &cli.input {
        Some(path) => {
            let file = File::open(path).map_err(|e| depminer::MinerError::DataShape(format!("cannot open {}: {e}", path.display())))?;
            load_transactions(BufReader::new(file))?
        }
        None => load_transactions(io::stdin().lock())?,
    };

    let target = partitions.resolve_index(cli.target)?;
    let target_partition = Arc::new(partitions.get(target).unwrap().clone());

    let kind = match cli.scorer_choice()? {
        ScorerChoice::Rfi => ScorerKind::ReliableFractionOfInformation,
        ScorerChoice::Smi { alpha } => ScorerKind::SmoothedMutualInformation { alpha },
    };
    let factory = scorer_factory(kind, target_partition);

    rayon::ThreadPoolBuilder::new()
        .num_threads(cli.worker_count())
        .build_global()
        .ok();

    log::info!("mining target={target} k={} opus={}", cli.k, cli.opus);
    let mut miner = BranchAndBoundMiner::new(&partitions, target, factory, cli.k, cli.opus);
    let results = miner.mine();
    log::info!("explored {} patterns, kept {}", miner.pattern_count(), results.len());

    match &cli.output {
        Some(path) => {
            let file = File::create(path).map_err(|e| depminer::MinerError::DataShape(format!("cannot create {}: {e}", path.display())))?;
            write_results(BufWriter::new(file), &results)?;
        }
        None => write_results(io::stdout().lock(), &results)?,
    }

    let stats = Statistics { total_time: started.elapsed(), pattern_number: miner.pattern_count() };
    match &cli.stats {
        Some(path) => {
            let file = File::create(path).map_err(|e| depminer::MinerError::DataShape(format!("cannot create {}: {e}", path.display())))?;
            stats.write(BufWriter::new(file))?;
        }
        None => stats.write(io::stderr().lock())?,
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let _ = writeln!(io::stderr(), "error: {err}");
            ExitCode::FAILURE
        }
    }
}
