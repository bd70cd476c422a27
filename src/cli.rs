//! Command-line surface (part of C7), grounded in the clap derive style used
//! elsewhere in this lineage for analysis-style CLIs.

use std::path::PathBuf;

use clap::Parser;

use crate::error::{MinerError, Result};

#[derive(Parser, Debug)]
#[command(name = "depminer", about = "Top-K informative attribute subset mining over categorical data")]
pub struct Cli {
    /// Target attribute id; negative indexes from the end of the attribute list.
    #[arg(long)]
    pub target: i64,

    /// Number of top-K patterns to retain.
    #[arg(long = "K", default_value_t = 1)]
    pub k: usize,

    /// Worker count for FP-tree build; defaults to the available parallelism.
    #[arg(long)]
    pub threads: Option<usize>,

    /// Score using Reliable Fraction of Information.
    #[arg(long, conflicts_with = "smi")]
    pub rfi: bool,

    /// Score using smoothed mutual information, with optional smoothing `alpha`.
    #[arg(long, num_args = 0..=1, default_missing_value = "1.0")]
    pub smi: Option<f64>,

    /// Enable OPUS pruning order (visits each subset exactly once, different order).
    #[arg(long)]
    pub opus: bool,

    /// Input transaction file; stdin if absent.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Output pattern file; stdout if absent.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Statistics report file; diagnostic stream if absent.
    #[arg(long)]
    pub stats: Option<PathBuf>,
}

/// The scorer a parsed CLI selects, defaulting to RFI when neither flag is given.
pub enum ScorerChoice {
    Rfi,
    Smi { alpha: f64 },
}

impl Cli {
    pub fn scorer_choice(&self) -> Result<ScorerChoice> {
        match self.smi {
            Some(alpha) => {
                if alpha < 0.0 {
                    return Err(MinerError::Threshold(format!("smoothing alpha {alpha} must be >= 0")));
                }
                Ok(ScorerChoice::Smi { alpha })
            }
            None => Ok(ScorerChoice::Rfi),
        }
    }

    pub fn worker_count(&self) -> usize {
        self.threads.unwrap_or_else(num_cpus::get)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_rfi_when_no_scorer_flag_given() {
        let cli = Cli { target: 0, k: 1, threads: None, rfi: false, smi: None, opus: false, input: None, output: None, stats: None };
        assert!(matches!(cli.scorer_choice().unwrap(), ScorerChoice::Rfi));
    }

    #[test]
    fn negative_smoothing_alpha_is_rejected() {
        let cli = Cli { target: 0, k: 1, threads: None, rfi: false, smi: Some(-1.0), opus: false, input: None, output: None, stats: None };
        assert!(matches!(cli.scorer_choice(), Err(MinerError::Threshold(_))));
    }

    #[test]
    fn worker_count_falls_back_to_num_cpus() {
        let cli = Cli { target: 0, k: 1, threads: Some(4), rfi: false, smi: None, opus: false, input: None, output: None, stats: None };
        assert_eq!(cli.worker_count(), 4);
    }
}
