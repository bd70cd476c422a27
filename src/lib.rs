//! # depminer
//!
//! Top-K informative attribute subset mining over categorical transaction
//! data. Given N tuples with categorical attributes and one designated
//! target attribute, the engine finds the K subsets of the remaining
//! attributes whose joint partition is most informative about the target's
//! partition, by an information-theoretic score (entropy-derived, with
//! several bias-corrected variants).
//!
//! ## Core
//!
//! - [`partition`] - columnar per-attribute partitions and the intersection
//!   primitive that drives both refinement and scoring in one pass.
//! - [`scorer`] - the scoring-function family (entropy, smoothed mutual
//!   information, reliable fraction of information, Suzuki MI, adjusted
//!   dependency), each producing a `(score, bound)` pair.
//! - [`topk`] - bounded top-K priority queue over `(subset, score)`.
//! - [`varlist`] - intrusive doubly-linked candidate-attribute list with
//!   O(1) remove/reinsert, used by the miner's backtracking.
//! - [`miner`] - the branch-and-bound depth-first enumerator, in both
//!   standard and OPUS orderings.
//! - [`fptree`] - an alternate prefix-sharing representation for sparse
//!   datasets, with parallel group-level intersection.
//! - [`arena`] - the `Rebuilder` no-op retained from the pointer-patching
//!   arena design this crate's index-based arenas supersede.
//!
//! ## Ambient stack
//!
//! - [`error`] - the typed `MinerError` hierarchy.
//! - [`io`] - transaction stream parsing and result serialization.
//! - [`stats`] - the statistics report writer.
//! - [`cli`] - the `clap`-derived argument parser.
//! - [`utils`] - small numeric helpers shared across scorers.

pub mod arena;
pub mod cli;
pub mod error;
pub mod fptree;
pub mod io;
pub mod miner;
pub mod partition;
pub mod scorer;
pub mod stats;
pub mod topk;
pub mod utils;
pub mod varlist;

pub use error::{MinerError, Result};
pub use miner::BranchAndBoundMiner;
pub use partition::{Partition, Partitions};
pub use topk::{Entry, TopKQueue};
