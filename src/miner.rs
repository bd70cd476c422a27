//! Branch-and-bound subset enumeration (component C5).
//!
//! Depth-first search over attribute subsets: at each node, every remaining
//! candidate attribute is scored by intersecting the current partition with
//! it; a candidate survives only if the top-K queue isn't full yet, or its
//! score's upper bound can still beat the queue's current worst kept score.
//! Surviving children are explored best-score-first.

use std::sync::Arc;

use crate::partition::{Partition, Partitions};
use crate::scorer::{AdjustedDependency, ReliableFractionOfInformation, Scorer, ScorerKind, SmoothedMutualInformation, SuzukiMutualInformation, TargetScorer};
use crate::topk::{Entry, TopKQueue};
use crate::varlist::VarList;

/// Object-safe union of the two scorer traits, so the miner can hold one
/// scorer implementation behind a trait object chosen at runtime from the
/// CLI, instead of monomorphizing the whole search over every scorer type.
pub trait DynScorer: Scorer + TargetScorer {}
impl<T: Scorer + TargetScorer> DynScorer for T {}

/// Builds one fresh, target-bound scorer instance per candidate extension.
/// Scorers are stateful accumulators driven once through a single
/// intersection pass, so each candidate needs its own.
pub type ScorerFactory = Box<dyn Fn() -> Box<dyn DynScorer> + Send + Sync>;

pub fn scorer_factory(kind: ScorerKind, target: Arc<Partition>) -> ScorerFactory {
    match kind {
        ScorerKind::ReliableFractionOfInformation => Box::new(move || {
            let mut s = ReliableFractionOfInformation::default();
            s.set_target(&target);
            Box::new(s) as Box<dyn DynScorer>
        }),
        ScorerKind::SmoothedMutualInformation { alpha } => Box::new(move || {
            let mut s = SmoothedMutualInformation::new(alpha);
            s.set_target(&target);
            Box::new(s) as Box<dyn DynScorer>
        }),
    }
}

/// Same factory shape for the two scorers exposed only internally (no CLI
/// flag yet binds them, but they are exercised directly by callers that
/// construct a miner by hand, and by tests).
pub fn suzuki_scorer_factory(target: Arc<Partition>) -> ScorerFactory {
    Box::new(move || {
        let mut s = SuzukiMutualInformation::default();
        s.set_target(&target);
        Box::new(s) as Box<dyn DynScorer>
    })
}

pub fn adjusted_dependency_scorer_factory(alpha: f64, target: Arc<Partition>) -> ScorerFactory {
    Box::new(move || {
        let mut s = AdjustedDependency::new(alpha);
        s.set_target(&target);
        Box::new(s) as Box<dyn DynScorer>
    })
}

struct Candidate {
    handle: usize,
    field: u16,
    partition: Partition,
    score: f64,
    bound: f64,
}

/// Depth-first branch-and-bound miner over the partition representation.
pub struct BranchAndBoundMiner<'a> {
    partitions: &'a Partitions,
    scorer_factory: ScorerFactory,
    variables: VarList,
    queue: TopKQueue,
    opus: bool,
    pattern_count: u64,
}

impl<'a> BranchAndBoundMiner<'a> {
    pub fn new(partitions: &'a Partitions, target: usize, scorer_factory: ScorerFactory, k: usize, opus: bool) -> Self {
        let variables = VarList::build((0..partitions.n_attributes()).filter(|&i| i != target).map(|i| i as u16));
        Self { partitions, scorer_factory, variables, queue: TopKQueue::new(k), opus, pattern_count: 0 }
    }

    pub fn pattern_count(&self) -> u64 {
        self.pattern_count
    }

    /// Run the full enumeration and drain the top-K queue, each subset
    /// sorted ascending the way the output stream expects.
    pub fn mine(&mut self) -> Vec<Entry> {
        let root = self.partitions.top().clone();
        let mut pattern = Vec::new();
        // The empty subset is never itself a candidate (it is the search
        // root, not an extension), so its score is never read.
        self.descend(root, &mut pattern, 0.0);

        self.queue.purge(|mut entry| {
            entry.subset.sort_unstable();
            entry
        })
    }

    fn descend(&mut self, current: Partition, pattern: &mut Vec<u16>, score: f64) {
        self.pattern_count += 1;
        if !pattern.is_empty() {
            self.queue.push(Entry::new(pattern.clone(), score));
        }

        let handles: Vec<usize> = self.variables.iter().collect();
        let mut removed: Vec<usize> = Vec::new();
        let mut accepted: Vec<Candidate> = Vec::new();

        for handle in handles {
            let field = self.variables.value(handle);
            let Some(attr_partition) = self.partitions.get(field as usize) else { continue };

            let mut ext = current.clone();
            let mut scorer = (self.scorer_factory)();
            if ext.intersect_scored(attr_partition, scorer.as_mut()).is_err() {
                // A malformed/ragged attribute column: treat as unusable
                // rather than aborting the whole run.
                removed.push(handle);
                continue;
            }
            let (score, bound) = scorer.result();

            let accept = !self.queue.full() || self.queue.last().is_none_or(|worst| worst.score < bound);
            if accept {
                accepted.push(Candidate { handle, field, partition: ext, score, bound });
            } else {
                removed.push(handle);
            }
        }

        // Best score first, matching the reference engine's "worse"
        // comparator driving a descending sort before recursion.
        accepted.sort_by(|a, b| b.score.total_cmp(&a.score));

        if self.opus {
            // Remove every accepted sibling up front so a deeper recursion
            // never sees a sibling that has not been visited yet; reinsert
            // strictly left-to-right so each subset is generated exactly
            // once (the OPUS ordering trick).
            for candidate in accepted.iter().rev() {
                self.variables.remove(candidate.handle);
            }
            for candidate in &accepted {
                pattern.push(candidate.field);
                self.descend(candidate.partition.clone(), pattern, candidate.score);
                pattern.pop();
                self.variables.insert(candidate.handle);
            }
        } else {
            for candidate in &accepted {
                self.variables.remove(candidate.handle);
                removed.push(candidate.handle);
                pattern.push(candidate.field);
                self.descend(candidate.partition.clone(), pattern, candidate.score);
                pattern.pop();
            }
        }

        while let Some(handle) = removed.pop() {
            self.variables.insert(handle);
        }
    }
}
