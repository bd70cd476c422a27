//! Prefix-sharing alternate representation for sparse categorical data
//! (component C6).
//!
//! Where [`crate::partition::Partition`] keeps one cell per tuple per
//! attribute, an [`FpTree`] merges tuples that agree on a prefix of their
//! (entropy-sorted) attributes into shared trie nodes. Attributes are
//! visited low-entropy-first, since those are the ones most likely to merge
//! paths near the root; the designated target attribute is always sorted to
//! the end, since nothing downstream of it needs climbing past it.
//!
//! The trie itself never changes after [`FpTree::build`]; what does change,
//! once per recursive step of [`PatternGenerator`], is each [`Group`]'s
//! `parts`: the equivalence classes induced by intersecting that attribute
//! with however much of the subset has been folded in so far. Finding which
//! class a trie node falls into means climbing from the node toward the
//! root until an ancestor belonging to the target group is found; each node
//! caches the last ancestor it resolved, so repeated climbs from nearby
//! nodes are amortized (the same trick a union-find structure uses for path
//! compression).

use std::collections::HashMap;

use rayon::prelude::*;

use crate::error::{MinerError, Result};
use crate::miner::ScorerFactory;
use crate::partition::Partition;
use crate::scorer::{xlogx, Scorer, TargetScorer};
use crate::topk::{Entry, TopKQueue};

type NodeIdx = u32;
type LevelIdx = u32;

const ROOT: usize = 0;

#[derive(Clone, Copy, Debug)]
struct TreeNode {
    parent: Option<NodeIdx>,
    /// Path-compression cache: the last ancestor resolved for some earlier
    /// `intersect_scored` climb. Reset implicitly by being overwritten, never
    /// explicitly cleared.
    ancestor: NodeIdx,
    count: u32,
    part: u32,
    level: LevelIdx,
    /// Next node sharing this node's level (attribute, value) pair, forming
    /// that level's horizontal node list.
    next: Option<NodeIdx>,
}

#[derive(Clone, Debug)]
struct LevelRec {
    count: u64,
    group: usize,
    head: Option<NodeIdx>,
}

#[derive(Clone, Copy, Debug)]
struct PartRec {
    #[allow(dead_code)]
    level: LevelIdx,
    count: f64,
}

/// One attribute's levels, the entropy used to order it among its siblings,
/// and its currently refined partition.
#[derive(Clone, Debug)]
pub struct Group {
    var: Option<u16>,
    /// `-1` for the synthetic root group, `0..n-1` ascending by entropy for
    /// candidate attributes, and the target group always holds the highest
    /// rank (it is excluded from the entropy sort and appended last).
    rank: i64,
    levels: Vec<LevelIdx>,
    parts: Vec<PartRec>,
    entropy: f64,
}

impl Group {
    pub fn n_parts(&self) -> usize {
        self.parts.len()
    }

    pub fn entropy(&self) -> f64 {
        self.entropy
    }

    pub fn attribute(&self) -> Option<u16> {
        self.var
    }
}

/// A built FP-tree: the trie plus one [`Group`] per attribute (root and
/// target included), ready for repeated intersection during mining.
pub struct FpTree {
    levels: Vec<LevelRec>,
    nodes: Vec<TreeNode>,
    groups: Vec<Group>,
    target_group: usize,
    size: u64,
}

impl FpTree {
    /// Build the tree from deduplicated-per-transaction `(attribute, value)`
    /// pairs. Two passes: the first records every `(attribute, value)`
    /// level's global count to compute each attribute's entropy and decide
    /// the sort order; the second renames attributes to that order and
    /// inserts each transaction into the trie, reusing shared prefixes via a
    /// hashed child lookup keyed by (parent node, level).
    pub fn build(transactions: &[Vec<(u16, u8)>], target_attr: u16) -> Result<Self> {
        let mut level_lookup: HashMap<(u16, u8), usize> = HashMap::new();
        let mut levels: Vec<LevelRec> = Vec::new();
        let mut level_key: Vec<(u16, u8)> = Vec::new();
        let mut group_lookup: HashMap<u16, usize> = HashMap::new();

        struct Building {
            var: u16,
            levels: Vec<usize>,
            entropy: f64,
        }
        let mut building: Vec<Building> = Vec::new();

        for tx in transactions {
            for &(attr, value) in tx {
                let level_idx = *level_lookup.entry((attr, value)).or_insert_with(|| {
                    levels.push(LevelRec { count: 0, group: 0, head: None });
                    level_key.push((attr, value));
                    levels.len() - 1
                });
                levels[level_idx].count += 1;

                let group_idx = *group_lookup.entry(attr).or_insert_with(|| {
                    building.push(Building { var: attr, levels: Vec::new(), entropy: 0.0 });
                    building.len() - 1
                });
                if !building[group_idx].levels.contains(&level_idx) {
                    building[group_idx].levels.push(level_idx);
                }
            }
        }

        for g in &mut building {
            let total: u64 = g.levels.iter().map(|&l| levels[l].count).sum();
            if total > 0 {
                let sumxlogx: f64 = g.levels.iter().map(|&l| xlogx(levels[l].count as f64)).sum();
                g.entropy = crate::utils::clamp_nonnegative((total as f64).log2() - sumxlogx / total as f64);
            }
        }

        let target_pos = building
            .iter()
            .position(|g| g.var == target_attr)
            .ok_or_else(|| MinerError::DataShape(format!("unknown target variable {target_attr}")))?;
        let target_building = building.remove(target_pos);
        building.sort_by(|a, b| a.entropy.total_cmp(&b.entropy));
        building.push(target_building);

        let mut groups = Vec::with_capacity(building.len() + 1);
        groups.push(Group {
            var: None,
            rank: -1,
            levels: Vec::new(),
            parts: vec![PartRec { level: u32::MAX, count: transactions.len() as f64 }],
            entropy: 0.0,
        });

        let mut part_of_level: Vec<u32> = vec![0; levels.len()];
        for (rank, g) in building.into_iter().enumerate() {
            let group_idx = groups.len();
            let mut parts = Vec::with_capacity(g.levels.len());
            for &lvl in &g.levels {
                levels[lvl].group = group_idx;
                part_of_level[lvl] = parts.len() as u32;
                parts.push(PartRec { level: lvl as LevelIdx, count: levels[lvl].count as f64 });
            }
            groups.push(Group {
                var: Some(g.var),
                rank: rank as i64,
                levels: g.levels.iter().map(|&l| l as LevelIdx).collect(),
                parts,
                entropy: g.entropy,
            });
        }
        let target_group = groups.len() - 1;

        let attr_rank: HashMap<u16, i64> = groups.iter().filter_map(|g| g.var.map(|v| (v, g.rank))).collect();

        let mut nodes = vec![TreeNode { parent: None, ancestor: 0, count: transactions.len() as u32, part: 0, level: u32::MAX, next: None }];
        let mut children: HashMap<(NodeIdx, LevelIdx), NodeIdx> = HashMap::new();

        for tx in transactions {
            let mut sorted_tx = tx.clone();
            sorted_tx.sort_by_key(|&(attr, _)| attr_rank.get(&attr).copied().unwrap_or(i64::MAX));

            let mut node = ROOT as NodeIdx;
            for &(attr, value) in &sorted_tx {
                let level_idx = level_lookup[&(attr, value)] as LevelIdx;
                let key = (node, level_idx);
                node = *children.entry(key).or_insert_with(|| {
                    let group = levels[level_idx as usize].group;
                    let part_idx = part_of_level[level_idx as usize];
                    let _ = group;
                    let idx = nodes.len() as NodeIdx;
                    nodes.push(TreeNode {
                        parent: Some(node),
                        ancestor: idx,
                        count: 0,
                        part: part_idx,
                        level: level_idx,
                        next: levels[level_idx as usize].head,
                    });
                    levels[level_idx as usize].head = Some(idx);
                    idx
                });
                nodes[node as usize].count += 1;
            }
        }

        Ok(Self { levels, nodes, groups, target_group, size: transactions.len() as u64 })
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Number of attribute groups available to fold into a subset, excluding
    /// the synthetic root and the target itself.
    pub fn n_candidate_groups(&self) -> usize {
        self.groups.len() - 2
    }

    /// Map a rank (`0..n_candidate_groups()`, ascending entropy) to its
    /// group index.
    pub fn group_by_rank(&self, rank: usize) -> usize {
        rank + 1
    }

    pub fn group_attr(&self, group_idx: usize) -> u16 {
        self.groups[group_idx].var.expect("candidate and target groups always have an attribute")
    }

    pub fn target_group_index(&self) -> usize {
        self.target_group
    }

    /// The target attribute's marginal part sizes, in level order, as seen
    /// before any refinement — used once to build the synthetic [`Partition`]
    /// a [`crate::scorer::TargetScorer`] is bound against.
    pub fn target_part_sizes(&self) -> Vec<f64> {
        self.groups[self.target_group].levels.iter().map(|&lvl| self.levels[lvl as usize].count as f64).collect()
    }

    pub fn target_synthetic_partition(&self) -> Partition {
        Partition::synthetic(&self.target_part_sizes())
    }

    fn group_rank_of_node(&self, node: NodeIdx) -> i64 {
        if node as usize == ROOT {
            return -1;
        }
        let level = self.nodes[node as usize].level;
        self.groups[self.levels[level as usize].group].rank
    }

    /// Climb from `start` (a node one level below the one being resolved)
    /// toward the root until an ancestor belonging to the group ranked
    /// `target_rank` is found, caching the result on `start` for the next
    /// climb through it.
    fn part_for_node(&mut self, start: NodeIdx, target_rank: i64) -> usize {
        let mut ancestor = self.nodes[start as usize].ancestor;
        if self.group_rank_of_node(ancestor) < target_rank {
            ancestor = start;
        }
        while self.group_rank_of_node(ancestor) != target_rank {
            ancestor = self.nodes[ancestor as usize]
                .parent
                .expect("every rank below the root group is reachable by climbing parent pointers");
        }
        self.nodes[start as usize].ancestor = ancestor;
        self.nodes[ancestor as usize].part as usize
    }

    /// Refine `group_idx` in place to represent its intersection with
    /// `ancestor_idx`, driving `scorer`'s callbacks as each ancestor part
    /// closes. `ancestor_idx` is read only, mirroring the self/other
    /// convention of [`crate::partition::Partition::intersect_scored`] with
    /// `group_idx` playing `self`.
    pub fn intersect_scored(&mut self, group_idx: usize, ancestor_idx: usize, scorer: &mut dyn Scorer) {
        let ancestor_rank = self.groups[ancestor_idx].rank;
        let n_x = self.groups[ancestor_idx].n_parts();
        let group_levels = self.groups[group_idx].levels.clone();
        scorer.begin_pair(n_x, group_levels.len());

        let mut new_parts: Vec<PartRec> = Vec::new();
        let mut heir: HashMap<(usize, LevelIdx), usize> = HashMap::new();
        let mut touched: Vec<Vec<usize>> = vec![Vec::new(); n_x];

        for &level_idx in &group_levels {
            let mut node_opt = self.levels[level_idx as usize].head;
            while let Some(node_idx) = node_opt {
                let parent = self.nodes[node_idx as usize]
                    .parent
                    .expect("only the root itself has no parent, and the root belongs to no attribute level");
                let ancestor_part = self.part_for_node(parent, ancestor_rank);
                let key = (ancestor_part, level_idx);
                let new_idx = *heir.entry(key).or_insert_with(|| {
                    new_parts.push(PartRec { level: level_idx, count: 0.0 });
                    let idx = new_parts.len() - 1;
                    touched[ancestor_part].push(idx);
                    idx
                });
                new_parts[new_idx].count += self.nodes[node_idx as usize].count as f64;
                self.nodes[node_idx as usize].part = new_idx as u32;
                node_opt = self.nodes[node_idx as usize].next;
            }
        }

        for chain in touched {
            if chain.is_empty() {
                continue;
            }
            scorer.subbegin();
            for idx in chain {
                scorer.update(new_parts[idx].count);
            }
            scorer.subend();
        }

        self.groups[group_idx].parts = new_parts;
        scorer.end();
    }

    /// Collapse every node of `group_idx` onto its parent's part, excluding
    /// the group from further refinement. Each level's node chain is
    /// disjoint from every other level of the same group, so the
    /// reassignment is computed in parallel per level (read-only against the
    /// node arena) and applied in one fast sequential pass, rather than
    /// mutating disjoint regions of the arena concurrently.
    pub fn skip(&mut self, group_idx: usize) {
        let level_idxs = self.groups[group_idx].levels.clone();
        let levels = &self.levels;
        let nodes = &self.nodes;

        let updates: Vec<(NodeIdx, u32)> = level_idxs
            .par_iter()
            .flat_map_iter(|&level_idx| {
                let mut out = Vec::new();
                let mut node_opt = levels[level_idx as usize].head;
                while let Some(node_idx) = node_opt {
                    let node = &nodes[node_idx as usize];
                    if let Some(parent) = node.parent {
                        out.push((node_idx, nodes[parent as usize].part));
                    }
                    node_opt = node.next;
                }
                out
            })
            .collect();

        for (node_idx, new_part) in updates {
            self.nodes[node_idx as usize].part = new_part;
        }
    }
}

/// Recursive include/exclude enumerator over an [`FpTree`]'s candidate
/// groups: for each rank (ascending entropy), first recurse past it
/// unchanged (exclude), then fold it into the running accumulator and, if
/// its bound can still beat the top-K queue's worst kept score, recurse
/// again with it included.
pub struct PatternGenerator<'a> {
    tree: &'a mut FpTree,
    scorer_factory: ScorerFactory,
    queue: TopKQueue,
    pattern_count: u64,
}

impl<'a> PatternGenerator<'a> {
    pub fn new(tree: &'a mut FpTree, scorer_factory: ScorerFactory, k: usize) -> Self {
        Self { tree, scorer_factory, queue: TopKQueue::new(k), pattern_count: 0 }
    }

    pub fn pattern_count(&self) -> u64 {
        self.pattern_count
    }

    pub fn generate(mut self) -> Vec<Entry> {
        let mut pattern = Vec::new();
        self.develop(ROOT, 0, &mut pattern);
        self.queue.purge(|mut entry| {
            entry.subset.sort_unstable();
            entry
        })
    }

    fn develop(&mut self, accumulator: usize, rank: usize, pattern: &mut Vec<u16>) {
        if rank >= self.tree.n_candidate_groups() {
            return;
        }

        // Exclude branch: same accumulator, next rank.
        self.develop(accumulator, rank + 1, pattern);

        // Include branch: fold this rank's attribute into a fresh copy of
        // the accumulator, then probe how informative the result is about
        // the target.
        let candidate = self.tree.group_by_rank(rank);
        self.pattern_count += 1;
        self.tree.intersect_scored(candidate, accumulator, &mut crate::scorer::NoScore);

        let mut scorer = (self.scorer_factory)();
        let target = self.tree.target_group_index();
        self.tree.intersect_scored(target, candidate, scorer.as_mut());
        let (score, bound) = scorer.result();

        pattern.push(self.tree.group_attr(candidate));
        if !self.queue.full() || self.queue.last().is_none_or(|worst| worst.score < bound) {
            self.queue.push(Entry::new(pattern.clone(), score));
            self.develop(candidate, rank + 1, pattern);
        }
        pattern.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miner::{scorer_factory, BranchAndBoundMiner};
    use crate::partition::PartitionBuilder;
    use crate::scorer::ScorerKind;
    use std::sync::Arc;

    fn dataset() -> Vec<Vec<(u16, u8)>> {
        vec![
            vec![(0, 0), (1, 0), (2, 0)],
            vec![(0, 0), (1, 0), (2, 0)],
            vec![(0, 0), (1, 1), (2, 1)],
            vec![(0, 1), (1, 0), (2, 1)],
            vec![(0, 1), (1, 1), (2, 1)],
            vec![(0, 1), (1, 1), (2, 1)],
        ]
    }

    #[test]
    fn build_sorts_candidate_groups_ascending_by_entropy() {
        let tree = FpTree::build(&dataset(), 2).unwrap();
        let ranked: Vec<f64> = (0..tree.n_candidate_groups()).map(|r| tree.groups[tree.group_by_rank(r)].entropy()).collect();
        for window in ranked.windows(2) {
            assert!(window[0] <= window[1] + 1e-9);
        }
    }

    #[test]
    fn target_group_is_excluded_from_candidate_ranks() {
        let tree = FpTree::build(&dataset(), 2).unwrap();
        for r in 0..tree.n_candidate_groups() {
            assert_ne!(tree.group_by_rank(r), tree.target_group_index());
        }
    }

    #[test]
    fn intersecting_root_with_a_candidate_reproduces_its_marginal() {
        let mut tree = FpTree::build(&dataset(), 2).unwrap();
        let candidate = tree.group_by_rank(0);
        tree.intersect_scored(candidate, ROOT, &mut crate::scorer::NoScore);
        let total: f64 = tree.groups[candidate].parts.iter().map(|p| p.count).sum();
        assert!((total - tree.size() as f64).abs() < 1e-9);
    }

    #[test]
    fn skip_reassigns_every_node_to_its_parents_part() {
        let mut tree = FpTree::build(&dataset(), 2).unwrap();
        let candidate = tree.group_by_rank(0);
        tree.intersect_scored(candidate, ROOT, &mut crate::scorer::NoScore);
        tree.skip(candidate);
        for &level_idx in &tree.groups[candidate].levels.clone() {
            let mut node_opt = tree.levels[level_idx as usize].head;
            while let Some(node_idx) = node_opt {
                let node = tree.nodes[node_idx as usize];
                let parent_part = tree.nodes[node.parent.unwrap() as usize].part;
                assert_eq!(node.part, parent_part);
                node_opt = node.next;
            }
        }
    }

    #[test]
    fn generate_agrees_with_the_dense_branch_and_bound_miner() {
        let data = dataset();

        let mut tree = FpTree::build(&data, 2).unwrap();
        let fp_target = Arc::new(tree.target_synthetic_partition());
        let generator = PatternGenerator::new(&mut tree, scorer_factory(ScorerKind::ReliableFractionOfInformation, fp_target), 1);
        let fp_result = generator.generate();

        let mut builder = PartitionBuilder::new();
        for tx in &data {
            builder.add(tx);
        }
        let partitions = builder.finish();
        let dense_target = Arc::new(partitions.get(2).unwrap().clone());
        let mut miner = BranchAndBoundMiner::new(&partitions, 2, scorer_factory(ScorerKind::ReliableFractionOfInformation, dense_target), 1, false);
        let dense_result = miner.mine();

        assert_eq!(fp_result.len(), 1);
        assert_eq!(dense_result.len(), 1);
        assert_eq!(fp_result[0].subset, dense_result[0].subset);
        assert!((fp_result[0].score - dense_result[0].score).abs() < 1e-6);
    }
}
