//! Columnar partitions over categorical tuples (component C1).
//!
//! A [`Partition`] represents the equivalence classes ("parts") induced by
//! one attribute over the tuples of a dataset. Refining a partition by
//! intersecting it with another is the core primitive the miner and the
//! scorers are built on: every information-theoretic score is computed as a
//! side effect of one intersection pass, never from a materialized
//! contingency table.
//!
//! Cells and parts live in flat arenas addressed by index rather than by
//! pointer. The reference implementation this crate is modeled on patches
//! raw pointers on every arena reallocation via a `Rebuilder` callback;
//! indices into a `Vec` survive reallocation unchanged, so that callback
//! degenerates to the identity here (see [`crate::arena`]).

use std::collections::HashMap;

use crate::error::{MinerError, Result};
use crate::scorer::{xlogx, Scorer};

type CellIndex = u32;
type PartIndex = u32;

#[derive(Clone, Copy, Debug)]
struct Cell {
    next: Option<CellIndex>,
    part: PartIndex,
}

#[derive(Clone, Debug, Default)]
struct Part {
    first: Option<CellIndex>,
    last: Option<CellIndex>,
    n: u32,
    /// Scratch pointer used only during intersection: the new part (in the
    /// arena under construction) this part's cells have been redirected to.
    new_part: Option<PartIndex>,
}

impl Part {
    fn push(&mut self, cells: &mut [Cell], cell: CellIndex, part_idx: PartIndex) {
        cells[cell as usize].next = None;
        cells[cell as usize].part = part_idx;
        match self.last {
            Some(last) => cells[last as usize].next = Some(cell),
            None => self.first = Some(cell),
        }
        self.last = Some(cell);
        self.n += 1;
    }
}

/// One attribute's equivalence-class partition of the tuple set (or the
/// "top" partition that places every tuple in a single class).
#[derive(Clone, Debug, Default)]
pub struct Partition {
    cells: Vec<Cell>,
    parts: Vec<Part>,
    n_empty_parts: usize,
}

impl Partition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tuples represented (cells are one-per-tuple for this
    /// attribute; sparse attributes that skip tuples have fewer cells).
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Total number of equivalence classes, counting parts folded away
    /// during a prior intersection as empty.
    pub fn n_parts(&self) -> usize {
        self.parts.len() + self.n_empty_parts
    }

    pub fn n_non_empty_parts(&self) -> usize {
        self.parts.len()
    }

    pub fn n_empty_parts(&self) -> usize {
        self.n_empty_parts
    }

    /// Append one cell bound to `value`, creating a new part the first time
    /// `value` is seen. `next_part` hands out fresh part indices; callers
    /// building many partitions from one stream typically keep one `HashMap`
    /// per partition (see [`PartitionBuilder`]).
    fn add_cell(&mut self, part_for_value: &mut HashMap<u8, PartIndex>, value: u8) {
        let cell_idx = self.cells.len() as CellIndex;
        self.cells.push(Cell { next: None, part: 0 });
        let part_idx = *part_for_value.entry(value).or_insert_with(|| {
            self.parts.push(Part::default());
            (self.parts.len() - 1) as PartIndex
        });
        self.parts[part_idx as usize].push(&mut self.cells, cell_idx, part_idx);
    }

    /// Entropy of this partition, clamped to be non-negative: `log2(N) -
    /// sum(n_k log2 n_k) / N`.
    pub fn entropy(&self) -> f64 {
        if self.cells.is_empty() {
            return 0.0;
        }
        let n = self.cells.len() as f64;
        let sumxlogx: f64 = self.parts.iter().map(|p| xlogx(p.n as f64)).sum();
        crate::utils::clamp_nonnegative(n.log2() - sumxlogx / n)
    }

    /// Drive a scorer's callbacks over this partition's parts directly,
    /// without intersecting against anything (used to score the root / top
    /// partition, and by scorers that need a plain marginal distribution).
    pub fn score_self(&self, scorer: &mut dyn Scorer) {
        scorer.begin(self.n_parts());
        for part in &self.parts {
            scorer.update(part.n as f64);
        }
        scorer.end();
    }

    /// Part sizes, in arena order. Used by scorers that need the target's
    /// full marginal count vector up front (RFI, smoothed MI).
    pub fn part_sizes(&self) -> Vec<f64> {
        self.parts.iter().map(|p| p.n as f64).collect()
    }

    /// Refine `self` in place by intersecting it with `other`, driving
    /// `scorer`'s callbacks as each new part closes. Both partitions must
    /// describe the same tuple set (same cell count).
    pub fn intersect_scored(&mut self, other: &Partition, scorer: &mut dyn Scorer) -> Result<()> {
        if self.cells.len() != other.cells.len() {
            return Err(MinerError::DataShape(format!(
                "partition size mismatch in intersection: {} vs {}",
                self.cells.len(),
                other.cells.len()
            )));
        }

        scorer.begin_pair(self.n_parts(), other.n_parts());

        let mut other_cells = other.cells.clone();
        let max_parts = self.n_parts().saturating_mul(other.n_parts()).min(self.cells.len());
        let mut new_parts: Vec<Part> = Vec::with_capacity(max_parts);
        // other_new_part[i] mirrors `other`'s parts' scratch `new_part` field.
        let mut other_new_part: Vec<Option<PartIndex>> = vec![None; other.parts.len()];

        for part in &self.parts {
            scorer.subbegin();
            let mut cell = part.first;
            while let Some(c) = cell {
                let next = self.cells[c as usize].next;
                // Cells are positionally aligned by tuple index across
                // partitions describing the same tuple set.
                let other_part_idx = other_cells[c as usize].part;
                let new_part_idx = match other_new_part[other_part_idx as usize] {
                    Some(idx) => idx,
                    None => {
                        new_parts.push(Part::default());
                        let idx = (new_parts.len() - 1) as PartIndex;
                        other_new_part[other_part_idx as usize] = Some(idx);
                        idx
                    }
                };
                new_parts[new_part_idx as usize].push(&mut other_cells, c, new_part_idx);
                cell = next;
            }

            for (other_part_idx, slot) in other_new_part.iter_mut().enumerate() {
                if let Some(new_part_idx) = slot.take() {
                    let _ = other_part_idx;
                    scorer.update(new_parts[new_part_idx as usize].n as f64);
                }
            }
            scorer.subend();
        }

        let total_slots = self.n_parts() * other.n_parts();
        self.n_empty_parts = total_slots - new_parts.len();
        // `cells` keep their own chain pointers (rewritten above via
        // `other_cells`, a positionally-aligned copy of `other`'s cells);
        // copy the updated `part` assignment back onto our own cell array.
        for (dst, src) in self.cells.iter_mut().zip(other_cells.iter()) {
            dst.part = src.part;
            dst.next = src.next;
        }
        self.parts = new_parts;

        scorer.end();
        Ok(())
    }

    /// Intersect without scoring, for callers that only need the refined
    /// partition (e.g. building the global max bound during preprocessing).
    pub fn intersect(&mut self, other: &Partition) -> Result<()> {
        self.intersect_scored(other, &mut crate::scorer::NoScore)
    }

    /// Build a partition directly from part sizes, skipping real cell
    /// construction. Used to hand the FP-tree's target marginal (known only
    /// as per-value counts) to a [`crate::scorer::TargetScorer`] without
    /// requiring the tree to materialize a parallel cell-arena partition.
    pub fn synthetic(part_sizes: &[f64]) -> Self {
        let mut p = Partition::new();
        for (idx, &size) in part_sizes.iter().enumerate() {
            let n = size.round().max(0.0) as u32;
            for _ in 0..n {
                p.cells.push(Cell { next: None, part: idx as PartIndex });
            }
            p.parts.push(Part { first: None, last: None, n, new_part: None });
        }
        p
    }
}

/// Builds one [`Partition`] per attribute (plus the implicit "top"
/// partition) while streaming transactions, mirroring the reference
/// engine's incremental `Mapper`-per-column construction.
#[derive(Default)]
pub struct PartitionBuilder {
    top: Partition,
    top_mapper: HashMap<u8, PartIndex>,
    columns: Vec<Partition>,
    mappers: Vec<HashMap<u8, PartIndex>>,
    n_tuples: usize,
}

impl PartitionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_column(&mut self, field: usize) {
        while field >= self.columns.len() {
            self.columns.push(Partition::new());
            self.mappers.push(HashMap::new());
        }
    }

    /// Feed one transaction: a list of `(attribute_id, value_id)` pairs.
    pub fn add(&mut self, transaction: &[(u16, u8)]) {
        for &(field, value) in transaction {
            let field = field as usize;
            self.ensure_column(field);
            let (col, mapper) = (&mut self.columns[field], &mut self.mappers[field]);
            col.add_cell(mapper, value);
        }
        self.top.add_cell(&mut self.top_mapper, 0);
        self.n_tuples += 1;
    }

    pub fn n_tuples(&self) -> usize {
        self.n_tuples
    }

    pub fn n_attributes(&self) -> usize {
        self.columns.len()
    }

    pub fn finish(self) -> Partitions {
        Partitions { top: self.top, columns: self.columns }
    }
}

/// The finished set of per-attribute partitions plus the top partition,
/// ready for mining.
pub struct Partitions {
    top: Partition,
    columns: Vec<Partition>,
}

impl Partitions {
    pub fn top(&self) -> &Partition {
        &self.top
    }

    pub fn get(&self, field: usize) -> Option<&Partition> {
        self.columns.get(field)
    }

    pub fn n_attributes(&self) -> usize {
        self.columns.len()
    }

    /// Resolve a (possibly negative, Python-style) target index against the
    /// attribute count.
    pub fn resolve_index(&self, target: i64) -> Result<usize> {
        let n = self.n_attributes() as i64;
        let resolved = if target < 0 { n + target } else { target };
        if resolved < 0 || resolved >= n {
            return Err(MinerError::DataShape(format!(
                "target index {target} out of bounds for {n} attributes"
            )));
        }
        Ok(resolved as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::Entropy;

    fn build(transactions: &[&[(u16, u8)]]) -> Partitions {
        let mut b = PartitionBuilder::new();
        for t in transactions {
            b.add(t);
        }
        b.finish()
    }

    #[test]
    fn single_attribute_two_values_has_two_parts() {
        let parts = build(&[&[(0, 0)], &[(0, 0)], &[(0, 1)]]);
        let col = parts.get(0).unwrap();
        assert_eq!(col.size(), 3);
        assert_eq!(col.n_parts(), 2);
    }

    #[test]
    fn entropy_of_uniform_binary_partition_is_one() {
        let parts = build(&[&[(0, 0)], &[(0, 1)], &[(0, 0)], &[(0, 1)]]);
        let col = parts.get(0).unwrap();
        assert!((col.entropy() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn entropy_of_single_part_is_zero() {
        let parts = build(&[&[(0, 0)], &[(0, 0)], &[(0, 0)]]);
        assert_eq!(parts.get(0).unwrap().entropy(), 0.0);
    }

    #[test]
    fn intersection_refines_parts_and_preserves_size() {
        // attr 0: {0,0,1,1}; attr 1: {0,1,0,1} -> intersection is 4 singleton parts
        let parts = build(&[&[(0, 0), (1, 0)], &[(0, 0), (1, 1)], &[(0, 1), (1, 0)], &[(0, 1), (1, 1)]]);
        let mut a = parts.get(0).unwrap().clone();
        let b = parts.get(1).unwrap();
        a.intersect(b).unwrap();
        assert_eq!(a.size(), 4);
        assert_eq!(a.n_non_empty_parts(), 4);
        let total: u32 = a.part_sizes().iter().map(|&n| n as u32).sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn intersection_rejects_mismatched_sizes() {
        let mut a = build(&[&[(0, 0)], &[(0, 1)]]).columns.remove(0);
        let b = build(&[&[(0, 0)], &[(0, 1)], &[(0, 1)]]).columns.remove(0);
        assert!(a.intersect(&b).is_err());
    }

    #[test]
    fn intersection_commutes_on_entropy_score() {
        let parts = build(&[&[(0, 0), (1, 0)], &[(0, 0), (1, 1)], &[(0, 1), (1, 0)], &[(0, 1), (1, 1)]]);
        let mut a = parts.get(0).unwrap().clone();
        let mut b = parts.get(1).unwrap().clone();
        let mut s1 = Entropy::default();
        a.intersect_scored(parts.get(1).unwrap(), &mut s1).unwrap();
        let mut s2 = Entropy::default();
        b.intersect_scored(parts.get(0).unwrap(), &mut s2).unwrap();
        assert!((s1.value() - s2.value()).abs() < 1e-9);
    }

    #[test]
    fn top_partition_has_one_part() {
        let parts = build(&[&[(0, 0)], &[(0, 1)], &[(0, 0)]]);
        assert_eq!(parts.top().n_parts(), 1);
        assert_eq!(parts.top().size(), 3);
    }

    #[test]
    fn resolve_negative_target_index() {
        let parts = build(&[&[(0, 0), (1, 0)], &[(0, 1), (1, 1)]]);
        assert_eq!(parts.resolve_index(-1).unwrap(), 1);
        assert!(parts.resolve_index(5).is_err());
    }
}
