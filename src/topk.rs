//! Bounded top-K priority queue (component C3).
//!
//! Keeps the K best `(subset, score)` entries seen so far. The worst kept
//! entry sits at the top of the internal heap, so [`TopKQueue::last`] -
//! the pruning threshold the miner checks every candidate's bound against -
//! is O(1).

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

/// One retained result: an attribute subset and its score.
#[derive(Clone, Debug)]
pub struct Entry {
    pub subset: Vec<u16>,
    pub score: f64,
}

impl Entry {
    pub fn new(subset: Vec<u16>, score: f64) -> Self {
        Self { subset, score }
    }
}

/// Reversed ordering so `BinaryHeap` (a max-heap) keeps the *worst* entry on
/// top, matching the reference queue's "evict the worst on overflow, peek
/// the worst as threshold" contract.
#[derive(Clone, Debug)]
struct WorstFirst(Entry);

impl PartialEq for WorstFirst {
    fn eq(&self, other: &Self) -> bool {
        OrderedFloat(self.0.score) == OrderedFloat(other.0.score)
    }
}
impl Eq for WorstFirst {}

impl PartialOrd for WorstFirst {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WorstFirst {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: the heap's max is our min, i.e. our worst score.
        OrderedFloat(other.0.score).cmp(&OrderedFloat(self.0.score))
    }
}

/// Fixed-capacity top-K queue over `(subset, score)` entries.
pub struct TopKQueue {
    heap: BinaryHeap<WorstFirst>,
    k: usize,
}

impl TopKQueue {
    pub fn new(k: usize) -> Self {
        Self { heap: BinaryHeap::with_capacity(k), k }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn full(&self) -> bool {
        self.heap.len() >= self.k
    }

    /// The current worst kept score, i.e. the pruning threshold: a
    /// candidate whose bound cannot beat this can never enter the queue.
    pub fn last(&self) -> Option<&Entry> {
        self.heap.peek().map(|w| &w.0)
    }

    /// Insert `entry` if the queue has room, or if it beats the current
    /// worst kept entry; evicts the worst entry on overflow.
    pub fn push(&mut self, entry: Entry) {
        if self.heap.len() < self.k {
            self.heap.push(WorstFirst(entry));
            return;
        }
        if self.k == 0 {
            return;
        }
        let worse_than_current_worst = self.heap.peek().is_some_and(|w| entry.score <= w.0.score);
        if !worse_than_current_worst {
            self.heap.push(WorstFirst(entry));
            self.heap.pop();
        }
    }

    /// Shrink (or grow) the capacity, evicting the worst entries if the new
    /// size is smaller than the current occupancy.
    pub fn set_maxsize(&mut self, k: usize) {
        self.k = k;
        while self.heap.len() > k {
            self.heap.pop();
        }
    }

    /// Drain all entries worst-first, applying `transform` to each (used to
    /// sort a subset's attribute ids before emission).
    pub fn purge<F: FnMut(Entry) -> Entry>(&mut self, mut transform: F) -> Vec<Entry> {
        let mut out = Vec::with_capacity(self.heap.len());
        while let Some(WorstFirst(entry)) = self.heap.pop() {
            out.push(transform(entry));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retains_only_the_k_best() {
        let mut q = TopKQueue::new(3);
        for (i, score) in [1.0, 5.0, 2.0, 9.0, 3.0, 7.0].into_iter().enumerate() {
            q.push(Entry::new(vec![i as u16], score));
        }
        let out = q.purge(|e| e);
        let mut scores: Vec<f64> = out.iter().map(|e| e.score).collect();
        scores.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(scores, vec![5.0, 7.0, 9.0]);
    }

    #[test]
    fn purge_emits_worst_to_best() {
        let mut q = TopKQueue::new(3);
        for score in [5.0, 9.0, 7.0] {
            q.push(Entry::new(vec![], score));
        }
        let out = q.purge(|e| e);
        let scores: Vec<f64> = out.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![5.0, 7.0, 9.0]);
    }

    #[test]
    fn last_is_the_pruning_threshold() {
        let mut q = TopKQueue::new(2);
        q.push(Entry::new(vec![], 3.0));
        q.push(Entry::new(vec![], 1.0));
        assert_eq!(q.last().unwrap().score, 1.0);
        q.push(Entry::new(vec![], 2.0));
        assert_eq!(q.last().unwrap().score, 2.0);
    }

    #[test]
    fn set_maxsize_evicts_excess() {
        let mut q = TopKQueue::new(5);
        for score in [1.0, 2.0, 3.0, 4.0, 5.0] {
            q.push(Entry::new(vec![], score));
        }
        q.set_maxsize(2);
        let out = q.purge(|e| e);
        let scores: Vec<f64> = out.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![4.0, 5.0]);
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut q = TopKQueue::new(0);
        q.push(Entry::new(vec![], 1.0));
        assert!(q.is_empty());
    }
}
