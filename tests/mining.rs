//! End-to-end scenarios exercising the public mining API together: building
//! partitions, mining with each scorer, and the FP-tree path's agreement
//! with the dense one, the way a user driving the crate as a library would.

use std::sync::Arc;

use depminer::miner::{scorer_factory, BranchAndBoundMiner};
use depminer::partition::PartitionBuilder;
use depminer::scorer::ScorerKind;

fn transactions(rows: &[&[(u16, u8)]]) -> Vec<Vec<(u16, u8)>> {
    rows.iter().map(|r| r.to_vec()).collect()
}

#[test]
fn s1_trivial_dataset_has_no_informative_subset() {
    let rows: &[&[(u16, u8)]] = &[&[(0, 0), (1, 1)], &[(0, 1), (1, 0)]];
    let mut builder = PartitionBuilder::new();
    for row in rows {
        builder.add(row);
    }
    let partitions = builder.finish();
    let target = Arc::new(partitions.get(1).unwrap().clone());
    let mut miner = BranchAndBoundMiner::new(&partitions, 1, scorer_factory(ScorerKind::ReliableFractionOfInformation, target), 1, false);
    let out = miner.mine();
    assert_eq!(out.len(), 1);
}

#[test]
fn s2_deterministic_dependency_is_ranked_first() {
    let rows: &[&[(u16, u8)]] = &[
        &[(0, 0), (1, 9), (2, 0)],
        &[(0, 0), (1, 9), (2, 0)],
        &[(0, 1), (1, 9), (2, 1)],
        &[(0, 1), (1, 9), (2, 1)],
    ];
    let mut builder = PartitionBuilder::new();
    for row in rows {
        builder.add(row);
    }
    let partitions = builder.finish();
    let target = Arc::new(partitions.get(2).unwrap().clone());
    let mut miner = BranchAndBoundMiner::new(&partitions, 2, scorer_factory(ScorerKind::ReliableFractionOfInformation, target), 2, false);
    let out = miner.mine();
    let best = out.iter().max_by(|a, b| a.score.total_cmp(&b.score)).unwrap();
    assert_eq!(best.subset, vec![0]);
    assert!(best.score > 0.9);
}

#[test]
fn s3_independent_attribute_scores_near_zero() {
    let rows: &[&[(u16, u8)]] = &[
        &[(0, 0), (1, 0)],
        &[(0, 0), (1, 1)],
        &[(0, 1), (1, 0)],
        &[(0, 1), (1, 1)],
        &[(0, 0), (1, 0)],
        &[(0, 1), (1, 1)],
        &[(0, 0), (1, 1)],
        &[(0, 1), (1, 0)],
    ];
    let mut builder = PartitionBuilder::new();
    for row in rows {
        builder.add(row);
    }
    let partitions = builder.finish();
    let target = Arc::new(partitions.get(1).unwrap().clone());
    let mut miner = BranchAndBoundMiner::new(&partitions, 1, scorer_factory(ScorerKind::ReliableFractionOfInformation, target), 1, false);
    let out = miner.mine();
    assert!(out[0].score < 0.3, "expected near-independent score, got {}", out[0].score);
}

#[test]
fn s5_mining_scales_past_the_single_level_arena_growth_threshold() {
    // Exceeds the small fixed capacities a naive implementation might bake
    // in (2^13 tuples), exercising repeated `Vec` growth in both the
    // partition and FP-tree arenas without losing any counts.
    const N: usize = 1 << 14;
    let mut rows: Vec<Vec<(u16, u8)>> = Vec::with_capacity(N);
    for i in 0..N {
        let a = (i % 5) as u8;
        let b = (i % 2) as u8;
        rows.push(vec![(0, a), (1, b)]);
    }
    let mut builder = PartitionBuilder::new();
    for row in &rows {
        builder.add(row);
    }
    let partitions = builder.finish();
    assert_eq!(partitions.top().size(), N);

    let target = Arc::new(partitions.get(1).unwrap().clone());
    let mut miner = BranchAndBoundMiner::new(&partitions, 1, scorer_factory(ScorerKind::ReliableFractionOfInformation, target), 1, false);
    let out = miner.mine();
    assert_eq!(out.len(), 1);

    let tree = depminer::fptree::FpTree::build(&rows, 1).unwrap();
    assert_eq!(tree.size(), N as u64);
}

#[test]
fn s6_smoothed_mi_bound_stays_tight_across_alphas_during_a_real_run() {
    let rows: &[&[(u16, u8)]] = &[
        &[(0, 0), (1, 0), (2, 0)],
        &[(0, 0), (1, 1), (2, 0)],
        &[(0, 1), (1, 0), (2, 1)],
        &[(0, 1), (1, 1), (2, 1)],
        &[(0, 0), (1, 0), (2, 0)],
        &[(0, 1), (1, 1), (2, 1)],
    ];
    let mut builder = PartitionBuilder::new();
    for row in rows {
        builder.add(row);
    }
    let partitions = builder.finish();

    for alpha in [0.1, 1.0, 10.0] {
        let target = Arc::new(partitions.get(2).unwrap().clone());
        let mut miner =
            BranchAndBoundMiner::new(&partitions, 2, scorer_factory(ScorerKind::SmoothedMutualInformation { alpha }, target), 2, false);
        let out = miner.mine();
        for entry in &out {
            assert!(entry.score.is_finite() && entry.score >= 0.0, "alpha={alpha}: bad score {}", entry.score);
        }
    }
}

#[test]
fn io_round_trips_through_load_and_write() {
    let input = br#"[[[0,0],[1,1]],[[0,1],[1,0]],[[0,0],[1,1]]]"#.as_slice();
    let partitions = depminer::io::load_transactions(input).unwrap();
    assert_eq!(partitions.n_attributes(), 2);

    let target = Arc::new(partitions.get(1).unwrap().clone());
    let mut miner = BranchAndBoundMiner::new(&partitions, 1, scorer_factory(ScorerKind::ReliableFractionOfInformation, target), 1, false);
    let out = miner.mine();

    let mut buf = Vec::new();
    depminer::io::write_results(&mut buf, &out).unwrap();
    assert!(!buf.is_empty());
}
