//! Reproducible stratified train/test splitting.

use crate::types::{DatasetError, DatasetResult};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;

pub const DEFAULT_TEST_RATIO: f32 = 0.2;
pub const DEFAULT_SPLIT_SEED: u64 = 42;

/// Row indices for each partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Test rows allotted to a class with `count` samples: proportional, but at least one
/// row on each side.
pub fn test_share(count: usize, test_ratio: f32) -> usize {
    let raw = (count as f32 * test_ratio).round() as usize;
    raw.clamp(1, count.saturating_sub(1).max(1))
}

/// Split row indices so every label keeps (as closely as possible) the same proportion
/// in both partitions. Every label needs at least two rows, and there must be at least
/// two distinct labels.
pub fn stratified_split<S: AsRef<str>>(
    labels: &[S],
    test_ratio: f32,
    seed: u64,
) -> DatasetResult<SplitIndices> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(DatasetError::InvalidConfig(format!(
            "test ratio must be in (0, 1), got {test_ratio}"
        )));
    }
    let mut by_label: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (idx, label) in labels.iter().enumerate() {
        by_label.entry(label.as_ref()).or_default().push(idx);
    }
    if by_label.len() < 2 {
        return Err(DatasetError::TooFewClasses {
            found: by_label.len(),
        });
    }
    if let Some((label, rows)) = by_label.iter().find(|(_, rows)| rows.len() < 2) {
        return Err(DatasetError::InsufficientSamples {
            label: label.to_string(),
            count: rows.len(),
        });
    }

    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();
    for rows in by_label.values_mut() {
        rows.shuffle(&mut rng);
        let n_test = test_share(rows.len(), test_ratio);
        test.extend_from_slice(&rows[..n_test]);
        train.extend_from_slice(&rows[n_test..]);
    }
    train.shuffle(&mut rng);
    test.shuffle(&mut rng);
    Ok(SplitIndices { train, test })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn labels(counts: &[(&str, usize)]) -> Vec<String> {
        counts
            .iter()
            .flat_map(|(l, n)| std::iter::repeat(l.to_string()).take(*n))
            .collect()
    }

    #[test]
    fn partitions_are_disjoint_and_complete() {
        let ls = labels(&[("A", 13), ("B", 10), ("C", 27)]);
        let split = stratified_split(&ls, 0.2, 42).unwrap();
        let train: HashSet<_> = split.train.iter().copied().collect();
        let test: HashSet<_> = split.test.iter().copied().collect();
        assert!(train.is_disjoint(&test));
        assert_eq!(train.len() + test.len(), ls.len());
    }

    #[test]
    fn class_proportions_hold_within_one_sample() {
        let ls = labels(&[("A", 10), ("B", 23), ("Ç", 41), ("D", 12)]);
        let split = stratified_split(&ls, 0.2, 7).unwrap();
        for label in ["A", "B", "Ç", "D"] {
            let total = ls.iter().filter(|l| *l == label).count() as f32;
            let in_test = split.test.iter().filter(|&&i| ls[i] == label).count() as f32;
            assert!(
                (in_test - total * 0.2).abs() <= 1.0,
                "{label}: {in_test} of {total} in test"
            );
        }
    }

    #[test]
    fn same_seed_same_split() {
        let ls = labels(&[("A", 20), ("B", 20)]);
        assert_eq!(
            stratified_split(&ls, 0.2, 42).unwrap(),
            stratified_split(&ls, 0.2, 42).unwrap()
        );
    }

    #[test]
    fn singleton_class_is_reported() {
        let ls = labels(&[("A", 1), ("B", 1)]);
        match stratified_split(&ls, 0.2, 42) {
            Err(DatasetError::InsufficientSamples { label, count }) => {
                assert_eq!(label, "A");
                assert_eq!(count, 1);
            }
            other => panic!("expected InsufficientSamples, got {other:?}"),
        }
    }

    #[test]
    fn single_class_is_reported() {
        let ls = labels(&[("A", 8)]);
        assert!(matches!(
            stratified_split(&ls, 0.2, 42),
            Err(DatasetError::TooFewClasses { found: 1 })
        ));
    }

    #[test]
    fn tiny_classes_keep_one_row_each_side() {
        assert_eq!(test_share(2, 0.2), 1);
        assert_eq!(test_share(3, 0.2), 1);
        assert_eq!(test_share(10, 0.2), 2);
        assert_eq!(test_share(13, 0.2), 3);
    }
}
