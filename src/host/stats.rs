use std::cmp::Ordering;

use anyhow::{ensure, Result};

use crate::lang::ast::StatKind;

/// Compute a summary statistic over a column already stripped of missing
/// values
pub fn compute(values: &[f64], stat: StatKind) -> Result<f64> {
    ensure!(
        !values.is_empty(),
        "cannot compute the {} of an empty column",
        stat
    );

    let result = match stat {
        StatKind::Mean => mean(values),
        StatKind::Median => median(values),
        StatKind::Mode => mode(values),
    };

    Ok(result)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    let sorted = sort(values);
    let mid = sorted.len() / 2;

    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Most frequent value; ties resolve to the smallest tied value
///
/// Counting runs over the sorted slice makes the tie-break fall out of the
/// ordering: a later (larger) run must be strictly more frequent to
/// displace the current pick.
fn mode(values: &[f64]) -> f64 {
    let sorted = sort(values);

    let mut best = sorted[0];
    let mut best_count = 0;
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i + 1;
        while j < sorted.len() && sorted[j] == sorted[i] {
            j += 1;
        }

        if j - i > best_count {
            best = sorted[i];
            best_count = j - i;
        }

        i = j;
    }

    best
}

fn sort(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}

#[test]
fn test_mean() {
    let data = vec![
        (vec![1.0, 2.0, 3.0], 2.0),
        (vec![5.0], 5.0),
        (vec![-1.0, 1.0], 0.0),
        (vec![0.5, 0.25], 0.375),
    ];

    for (values, expected) in data {
        assert_eq!(compute(&values, StatKind::Mean).unwrap(), expected);
    }
}

#[test]
fn test_median() {
    let data = vec![
        (vec![3.0, 1.0, 2.0], 2.0),
        (vec![4.0, 1.0, 3.0, 2.0], 2.5),
        (vec![7.0], 7.0),
        (vec![2.0, 2.0], 2.0),
    ];

    for (values, expected) in data {
        assert_eq!(compute(&values, StatKind::Median).unwrap(), expected);
    }
}

#[test]
fn test_mode() {
    let data = vec![
        (vec![1.0, 2.0, 2.0, 3.0], 2.0),
        // Two-way tie: the smallest tied value wins
        (vec![1.0, 1.0, 2.0, 2.0], 1.0),
        (vec![2.0, 2.0, 1.0, 1.0], 1.0),
        (vec![3.0], 3.0),
        (vec![5.0, 4.0, 5.0, 4.0, 5.0], 5.0),
    ];

    for (values, expected) in data {
        assert_eq!(compute(&values, StatKind::Mode).unwrap(), expected);
    }
}

#[test]
fn test_empty_column() {
    for stat in [StatKind::Mean, StatKind::Median, StatKind::Mode].iter() {
        assert!(compute(&[], *stat).is_err());
    }
}
