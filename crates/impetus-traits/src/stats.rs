//! Statistical utility functions for cross-sections and price series.
//!
//! This module provides the row-level primitives behind panel ranking and the
//! dispersion estimates used by risk-aware allocators.

use serde::{Deserialize, Serialize};

/// Minimum threshold for standard deviation to avoid division by zero.
/// Values below this threshold are treated as zero variance.
pub const MIN_STD_THRESHOLD: f64 = 1e-10;

/// Direction of a ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RankOrder {
    /// Smallest value gets the smallest rank
    Ascending,
    /// Largest value gets the smallest rank
    Descending,
}

/// Percentile ranks of a cross-section.
///
/// Each defined, finite value receives `rank / n`, where `n` counts the
/// defined values and `rank` is its 1-based position in `order`. Ties share
/// the average of the positions they span. Missing and non-finite values are
/// left out and come back as `None`.
///
/// # Examples
///
/// ```
/// use impetus_traits::stats::{RankOrder, rank_pct};
///
/// let ranks = rank_pct(&[Some(0.3), None, Some(-0.1), Some(0.3)], RankOrder::Descending);
/// assert_eq!(ranks, vec![Some(0.5), None, Some(1.0), Some(0.5)]);
/// ```
pub fn rank_pct(values: &[Option<f64>], order: RankOrder) -> Vec<Option<f64>> {
    let mut defined: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.filter(|x| x.is_finite()).map(|x| (i, x)))
        .collect();

    match order {
        RankOrder::Ascending => defined.sort_by(|a, b| a.1.total_cmp(&b.1)),
        RankOrder::Descending => defined.sort_by(|a, b| b.1.total_cmp(&a.1)),
    }

    let n = defined.len() as f64;
    let mut ranks = vec![None; values.len()];
    let mut start = 0;
    while start < defined.len() {
        let mut end = start + 1;
        while end < defined.len() && defined[end].1 == defined[start].1 {
            end += 1;
        }
        // positions start+1 ..= end share their mean
        let average = (start + 1 + end) as f64 / 2.0;
        for (i, _) in &defined[start..end] {
            ranks[*i] = Some(average / n);
        }
        start = end;
    }
    ranks
}

/// Sample standard deviation (N-1 denominator) of the finite values.
///
/// Returns `None` with fewer than two finite values.
///
/// # Examples
///
/// ```
/// use impetus_traits::stats::sample_std;
///
/// let std = sample_std(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
/// assert!((std - 2.5_f64.sqrt()).abs() < 1e-12);
/// assert_eq!(sample_std(&[1.0]), None);
/// ```
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let finite: Vec<f64> = values.iter().copied().filter(|x| x.is_finite()).collect();
    if finite.len() < 2 {
        return None;
    }

    let n = finite.len() as f64;
    let mean = finite.iter().sum::<f64>() / n;
    // Bessel's correction
    let variance = finite.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt())
}
