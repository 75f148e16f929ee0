//! Deterministic top-K selection over one row of the similarity matrix.
//!
//! Order: score descending, ties by column index ascending. A full sort and
//! the partial selection used here produce the same output because the
//! comparator never reports two distinct columns as equal.

use std::cmp::Ordering;

/// Compare two scores for descending order, NaN after every number
fn by_score_desc(a: f64, b: f64) -> Ordering {
    match b.partial_cmp(&a) {
        Some(ord) => ord,
        None => a.is_nan().cmp(&b.is_nan()),
    }
}

/// Full ranking order for `(column, score)` pairs
pub fn rank_order(a: &(usize, f64), b: &(usize, f64)) -> Ordering {
    by_score_desc(a.1, b.1).then_with(|| a.0.cmp(&b.0))
}

/// Return the `k` best `(column, score)` pairs of `row`, skipping `exclude`.
///
/// Runs in O(n + k log k): a linear selection of the k-th best pair, then a
/// sort of the k survivors.
pub fn rank_row(row: &[f64], exclude: Option<usize>, k: usize) -> Vec<(usize, f64)> {
    if k == 0 {
        return Vec::new();
    }

    let mut scored: Vec<(usize, f64)> = row
        .iter()
        .copied()
        .enumerate()
        .filter(|(column, _)| Some(*column) != exclude)
        .collect();

    if scored.len() > k {
        scored.select_nth_unstable_by(k - 1, rank_order);
        scored.truncate(k);
    }
    scored.sort_unstable_by(rank_order);
    scored
}
