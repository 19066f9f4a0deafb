//! Partial top-k selection over per-listing scores.
//!
//! [`select_top_k`] runs in expected linear time and makes no promise about
//! the order of the returned indices. [`rank_top_k`] additionally sorts just
//! the selected subset, strongest first.

use ordered_float::OrderedFloat;
use std::cmp::Ordering;

/// NaN ranks below every real score
#[inline]
fn rank_key(score: f32) -> OrderedFloat<f32> {
    if score.is_nan() {
        OrderedFloat(f32::NEG_INFINITY)
    } else {
        OrderedFloat(score)
    }
}

#[inline]
fn descending(scores: &[f32], a: usize, b: usize) -> Ordering {
    rank_key(scores[b]).cmp(&rank_key(scores[a]))
}

/// Indices of the `k` highest scores, in unspecified order.
///
/// `k` is clamped to `scores.len()`. Every returned index scores at least as
/// high as every index left out.
pub fn select_top_k(scores: &[f32], k: usize) -> Vec<usize> {
    let k = k.min(scores.len());
    if k == 0 {
        return Vec::new();
    }

    let mut indices: Vec<usize> = (0..scores.len()).collect();
    if k < indices.len() {
        indices.select_nth_unstable_by(k - 1, |&a, &b| descending(scores, a, b));
        indices.truncate(k);
    }
    indices
}

/// Like [`select_top_k`], then orders the selection by descending score.
///
/// Equal scores keep ascending index order.
pub fn rank_top_k(scores: &[f32], k: usize) -> Vec<usize> {
    let mut selected = select_top_k(scores, k);
    selected.sort_unstable_by(|&a, &b| descending(scores, a, b).then(a.cmp(&b)));
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_partition(scores: &[f32], selected: &[usize]) {
        let min_in = selected
            .iter()
            .map(|&i| rank_key(scores[i]))
            .min()
            .unwrap();
        let max_out = (0..scores.len())
            .filter(|i| !selected.contains(i))
            .map(|i| rank_key(scores[i]))
            .max();
        if let Some(max_out) = max_out {
            assert!(min_in >= max_out, "{:?} not a top-k of {:?}", selected, scores);
        }
    }

    #[test]
    fn test_select_size_and_partition() {
        let scores = [0.1, 0.9, -0.3, 0.5, 0.7, 0.2];
        for k in 1..=scores.len() {
            let selected = select_top_k(&scores, k);
            assert_eq!(selected.len(), k);
            assert_partition(&scores, &selected);
        }
    }

    #[test]
    fn test_select_clamps_k() {
        let scores = [0.3, 0.1];
        let mut selected = select_top_k(&scores, 10);
        selected.sort_unstable();
        assert_eq!(selected, vec![0, 1]);
        assert!(select_top_k(&scores, 0).is_empty());
        assert!(select_top_k(&[], 3).is_empty());
    }

    #[test]
    fn test_select_with_ties() {
        let scores = [0.5, 0.5, 0.5, 0.1];
        let selected = select_top_k(&scores, 2);
        assert_eq!(selected.len(), 2);
        assert!(!selected.contains(&3));
    }

    #[test]
    fn test_nan_ranks_last() {
        let scores = [f32::NAN, 0.2, -0.9];
        let mut selected = select_top_k(&scores, 2);
        selected.sort_unstable();
        assert_eq!(selected, vec![1, 2]);
    }

    #[test]
    fn test_rank_orders_selection() {
        let scores = [0.1, 0.9, -0.3, 0.5, 0.7, 0.2];
        assert_eq!(rank_top_k(&scores, 3), vec![1, 4, 3]);
        assert_eq!(rank_top_k(&[0.4, 0.8, 0.8], 2), vec![1, 2]);
    }
}
