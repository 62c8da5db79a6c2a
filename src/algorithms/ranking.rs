use crate::config::ExclusionPolicy;

/// Force the scores of `excluded` item indices to negative infinity so they
/// sort after every other item. Indices outside `scores` are ignored.
pub fn mask_excluded(scores: &mut [f32], excluded: &[usize]) {
    for &index in excluded {
        if let Some(score) = scores.get_mut(index) {
            *score = f32::NEG_INFINITY;
        }
    }
}

/// Every index of `scores` ordered by descending score. Equal scores keep
/// ascending index order.
pub fn rank_descending(scores: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    // sort_by is stable; model weights are validated finite so total_cmp
    // never sees a NaN from a well-formed model.
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    order
}

pub fn top_k_indices(scores: &[f32], k: usize) -> Vec<usize> {
    let mut order = rank_descending(scores);
    order.truncate(k);
    order
}

/// Mask `excluded`, rank, and return at most `k` indices. With
/// `ExclusionPolicy::Drop` masked items are never returned; with
/// `ExclusionPolicy::Backfill` they may fill slots left over once every
/// unmasked item is used.
pub fn select_top_k(
    mut scores: Vec<f32>,
    excluded: &[usize],
    k: usize,
    policy: ExclusionPolicy,
) -> Vec<usize> {
    mask_excluded(&mut scores, excluded);

    match policy {
        ExclusionPolicy::Backfill => top_k_indices(&scores, k),
        ExclusionPolicy::Drop => {
            let mut is_excluded = vec![false; scores.len()];
            for &index in excluded {
                if let Some(flag) = is_excluded.get_mut(index) {
                    *flag = true;
                }
            }
            rank_descending(&scores)
                .into_iter()
                .filter(|&index| !is_excluded[index])
                .take(k)
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_k_indices() {
        let scores = vec![0.1, 0.5, 0.3, 0.9, 0.2];
        assert_eq!(top_k_indices(&scores, 2), vec![3, 1]);
    }

    #[test]
    fn test_ties_keep_index_order() {
        let scores = vec![0.5, 0.7, 0.5, 0.7, 0.5];
        assert_eq!(rank_descending(&scores), vec![1, 3, 0, 2, 4]);
    }

    #[test]
    fn test_k_larger_than_catalog() {
        let scores = vec![0.2, 0.1];
        assert_eq!(top_k_indices(&scores, 10), vec![0, 1]);
        assert!(top_k_indices(&scores, 0).is_empty());
    }

    #[test]
    fn test_mask_excluded_ignores_out_of_range() {
        let mut scores = vec![0.9, 0.1, 0.5];
        mask_excluded(&mut scores, &[1, 8]);
        assert_eq!(scores[1], f32::NEG_INFINITY);
        assert_eq!(scores[0], 0.9);
        assert_eq!(scores[2], 0.5);
    }

    #[test]
    fn test_drop_policy_never_returns_excluded() {
        let scores = vec![0.9, 0.1, 0.5];
        let picked = select_top_k(scores, &[0], 3, ExclusionPolicy::Drop);
        assert_eq!(picked, vec![2, 1]);
    }

    #[test]
    fn test_backfill_policy_fills_with_excluded_in_index_order() {
        let scores = vec![0.9, 0.1, 0.5, 0.8];
        let picked = select_top_k(scores, &[0, 3], 4, ExclusionPolicy::Backfill);
        assert_eq!(picked, vec![2, 1, 0, 3]);
    }

    #[test]
    fn test_policies_agree_when_enough_unseen_items() {
        let scores = vec![0.9, 0.1, 0.5, 0.3];
        let dropped = select_top_k(scores.clone(), &[1], 2, ExclusionPolicy::Drop);
        let backfilled = select_top_k(scores, &[1], 2, ExclusionPolicy::Backfill);
        assert_eq!(dropped, vec![0, 2]);
        assert_eq!(dropped, backfilled);
    }
}
