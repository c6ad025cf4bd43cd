//! Classification score post-processing.

/// Returns the index of the maximum score.
///
/// Ties are broken by picking the first such index in order; this determines
/// the displayed diagnosis and must not change. Comparison is strictly
/// greater-than, so NaN scores never displace an earlier candidate.
///
/// # Arguments
///
/// * `scores` - Confidence scores, one per class.
///
/// # Returns
///
/// * `Some(index)` - Index of the maximum score.
/// * `None` - If `scores` is empty.
pub fn argmax_first(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, &score) in scores.iter().enumerate() {
        match best {
            None => best = Some((idx, score)),
            Some((_, best_score)) if score > best_score => best = Some((idx, score)),
            _ => {}
        }
    }
    best.map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax_picks_maximum() {
        assert_eq!(argmax_first(&[4.1, 82.7, 13.2]), Some(1));
        assert_eq!(argmax_first(&[90.0, 5.0, 5.0]), Some(0));
        assert_eq!(argmax_first(&[1.0, 2.0, 97.0]), Some(2));
    }

    #[test]
    fn test_argmax_tie_breaks_to_first_index() {
        assert_eq!(argmax_first(&[50.0, 50.0, 0.0]), Some(0));
        assert_eq!(argmax_first(&[0.0, 50.0, 50.0]), Some(1));
        assert_eq!(argmax_first(&[33.3, 33.3, 33.3]), Some(0));
    }

    #[test]
    fn test_argmax_empty_is_none() {
        assert_eq!(argmax_first(&[]), None);
    }

    #[test]
    fn test_argmax_single_element() {
        assert_eq!(argmax_first(&[7.5]), Some(0));
    }
}
