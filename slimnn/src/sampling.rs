/// Index of the first entry whose running total reaches `u`.
///
/// `u` is expected in `[0, 1)`. Rounding can leave the final cumulative
/// value a hair under 1.0, so a draw past it falls on the last index.
pub fn sample_cdf(probs: &[f32], u: f32) -> Option<usize> {
    if probs.is_empty() {
        return None;
    }
    let mut cumulative = 0.0;
    for (i, p) in probs.iter().enumerate() {
        cumulative += p;
        if cumulative >= u {
            return Some(i);
        }
    }
    Some(probs.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smallest_index_meeting_draw() {
        let probs = [0.25, 0.25, 0.5];
        assert_eq!(sample_cdf(&probs, 0.0), Some(0));
        assert_eq!(sample_cdf(&probs, 0.25), Some(0));
        assert_eq!(sample_cdf(&probs, 0.2500001), Some(1));
        assert_eq!(sample_cdf(&probs, 0.5), Some(1));
        assert_eq!(sample_cdf(&probs, 0.75), Some(2));
        assert_eq!(sample_cdf(&probs, 0.9999), Some(2));
    }

    #[test]
    fn test_zero_probability_is_skipped() {
        assert_eq!(sample_cdf(&[0.0, 1.0], 0.1), Some(1));
    }

    #[test]
    fn test_rounding_falls_on_last() {
        assert_eq!(sample_cdf(&[0.3, 0.3, 0.3], 0.95), Some(2));
        assert_eq!(sample_cdf(&[], 0.5), None);
    }
}
