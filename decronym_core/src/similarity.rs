//! String closeness for "did you mean" suggestions
//!
//! Closeness is the normalized indel similarity `2 * LCS / (len(a) + len(b))`,
//! where LCS is the longest common subsequence. It is 1.0 for identical
//! strings and 0.0 for strings sharing no character in order.

/// Default minimum similarity for a candidate to be suggested
pub const DEFAULT_CUTOFF: f64 = 0.6;

/// Default number of suggestions per provider
pub const DEFAULT_LIMIT: usize = 3;

/// Similarity ratio in `[0.0, 1.0]`, compared case-insensitively
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    (2 * lcs_length(&a, &b)) as f64 / total as f64
}

fn lcs_length(a: &[char], b: &[char]) -> usize {
    // Single rolling row of the classic DP table
    let mut row = vec![0usize; b.len() + 1];
    for ca in a {
        let mut diagonal = 0;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb {
                diagonal + 1
            } else {
                above.max(row[j])
            };
            diagonal = above;
        }
    }
    row[b.len()]
}

/// Candidates at least `cutoff` similar to `word`, best first
///
/// Ties keep the candidates' input order. At most `limit` are returned and an
/// exact (case-insensitive) match of `word` itself is never suggested.
pub fn close_matches<'a, I>(word: &str, candidates: I, limit: usize, cutoff: f64) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    if limit == 0 {
        return Vec::new();
    }

    let folded = word.to_lowercase();
    let mut scored: Vec<(f64, &'a str)> = candidates
        .into_iter()
        .filter(|candidate| candidate.to_lowercase() != folded)
        .map(|candidate| (similarity(&folded, candidate), candidate))
        .filter(|(score, _)| *score >= cutoff)
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.truncate(limit);
    scored.into_iter().map(|(_, candidate)| candidate).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_identical_strings() {
        assert_eq!(similarity("dma", "dma"), 1.0);
        assert_eq!(similarity("DMA", "dma"), 1.0);
        assert_eq!(similarity("", ""), 1.0);
    }

    #[test]
    fn test_disjoint_strings() {
        assert_eq!(similarity("abc", "xyz"), 0.0);
        assert_eq!(similarity("abc", ""), 0.0);
    }

    #[test]
    fn test_single_substitution() {
        let score = similarity("xyz", "xyy");
        assert!((score - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_close_matches_both_neighbours() {
        let keys = ["xyy", "xzz", "abc"];
        let matches = close_matches("XYZ", keys, DEFAULT_LIMIT, DEFAULT_CUTOFF);
        assert_eq!(matches, vec!["xyy", "xzz"]);
    }

    #[test]
    fn test_close_matches_best_first() {
        let keys = ["apx", "apic", "api2"];
        let matches = close_matches("apis", keys, 3, 0.5);
        assert_eq!(matches[0], "apic");
    }

    #[test]
    fn test_close_matches_respects_limit() {
        let keys = ["dmb", "dmc", "dmd", "dme"];
        assert_eq!(close_matches("dma", keys, 2, DEFAULT_CUTOFF).len(), 2);
        assert!(close_matches("dma", keys, 0, DEFAULT_CUTOFF).is_empty());
    }

    #[test]
    fn test_close_matches_skips_self() {
        let keys = ["dma", "dmb"];
        assert_eq!(close_matches("DMA", keys, 3, DEFAULT_CUTOFF), vec!["dmb"]);
    }

    proptest! {
        #[test]
        fn prop_similarity_is_symmetric_and_bounded(a in "[a-z0-9-]{0,12}", b in "[a-z0-9-]{0,12}") {
            let ab = similarity(&a, &b);
            let ba = similarity(&b, &a);
            prop_assert!((ab - ba).abs() < 1e-9);
            prop_assert!((0.0..=1.0).contains(&ab));
        }
    }
}
