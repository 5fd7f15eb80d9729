//! Matching-blocks similarity ratio.
//!
//! Ratcliff/Obershelp: repeatedly take the longest common substring,
//! recurse on the pieces to its left and right, and score
//! `2 * matched / (len(a) + len(b))`. Lengths are counted in Unicode
//! scalar values so CJK names compare character by character.

use std::collections::HashMap;

/// Similarity of `a` and `b` in `[0, 1]`; two empty strings score `1.0`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    2.0 * matched_chars(&a, &b) as f64 / total as f64
}

/// Total size of the matching blocks between `a` and `b`.
fn matched_chars(a: &[char], b: &[char]) -> usize {
    let mut positions: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, c) in b.iter().enumerate() {
        positions.entry(*c).or_default().push(j);
    }

    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(a, &positions, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matched += size;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            pending.push((i + size, ahi, j + size, bhi));
        }
    }

    matched
}

/// Longest common run of `a[alo..ahi]` and `b[blo..bhi]` as
/// `(start_in_a, start_in_b, len)`. The earliest run wins on ties.
fn longest_match(
    a: &[char],
    positions: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
    // run length of the match ending at b[j], for the previous row of a
    let mut run_ending_at: HashMap<usize, usize> = HashMap::new();

    for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next_runs = HashMap::new();
        if let Some(js) = positions.get(c) {
            for &j in js {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let run = j
                    .checked_sub(1)
                    .and_then(|prev| run_ending_at.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next_runs.insert(j, run);
                if run > best_size {
                    best_i = i + 1 - run;
                    best_j = j + 1 - run;
                    best_size = run;
                }
            }
        }
        run_ending_at = next_runs;
    }

    (best_i, best_j, best_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_identical_strings() {
        assert_close(similarity("浦发银行", "浦发银行"), 1.0);
    }

    #[test]
    fn test_empty_strings() {
        assert_close(similarity("", ""), 1.0);
        assert_close(similarity("", "腾讯"), 0.0);
    }

    #[test]
    fn test_disjoint_strings() {
        assert_close(similarity("比亚迪", "浦发银行"), 0.0);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        // 3 of 4 chars shared: 2 * 3 / 7
        assert_close(similarity("立讯精", "立讯精密"), 6.0 / 7.0);
    }

    #[test]
    fn test_prefix_match_ratio() {
        assert_eq!(similarity("ABCXY", "ABCZW"), 0.6);
        assert_close(similarity("ABCXY", "ABCZWV"), 6.0 / 11.0);
    }

    #[test]
    fn test_recurses_on_both_sides() {
        // blocks "a" then "cd": 2 * 3 / 8
        assert_close(similarity("abcd", "axcd"), 0.75);
        // "bc" in the middle plus "a" on the left and "d" on the right
        assert_close(similarity("abcd", "abcd"), 1.0);
        assert_close(similarity("xabcdy", "abzcd"), 2.0 * 4.0 / 11.0);
    }

    #[test]
    fn test_symmetric_on_simple_inputs() {
        assert_close(similarity("中国平安", "平安银行"), similarity("平安银行", "中国平安"));
    }
}
