//! Fuzzy ticker search
//!
//! Approximate string matching over the ticker symbol table. A query is
//! scored against every candidate ticker with a partial-ratio similarity
//! (0-100): the best Levenshtein-family ratio of the shorter string
//! against every contiguous window of the longer string. The top four
//! candidates survive, minus anything scoring below 50.
//!
//! Pure and stateless; the backing table is owned by [`crate::state`].

use serde::{Deserialize, Serialize};

/// Maximum number of records a search returns
pub const MAX_RESULTS: usize = 4;

/// Minimum partial-ratio score a result must reach
pub const MIN_SCORE: f64 = 50.0;

/// One row of the ticker symbol table.
///
/// The matcher reads only `ticker` (must be non-empty); the remaining
/// fields pass through to the caller untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TickerRecord {
    pub ticker: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub exchange: String,
}

/// Search `records` for the best partial-ratio matches to `query`.
///
/// An empty query returns an empty result without scanning. Matching is
/// case-insensitive. Equal scores keep the table order (stable
/// tie-break). Duplicate tickers in the table can all be returned.
pub fn search<'a>(query: &str, records: &'a [TickerRecord]) -> Vec<&'a TickerRecord> {
    if query.is_empty() {
        return Vec::new();
    }

    let query = query.to_lowercase();

    let mut scored: Vec<(f64, &TickerRecord)> = records
        .iter()
        .map(|record| (partial_ratio(&query, &record.ticker.to_lowercase()), record))
        .collect();

    // Stable descending sort: equal scores preserve table order
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    scored
        .into_iter()
        .take(MAX_RESULTS)
        .filter(|(score, _)| *score >= MIN_SCORE)
        .map(|(_, record)| record)
        .collect()
}

/// Partial-ratio similarity between two strings, 0-100.
///
/// The shorter string is slid across every contiguous window of the
/// longer string of the same length; the result is the maximum indel
/// ratio over all windows. Inputs are compared as-is (callers normalize
/// case).
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let (shorter, longer) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };

    if shorter.is_empty() {
        return if longer.is_empty() { 100.0 } else { 0.0 };
    }

    let mut best = 0.0f64;
    for start in 0..=(longer.len() - shorter.len()) {
        let window = &longer[start..start + shorter.len()];
        let score = indel_ratio(shorter, window);
        if score > best {
            best = score;
        }
        if best >= 100.0 {
            break;
        }
    }
    best
}

/// Normalized indel similarity, 0-100.
///
/// Equivalent to `(len(a) + len(b) - indel_distance) / (len(a) + len(b))`
/// scaled to 100, where indel distance is Levenshtein with substitutions
/// counted as delete+insert. Computed via the longest common subsequence.
fn indel_ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    let lcs = lcs_length(a, b);
    (2.0 * lcs as f64) / total as f64 * 100.0
}

/// Longest common subsequence length, O(min) rows of space
fn lcs_length(a: &[char], b: &[char]) -> usize {
    let (rows, cols) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    let mut prev = vec![0usize; rows.len() + 1];
    let mut curr = vec![0usize; rows.len() + 1];

    for &c in cols {
        for (i, &r) in rows.iter().enumerate() {
            curr[i + 1] = if r == c {
                prev[i] + 1
            } else {
                prev[i + 1].max(curr[i])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[rows.len()]
}
