//! Block-matching similarity ratio (Ratcliff/Obershelp).
//!
//! `ratio = 2·M / (len(a) + len(b))`, where `M` is the total size of the
//! matching blocks found by taking the longest common substring and recursing
//! into the unmatched text on either side of it. Ties between equally long
//! substrings go to the earliest position in `a`, then in `b`, so results are
//! deterministic.

use std::collections::HashMap;

/// Similarity of two character sequences in `[0, 1]`. Two empty inputs are
/// identical (1.0).
pub fn ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(a, b) as f64 / total as f64
}

/// True if `ratio(a, b) > threshold`.
///
/// Two cheap upper bounds (length-only, then character multiset) reject most
/// unrelated pairs before the quadratic block search runs.
pub fn exceeds(a: &[char], b: &[char], threshold: f64) -> bool {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0 > threshold;
    }
    let length_bound = 2.0 * a.len().min(b.len()) as f64 / total as f64;
    if length_bound <= threshold {
        return false;
    }
    let multiset_bound = 2.0 * common_chars(a, b) as f64 / total as f64;
    if multiset_bound <= threshold {
        return false;
    }
    ratio(a, b) > threshold
}

/// Total length of all matching blocks.
pub fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        total += k;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }
    total
}

/// Longest common substring of `a[alo..ahi]` and `b[blo..bhi]` as
/// `(start_in_a, start_in_b, len)`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);
    let width = bhi - blo;
    // curr[col]: length of the match ending at (i, blo + col - 1)
    let mut prev = vec![0usize; width + 1];
    let mut curr = vec![0usize; width + 1];

    for i in alo..ahi {
        for j in blo..bhi {
            let col = j - blo + 1;
            if a[i] == b[j] {
                let k = prev[col - 1] + 1;
                curr[col] = k;
                if k > best_k {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_k = k;
                }
            } else {
                curr[col] = 0;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    (best_i, best_j, best_k)
}

/// Size of the multiset intersection of the two character sequences.
fn common_chars(a: &[char], b: &[char]) -> usize {
    let mut available: HashMap<char, usize> = HashMap::new();
    for c in b {
        *available.entry(*c).or_insert(0) += 1;
    }
    let mut common = 0;
    for c in a {
        if let Some(n) = available.get_mut(c) {
            if *n > 0 {
                *n -= 1;
                common += 1;
            }
        }
    }
    common
}
