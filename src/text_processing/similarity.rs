//! Character-sequence similarity (Ratcliff/Obershelp)
//!
//! The ratio is `2 * M / T`, where `T` is the combined length of both strings
//! and `M` is the number of characters covered by the matching blocks: the
//! longest common contiguous block, then recursively the longest blocks to its
//! left and to its right.

use std::collections::HashMap;

/// Second-sequence length at which very frequent characters stop being indexed
const AUTOJUNK_MIN_LEN: usize = 200;

/// Similarity ratio of two strings in `[0.0, 1.0]`
///
/// Two empty strings are identical (1.0). The comparison is over Unicode
/// scalar values and is case-sensitive.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matcher = SequenceMatcher::new(&a, &b);
    2.0 * matcher.matched_len() as f64 / total as f64
}

/// Convert a ratio to a truncated integer percentage
pub fn to_percent(ratio: f64) -> u8 {
    (ratio.clamp(0.0, 1.0) * 100.0) as u8
}

struct SequenceMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    /// Positions of each indexed character in `b`, ascending
    b2j: HashMap<char, Vec<usize>>,
}

impl<'a> SequenceMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, ch) in b.iter().enumerate() {
            b2j.entry(*ch).or_default().push(j);
        }

        // Characters that make up more than ~1% of a long `b` are not indexed.
        // Blocks can still grow across them during extension.
        if b.len() >= AUTOJUNK_MIN_LEN {
            let threshold = b.len() / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= threshold);
        }

        Self { a, b, b2j }
    }

    /// Longest matching block in `a[alo..ahi]` and `b[blo..bhi]`
    ///
    /// Returns `(i, j, size)`. Among maximal blocks the one starting earliest
    /// in `a` wins, then the one starting earliest in `b`.
    fn find_longest_match(
        &self,
        alo: usize,
        ahi: usize,
        blo: usize,
        bhi: usize,
    ) -> (usize, usize, usize) {
        let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);

        // j2len[j] = length of the block ending at a[i - 1] and b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut new_j2len: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    new_j2len.insert(j, k);
                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }
            j2len = new_j2len;
        }

        // Extend across equal characters that were left out of the index
        while best_i > alo && best_j > blo && self.a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_size += 1;
        }
        while best_i + best_size < ahi
            && best_j + best_size < bhi
            && self.a[best_i + best_size] == self.b[best_j + best_size]
        {
            best_size += 1;
        }

        (best_i, best_j, best_size)
    }

    /// Total number of characters covered by all matching blocks
    fn matched_len(&self) -> usize {
        let mut matched = 0;
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, size) = self.find_longest_match(alo, ahi, blo, bhi);
            if size == 0 {
                continue;
            }

            matched += size;
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + size < ahi && j + size < bhi {
                queue.push((i + size, ahi, j + size, bhi));
            }
        }

        matched
    }
}
