//! Repetition checking within a single text
//!
//! Every pair of sentences is compared with the Ratcliff/Obershelp ratio.
//! The report score is the highest ratio seen over all pairs. Pairs above
//! [`SIMILARITY_THRESHOLD`] are reported in the order they are found: outer
//! index ascending, then inner index ascending.

use serde::Serialize;

use crate::config::constants::SIMILARITY_THRESHOLD;
use crate::text_processing::{ratio, similarity::to_percent, split_sentences};

/// A pair of sentences that read as near duplicates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityMatch {
    pub s1: String,
    pub s2: String,
    /// Whole-number percentage, always above 80
    pub similarity: u8,
    /// Position of `s1` among the split sentences
    pub s1_index: usize,
    /// Position of `s2` among the split sentences
    pub s2_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalReport {
    /// Highest pairwise similarity as a whole-number percentage
    pub score: u8,
    pub matches: Vec<SimilarityMatch>,
}

impl LocalReport {
    fn empty() -> Self {
        Self {
            score: 0,
            matches: Vec::new(),
        }
    }
}

/// Find sentence pairs that are suspiciously similar to each other
pub fn check_local_repetition(text: &str) -> LocalReport {
    let sentences = split_sentences(text);
    if sentences.len() < 2 {
        return LocalReport::empty();
    }

    let mut matches = Vec::new();
    let mut max_ratio = 0.0_f64;

    for i in 0..sentences.len() {
        for j in (i + 1)..sentences.len() {
            let r = ratio(&sentences[i], &sentences[j]);
            max_ratio = max_ratio.max(r);
            if r > SIMILARITY_THRESHOLD {
                matches.push(SimilarityMatch {
                    s1: sentences[i].clone(),
                    s2: sentences[j].clone(),
                    similarity: to_percent(r),
                    s1_index: i,
                    s2_index: j,
                });
            }
        }
    }

    let score = to_percent(max_ratio);

    tracing::debug!(
        sentences = sentences.len(),
        pairs = matches.len(),
        score,
        "local repetition check finished"
    );

    LocalReport { score, matches }
}
