pub mod sentence_splitting;
pub mod similarity;

pub use sentence_splitting::{split_sentences, token_count, trim_space};
pub use similarity::ratio;
