//! Sentence splitting at terminal punctuation
//! A boundary is any run of whitespace that directly follows `.`, `!` or `?`

/// Characters that can end a sentence
const TERMINAL_PUNCTUATION: &[char] = &['.', '!', '?'];

fn is_terminal(ch: char) -> bool {
    TERMINAL_PUNCTUATION.contains(&ch)
}

/// Unicode whitespace plus the ASCII file, group, record and unit
/// separators (U+001C..U+001F), which `char::is_whitespace` leaves out
pub fn is_space(ch: char) -> bool {
    ch.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&ch)
}

/// Trim leading and trailing [`is_space`] characters
pub fn trim_space(text: &str) -> &str {
    text.trim_matches(is_space)
}

/// Split text into sentences
///
/// The terminal punctuation stays attached to the sentence it ends, the
/// whitespace run after it is consumed, and every piece is trimmed. Empty
/// pieces are dropped, so empty or whitespace-only input yields no sentences.
///
/// Unlike speech-oriented splitters this does not try to recognise
/// abbreviations or decimals: "Dr. Smith" is two sentences.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut prev: Option<char> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if is_space(ch) && prev.is_some_and(is_terminal) {
            push_trimmed(&mut sentences, &text[start..idx]);

            // Consume the rest of the whitespace run
            let mut end = idx + ch.len_utf8();
            while let Some(&(next_idx, next_ch)) = chars.peek() {
                if !is_space(next_ch) {
                    break;
                }
                end = next_idx + next_ch.len_utf8();
                chars.next();
            }

            start = end;
            prev = None;
            continue;
        }

        prev = Some(ch);
    }

    push_trimmed(&mut sentences, &text[start..]);
    sentences
}

fn push_trimmed(sentences: &mut Vec<String>, piece: &str) {
    let trimmed = trim_space(piece);
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}

/// Number of whitespace-delimited tokens in a sentence
pub fn token_count(sentence: &str) -> usize {
    sentence.split(is_space).filter(|t| !t.is_empty()).count()
}
