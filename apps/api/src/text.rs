//! Text normalization and order-preserving tokenization shared by the ingestor,
//! the requirement extractor, and the matcher.

use unicode_normalization::UnicodeNormalization;

/// Characters allowed inside a token so that `c++`, `c#`, `node.js` and `ci/cd`
/// survive as single tokens.
const INNER_CHARS: &[char] = &['+', '#', '.', '/', '-', '_'];

/// A lowercased token plus the byte offset where it starts in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub offset: usize,
}

/// NFKC-folds the text (PDF ligatures like "ﬁ" become "fi"), unifies line
/// endings, collapses horizontal whitespace, and drops repeated blank lines.
pub fn normalize_text(raw: &str) -> String {
    let folded: String = raw.nfkc().collect();
    let unified = folded.replace("\r\n", "\n").replace('\r', "\n");

    let mut out = String::with_capacity(unified.len());
    let mut previous_blank = true;
    for line in unified.split('\n') {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            if !previous_blank {
                out.push('\n');
            }
            previous_blank = true;
            continue;
        }
        out.push_str(&collapsed);
        out.push('\n');
        previous_blank = false;
    }

    out.trim_end().to_string()
}

/// Splits text into lowercased tokens in reading order.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    for (idx, ch) in text.char_indices() {
        if ch.is_alphanumeric() || INNER_CHARS.contains(&ch) {
            if start.is_none() {
                start = Some(idx);
            }
        } else if let Some(s) = start.take() {
            push_token(&mut tokens, text, s, idx);
        }
    }
    if let Some(s) = start {
        push_token(&mut tokens, text, s, text.len());
    }

    tokens
}

fn push_token(tokens: &mut Vec<Token>, text: &str, start: usize, end: usize) {
    let raw = &text[start..end];
    let trimmed = raw.trim_end_matches(&['.', '/', '-', '_'][..]);
    let core = trimmed.trim_start_matches(&['/', '-', '_'][..]);
    if !core.chars().any(char::is_alphanumeric) {
        return;
    }
    let lead = trimmed.len() - core.len();
    tokens.push(Token {
        text: core.to_lowercase(),
        offset: start + lead,
    });
}

/// Lowercased, token-joined form of a phrase. Used as the lookup key for terms.
pub fn phrase_key(phrase: &str) -> String {
    tokenize(phrase)
        .into_iter()
        .map(|t| t.text)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns the index of the first token where `needle` occurs as a contiguous
/// token sequence.
pub fn find_phrase(haystack: &[Token], needle: &[String]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window.iter().zip(needle).all(|(t, n)| t.text == *n))
}
