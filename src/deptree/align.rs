//! Recovers character offsets of parser tokens in the original sentence.

use super::{
    error::{DeptreeError, Result},
    node::{DependencyNode, RawToken, Span},
};

/// Penn Treebank bracket and quote escapes the parser may emit in `word`.
const PTB_ESCAPES: &[(&str, &str)] = &[
    ("-LRB-", "("),
    ("-RRB-", ")"),
    ("-LSB-", "["),
    ("-RSB-", "]"),
    ("-LCB-", "{"),
    ("-RCB-", "}"),
    ("``", "\""),
    ("''", "\""),
];

/// Assign inclusive character spans to `tokens` (already in id order) by a
/// single forward scan over `text`.
///
/// Each search starts where the previous token ended, so repeated words
/// resolve to successive occurrences. Offsets count characters, not bytes.
pub fn align_tokens(text: &str, tokens: Vec<RawToken>) -> Result<Vec<DependencyNode>> {
    let mut byte_cursor = 0usize;
    let mut char_cursor = 0usize;
    let mut aligned = Vec::with_capacity(tokens.len());

    for token in tokens {
        let word = match token.word.as_deref() {
            Some(word) if !word.is_empty() => word,
            _ => {
                return Err(DeptreeError::AlignmentFailure {
                    id: token.id,
                    word: token.word.clone(),
                    cursor: char_cursor,
                })
            }
        };

        let rest = &text[byte_cursor..];
        let Some((byte_pos, surface)) = locate(rest, word) else {
            return Err(DeptreeError::AlignmentFailure {
                id: token.id,
                word: token.word.clone(),
                cursor: char_cursor,
            });
        };

        let start = char_cursor + rest[..byte_pos].chars().count();
        let len = surface.chars().count();
        byte_cursor += byte_pos + surface.len();
        char_cursor = start + len;

        aligned.push(DependencyNode::aligned(token, Span::new(start, start + len - 1)));
    }

    Ok(aligned)
}

/// Find `word` in `haystack`, falling back to its unescaped surface form.
/// Returns the byte position and the string actually matched.
fn locate<'w>(haystack: &str, word: &'w str) -> Option<(usize, &'w str)> {
    if let Some(pos) = haystack.find(word) {
        return Some((pos, word));
    }
    let surface = unescape(word)?;
    haystack.find(surface).map(|pos| (pos, surface))
}

fn unescape(word: &str) -> Option<&'static str> {
    PTB_ESCAPES
        .iter()
        .find(|(escaped, _)| *escaped == word)
        .map(|(_, surface)| *surface)
}
