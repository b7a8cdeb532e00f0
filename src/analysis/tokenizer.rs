//! Regex tokenization of normalized Arabic text.
//!
//! Tokens are maximal runs of Arabic letters, ASCII digits, or lowercase
//! ASCII letters in the normalized string. Everything else (whitespace,
//! punctuation, symbols) is a boundary. Because [`normalize`] already folds
//! case and digit variants, the pattern only needs the canonical ranges.

use lazy_static::lazy_static;
use regex::Regex;

use crate::analysis::normalize;

lazy_static! {
    static ref TOKEN_RE: Regex =
        Regex::new(r"[\x{0621}-\x{064A}0-9a-z]+").expect("token pattern is valid");
}

/// Normalize `text` and split it into index/query tokens.
///
/// Applied identically when building the lexical index and when analyzing a
/// query. Returns an empty vector when the text contains no token characters.
///
/// # Examples
///
/// ```
/// use dalil::analysis::tokenize;
///
/// let tokens = tokenize("الطاقة النووية");
/// assert_eq!(tokens, vec!["الطاقة", "النووية"]);
///
/// assert!(tokenize("!!! ...").is_empty());
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = normalize(text);
    TOKEN_RE
        .find_iter(&normalized)
        .map(|m| m.as_str().to_string())
        .collect()
}
