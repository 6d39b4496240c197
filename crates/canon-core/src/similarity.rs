// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Lexical Similarity Primitives
// ─────────────────────────────────────────────────────────────────────
//! Tokenisation and set-overlap measures shared by the metric
//! evaluator, the cycle detector and the corrector.
//!
//! Tokens are maximal runs of alphanumeric characters, lower-cased.
//! Byte offsets into the source text are kept so callers can edit the
//! original string without re-tokenising it.

use std::collections::HashSet;
use std::ops::Range;

/// A lower-cased word and its byte span in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub start: usize,
    pub end: usize,
    pub norm: String,
}

impl Token {
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Split `text` into word tokens with byte offsets.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    for (i, c) in text.char_indices() {
        if c.is_alphanumeric() {
            if start.is_none() {
                start = Some(i);
            }
        } else if let Some(s) = start.take() {
            tokens.push(Token {
                start: s,
                end: i,
                norm: text[s..i].to_lowercase(),
            });
        }
    }
    if let Some(s) = start {
        tokens.push(Token {
            start: s,
            end: text.len(),
            norm: text[s..].to_lowercase(),
        });
    }
    tokens
}

/// Distinct lower-cased words of `text`.
pub fn token_set(text: &str) -> HashSet<String> {
    tokenize(text).into_iter().map(|t| t.norm).collect()
}

/// |A ∩ B| / |A ∪ B|. Zero when either side is empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let inter = a.intersection(b).count() as f64;
    let union = (a.len() + b.len()) as f64 - inter;
    inter / union
}

/// |A ∩ B| / min(|A|, |B|). Zero when either side is empty.
pub fn overlap(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let inter = a.intersection(b).count() as f64;
    inter / a.len().min(b.len()) as f64
}

/// Title abbreviations that do not end a sentence.
const TITLE_ABBREVIATIONS: &[&str] = &["mr", "mrs", "ms", "dr", "prof", "st", "vs"];

/// Closing marks that stay with the sentence they follow.
const CLOSERS: &[char] = &['"', '\'', ')', ']', '\u{201d}', '\u{2019}'];

/// Byte ranges of sentences in `text`.
///
/// `.`, `!` or `?` end a sentence only when followed (after any closing
/// quote or bracket) by whitespace or the end of the text, so decimals,
/// domain names and abbreviations like `e.g.` stay inside one sentence.
/// A line break ends a sentence with content; the break itself leads
/// the next one. Ranges cover the whole input, so concatenating them
/// reproduces `text`.
pub fn split_sentences(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = 0;
    let mut has_content = false;
    for (i, c) in text.char_indices() {
        if i < start {
            continue;
        }
        if c == '\n' {
            if has_content {
                spans.push(start..i);
                start = i;
                has_content = false;
            }
        } else if matches!(c, '.' | '!' | '?') {
            has_content = true;
            if let Some(end) = sentence_end(text, i, c) {
                spans.push(start..end);
                start = end;
                has_content = false;
            }
        } else if !c.is_whitespace() {
            has_content = true;
        }
    }
    if start < text.len() {
        spans.push(start..text.len());
    }
    spans
}

/// End of the sentence closed by terminator `c` at byte `i`, if it closes one.
fn sentence_end(text: &str, i: usize, c: char) -> Option<usize> {
    let after = i + c.len_utf8();
    let rest = &text[after..];
    let closed = rest.trim_start_matches(CLOSERS);
    if !(closed.is_empty() || closed.starts_with(char::is_whitespace)) {
        return None;
    }
    if c == '.' && ends_with_abbreviation(&text[..i]) {
        return None;
    }
    Some(after + rest.len() - closed.len())
}

/// The word just before a full stop is an abbreviation (`e.g`, `U.S`, `Dr`).
fn ends_with_abbreviation(before: &str) -> bool {
    let word = before
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or_default()
        .trim_start_matches(|c: char| !c.is_alphanumeric());
    if word.is_empty() {
        return false;
    }
    if word.contains('.') {
        return word.split('.').all(|part| part.chars().count() == 1);
    }
    TITLE_ABBREVIATIONS.contains(&word.to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(words: &[&str]) -> HashSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_tokenize_offsets() {
        let text = "Hello, World! 42x";
        let tokens = tokenize(text);
        let norms: Vec<&str> = tokens.iter().map(|t| t.norm.as_str()).collect();
        assert_eq!(norms, ["hello", "world", "42x"]);
        assert_eq!(&text[tokens[1].span()], "World");
    }

    #[test]
    fn test_tokenize_unicode() {
        let tokens = tokenize("Café — naïve");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].norm, "café");
        assert_eq!(tokens[1].norm, "naïve");
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("  ... ").is_empty());
    }

    #[test]
    fn test_jaccard() {
        let a = set(&["a", "b", "c"]);
        let b = set(&["b", "c", "d"]);
        assert!((jaccard(&a, &b) - 0.5).abs() < 1e-9);
        assert_eq!(jaccard(&a, &a), 1.0);
        assert_eq!(jaccard(&a, &HashSet::new()), 0.0);
    }

    #[test]
    fn test_overlap() {
        let a = set(&["a", "b"]);
        let b = set(&["a", "b", "c", "d"]);
        assert_eq!(overlap(&a, &b), 1.0);
        assert_eq!(overlap(&set(&["x"]), &b), 0.0);
        assert_eq!(overlap(&HashSet::new(), &b), 0.0);
    }

    #[test]
    fn test_split_sentences_roundtrip() {
        let text = "First one. Second!\nThird without end";
        let spans = split_sentences(text);
        assert_eq!(spans.len(), 3);
        let joined: String = spans.iter().map(|r| &text[r.clone()]).collect();
        assert_eq!(joined, text);
        assert_eq!(&text[spans[0].clone()], "First one.");
        assert_eq!(&text[spans[2].clone()], "\nThird without end");
    }

    #[test]
    fn test_split_sentences_keeps_inner_dots() {
        let text = "Pi is 3.14 and example.com loads, e.g. here. Next one.";
        let spans = split_sentences(text);
        assert_eq!(spans.len(), 2);
        assert_eq!(&text[spans[0].clone()], "Pi is 3.14 and example.com loads, e.g. here.");
    }

    #[test]
    fn test_split_sentences_abbreviations() {
        let text = "Dr. Smith signed it. The U.S. office agreed. Done.";
        let sentences: Vec<&str> = split_sentences(text)
            .into_iter()
            .map(|r| &text[r])
            .collect();
        assert_eq!(
            sentences,
            ["Dr. Smith signed it.", " The U.S. office agreed.", " Done."]
        );
    }

    #[test]
    fn test_split_sentences_closing_quote() {
        let text = "He said \"stop.\" Then left.";
        let spans = split_sentences(text);
        assert_eq!(spans.len(), 2);
        assert_eq!(&text[spans[0].clone()], "He said \"stop.\"");
    }

    #[test]
    fn test_split_sentences_blank_lines() {
        let text = "A.\n\nB.\n";
        let sentences: Vec<&str> = split_sentences(text)
            .into_iter()
            .map(|r| &text[r])
            .collect();
        assert_eq!(sentences, ["A.", "\n\nB.", "\n"]);
    }
}
