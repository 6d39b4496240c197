// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Canon Store
// ─────────────────────────────────────────────────────────────────────
//! The canon: an immutable, ordered set of constraint entries that
//! drafts are checked against.
//!
//! Entries are loaded from JSON (bundled default, a file, or an inline
//! string), validated once, and pre-tokenised so that lookups are pure
//! in-memory scans with no I/O.

use std::collections::HashSet;
use std::fmt;
use std::ops::Range;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use canon_types::{CanonError, CanonResult};

use crate::similarity::{tokenize, Token};

/// Canon shipped with the crate, used by `CanonSource::Default`.
pub const DEFAULT_CANON_JSON: &str = include_str!("../canon/default_canon.json");

/// What an entry looks for in a draft.
///
/// Serialized externally tagged: `{"keyword": "contradict"}` or
/// `{"phrase": "the opposite is true"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonPattern {
    /// A single word; also matches words it is a prefix of.
    Keyword(String),
    /// A contiguous sequence of words, matched exactly.
    Phrase(String),
}

impl CanonPattern {
    fn raw(&self) -> &str {
        match self {
            Self::Keyword(s) | Self::Phrase(s) => s,
        }
    }
}

/// A single canon constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonEntry {
    pub id: String,
    pub pattern: CanonPattern,
    /// Contribution to τ when matched. Zero marks a reference-only entry.
    pub weight: f64,
    /// Text substituted for matched spans on the correction path.
    /// Without one, the whole sentence containing the match is struck.
    #[serde(default)]
    pub replacement: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(skip)]
    terms: Vec<String>,
}

impl CanonEntry {
    pub fn new(id: impl Into<String>, pattern: CanonPattern, weight: f64) -> Self {
        Self {
            id: id.into(),
            pattern,
            weight,
            replacement: None,
            category: None,
            terms: Vec::new(),
        }
    }

    pub fn with_replacement(mut self, replacement: impl Into<String>) -> Self {
        self.replacement = Some(replacement.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Entry counts towards τ.
    pub fn flags_violation(&self) -> bool {
        self.weight > 0.0
    }

    /// Validate and pre-tokenise the pattern.
    fn compile(&mut self) -> CanonResult<()> {
        if self.id.trim().is_empty() {
            return Err(CanonError::CanonLoad("entry with empty id".to_string()));
        }
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(CanonError::CanonLoad(format!(
                "entry '{}': weight must be finite and >= 0, got {}",
                self.id, self.weight
            )));
        }
        let terms: Vec<String> = tokenize(self.pattern.raw())
            .into_iter()
            .map(|t| t.norm)
            .collect();
        if terms.is_empty() {
            return Err(CanonError::CanonLoad(format!(
                "entry '{}': pattern has no words",
                self.id
            )));
        }
        if matches!(self.pattern, CanonPattern::Keyword(_)) && terms.len() > 1 {
            return Err(CanonError::CanonLoad(format!(
                "entry '{}': keyword must be a single word, use a phrase for '{}'",
                self.id,
                self.pattern.raw()
            )));
        }
        self.terms = terms;
        Ok(())
    }

    /// Byte spans in the tokenised text where this entry matches.
    pub fn find_spans(&self, tokens: &[Token]) -> Vec<Range<usize>> {
        match self.pattern {
            CanonPattern::Keyword(_) => {
                let Some(keyword) = self.terms.first() else {
                    return Vec::new();
                };
                tokens
                    .iter()
                    .filter(|t| t.norm.starts_with(keyword.as_str()))
                    .map(Token::span)
                    .collect()
            }
            CanonPattern::Phrase(_) => {
                let n = self.terms.len();
                if n == 0 || tokens.len() < n {
                    return Vec::new();
                }
                tokens
                    .windows(n)
                    .filter(|w| w.iter().zip(&self.terms).all(|(t, term)| t.norm == *term))
                    .map(|w| w[0].start..w[n - 1].end)
                    .collect()
            }
        }
    }

    /// Boolean match against tokenised text.
    pub fn matches(&self, tokens: &[Token]) -> bool {
        match self.pattern {
            CanonPattern::Keyword(_) => self
                .terms
                .first()
                .is_some_and(|k| tokens.iter().any(|t| t.norm.starts_with(k.as_str()))),
            CanonPattern::Phrase(_) => !self.find_spans(tokens).is_empty(),
        }
    }
}

/// Where `Canon::load` reads from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CanonSource {
    /// The canon bundled with the crate.
    #[default]
    Default,
    /// A JSON file on disk.
    Path(PathBuf),
    /// An inline JSON document.
    Json(String),
}

impl fmt::Display for CanonSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("<bundled default canon>"),
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::Json(_) => f.write_str("<inline json>"),
        }
    }
}

#[derive(Deserialize)]
struct CanonDocument {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    entries: Vec<CanonEntry>,
}

/// Loaded canon. Immutable once built.
#[derive(Debug, Clone)]
pub struct Canon {
    name: String,
    version: Option<String>,
    entries: Vec<CanonEntry>,
}

impl Canon {
    /// Read, parse and validate a canon.
    ///
    /// Fails with `CanonError::CanonLoad` when the source is missing,
    /// blank, malformed, or holds an invalid entry. A document with an
    /// empty `entries` list is valid.
    pub fn load(source: &CanonSource) -> CanonResult<Self> {
        let text = match source {
            CanonSource::Default => DEFAULT_CANON_JSON.to_string(),
            CanonSource::Path(path) => std::fs::read_to_string(path).map_err(|e| {
                CanonError::CanonLoad(format!("cannot read {}: {e}", path.display()))
            })?,
            CanonSource::Json(json) => json.clone(),
        };
        Self::from_json(&text).map_err(|e| match e {
            CanonError::CanonLoad(msg) => CanonError::CanonLoad(format!("{source}: {msg}")),
            other => other,
        })
    }

    /// Parse a canon from a JSON document.
    pub fn from_json(json: &str) -> CanonResult<Self> {
        if json.trim().is_empty() {
            return Err(CanonError::CanonLoad("canon source is empty".to_string()));
        }
        let doc: CanonDocument = serde_json::from_str(json)
            .map_err(|e| CanonError::CanonLoad(format!("JSON parse error: {e}")))?;
        let name = doc.name.unwrap_or_else(|| "unnamed".to_string());
        let mut canon = Self::from_entries(name, doc.entries)?;
        canon.version = doc.version;
        Ok(canon)
    }

    /// Build a canon from entries, validating each one.
    pub fn from_entries(name: impl Into<String>, entries: Vec<CanonEntry>) -> CanonResult<Self> {
        let mut seen = HashSet::with_capacity(entries.len());
        let mut compiled = Vec::with_capacity(entries.len());
        for mut entry in entries {
            entry.compile()?;
            if !seen.insert(entry.id.clone()) {
                return Err(CanonError::CanonLoad(format!(
                    "duplicate entry id '{}'",
                    entry.id
                )));
            }
            compiled.push(entry);
        }
        Ok(Self {
            name: name.into(),
            version: None,
            entries: compiled,
        })
    }

    /// Entries matching `text`, in canon order.
    pub fn lookup(&self, text: &str) -> Vec<&CanonEntry> {
        self.lookup_tokens(&tokenize(text))
    }

    /// As [`Canon::lookup`], for text that is already tokenised.
    pub fn lookup_tokens(&self, tokens: &[Token]) -> Vec<&CanonEntry> {
        if tokens.is_empty() {
            return Vec::new();
        }
        self.entries.iter().filter(|e| e.matches(tokens)).collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn entries(&self) -> &[CanonEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn ids<'a>(entries: &[&'a CanonEntry]) -> Vec<&'a str> {
        entries.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_default_canon_loads() {
        let canon = Canon::load(&CanonSource::Default).unwrap();
        assert_eq!(canon.name(), "quantara-default");
        assert_eq!(canon.version(), Some("1"));
        assert!(!canon.is_empty());
    }

    #[test]
    fn test_keyword_stem_match() {
        let canon = Canon::load(&CanonSource::Default).unwrap();
        let hits = canon.lookup("This contradicts what I said.");
        assert_eq!(ids(&hits), ["contradiction.self"]);
    }

    #[test]
    fn test_phrase_match_case_insensitive() {
        let canon = Canon::load(&CanonSource::Default).unwrap();
        let hits = canon.lookup("Well, EVERYONE knows that.");
        assert_eq!(ids(&hits), ["unsupported.everyone_knows"]);
        assert!(canon.lookup("everyone probably knows").is_empty());
    }

    #[test]
    fn test_lookup_order_is_insertion_order() {
        let canon = Canon::from_entries(
            "t",
            vec![
                CanonEntry::new("z", CanonPattern::Keyword("beta".into()), 0.1),
                CanonEntry::new("a", CanonPattern::Keyword("alpha".into()), 0.1),
            ],
        )
        .unwrap();
        let hits = canon.lookup("alpha beta");
        assert_eq!(ids(&hits), ["z", "a"]);
    }

    #[test]
    fn test_lookup_empty_text() {
        let canon = Canon::load(&CanonSource::Default).unwrap();
        assert!(canon.lookup("").is_empty());
    }

    #[test]
    fn test_find_spans() {
        let entry = {
            let canon = Canon::from_entries(
                "t",
                vec![CanonEntry::new("p", CanonPattern::Phrase("trust me".into()), 0.2)],
            )
            .unwrap();
            canon.entries()[0].clone()
        };
        let text = "Trust me, just trust   me.";
        let spans = entry.find_spans(&tokenize(text));
        assert_eq!(spans.len(), 2);
        assert_eq!(&text[spans[0].clone()], "Trust me");
        assert_eq!(&text[spans[1].clone()], "trust   me");
    }

    #[test]
    fn test_empty_entries_is_valid() {
        let canon = Canon::load(&CanonSource::Json(r#"{"entries": []}"#.into())).unwrap();
        assert!(canon.is_empty());
        assert_eq!(canon.name(), "unnamed");
    }

    #[test]
    fn test_blank_source_rejected() {
        let err = Canon::load(&CanonSource::Json("   ".into())).unwrap_err();
        assert!(matches!(err, CanonError::CanonLoad(_)));
    }

    #[test]
    fn test_malformed_source_rejected() {
        let err = Canon::load(&CanonSource::Json("{\"entries\": [".into())).unwrap_err();
        assert!(err.to_string().contains("JSON parse error"));
    }

    #[test]
    fn test_missing_file_rejected() {
        let path = PathBuf::from("/nonexistent/canon-kernel/canon.json");
        let err = Canon::load(&CanonSource::Path(path)).unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("canon-test-{}.json", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"name": "file", "entries": [{{"id": "k", "pattern": {{"keyword": "bad"}}, "weight": 0.5}}]}}"#
        )
        .unwrap();
        drop(file);
        let canon = Canon::load(&CanonSource::Path(path.clone())).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(canon.name(), "file");
        assert_eq!(canon.len(), 1);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let err = Canon::from_entries(
            "t",
            vec![
                CanonEntry::new("dup", CanonPattern::Keyword("a".into()), 0.1),
                CanonEntry::new("dup", CanonPattern::Keyword("b".into()), 0.1),
            ],
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_invalid_entries_rejected() {
        let bad = [
            CanonEntry::new("", CanonPattern::Keyword("a".into()), 0.1),
            CanonEntry::new("neg", CanonPattern::Keyword("a".into()), -0.1),
            CanonEntry::new("nan", CanonPattern::Keyword("a".into()), f64::NAN),
            CanonEntry::new("blank", CanonPattern::Phrase("  ,, ".into()), 0.1),
            CanonEntry::new("multi", CanonPattern::Keyword("two words".into()), 0.1),
        ];
        for entry in bad {
            assert!(Canon::from_entries("t", vec![entry]).is_err());
        }
    }

    #[test]
    fn test_zero_weight_is_reference_only() {
        let canon = Canon::load(&CanonSource::Default).unwrap();
        let hits = canon.lookup("I am not sure about that");
        assert_eq!(hits.len(), 1);
        assert!(!hits[0].flags_violation());
    }
}
