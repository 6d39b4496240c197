// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Corrector
// ─────────────────────────────────────────────────────────────────────
//! Rewrites drafts that failed judgment, or gives up with a zero-return.
//!
//! The correction path edits the draft sentence by sentence against
//! the canon entries it tripped: spans of entries carrying a
//! `replacement` are substituted, sentences tripped by entries without
//! one are struck, everything else is kept verbatim. Whitespace is
//! only tidied where text was removed.
//!
//! The fallback path yields a [`ZeroReturn`]. It only resolves to a
//! fixed message and has no way back into [`Corrector::correct`], so a
//! fallback reply is never corrected again.

use std::fmt;
use std::ops::Range;

use canon_types::{KernelConfig, Metrics, TurnContext, TurnRecord};

use crate::canon::{Canon, CanonEntry};
use crate::cycle::CycleDetector;
use crate::similarity::{split_sentences, tokenize};

/// Why no confident correction was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    CycleDetected,
    EmptyDraft,
    TensionSaturated,
    /// Judgment failed on coherence alone; no weighted entry to edit by.
    NoApplicableEntries,
    /// The preceding turns were all corrected already.
    CorrectionStreak,
    /// The rewrite was empty, still tripped the canon, or repeated a recent reply.
    RewriteRejected,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CycleDetected => "cycle_detected",
            Self::EmptyDraft => "empty_draft",
            Self::TensionSaturated => "tension_saturated",
            Self::NoApplicableEntries => "no_applicable_entries",
            Self::CorrectionStreak => "correction_streak",
            Self::RewriteRejected => "rewrite_rejected",
        };
        f.write_str(s)
    }
}

/// Terminal fallback outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZeroReturn {
    reason: FallbackReason,
}

impl ZeroReturn {
    pub fn new(reason: FallbackReason) -> Self {
        Self { reason }
    }

    pub fn reason(&self) -> FallbackReason {
        self.reason
    }

    /// The fixed reply for this fallback.
    ///
    /// Cycles get `cycle_break_message`, everything else
    /// `fallback_message`. If the draft is that exact text the other
    /// message is used, so the reply never equals the draft.
    pub fn reply(&self, config: &KernelConfig, draft: &str) -> String {
        let (primary, alternate) = match self.reason {
            FallbackReason::CycleDetected => {
                (&config.cycle_break_message, &config.fallback_message)
            }
            _ => (&config.fallback_message, &config.cycle_break_message),
        };
        if primary == draft {
            alternate.clone()
        } else {
            primary.clone()
        }
    }
}

/// Result of [`Corrector::correct`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Correction {
    Rewritten(String),
    ZeroReturn(ZeroReturn),
}

impl Correction {
    /// Resolve to `(final_reply, zero_return)`.
    pub fn into_reply(self, config: &KernelConfig, draft: &str) -> (String, bool) {
        match self {
            Self::Rewritten(text) => (text, false),
            Self::ZeroReturn(z) => (z.reply(config, draft), true),
        }
    }
}

pub struct Corrector<'a> {
    config: &'a KernelConfig,
    canon: &'a Canon,
}

impl<'a> Corrector<'a> {
    pub fn new(config: &'a KernelConfig, canon: &'a Canon) -> Self {
        Self { config, canon }
    }

    /// Produce a replacement for a draft that was not accepted.
    pub fn correct(&self, ctx: &TurnContext, metrics: &Metrics) -> Correction {
        match self.try_rewrite(ctx, metrics) {
            Ok(text) => Correction::Rewritten(text),
            Err(reason) => {
                log::warn!("correction abandoned: {reason}");
                Correction::ZeroReturn(ZeroReturn::new(reason))
            }
        }
    }

    fn try_rewrite(&self, ctx: &TurnContext, metrics: &Metrics) -> Result<String, FallbackReason> {
        if ctx.draft_is_empty() {
            return Err(FallbackReason::EmptyDraft);
        }
        if metrics.tau_saturated() {
            return Err(FallbackReason::TensionSaturated);
        }

        let streak = self.config.max_consecutive_corrections;
        let recent = ctx.recent(streak);
        if recent.len() == streak && recent.iter().all(|t| self.was_rewritten(t)) {
            return Err(FallbackReason::CorrectionStreak);
        }

        let tokens = tokenize(&ctx.draft);
        let violations: Vec<&CanonEntry> = self
            .canon
            .lookup_tokens(&tokens)
            .into_iter()
            .filter(|e| e.flags_violation())
            .collect();
        if violations.is_empty() {
            return Err(FallbackReason::NoApplicableEntries);
        }

        let rewritten = rewrite(&ctx.draft, &violations);
        if rewritten.trim().is_empty() {
            return Err(FallbackReason::RewriteRejected);
        }
        if self
            .canon
            .lookup(&rewritten)
            .iter()
            .any(|e| e.flags_violation())
        {
            return Err(FallbackReason::RewriteRejected);
        }
        if CycleDetector::new(self.config).is_repeat(&rewritten, &ctx.history) {
            return Err(FallbackReason::RewriteRejected);
        }

        log::debug!(
            "rewrote draft against {} canon entr{}",
            violations.len(),
            if violations.len() == 1 { "y" } else { "ies" }
        );
        Ok(rewritten)
    }

    /// The turn's draft was rewritten, not accepted and not replaced
    /// by a fallback message.
    fn was_rewritten(&self, turn: &TurnRecord) -> bool {
        turn.was_corrected()
            && turn.assistant_canon != self.config.fallback_message
            && turn.assistant_canon != self.config.cycle_break_message
    }
}

/// Apply `entries` to `draft` sentence by sentence.
fn rewrite(draft: &str, entries: &[&CanonEntry]) -> String {
    let mut out = String::with_capacity(draft.len());
    let mut struck = false;

    for span in split_sentences(draft) {
        let sentence = &draft[span];
        let tokens = tokenize(sentence);

        if entries
            .iter()
            .any(|e| e.replacement.is_none() && e.matches(&tokens))
        {
            struck = true;
            continue;
        }

        let mut edits: Vec<(Range<usize>, &str)> = Vec::new();
        for entry in entries {
            if let Some(replacement) = entry.replacement.as_deref() {
                for range in entry.find_spans(&tokens) {
                    edits.push((range, replacement));
                }
            }
        }
        let edited = apply_edits(sentence, edits);
        // Leading sentences were struck: drop the gap they leave.
        if struck && out.is_empty() {
            out.push_str(edited.trim_start());
        } else {
            out.push_str(&edited);
        }
    }
    out
}

/// Replace non-overlapping ranges; the earliest-starting edit wins a clash.
///
/// An empty replacement also swallows the blanks after it when the
/// text before already ends in whitespace.
fn apply_edits(text: &str, mut edits: Vec<(Range<usize>, &str)>) -> String {
    if edits.is_empty() {
        return text.to_string();
    }
    edits.sort_by_key(|(range, _)| range.start);

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for (range, replacement) in edits {
        if range.start < cursor {
            continue;
        }
        out.push_str(&text[cursor..range.start]);
        let replacement = match_leading_case(&text[range.clone()], replacement);
        cursor = range.end;
        if replacement.is_empty() && (out.is_empty() || out.ends_with(char::is_whitespace)) {
            let rest = &text[cursor..];
            cursor += rest.len() - rest.trim_start_matches(&[' ', '\t'][..]).len();
        }
        out.push_str(&replacement);
    }
    out.push_str(&text[cursor..]);
    out
}

/// Capitalise `replacement` when the text it replaces starts uppercase.
fn match_leading_case(original: &str, replacement: &str) -> String {
    let upper = original.chars().next().is_some_and(char::is_uppercase);
    let mut chars = replacement.chars();
    match chars.next() {
        Some(first) if upper => first.to_uppercase().chain(chars).collect(),
        _ => replacement.to_string(),
    }
}
