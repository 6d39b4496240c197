// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Cycle Detector
// ─────────────────────────────────────────────────────────────────────
//! Detects looping conversations over a sliding window of the last K
//! final replies.
//!
//! Two independent checks, either of which flags a cycle:
//! - **Repetition**: the draft near-duplicates a recent final reply.
//! - **Oscillation**: the recent final replies ping-pong between two
//!   distinct clusters (A, B, A, B, …).
//!
//! Only the last `cycle_window` turns are ever read, so cost is linear
//! in K regardless of total history length. No state survives a call.

use std::collections::HashSet;

use canon_types::{KernelConfig, TurnContext, TurnRecord};

use crate::similarity::{jaccard, token_set};

/// Fewest window replies that can establish an A/B/A/B pattern.
pub const MIN_OSCILLATION_TURNS: usize = 4;

/// Which check flagged the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePattern {
    /// Draft repeats the final reply `turns_back` turns ago (1 = last turn).
    Repetition { turns_back: usize },
    /// Window replies alternate between two clusters.
    Oscillation,
}

pub struct CycleDetector<'a> {
    config: &'a KernelConfig,
}

impl<'a> CycleDetector<'a> {
    pub fn new(config: &'a KernelConfig) -> Self {
        Self { config }
    }

    pub fn detect(&self, ctx: &TurnContext) -> bool {
        self.classify(ctx).is_some()
    }

    /// Run both checks; repetition wins when both fire.
    pub fn classify(&self, ctx: &TurnContext) -> Option<CyclePattern> {
        let window = ctx.recent(self.config.cycle_window);
        if window.is_empty() {
            return None;
        }
        let finals: Vec<HashSet<String>> = window
            .iter()
            .map(|t| token_set(&t.assistant_canon))
            .collect();

        let draft = token_set(&ctx.draft);
        if let Some(turns_back) = self.repeat_distance(&draft, &finals) {
            log::debug!("cycle: draft repeats final reply {turns_back} turn(s) back");
            return Some(CyclePattern::Repetition { turns_back });
        }

        if self.oscillates(&finals) {
            log::debug!("cycle: final replies oscillate over {} turns", finals.len());
            return Some(CyclePattern::Oscillation);
        }
        None
    }

    /// `text` near-duplicates a final reply in the window.
    pub fn is_repeat(&self, text: &str, history: &[TurnRecord]) -> bool {
        let start = history.len().saturating_sub(self.config.cycle_window);
        let finals: Vec<HashSet<String>> = history[start..]
            .iter()
            .map(|t| token_set(&t.assistant_canon))
            .collect();
        self.repeat_distance(&token_set(text), &finals).is_some()
    }

    fn near_duplicate(&self, a: &HashSet<String>, b: &HashSet<String>) -> bool {
        jaccard(a, b) >= self.config.similarity_threshold
    }

    fn repeat_distance(&self, text: &HashSet<String>, finals: &[HashSet<String>]) -> Option<usize> {
        finals
            .iter()
            .rev()
            .position(|f| self.near_duplicate(text, f))
            .map(|i| i + 1)
    }

    fn oscillates(&self, finals: &[HashSet<String>]) -> bool {
        if finals.len() < MIN_OSCILLATION_TURNS {
            return false;
        }
        if finals.iter().any(HashSet::is_empty) {
            return false;
        }
        if self.near_duplicate(&finals[0], &finals[1]) {
            return false;
        }
        (2..finals.len()).all(|i| self.near_duplicate(&finals[i], &finals[i - 2]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(finals: &[&str]) -> Vec<TurnRecord> {
        finals
            .iter()
            .map(|f| TurnRecord::new("question", *f, *f))
            .collect()
    }

    const X: &str = "The capital of Australia is Canberra, not Sydney.";
    const Y: &str = "Actually the largest city of Australia is Sydney.";

    #[test]
    fn test_empty_history_no_cycle() {
        let config = KernelConfig::default();
        let detector = CycleDetector::new(&config);
        assert!(!detector.detect(&TurnContext::new("hi", Vec::new(), X)));
    }

    #[test]
    fn test_repetition_last_turn() {
        let config = KernelConfig::default();
        let detector = CycleDetector::new(&config);
        let ctx = TurnContext::new("again?", history(&["hello there", X]), X);
        assert_eq!(
            detector.classify(&ctx),
            Some(CyclePattern::Repetition { turns_back: 1 })
        );
    }

    #[test]
    fn test_repetition_ignores_case_and_punctuation() {
        let config = KernelConfig::default();
        let detector = CycleDetector::new(&config);
        let ctx = TurnContext::new(
            "again?",
            history(&[X]),
            "the capital of australia is canberra not sydney",
        );
        assert!(detector.detect(&ctx));
    }

    #[test]
    fn test_alternating_history_with_repeat_draft() {
        let config = KernelConfig::default();
        let detector = CycleDetector::new(&config);
        let ctx = TurnContext::new("which?", history(&[X, Y, X, Y]), X);
        assert!(detector.detect(&ctx));
    }

    #[test]
    fn test_oscillation_with_fresh_draft() {
        let config = KernelConfig::default();
        let detector = CycleDetector::new(&config);
        let ctx = TurnContext::new(
            "which?",
            history(&[X, Y, X, Y]),
            "Let me check an atlas before answering.",
        );
        assert_eq!(detector.classify(&ctx), Some(CyclePattern::Oscillation));
    }

    #[test]
    fn test_short_alternation_not_oscillation() {
        let config = KernelConfig::default();
        let detector = CycleDetector::new(&config);
        let ctx = TurnContext::new("which?", history(&[X, Y, X]), "Something new entirely.");
        assert!(!detector.detect(&ctx));
    }

    #[test]
    fn test_window_limits_lookback() {
        let config = KernelConfig {
            cycle_window: 2,
            ..Default::default()
        };
        let detector = CycleDetector::new(&config);
        // X is three turns back, outside a window of 2.
        let ctx = TurnContext::new("q", history(&[X, "one", "two"]), X);
        assert!(!detector.detect(&ctx));
    }

    #[test]
    fn test_distinct_replies_no_cycle() {
        let config = KernelConfig::default();
        let detector = CycleDetector::new(&config);
        let ctx = TurnContext::new(
            "q",
            history(&["alpha beta", "gamma delta", "epsilon zeta", "eta theta"]),
            "iota kappa",
        );
        assert!(!detector.detect(&ctx));
    }

    #[test]
    fn test_empty_replies_never_duplicate() {
        let config = KernelConfig::default();
        let detector = CycleDetector::new(&config);
        let ctx = TurnContext::new("q", history(&["", "", "", ""]), "");
        assert!(!detector.detect(&ctx));
    }

    #[test]
    fn test_is_repeat() {
        let config = KernelConfig::default();
        let detector = CycleDetector::new(&config);
        let h = history(&[X, Y]);
        assert!(detector.is_repeat(Y, &h));
        assert!(!detector.is_repeat("completely unrelated words", &h));
    }
}
