// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Canon Kernel Configuration
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::error::{CanonError, CanonResult};

/// Reply substituted when no confident correction exists.
pub const DEFAULT_FALLBACK_MESSAGE: &str =
    "I can't give a reliable answer to that yet. Could you rephrase or add more detail?";

/// Reply substituted when the conversation is looping.
pub const DEFAULT_CYCLE_BREAK_MESSAGE: &str =
    "We seem to be going in circles. Let's step back: what exactly would you like to resolve?";

/// Runtime configuration for the Canon Kernel.
///
/// Every threshold the judgment policy consults lives here so that two
/// kernels built from equal configs and equal canons judge identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Drafts with Σ >= this pass through unchanged. Must be above the
    /// worst-case Σ so that an empty draft is never accepted.
    /// Default: 0.4.
    pub accept_threshold: f64,

    /// Number of prior turns that feed the κ history reference.
    /// Default: 3.
    pub history_window: usize,

    /// Weight of the user-utterance part of κ; the history part gets the rest.
    /// Default: 0.6.
    pub w_user: f64,

    /// Summed canon weight that saturates τ at 1.0.
    /// Default: 1.0.
    pub tau_scale: f64,

    /// Number of recent turns inspected by the cycle detector (K).
    /// Default: 4.
    pub cycle_window: usize,

    /// Jaccard similarity at or above which two replies are near-duplicates.
    /// Default: 0.85.
    pub similarity_threshold: f64,

    /// Consecutive corrected turns after which another correction is refused.
    /// Default: 2.
    pub max_consecutive_corrections: usize,

    /// Zero-return reply for non-cycle fallbacks.
    pub fallback_message: String,

    /// Zero-return reply for detected cycles.
    pub cycle_break_message: String,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            accept_threshold: 0.4,
            history_window: 3,
            w_user: 0.6,
            tau_scale: 1.0,
            cycle_window: 4,
            similarity_threshold: 0.85,
            max_consecutive_corrections: 2,
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_string(),
            cycle_break_message: DEFAULT_CYCLE_BREAK_MESSAGE.to_string(),
        }
    }
}

impl KernelConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> CanonResult<()> {
        if !(self.accept_threshold > 0.0 && self.accept_threshold <= 1.0) {
            return Err(CanonError::Config(format!(
                "accept_threshold must be in (0, 1], got {}",
                self.accept_threshold
            )));
        }
        if self.history_window < 1 {
            return Err(CanonError::Config(format!(
                "history_window must be >= 1, got {}",
                self.history_window
            )));
        }
        if !(0.0..=1.0).contains(&self.w_user) {
            return Err(CanonError::Config(format!(
                "w_user must be in [0, 1], got {}",
                self.w_user
            )));
        }
        if !self.tau_scale.is_finite() || self.tau_scale <= 0.0 {
            return Err(CanonError::Config(format!(
                "tau_scale must be finite and > 0, got {}",
                self.tau_scale
            )));
        }
        if self.cycle_window < 1 {
            return Err(CanonError::Config(format!(
                "cycle_window must be >= 1, got {}",
                self.cycle_window
            )));
        }
        if !(self.similarity_threshold > 0.0 && self.similarity_threshold <= 1.0) {
            return Err(CanonError::Config(format!(
                "similarity_threshold must be in (0, 1], got {}",
                self.similarity_threshold
            )));
        }
        if self.max_consecutive_corrections < 1 {
            return Err(CanonError::Config(format!(
                "max_consecutive_corrections must be >= 1, got {}",
                self.max_consecutive_corrections
            )));
        }
        if self.fallback_message.trim().is_empty() {
            return Err(CanonError::Config(
                "fallback_message must not be empty".to_string(),
            ));
        }
        if self.cycle_break_message.trim().is_empty() {
            return Err(CanonError::Config(
                "cycle_break_message must not be empty".to_string(),
            ));
        }
        if self.cycle_break_message == self.fallback_message {
            return Err(CanonError::Config(
                "cycle_break_message must differ from fallback_message".to_string(),
            ));
        }
        Ok(())
    }

    /// Load from JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> CanonResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| CanonError::Config(format!("JSON parse error: {e}")))
    }
}
