// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Metric Evaluator (κ / τ / Σ)
// ─────────────────────────────────────────────────────────────────────
//! Per-turn scalar metrics for a draft reply.
//!
//! - **κ** (coherence): lexical overlap of the draft with the user
//!   utterance and with a bounded window of recent turns.
//! - **τ** (tension): summed weight of canon entries the draft trips,
//!   scaled by `tau_scale` and capped at 1.
//! - **Σ**: `clamp(κ − τ)`, see [`Metrics::sigma_of`].
//!
//! All three live in [0, 1]. An empty draft scores worst-case.

use std::collections::HashSet;

use canon_types::{clamp_score, KernelConfig, Metrics, TurnContext};

use crate::canon::Canon;
use crate::similarity::{overlap, token_set, tokenize, Token};

/// κ component used when its reference text is empty.
pub const NEUTRAL_KAPPA: f64 = 0.5;

/// Stateless evaluator over a borrowed config and canon snapshot.
pub struct MetricEvaluator<'a> {
    config: &'a KernelConfig,
    canon: &'a Canon,
}

impl<'a> MetricEvaluator<'a> {
    pub fn new(config: &'a KernelConfig, canon: &'a Canon) -> Self {
        Self { config, canon }
    }

    /// Compute κ, τ and Σ for the context's draft.
    pub fn evaluate(&self, ctx: &TurnContext) -> Metrics {
        if ctx.draft_is_empty() {
            log::debug!("empty draft, returning worst-case metrics");
            return Metrics::worst_case();
        }
        let tokens = tokenize(&ctx.draft);
        let kappa = self.calculate_coherence(ctx, &tokens);
        let tau = self.calculate_tension(&tokens);
        let metrics = Metrics::new(kappa, tau);
        log::debug!(
            "metrics: kappa={:.4} tau={:.4} sigma={:.4}",
            metrics.kappa,
            metrics.tau,
            metrics.sigma
        );
        metrics
    }

    /// κ = `w_user · κ_user + (1 − w_user) · κ_hist`.
    ///
    /// Each part is [`NEUTRAL_KAPPA`] when its reference is empty, so the
    /// first turn of a conversation is judged on the user utterance alone.
    pub fn calculate_coherence(&self, ctx: &TurnContext, draft_tokens: &[Token]) -> f64 {
        let draft: HashSet<String> = draft_tokens.iter().map(|t| t.norm.clone()).collect();
        if draft.is_empty() {
            return 0.0;
        }

        let user = token_set(&ctx.user);
        let kappa_user = if user.is_empty() {
            NEUTRAL_KAPPA
        } else {
            overlap(&draft, &user)
        };

        let mut window = HashSet::new();
        for turn in ctx.recent(self.config.history_window) {
            window.extend(token_set(&turn.user));
            window.extend(token_set(&turn.assistant_canon));
        }
        let kappa_hist = if window.is_empty() {
            NEUTRAL_KAPPA
        } else {
            overlap(&draft, &window)
        };

        let w = self.config.w_user;
        clamp_score(w * kappa_user + (1.0 - w) * kappa_hist, 0.0, 1.0)
    }

    /// τ = `min(1, Σ weights of matched entries / tau_scale)`; 0 without matches.
    pub fn calculate_tension(&self, draft_tokens: &[Token]) -> f64 {
        let total: f64 = self
            .canon
            .lookup_tokens(draft_tokens)
            .iter()
            .filter(|e| e.flags_violation())
            .map(|e| e.weight)
            .sum();
        clamp_score(total / self.config.tau_scale, 0.0, 1.0)
    }
}
