// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Canon Kernel Metric Types
// ─────────────────────────────────────────────────────────────────────

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lower bound of every metric.
pub const METRIC_MIN: f64 = 0.0;
/// Upper bound of every metric.
pub const METRIC_MAX: f64 = 1.0;

/// Clamp a value to [lo, hi], mapping NaN to lo and Inf to nearest bound.
#[inline]
pub fn clamp_score(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() {
        log::warn!("clamp_score: NaN detected, clamping to {lo:.4}");
        return lo;
    }
    if value.is_infinite() {
        let boundary = if value > 0.0 { hi } else { lo };
        log::warn!("clamp_score: Inf detected, clamping to {boundary:.4}");
        return boundary;
    }
    value.clamp(lo, hi)
}

/// Per-turn scalars, all in [0, 1].
///
/// - `kappa`: coherence of the draft with the conversation (higher is better).
/// - `tau`: tension from matched canon entries (higher is worse).
/// - `sigma`: acceptability, `clamp(kappa - tau)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub kappa: f64,
    pub tau: f64,
    pub sigma: f64,
}

impl Metrics {
    /// Build metrics from κ and τ; Σ is always derived, never supplied.
    pub fn new(kappa: f64, tau: f64) -> Self {
        let kappa = clamp_score(kappa, METRIC_MIN, METRIC_MAX);
        let tau = clamp_score(tau, METRIC_MIN, METRIC_MAX);
        Self {
            kappa,
            tau,
            sigma: Self::sigma_of(kappa, tau),
        }
    }

    /// Σ as a function of κ and τ only.
    ///
    /// Non-decreasing in κ and non-increasing in τ over the whole range.
    #[inline]
    pub fn sigma_of(kappa: f64, tau: f64) -> f64 {
        clamp_score(kappa - tau, METRIC_MIN, METRIC_MAX)
    }

    /// κ = min, τ = max, Σ = min. Used for empty drafts.
    pub fn worst_case() -> Self {
        Self::new(METRIC_MIN, METRIC_MAX)
    }

    /// τ has reached the top of the scale.
    pub fn tau_saturated(&self) -> bool {
        self.tau >= METRIC_MAX
    }
}

/// Per-call diagnostics returned alongside the final reply.
///
/// Every field has a default so partial records coming from callers
/// deserialize cleanly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Diagnostics {
    pub kappa: f64,
    pub tau: f64,
    pub sigma: f64,
    pub cycle_detected: bool,
    pub zero_return: bool,
}

impl Diagnostics {
    pub fn new(metrics: Metrics, cycle_detected: bool, zero_return: bool) -> Self {
        Self {
            kappa: metrics.kappa,
            tau: metrics.tau,
            sigma: metrics.sigma,
            cycle_detected,
            zero_return,
        }
    }

    pub fn metrics(&self) -> Metrics {
        Metrics {
            kappa: self.kappa,
            tau: self.tau,
            sigma: self.sigma,
        }
    }
}

/// One-line console summary: `κ: … | τ: … | Σ: …` plus flags when set.
impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "κ: {:.4} | τ: {:.4} | Σ: {:.4}",
            self.kappa, self.tau, self.sigma
        )?;
        if self.cycle_detected {
            f.write_str(" | cycle_detected = TRUE")?;
        }
        if self.zero_return {
            f.write_str(" | zero_return triggered")?;
        }
        Ok(())
    }
}
