// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Canon Kernel (Facade)
// ─────────────────────────────────────────────────────────────────────
//! The one surface callers use: load a canon, then `respond` per turn.
//!
//! Each `respond` call runs a fixed sequence and keeps no state:
//!
//! ```text
//! START → METRICS_COMPUTED → CYCLE_CHECKED → JUDGED
//!       → { ACCEPTED | CORRECTED | FALLBACK } → RETURNED
//! ```
//!
//! The loaded canon sits behind a `parking_lot::RwLock` as an
//! `Arc<Canon>`. `respond` only holds the read lock long enough to clone
//! the `Arc`, so calls for different sessions run concurrently.

use std::sync::Arc;

use parking_lot::RwLock;

use canon_types::{
    CanonError, CanonResult, Diagnostics, KernelConfig, KernelResponse, Metrics, TurnContext,
};

use crate::canon::{Canon, CanonSource};
use crate::corrector::{Correction, Corrector, FallbackReason, ZeroReturn};
use crate::cycle::CycleDetector;
use crate::evaluator::MetricEvaluator;

/// Per-turn verdict. Only observable through the reply and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Judgment {
    Accept,
    Correct,
    Fallback,
}

impl Judgment {
    fn decide(config: &KernelConfig, metrics: &Metrics, cycle_detected: bool) -> Self {
        if cycle_detected {
            Self::Fallback
        } else if metrics.sigma >= config.accept_threshold {
            Self::Accept
        } else {
            Self::Correct
        }
    }
}

/// Response-coherence correction kernel.
pub struct CanonKernel {
    config: KernelConfig,
    canon: RwLock<Option<Arc<Canon>>>,
}

impl Default for CanonKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl CanonKernel {
    /// Kernel with default configuration and no canon loaded.
    pub fn new() -> Self {
        Self {
            config: KernelConfig::default(),
            canon: RwLock::new(None),
        }
    }

    /// Kernel with a validated custom configuration.
    pub fn with_config(config: KernelConfig) -> CanonResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            canon: RwLock::new(None),
        })
    }

    /// Load the bundled default canon.
    pub fn load_canon(&self) -> CanonResult<()> {
        self.load_canon_from(&CanonSource::Default)
    }

    /// Load a canon, replacing any previous one.
    ///
    /// The canon is fully built before the swap. On failure the
    /// previously loaded canon, if any, stays in place.
    pub fn load_canon_from(&self, source: &CanonSource) -> CanonResult<()> {
        let canon = Canon::load(source).map_err(|e| {
            log::error!("canon load failed: {e}");
            e
        })?;
        log::info!(
            "loaded canon '{}' ({} entries) from {source}",
            canon.name(),
            canon.len()
        );
        *self.canon.write() = Some(Arc::new(canon));
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.canon.read().is_some()
    }

    /// Snapshot of the current canon.
    pub fn canon(&self) -> Option<Arc<Canon>> {
        self.canon.read().clone()
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Judge a draft and return the final reply with diagnostics.
    ///
    /// Fails only with `KernelNotReady`; poor or empty drafts are
    /// expressed through the reply and metrics.
    pub fn respond(&self, ctx: &TurnContext) -> CanonResult<KernelResponse> {
        let canon = self.canon().ok_or(CanonError::KernelNotReady)?;
        Ok(self.respond_with(&canon, ctx))
    }

    fn respond_with(&self, canon: &Canon, ctx: &TurnContext) -> KernelResponse {
        let config = &self.config;

        let metrics = MetricEvaluator::new(config, canon).evaluate(ctx);
        let cycle_detected = CycleDetector::new(config).detect(ctx);
        let judgment = Judgment::decide(config, &metrics, cycle_detected);

        let (final_reply, zero_return) = match judgment {
            Judgment::Accept => (ctx.draft.clone(), false),
            Judgment::Correct => {
                Corrector::new(config, canon)
                    .correct(ctx, &metrics)
                    .into_reply(config, &ctx.draft)
            }
            Judgment::Fallback => {
                log::warn!("cycle detected, substituting zero-return reply");
                Correction::ZeroReturn(ZeroReturn::new(FallbackReason::CycleDetected))
                    .into_reply(config, &ctx.draft)
            }
        };

        let diagnostics = Diagnostics::new(metrics, cycle_detected, zero_return);
        log::info!("{judgment:?}: {diagnostics}");
        KernelResponse {
            final_reply,
            diagnostics,
        }
    }
}
