// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Canon Kernel Core Engine
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Coherence checking, cycle detection and correction of draft replies
//! against a loaded canon.
//!
//! A caller loads a canon once, then hands every draft to
//! [`CanonKernel::respond`] together with the conversation so far. The
//! kernel scores the draft (κ, τ, Σ), checks for looping, and returns
//! either the draft, a canon-constrained rewrite, or a fixed fallback.
//!
//! # Invariants
//!
//! 1. **Σ is monotone**: non-decreasing in κ and non-increasing in τ for
//!    every input, independent of the weights in the canon.
//!
//! 2. **Empty drafts are never accepted**: they score κ=0, τ=1, Σ=0 and
//!    `accept_threshold` is validated to be strictly above 0.
//!
//! 3. **A detected cycle always replaces the draft**: the fallback text
//!    is swapped for its alternate when it equals the draft.
//!
//! 4. **Fallbacks terminate**: a `ZeroReturn` resolves to fixed text and
//!    cannot be routed back into the corrector.
//!
//! 5. **No turn state in the kernel**: history is caller-owned and passed
//!    on every call; the only shared data is the immutable `Arc<Canon>`.

pub mod canon;
pub mod corrector;
pub mod cycle;
pub mod evaluator;
pub mod kernel;
pub mod similarity;

pub use canon::{Canon, CanonEntry, CanonPattern, CanonSource};
pub use corrector::{Correction, Corrector, FallbackReason, ZeroReturn};
pub use cycle::{CycleDetector, CyclePattern};
pub use evaluator::MetricEvaluator;
pub use kernel::CanonKernel;
