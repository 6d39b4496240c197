// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Canon Kernel Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Type definitions, configuration, and error hierarchy for the
//! Canon Kernel — the coherence-correction gate that sits between a
//! language model's draft reply and the user.

pub mod config;
pub mod error;
pub mod score;
pub mod turn;

pub use config::KernelConfig;
pub use error::{CanonError, CanonResult};
pub use score::{clamp_score, Diagnostics, Metrics};
pub use turn::{KernelResponse, TurnContext, TurnRecord};
