// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Canon Kernel Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for all Canon Kernel failures.
///
/// Low-quality or empty drafts are never errors; they surface through
/// metrics and the final reply instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CanonError {
    /// Canon source missing, unreadable, blank, or malformed.
    #[error("canon load error: {0}")]
    CanonLoad(String),

    /// `respond` was called before a canon was successfully loaded.
    #[error("kernel not ready: load_canon() must succeed before respond()")]
    KernelNotReady,

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),
}

pub type CanonResult<T> = Result<T, CanonError>;
