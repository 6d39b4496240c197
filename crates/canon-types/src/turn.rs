// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Canon Kernel Turn Types
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::score::Diagnostics;

/// One completed exchange in caller-owned history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnRecord {
    pub user: String,
    /// Model output before correction.
    pub assistant_raw: String,
    /// Reply actually shown to the user.
    pub assistant_canon: String,
}

impl TurnRecord {
    pub fn new(
        user: impl Into<String>,
        assistant_raw: impl Into<String>,
        assistant_canon: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            assistant_raw: assistant_raw.into(),
            assistant_canon: assistant_canon.into(),
        }
    }

    /// The kernel replaced the raw reply on this turn.
    pub fn was_corrected(&self) -> bool {
        self.assistant_raw != self.assistant_canon
    }
}

/// Input to a single `respond` call. The kernel only borrows it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnContext {
    pub user: String,
    /// Oldest first.
    pub history: Vec<TurnRecord>,
    pub draft: String,
}

impl TurnContext {
    pub fn new(user: impl Into<String>, history: Vec<TurnRecord>, draft: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            history,
            draft: draft.into(),
        }
    }

    /// The last `n` turns, oldest first.
    pub fn recent(&self, n: usize) -> &[TurnRecord] {
        let start = self.history.len().saturating_sub(n);
        &self.history[start..]
    }

    pub fn draft_is_empty(&self) -> bool {
        self.draft.trim().is_empty()
    }
}

/// Output of a `respond` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelResponse {
    pub final_reply: String,
    pub diagnostics: Diagnostics,
}
