//! Per-overlay results of best-effort batch toggles.

use std::fmt;

use serde::Serialize;

use crate::overlay::OverlayId;

/// Result of one `set_enabled` attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToggleOutcome {
    pub id: OverlayId,
    pub enabled: bool,
    /// Failure message, `None` on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToggleOutcome {
    pub const fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl fmt::Display for ToggleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = if self.enabled { "enable" } else { "disable" };
        match &self.error {
            None => write!(f, "{action} {}: ok", self.id),
            Some(err) => write!(f, "{action} {}: failed ({err})", self.id),
        }
    }
}

/// Ordered outcomes of one logical operation.
///
/// Toggles are not atomic: a report with failures means the earlier
/// successful toggles stay applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BatchReport {
    outcomes: Vec<ToggleOutcome>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, id: &OverlayId, enabled: bool, error: Option<String>) {
        self.outcomes.push(ToggleOutcome {
            id: id.clone(),
            enabled,
            error,
        });
    }

    pub fn extend(&mut self, other: Self) {
        self.outcomes.extend(other.outcomes);
    }

    pub fn outcomes(&self) -> &[ToggleOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ToggleOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(ToggleOutcome::is_ok)
    }
}
