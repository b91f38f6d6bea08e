use std::time::Duration;

use serde::Serialize;

use super::engine::DisplayState;

const CRITICAL_WITHIN: Duration = Duration::from_secs(60 * 60);
const WARNING_WITHIN: Duration = Duration::from_secs(7 * 60 * 60);
const ELEVATED_WITHIN: Duration = Duration::from_secs(14 * 60 * 60);
const NORMAL_WITHIN: Duration = Duration::from_secs(20 * 60 * 60);

/// Presentation-only severity bucket for badge coloring. Derived from the
/// display state, independent of the state derivation itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum UrgencyTier {
    Critical,
    Warning,
    Elevated,
    Normal,
    Calm,
}

impl UrgencyTier {
    /// Bucket a remaining duration. Thresholds are inclusive, so a
    /// sub-hour remainder (e.g. 45 minutes) lands in Critical.
    pub fn for_remaining(remaining: Duration) -> Self {
        if remaining <= CRITICAL_WITHIN {
            UrgencyTier::Critical
        } else if remaining <= WARNING_WITHIN {
            UrgencyTier::Warning
        } else if remaining <= ELEVATED_WITHIN {
            UrgencyTier::Elevated
        } else if remaining <= NORMAL_WITHIN {
            UrgencyTier::Normal
        } else {
            UrgencyTier::Calm
        }
    }

    pub fn for_state(state: &DisplayState) -> Self {
        match state {
            DisplayState::Active { remaining } => Self::for_remaining(*remaining),
            DisplayState::Failed => UrgencyTier::Critical,
            DisplayState::Upcoming { .. } | DisplayState::Pending | DisplayState::Completed => {
                UrgencyTier::Calm
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyTier::Critical => "critical",
            UrgencyTier::Warning => "warning",
            UrgencyTier::Elevated => "elevated",
            UrgencyTier::Normal => "normal",
            UrgencyTier::Calm => "calm",
        }
    }
}
