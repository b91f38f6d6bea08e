pub mod engine;
pub mod monitor;
pub mod urgency;

pub use engine::{badge_label, derive_state, DisplayState, StatusSnapshot};
pub use monitor::StatusMonitor;
pub use urgency::UrgencyTier;
