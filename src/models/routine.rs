use serde::{Deserialize, Serialize};

use super::time_of_day::TimeOfDay;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
        }
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Frequency::Daily
    }
}

/// A routine as handed to us by the routine data source. The core never
/// creates or persists these; it reads them and, on a confirmed
/// verification success, flips `is_done` through the store.
///
/// Schedule fields stay raw strings: malformed times must degrade at
/// evaluation time (to "no window"), never fail deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Routine {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub is_done: bool,
    #[serde(default)]
    pub is_failed: bool,
}

impl Routine {
    /// Parsed view of the daily window. Unparsable fields come back `None`.
    pub fn schedule(&self) -> Schedule {
        Schedule {
            start: self.start_time.as_deref().and_then(TimeOfDay::parse),
            end: self.end_time.as_deref().and_then(TimeOfDay::parse),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub start: Option<TimeOfDay>,
    pub end: Option<TimeOfDay>,
}

impl Schedule {
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}
