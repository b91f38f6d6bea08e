use std::fmt;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// A wall-clock time with no date component. Routine windows are expressed
/// as two of these and reapplied against "today" at every evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        Self::with_seconds(hour, minute, 0)
    }

    pub fn with_seconds(hour: u8, minute: u8, second: u8) -> Option<Self> {
        if hour > 23 || minute > 59 || second > 59 {
            return None;
        }
        Some(Self {
            hour,
            minute,
            second,
        })
    }

    /// Parse `"HH:MM"` or `"HH:MM:SS"`. Total: anything malformed yields
    /// `None`, which callers treat the same as an absent schedule field.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.trim().split(':');
        let hour = parts.next()?.parse::<u8>().ok()?;
        let minute = parts.next()?.parse::<u8>().ok()?;
        let second = match parts.next() {
            Some(value) => value.parse::<u8>().ok()?,
            None => 0,
        };
        if parts.next().is_some() {
            return None;
        }
        Self::with_seconds(hour, minute, second)
    }

    pub fn to_naive(self) -> NaiveTime {
        // Fields are range-checked at construction, so this cannot fail.
        NaiveTime::from_hms_opt(self.hour as u32, self.minute as u32, self.second as u32)
            .unwrap_or(NaiveTime::MIN)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hour_minute() {
        let t = TimeOfDay::parse("09:30").unwrap();
        assert_eq!((t.hour, t.minute, t.second), (9, 30, 0));
    }

    #[test]
    fn parses_hour_minute_second() {
        let t = TimeOfDay::parse("23:59:59").unwrap();
        assert_eq!((t.hour, t.minute, t.second), (23, 59, 59));
    }

    #[test]
    fn rejects_malformed_input() {
        for raw in ["", "9", "25:00", "09:61", "09:00:99", "ab:cd", "09:00:00:00"] {
            assert!(TimeOfDay::parse(raw).is_none(), "accepted {raw:?}");
        }
    }

    #[test]
    fn formats_with_leading_zeros() {
        assert_eq!(TimeOfDay::new(9, 5).unwrap().to_string(), "09:05");
    }
}
