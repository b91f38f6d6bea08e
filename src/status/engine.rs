use std::time::Duration;

use chrono::NaiveTime;
use serde::Serialize;

use crate::models::{Frequency, Routine, Schedule, TimeOfDay};

use super::urgency::UrgencyTier;

/// Derived status of a routine at one evaluation instant. Exactly one
/// variant holds per evaluation; the precedence rules live in
/// `derive_state` and nowhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DisplayState {
    Pending,
    Upcoming { starts: TimeOfDay },
    Active { remaining: Duration },
    Failed,
    Completed,
}

/// Pure derivation of a routine's display state from its daily window,
/// its externally-owned flags, and the current time of day. First match
/// wins:
///
/// 1. `is_done`: Completed, beating a concurrently forced failure.
/// 2. `is_failed`: forced failure overrides any time comparison.
/// 3. No parseable window at all: Pending (always actionable).
/// 4. Before today's start: Upcoming.
/// 5. At or before today's end: Active with a countdown. Both window
///    boundaries are inclusive of Active. A missing start with a present
///    end means the window has been open since midnight.
/// 6. Past today's end: Failed.
/// 7. Start-only window at or past its start: Pending, actionable with
///    no deadline, so it can never fail by time.
///
/// Malformed time strings parse to `None` upstream and flow through
/// rules 3/7; this function never panics and has no error path.
pub fn derive_state(
    schedule: Schedule,
    is_done: bool,
    is_failed: bool,
    now: NaiveTime,
) -> DisplayState {
    if is_done {
        return DisplayState::Completed;
    }
    if is_failed {
        return DisplayState::Failed;
    }
    if schedule.is_empty() {
        return DisplayState::Pending;
    }
    if let Some(starts) = schedule.start {
        if now < starts.to_naive() {
            return DisplayState::Upcoming { starts };
        }
    }
    if let Some(end) = schedule.end {
        let end = end.to_naive();
        if now <= end {
            let remaining = end
                .signed_duration_since(now)
                .to_std()
                .unwrap_or_default();
            return DisplayState::Active { remaining };
        }
        return DisplayState::Failed;
    }
    DisplayState::Pending
}

impl DisplayState {
    pub fn label(&self) -> String {
        match self {
            DisplayState::Pending => "Pending".into(),
            DisplayState::Upcoming { starts } => format!("Starts {starts}"),
            DisplayState::Active { remaining } => countdown_label(*remaining),
            DisplayState::Failed => "Failed".into(),
            DisplayState::Completed => "Completed".into(),
        }
    }

}

/// Badge text for a routine row. Countdown/state labels win; a Pending
/// routine has no countdown to show, so its badge falls back to the
/// frequency label.
pub fn badge_label(state: &DisplayState, frequency: Frequency) -> String {
    match state {
        DisplayState::Pending => frequency.label().to_string(),
        other => other.label(),
    }
}

/// Remaining time rounded up to whole minutes.
fn remaining_minutes(remaining: Duration) -> u64 {
    (remaining.as_secs() + 59) / 60
}

fn countdown_label(remaining: Duration) -> String {
    let minutes = remaining_minutes(remaining);
    if minutes == 0 {
        // Never show a zero countdown while the window is still open.
        return "1 Min".into();
    }
    if minutes < 60 {
        format!("{minutes} Min")
    } else {
        format!("{} Hours", minutes / 60)
    }
}

/// Everything the presentation layer needs for one routine row, derived
/// in one shot so a single tick produces a single consistent value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub routine_id: String,
    pub state: DisplayState,
    pub label: String,
    pub badge: String,
    pub urgency: UrgencyTier,
}

impl StatusSnapshot {
    pub fn derive(routine: &Routine, now: NaiveTime) -> Self {
        let state = derive_state(routine.schedule(), routine.is_done, routine.is_failed, now);
        Self {
            routine_id: routine.id.clone(),
            label: state.label(),
            badge: badge_label(&state, routine.frequency),
            urgency: UrgencyTier::for_state(&state),
            state,
        }
    }

    /// Fallback for a routine the store no longer knows about.
    pub fn placeholder(routine_id: &str) -> Self {
        Self {
            routine_id: routine_id.to_string(),
            state: DisplayState::Pending,
            label: "Pending".into(),
            badge: "Pending".into(),
            urgency: UrgencyTier::Calm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Routine;

    fn at(raw: &str) -> NaiveTime {
        TimeOfDay::parse(raw).unwrap().to_naive()
    }

    fn routine(start: Option<&str>, end: Option<&str>, is_done: bool, is_failed: bool) -> Routine {
        Routine {
            id: "r-1".into(),
            title: "Morning run".into(),
            frequency: Frequency::Daily,
            start_time: start.map(Into::into),
            end_time: end.map(Into::into),
            is_done,
            is_failed,
        }
    }

    fn derive(routine: &Routine, now: &str) -> DisplayState {
        derive_state(routine.schedule(), routine.is_done, routine.is_failed, at(now))
    }

    #[test]
    fn forced_failure_overrides_schedule() {
        // Mid-window, not done, but externally failed.
        let r = routine(Some("09:00"), Some("10:30"), false, true);
        assert_eq!(derive(&r, "09:30"), DisplayState::Failed);
        // Even with no schedule at all.
        let r = routine(None, None, false, true);
        assert_eq!(derive(&r, "12:00"), DisplayState::Failed);
    }

    #[test]
    fn no_schedule_is_always_pending() {
        let r = routine(None, None, false, false);
        for now in ["00:00", "09:00", "23:59:59"] {
            assert_eq!(derive(&r, now), DisplayState::Pending);
        }
    }

    #[test]
    fn upcoming_boundary_is_inclusive_of_active() {
        let r = routine(Some("09:00"), Some("10:30"), false, false);
        let before = derive(&r, "08:59:59");
        assert_eq!(
            before,
            DisplayState::Upcoming {
                starts: TimeOfDay::new(9, 0).unwrap()
            }
        );
        assert_eq!(before.label(), "Starts 09:00");
        assert!(matches!(derive(&r, "09:00:00"), DisplayState::Active { .. }));
    }

    #[test]
    fn failure_boundary_is_inclusive_of_active() {
        let r = routine(Some("09:00"), Some("10:00"), false, false);
        assert!(matches!(derive(&r, "10:00:00"), DisplayState::Active { .. }));
        assert_eq!(derive(&r, "10:00:01"), DisplayState::Failed);
    }

    #[test]
    fn countdown_label_formatting() {
        let forty_five = Duration::from_secs(45 * 60);
        assert_eq!((DisplayState::Active { remaining: forty_five }).label(), "45 Min");

        let ninety = Duration::from_secs(90 * 60);
        assert_eq!((DisplayState::Active { remaining: ninety }).label(), "1 Hours");

        let zero = Duration::ZERO;
        assert_eq!((DisplayState::Active { remaining: zero }).label(), "1 Min");

        let exactly_one_hour = Duration::from_secs(60 * 60);
        assert_eq!((DisplayState::Active { remaining: exactly_one_hour }).label(), "1 Hours");
    }

    #[test]
    fn completion_beats_elapsed_window_and_forced_failure() {
        // Far past the end time.
        let r = routine(Some("09:00"), Some("10:00"), true, false);
        assert_eq!(derive(&r, "18:00"), DisplayState::Completed);
        // Done and force-failed at once: Completed wins.
        let r = routine(Some("09:00"), Some("10:00"), true, true);
        assert_eq!(derive(&r, "18:00"), DisplayState::Completed);
    }

    #[test]
    fn malformed_times_degrade_to_pending() {
        let r = routine(Some("9 o'clock"), Some("later"), false, false);
        assert_eq!(derive(&r, "12:00"), DisplayState::Pending);
    }

    #[test]
    fn start_only_schedule_never_fails_by_time() {
        let r = routine(Some("09:00"), None, false, false);
        assert!(matches!(derive(&r, "08:00"), DisplayState::Upcoming { .. }));
        assert_eq!(derive(&r, "09:00"), DisplayState::Pending);
        assert_eq!(derive(&r, "23:59"), DisplayState::Pending);
    }

    #[test]
    fn end_only_schedule_is_open_from_midnight() {
        let r = routine(None, Some("10:00"), false, false);
        assert!(matches!(derive(&r, "00:00"), DisplayState::Active { .. }));
        assert_eq!(derive(&r, "10:00:01"), DisplayState::Failed);
    }

    #[test]
    fn snapshot_scenario_nine_forty_five() {
        // startTime 09:00:00, endTime 10:30:00, evaluated at 09:45:00.
        let r = routine(Some("09:00:00"), Some("10:30:00"), false, false);
        let snapshot = StatusSnapshot::derive(&r, at("09:45:00"));
        assert_eq!(
            snapshot.state,
            DisplayState::Active {
                remaining: Duration::from_secs(45 * 60)
            }
        );
        assert_eq!(snapshot.label, "45 Min");
        assert_eq!(snapshot.urgency, UrgencyTier::Critical);
        assert_eq!(snapshot.badge, "45 Min");
    }

    #[test]
    fn pending_badge_falls_back_to_frequency() {
        let mut r = routine(None, None, false, false);
        r.frequency = Frequency::Weekly;
        let snapshot = StatusSnapshot::derive(&r, at("12:00"));
        assert_eq!(snapshot.label, "Pending");
        assert_eq!(snapshot.badge, "Weekly");
    }
}
