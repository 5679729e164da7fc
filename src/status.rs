use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a contest sits relative to the current instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContestStatus {
    Upcoming,
    Ongoing,
    Completed,
}

impl ContestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContestStatus::Upcoming => "upcoming",
            ContestStatus::Ongoing => "ongoing",
            ContestStatus::Completed => "completed",
        }
    }

    /// Capitalised form used on badges.
    pub fn label(&self) -> &'static str {
        match self {
            ContestStatus::Upcoming => "Upcoming",
            ContestStatus::Ongoing => "Ongoing",
            ContestStatus::Completed => "Completed",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            ContestStatus::Upcoming => "blue",
            ContestStatus::Ongoing => "green",
            ContestStatus::Completed => "red",
        }
    }

    /// Caption of the button a registered participant uses to enter the contest.
    pub fn entry_caption(&self) -> &'static str {
        match self {
            ContestStatus::Upcoming => "Olympiad Not Started",
            ContestStatus::Ongoing => "Enter Olympiad",
            ContestStatus::Completed => "Olympiad Ended",
        }
    }

    /// Registration stays open until the contest window has closed.
    pub fn accepts_registration(&self) -> bool {
        *self != ContestStatus::Completed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInfo {
    pub status: ContestStatus,
    /// True only while the contest is ongoing. Submission and entry are gated on this.
    pub active: bool,
}

/// Whether a participant may enter the contest or submit to it. An unknown status never does.
pub fn accepts_submissions(status: Option<StatusInfo>) -> bool {
    status.is_some_and(|s| s.active)
}

/// Whether the register action is offered. It closes with the contest window.
pub fn accepts_registration(status: Option<StatusInfo>) -> bool {
    status.is_some_and(|s| s.status.accepts_registration())
}

/// Derives the status of a contest window at `now`. Both boundaries count as ongoing.
///
/// `start <= end` is assumed. The result depends on nothing but the three arguments.
pub fn evaluate(now: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> StatusInfo {
    let status = if now < start {
        ContestStatus::Upcoming
    } else if now <= end {
        ContestStatus::Ongoing
    } else {
        ContestStatus::Completed
    };
    StatusInfo {
        status,
        active: status == ContestStatus::Ongoing,
    }
}

/// The start and end of a contest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContestWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ContestWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        ContestWindow { start, end }
    }

    pub fn evaluate_at(&self, now: DateTime<Utc>) -> StatusInfo {
        evaluate(now, self.start, self.end)
    }

    /// Evaluates against the given clock. All wall-clock reads for status go through here.
    pub fn evaluate_with(&self, clock: &impl Clock) -> StatusInfo {
        self.evaluate_at(clock.now())
    }

    /// Length of the window in whole minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Source of the current instant for status evaluation.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// The local wall clock. Skew against the server is not corrected.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_gating_follows_status() {
        let window = ContestWindow::new(ts("2025-01-01T00:00:00Z"), ts("2025-01-01T02:00:00Z"));
        let before = Some(window.evaluate_at(ts("2024-12-31T23:59:59Z")));
        let during = Some(window.evaluate_at(ts("2025-01-01T01:00:00Z")));
        let at_end = Some(window.evaluate_at(ts("2025-01-01T02:00:00Z")));
        let after = Some(window.evaluate_at(ts("2025-01-01T02:00:01Z")));

        assert!(!accepts_submissions(before));
        assert!(accepts_submissions(during));
        assert!(accepts_submissions(at_end));
        assert!(!accepts_submissions(after));
        assert!(!accepts_submissions(None));

        assert!(accepts_registration(before));
        assert!(accepts_registration(during));
        assert!(!accepts_registration(after));
        assert!(!accepts_registration(None));
    }

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn window() -> ContestWindow {
        ContestWindow::new(ts("2025-01-01T00:00:00Z"), ts("2025-01-01T02:00:00Z"))
    }

    #[test]
    fn test_before_start_is_upcoming() {
        let w = window();
        for offset in [1, 59, 3600, 86_400 * 30] {
            let info = w.evaluate_at(w.start - Duration::seconds(offset));
            assert_eq!(info.status, ContestStatus::Upcoming);
            assert!(!info.active);
        }
    }

    #[test]
    fn test_inside_window_is_ongoing() {
        let w = window();
        for offset in [0, 1, 3599, 7199, 7200] {
            let info = w.evaluate_at(w.start + Duration::seconds(offset));
            assert_eq!(info.status, ContestStatus::Ongoing);
            assert!(info.active);
        }
    }

    #[test]
    fn test_after_end_is_completed() {
        let w = window();
        for offset in [1, 60, 86_400] {
            let info = w.evaluate_at(w.end + Duration::seconds(offset));
            assert_eq!(info.status, ContestStatus::Completed);
            assert!(!info.active);
        }
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let w = window();
        assert_eq!(w.evaluate_at(w.start).status, ContestStatus::Ongoing);
        assert_eq!(w.evaluate_at(w.end).status, ContestStatus::Ongoing);
        assert_eq!(
            w.evaluate_at(w.start - Duration::milliseconds(1)).status,
            ContestStatus::Upcoming
        );
        assert_eq!(
            w.evaluate_at(w.end + Duration::milliseconds(1)).status,
            ContestStatus::Completed
        );
    }

    #[test]
    fn test_zero_length_window() {
        let at = ts("2025-06-01T12:00:00Z");
        let info = evaluate(at, at, at);
        assert_eq!(info.status, ContestStatus::Ongoing);
        assert!(info.active);
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let now = ts("2025-01-01T01:30:00Z");
        let first = evaluate(now, window().start, window().end);
        let second = evaluate(now, window().start, window().end);
        assert_eq!(first, second);
    }

    #[test]
    fn test_scenarios() {
        let w = window();
        assert_eq!(
            w.evaluate_at(ts("2025-01-01T01:00:00Z")),
            StatusInfo {
                status: ContestStatus::Ongoing,
                active: true
            }
        );
        assert_eq!(
            w.evaluate_at(ts("2024-12-31T23:59:59Z")),
            StatusInfo {
                status: ContestStatus::Upcoming,
                active: false
            }
        );
        assert_eq!(
            w.evaluate_at(ts("2025-01-01T02:00:01Z")),
            StatusInfo {
                status: ContestStatus::Completed,
                active: false
            }
        );
    }

    #[test]
    fn test_evaluate_with_clock() {
        let w = window();
        let clock = FixedClock(ts("2025-01-01T00:00:00Z"));
        assert!(w.evaluate_with(&clock).active);
    }

    #[test]
    fn test_presentation_helpers() {
        assert_eq!(ContestStatus::Upcoming.entry_caption(), "Olympiad Not Started");
        assert_eq!(ContestStatus::Ongoing.entry_caption(), "Enter Olympiad");
        assert_eq!(ContestStatus::Completed.entry_caption(), "Olympiad Ended");
        assert_eq!(ContestStatus::Ongoing.label(), "Ongoing");
        assert_eq!(ContestStatus::Completed.color(), "red");
        assert!(ContestStatus::Upcoming.accepts_registration());
        assert!(!ContestStatus::Completed.accepts_registration());
        assert_eq!(window().duration_minutes(), 120);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&ContestStatus::Ongoing).unwrap();
        assert_eq!(json, "\"ongoing\"");
        assert_eq!(ContestStatus::Upcoming.as_str(), "upcoming");
    }
}
