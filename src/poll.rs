use leptos::logging::warn;
use leptos::prelude::*;
use std::time::Duration;

use crate::config::STATUS_REFRESH;
use crate::status::{Clock, ContestWindow, StatusInfo, SystemClock};

/// Status of the contest window, re-evaluated every [`STATUS_REFRESH`] for as long as the calling
/// view stays mounted. `None` until the window is known.
pub fn use_contest_status(window: Signal<Option<ContestWindow>>) -> Signal<Option<StatusInfo>> {
    use_contest_status_with(window, SystemClock, STATUS_REFRESH)
}

pub fn use_contest_status_with<C>(
    window: Signal<Option<ContestWindow>>,
    clock: C,
    period: Duration,
) -> Signal<Option<StatusInfo>>
where
    C: Clock + Send + Sync + 'static,
{
    let tick = RwSignal::new(0u64);

    // Effects only run in the browser, so the interval never starts during server rendering.
    // The interval is cleared when the owning view is torn down.
    Effect::new(move || {
        match set_interval_with_handle(
            move || {
                advance(tick);
            },
            period,
        ) {
            Ok(handle) => on_cleanup(move || handle.clear()),
            Err(e) => warn!("Could not start the contest status timer: {:?}", e),
        }
    });

    contest_status(window, clock, tick)
}

/// Status of `window` read from `clock`. The clock is consulted again only when `tick` or the
/// window changes.
pub fn contest_status<C>(
    window: Signal<Option<ContestWindow>>,
    clock: C,
    tick: RwSignal<u64>,
) -> Signal<Option<StatusInfo>>
where
    C: Clock + Send + Sync + 'static,
{
    Memo::new(move |_| {
        tick.track();
        window.get().map(|w| w.evaluate_with(&clock))
    })
    .into()
}

/// Bumps the tick. Returns false once the view owning it is gone.
fn advance(tick: RwSignal<u64>) -> bool {
    tick.try_update(|t| *t += 1).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::ContestStatus;
    use chrono::{DateTime, Utc};
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct StepClock(Arc<Mutex<DateTime<Utc>>>);

    impl StepClock {
        fn at(s: &str) -> Self {
            StepClock(Arc::new(Mutex::new(t(s))))
        }

        fn set(&self, s: &str) {
            *self.0.lock().unwrap() = t(s);
        }
    }

    impl Clock for StepClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    fn t(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn winter_cup() -> ContestWindow {
        ContestWindow::new(t("2025-01-01T00:00:00Z"), t("2025-01-01T02:00:00Z"))
    }

    #[test]
    fn test_status_follows_ticks() {
        let owner = Owner::new();
        owner.set();

        let clock = StepClock::at("2024-12-31T23:59:59Z");
        let tick = RwSignal::new(0u64);
        let window = RwSignal::new(Some(winter_cup()));
        let status = contest_status(window.into(), clock.clone(), tick);

        let current = || status.get_untracked().map(|s| (s.status, s.active));
        assert_eq!(current(), Some((ContestStatus::Upcoming, false)));

        // Time alone does not change what the view shows until the next tick.
        clock.set("2025-01-01T00:00:00Z");
        assert_eq!(current(), Some((ContestStatus::Upcoming, false)));
        assert!(advance(tick));
        assert_eq!(current(), Some((ContestStatus::Ongoing, true)));

        clock.set("2025-01-01T02:00:01Z");
        assert!(advance(tick));
        assert_eq!(current(), Some((ContestStatus::Completed, false)));
    }

    #[test]
    fn test_status_unknown_without_window() {
        let owner = Owner::new();
        owner.set();

        let tick = RwSignal::new(0u64);
        let window = RwSignal::new(None::<ContestWindow>);
        let status = contest_status(window.into(), StepClock::at("2025-01-01T01:00:00Z"), tick);
        assert_eq!(status.get_untracked(), None);

        window.set(Some(winter_cup()));
        assert_eq!(
            status.get_untracked().map(|s| s.status),
            Some(ContestStatus::Ongoing)
        );
    }

    #[test]
    fn test_advance_stops_after_dispose() {
        let owner = Owner::new();
        owner.set();

        let tick = RwSignal::new(0u64);
        assert!(advance(tick));
        assert_eq!(tick.get_untracked(), 1);
        tick.dispose();
        assert!(!advance(tick));
    }
}
