// ============================================================================
// COUNTDOWN.RS - Countdown State Machine
// ============================================================================
//
// The controller owns all timing state; the UI owns the clock. The UI calls
// `tick` once per second for the run it started and stops rescheduling as
// soon as a tick returns anything but `Continue`.
//
// TIMELINE (total = 3 seconds):
//
//   start()  -> shows 00:02
//   tick()   -> shows 00:01
//   tick()   -> zero_reached(), shows 00:00
//   tick()   -> shows 00:03 again, Finished
//
// Every value from total-1 down to 0 is shown exactly once.
// ============================================================================

use tracing::{debug, info};

use crate::format::format_mmss;

/// Receives what the countdown wants shown and when it reaches zero.
pub trait CountdownHooks {
    fn show(&mut self, text: &str);
    fn zero_reached(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownState {
    /// Never started, or the last run completed.
    Idle,
    Running { remaining: u64 },
    /// The last run was cut short by a reset.
    Stopped,
}

/// Identifies one run; ticks carrying an older id are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Schedule the next tick.
    Continue,
    /// The run reached zero and the display was restored.
    Finished,
    /// The tick belongs to a run that is no longer active.
    Cancelled,
}

pub struct Countdown {
    total_seconds: u64,
    state: CountdownState,
    run: u64,
}

impl Countdown {
    pub fn new(total_seconds: u64) -> Self {
        Self {
            total_seconds,
            state: CountdownState::Idle,
            run: 0,
        }
    }

    pub fn from_minutes(minutes: u64) -> Self {
        Self::new(minutes.saturating_mul(60))
    }

    pub fn total_seconds(&self) -> u64 {
        self.total_seconds
    }

    pub fn state(&self) -> CountdownState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, CountdownState::Running { .. })
    }

    /// Seconds currently on display.
    pub fn shown_seconds(&self) -> u64 {
        match self.state {
            CountdownState::Running { remaining } => remaining,
            CountdownState::Idle | CountdownState::Stopped => self.total_seconds,
        }
    }

    pub fn display(&self) -> String {
        format_mmss(self.shown_seconds())
    }

    /// Begin a run. Returns `None` if a run is already in progress (the
    /// press is ignored) or there is nothing to count down.
    pub fn start(&mut self, hooks: &mut impl CountdownHooks) -> Option<RunId> {
        if self.is_running() {
            debug!(event = "countdown.start_ignored", reason = "already_running");
            return None;
        }
        if self.total_seconds == 0 {
            debug!(event = "countdown.start_ignored", reason = "zero_duration");
            return None;
        }

        self.run += 1;
        info!(
            event = "countdown.started",
            run = self.run,
            total_seconds = self.total_seconds
        );
        self.enter(self.total_seconds - 1, hooks);
        Some(RunId(self.run))
    }

    /// Advance the given run by one second.
    pub fn tick(&mut self, run: RunId, hooks: &mut impl CountdownHooks) -> TickOutcome {
        let CountdownState::Running { remaining } = self.state else {
            return TickOutcome::Cancelled;
        };
        if run.0 != self.run {
            return TickOutcome::Cancelled;
        }

        if remaining == 0 {
            self.state = CountdownState::Idle;
            hooks.show(&format_mmss(self.total_seconds));
            info!(event = "countdown.finished", run = self.run);
            return TickOutcome::Finished;
        }

        self.enter(remaining - 1, hooks);
        TickOutcome::Continue
    }

    /// Stop any run and show the full duration again.
    pub fn reset(&mut self, hooks: &mut impl CountdownHooks) {
        if self.is_running() {
            self.state = CountdownState::Stopped;
            info!(event = "countdown.reset", run = self.run);
        }
        hooks.show(&format_mmss(self.total_seconds));
    }

    fn enter(&mut self, remaining: u64, hooks: &mut impl CountdownHooks) {
        self.state = CountdownState::Running { remaining };
        if remaining == 0 {
            hooks.zero_reached();
        }
        hooks.show(&format_mmss(remaining));
    }
}

// ============================================================================
// UNIT TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        shown: Vec<String>,
        zero_hits: usize,
        /// Index into `shown` at the moment zero was reached
        zero_at: Option<usize>,
    }

    impl CountdownHooks for Recorder {
        fn show(&mut self, text: &str) {
            self.shown.push(text.to_string());
        }

        fn zero_reached(&mut self) {
            self.zero_hits += 1;
            self.zero_at = Some(self.shown.len());
        }
    }

    fn run_to_end(countdown: &mut Countdown, hooks: &mut Recorder) -> usize {
        let run = countdown.start(hooks).unwrap();
        let mut ticks = 0;
        while countdown.tick(run, hooks) == TickOutcome::Continue {
            ticks += 1;
        }
        ticks
    }

    #[test]
    fn test_full_run_visits_every_second_once() {
        let minutes = 2;
        let total = minutes * 60;
        let mut countdown = Countdown::from_minutes(minutes);
        let mut hooks = Recorder::default();

        run_to_end(&mut countdown, &mut hooks);

        let expected: Vec<String> = (0..total)
            .rev()
            .map(format_mmss)
            .chain(std::iter::once(format_mmss(total)))
            .collect();
        assert_eq!(hooks.shown, expected);
        assert_eq!(hooks.zero_hits, 1);
        assert_eq!(countdown.state(), CountdownState::Idle);
        assert_eq!(countdown.display(), "02:00");
    }

    #[test]
    fn test_zero_actions_fire_before_zero_is_shown() {
        let mut countdown = Countdown::new(3);
        let mut hooks = Recorder::default();

        run_to_end(&mut countdown, &mut hooks);

        assert_eq!(hooks.shown, ["00:02", "00:01", "00:00", "00:03"]);
        assert_eq!(hooks.zero_at, Some(2));
    }

    #[test]
    fn test_one_second_run_reaches_zero_on_start() {
        let mut countdown = Countdown::new(1);
        let mut hooks = Recorder::default();

        let run = countdown.start(&mut hooks).unwrap();
        assert_eq!(hooks.zero_hits, 1);
        assert_eq!(hooks.shown, ["00:00"]);

        assert_eq!(countdown.tick(run, &mut hooks), TickOutcome::Finished);
        assert_eq!(hooks.shown, ["00:00", "00:01"]);
    }

    #[test]
    fn test_reset_halts_run() {
        let mut countdown = Countdown::from_minutes(1);
        let mut hooks = Recorder::default();

        let run = countdown.start(&mut hooks).unwrap();
        countdown.tick(run, &mut hooks);
        countdown.reset(&mut hooks);

        assert_eq!(hooks.shown.last().unwrap(), "01:00");
        assert_eq!(countdown.state(), CountdownState::Stopped);
        assert!(!countdown.is_running());

        let shown_before = hooks.shown.len();
        assert_eq!(countdown.tick(run, &mut hooks), TickOutcome::Cancelled);
        assert_eq!(hooks.shown.len(), shown_before);
        assert_eq!(hooks.zero_hits, 0);
        assert_eq!(countdown.display(), "01:00");
    }

    #[test]
    fn test_reset_before_start_keeps_full_time() {
        let mut countdown = Countdown::from_minutes(25);
        let mut hooks = Recorder::default();

        countdown.reset(&mut hooks);

        assert_eq!(hooks.shown, ["25:00"]);
        assert_eq!(countdown.state(), CountdownState::Idle);
        assert_eq!(countdown.display(), "25:00");
    }

    #[test]
    fn test_start_while_running_is_ignored() {
        let mut countdown = Countdown::new(10);
        let mut hooks = Recorder::default();

        let run = countdown.start(&mut hooks).unwrap();
        countdown.tick(run, &mut hooks);
        assert!(countdown.start(&mut hooks).is_none());

        assert_eq!(hooks.shown, ["00:09", "00:08"]);
        assert_eq!(countdown.shown_seconds(), 8);
    }

    #[test]
    fn test_stale_ticks_after_restart_are_cancelled() {
        let mut countdown = Countdown::new(10);
        let mut hooks = Recorder::default();

        let first = countdown.start(&mut hooks).unwrap();
        countdown.reset(&mut hooks);
        let second = countdown.start(&mut hooks).unwrap();
        assert_ne!(first, second);

        assert_eq!(countdown.tick(first, &mut hooks), TickOutcome::Cancelled);
        assert_eq!(countdown.shown_seconds(), 9);
        assert_eq!(countdown.tick(second, &mut hooks), TickOutcome::Continue);
        assert_eq!(countdown.shown_seconds(), 8);
    }

    #[test]
    fn test_zero_duration_cannot_start() {
        let mut countdown = Countdown::from_minutes(0);
        let mut hooks = Recorder::default();

        assert!(countdown.start(&mut hooks).is_none());
        assert!(hooks.shown.is_empty());
        assert_eq!(countdown.display(), "00:00");
    }

    #[test]
    fn test_shown_seconds_stays_within_total() {
        let mut countdown = Countdown::new(5);
        let mut hooks = Recorder::default();
        let run = countdown.start(&mut hooks).unwrap();
        loop {
            assert!(countdown.shown_seconds() <= countdown.total_seconds());
            if countdown.tick(run, &mut hooks) != TickOutcome::Continue {
                break;
            }
        }
        assert_eq!(countdown.shown_seconds(), 5);
    }
}
