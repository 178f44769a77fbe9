use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::domain::{EntryId, WorklogDraft};
use crate::duration::TimeSpent;
use crate::error::ValidationError;

/// Source of one-second ticks for the session timer.
///
/// The timer arms the source when it starts running and disarms it on pause,
/// stop and drop; a disarmed source must not report ticks.
pub trait Ticker {
    fn arm(&mut self);
    fn disarm(&mut self);
    /// Whole ticks elapsed since the last call, while armed.
    fn take_ticks(&mut self) -> u64;
}

/// Wall-clock ticker for interactive use. Partial seconds carry over between polls.
#[derive(Debug, Default)]
pub struct IntervalTicker {
    last: Option<Instant>,
}

impl IntervalTicker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Ticker for IntervalTicker {
    fn arm(&mut self) {
        self.last = Some(Instant::now());
    }

    fn disarm(&mut self) {
        self.last = None;
    }

    fn take_ticks(&mut self) -> u64 {
        let Some(last) = self.last else {
            return 0;
        };
        let ticks = last.elapsed().as_secs();
        self.last = Some(last + Duration::from_secs(ticks));
        ticks
    }
}

/// Virtual ticker; advance it through a [`ManualClock`] handle.
#[derive(Debug)]
pub struct ManualTicker {
    state: Rc<ManualState>,
}

#[derive(Debug, Default)]
struct ManualState {
    armed: Cell<bool>,
    pending: Cell<u64>,
}

#[derive(Debug, Clone)]
pub struct ManualClock {
    state: Rc<ManualState>,
}

impl ManualTicker {
    pub fn new() -> (Self, ManualClock) {
        let state = Rc::new(ManualState::default());
        (
            Self {
                state: Rc::clone(&state),
            },
            ManualClock { state },
        )
    }
}

impl ManualClock {
    /// Lets `seconds` pass. Ticks only accumulate while the ticker is armed.
    pub fn advance(&self, seconds: u64) {
        if self.state.armed.get() {
            self.state.pending.set(self.state.pending.get() + seconds);
        }
    }

    pub fn is_armed(&self) -> bool {
        self.state.armed.get()
    }
}

impl Ticker for ManualTicker {
    fn arm(&mut self) {
        self.state.armed.set(true);
    }

    fn disarm(&mut self) {
        self.state.armed.set(false);
        self.state.pending.set(0);
    }

    fn take_ticks(&mut self) -> u64 {
        self.state.pending.replace(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running,
    Paused,
}

/// A finished stopwatch run, ready to be stored as a worklog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedSession {
    pub entry_id: EntryId,
    pub date: NaiveDate,
    pub seconds: u64,
}

impl From<&CompletedSession> for WorklogDraft {
    fn from(session: &CompletedSession) -> Self {
        WorklogDraft::new(session.date, TimeSpent::from_elapsed(session.seconds))
    }
}

/// Start/pause/stop stopwatch bound to one selected entry.
#[derive(Debug)]
pub struct SessionTimer<T: Ticker> {
    ticker: T,
    state: TimerState,
    selected: Option<EntryId>,
    elapsed_seconds: u64,
    history: Vec<CompletedSession>,
}

impl<T: Ticker> SessionTimer<T> {
    pub fn new(ticker: T) -> Self {
        Self {
            ticker,
            state: TimerState::Idle,
            selected: None,
            elapsed_seconds: 0,
            history: Vec::new(),
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn selected(&self) -> Option<EntryId> {
        self.selected
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    /// Completed sessions, most recent last.
    pub fn history(&self) -> &[CompletedSession] {
        &self.history
    }

    /// Changes the selected task. Ignored while running, and while tracked
    /// seconds are already bound to an entry.
    pub fn select(&mut self, task: Option<EntryId>) -> bool {
        let bound = self.elapsed_seconds > 0 && self.selected.is_some();
        if self.state == TimerState::Running || bound {
            return false;
        }
        self.selected = task;
        true
    }

    /// Starts or resumes. `task` replaces the selection when given; without
    /// any selection the timer stays where it is.
    pub fn start(&mut self, task: Option<EntryId>) -> Result<(), ValidationError> {
        if self.state == TimerState::Running {
            return Ok(());
        }

        let selected = task.or(self.selected).ok_or(ValidationError::NoTaskSelected)?;
        self.selected = Some(selected);
        self.state = TimerState::Running;
        self.ticker.arm();
        debug!(entry = %selected, elapsed = self.elapsed_seconds, "timer running");
        Ok(())
    }

    /// Folds pending ticks into the elapsed time. Call once per event-loop turn.
    pub fn poll(&mut self) -> u64 {
        if self.state == TimerState::Running {
            self.elapsed_seconds += self.ticker.take_ticks();
        }
        self.elapsed_seconds
    }

    pub fn pause(&mut self) {
        if self.state != TimerState::Running {
            return;
        }

        self.poll();
        self.ticker.disarm();
        self.state = TimerState::Paused;
        debug!(elapsed = self.elapsed_seconds, "timer paused");
    }

    /// Ends the session. A run with time on the clock is returned (and kept in
    /// the history) for `today`; the elapsed time and selection are cleared.
    ///
    /// Time without a selected entry is never dropped: the timer stays paused
    /// with its elapsed seconds until an entry is selected.
    pub fn stop(&mut self, today: NaiveDate) -> Option<CompletedSession> {
        self.poll();
        self.ticker.disarm();

        if self.elapsed_seconds == 0 {
            self.state = TimerState::Idle;
            self.selected = None;
            debug!("timer stopped with nothing recorded");
            return None;
        }

        let Some(entry_id) = self.selected else {
            self.state = TimerState::Paused;
            warn!(elapsed = self.elapsed_seconds, "timer has no entry to record against; kept paused");
            return None;
        };

        let elapsed = std::mem::take(&mut self.elapsed_seconds);
        self.selected = None;
        self.state = TimerState::Idle;
        let session = CompletedSession {
            entry_id,
            date: today,
            seconds: elapsed,
        };
        debug!(entry = %entry_id, seconds = elapsed, "timer session completed");
        self.history.push(session.clone());
        Some(session)
    }
}

impl<T: Ticker> Drop for SessionTimer<T> {
    fn drop(&mut self) {
        self.ticker.disarm();
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{CompletedSession, ManualTicker, SessionTimer, TimerState};
    use crate::domain::{ClockTime, EntryFields, EntryId, WorklogDraft};
    use crate::error::ValidationError;
    use crate::store::EntryStore;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    #[test]
    fn start_without_a_task_keeps_the_timer_idle() {
        let (ticker, clock) = ManualTicker::new();
        let mut timer = SessionTimer::new(ticker);

        assert_eq!(timer.start(None), Err(ValidationError::NoTaskSelected));
        assert_eq!(timer.state(), TimerState::Idle);
        assert!(!clock.is_armed());
    }

    #[test]
    fn counts_only_while_running() {
        let (ticker, clock) = ManualTicker::new();
        let mut timer = SessionTimer::new(ticker);

        clock.advance(5);
        timer.start(Some(EntryId(1))).unwrap();
        clock.advance(3);
        assert_eq!(timer.poll(), 3);

        clock.advance(2);
        timer.pause();
        assert_eq!(timer.state(), TimerState::Paused);
        assert!(!clock.is_armed());
        clock.advance(60);
        assert_eq!(timer.poll(), 5);

        timer.start(None).unwrap();
        clock.advance(4);
        assert_eq!(timer.poll(), 9);
    }

    #[test]
    fn pause_when_not_running_is_a_no_op() {
        let (ticker, _clock) = ManualTicker::new();
        let mut timer = SessionTimer::new(ticker);
        timer.pause();
        assert_eq!(timer.state(), TimerState::Idle);
    }

    #[test]
    fn stop_with_zero_elapsed_emits_nothing() {
        let (ticker, _clock) = ManualTicker::new();
        let mut timer = SessionTimer::new(ticker);
        timer.start(Some(EntryId(1))).unwrap();

        assert_eq!(timer.stop(today()), None);
        assert_eq!(timer.state(), TimerState::Idle);
        assert!(timer.history().is_empty());
    }

    #[test]
    fn stop_emits_the_session_and_resets() {
        let (ticker, clock) = ManualTicker::new();
        let mut timer = SessionTimer::new(ticker);
        timer.start(Some(EntryId(2))).unwrap();
        clock.advance(90);
        timer.pause();

        let session = timer.stop(today());
        let expected = CompletedSession {
            entry_id: EntryId(2),
            date: today(),
            seconds: 90,
        };
        assert_eq!(session, Some(expected.clone()));
        assert_eq!(timer.elapsed_seconds(), 0);
        assert_eq!(timer.selected(), None);
        assert_eq!(timer.history(), &[expected]);
        assert!(!clock.is_armed());
    }

    #[test]
    fn selection_is_locked_while_running() {
        let (ticker, _clock) = ManualTicker::new();
        let mut timer = SessionTimer::new(ticker);
        assert!(timer.select(Some(EntryId(1))));
        timer.start(None).unwrap();
        assert!(!timer.select(Some(EntryId(2))));
        assert_eq!(timer.selected(), Some(EntryId(1)));
    }

    #[test]
    fn paused_time_survives_a_cleared_selection() {
        let (ticker, clock) = ManualTicker::new();
        let mut timer = SessionTimer::new(ticker);
        timer.start(Some(EntryId(1))).unwrap();
        clock.advance(600);
        timer.pause();

        assert!(!timer.select(None));
        assert!(!timer.select(Some(EntryId(2))));
        assert_eq!(timer.selected(), Some(EntryId(1)));
        assert_eq!(timer.start(None), Ok(()));
        timer.pause();

        let session = timer.stop(today()).expect("paused time should be recorded");
        assert_eq!(session.entry_id, EntryId(1));
        assert_eq!(session.seconds, 600);
        assert_eq!(timer.elapsed_seconds(), 0);
    }

    #[test]
    fn selection_is_free_again_after_stop() {
        let (ticker, clock) = ManualTicker::new();
        let mut timer = SessionTimer::new(ticker);
        timer.start(Some(EntryId(1))).unwrap();
        clock.advance(30);
        timer.stop(today()).unwrap();

        assert!(timer.select(Some(EntryId(2))));
        assert_eq!(timer.selected(), Some(EntryId(2)));
    }

    #[test]
    fn dropping_the_timer_disarms_the_tick_source() {
        let (ticker, clock) = ManualTicker::new();
        let mut timer = SessionTimer::new(ticker);
        timer.start(Some(EntryId(1))).unwrap();
        assert!(clock.is_armed());

        drop(timer);
        assert!(!clock.is_armed());
    }

    #[test]
    fn completed_session_lands_as_todays_worklog() {
        let mut store = EntryStore::new();
        let id = store
            .add(EntryFields::new(
                "Task 1",
                today(),
                ClockTime::new(9, 0).unwrap(),
                ClockTime::new(10, 0).unwrap(),
            ))
            .unwrap()
            .id;

        let (ticker, clock) = ManualTicker::new();
        let mut timer = SessionTimer::new(ticker);
        timer.start(Some(id)).unwrap();
        clock.advance(125);
        let session = timer.stop(today()).unwrap();

        let entry = store
            .append_or_replace_worklog(session.entry_id, WorklogDraft::from(&session))
            .unwrap();
        assert_eq!(entry.worklogs.len(), 1);
        assert_eq!(entry.worklogs[0].date, today());
        assert_eq!(entry.worklogs[0].duration_seconds, 125);
    }
}
