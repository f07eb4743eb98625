// Countdown - Session timer state machine
// Owns minutes:seconds and the one-second tick schedule

use std::time::{Duration, Instant};

/// Result of a tick transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Tick arrived while the timer was idle (ignored)
    Idle,
    /// Normal countdown step
    Ticked,
    /// Countdown reached zero; the timer has reset to its default
    Completed,
}

impl TickOutcome {
    /// Check if this tick ended the session
    pub fn is_completed(&self) -> bool {
        matches!(self, TickOutcome::Completed)
    }
}

/// Countdown timer
/// Two live states (idle, running); completion is transient — it is reported
/// once via `TickOutcome::Completed` and the timer immediately resets to the
/// default duration, stopped.
#[derive(Debug, Clone)]
pub struct CountdownTimer {
    minutes: u32,
    seconds: u32,
    running: bool,
}

impl CountdownTimer {
    /// Default session length in minutes
    pub const DEFAULT_MINUTES: u32 = 25;

    /// Shortest session a duration edit can dial in
    pub const MIN_MINUTES: u32 = 1;

    /// Longest session a duration edit can dial in
    pub const MAX_MINUTES: u32 = 120;

    /// Create a timer at the default duration, stopped
    pub fn new() -> Self {
        Self {
            minutes: Self::DEFAULT_MINUTES,
            seconds: 0,
            running: false,
        }
    }

    /// Begin counting down. No-op while already running.
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Halt the countdown, keeping the remaining time. Idempotent.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Advance the countdown by one second
    /// Ticks while idle are ignored (stale ticks after a stop are harmless).
    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }

        if self.seconds == 0 {
            if self.minutes == 0 {
                self.reset();
                return TickOutcome::Completed;
            }
            self.minutes -= 1;
            self.seconds = 59;
        } else {
            self.seconds -= 1;
        }

        TickOutcome::Ticked
    }

    /// Set the session length in whole minutes, clamped to
    /// [MIN_MINUTES, MAX_MINUTES]; seconds reset to zero.
    /// Ignored while running — callers gate on state, so this is a silent no-op.
    pub fn set_duration(&mut self, minutes: u32) {
        if self.running {
            return;
        }
        self.minutes = minutes.clamp(Self::MIN_MINUTES, Self::MAX_MINUTES);
        self.seconds = 0;
    }

    /// Back to the default duration, stopped
    pub fn reset(&mut self) {
        self.minutes = Self::DEFAULT_MINUTES;
        self.seconds = 0;
        self.running = false;
    }

    /// Whole minutes remaining
    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    /// Seconds remaining within the current minute
    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    /// Remaining time as (minutes, seconds)
    pub fn remaining(&self) -> (u32, u32) {
        (self.minutes, self.seconds)
    }

    /// Check if the countdown is running
    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl Default for CountdownTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Poll-driven one-second tick source
/// A single deadline is armed at a time, so a stop/start cycle can never leave
/// two tick schedules alive; cancelling drops the pending tick outright.
#[derive(Debug, Clone, Copy)]
pub struct SecondTicker {
    next_due: Option<Instant>,
}

impl SecondTicker {
    /// Tick period (one wall-clock second)
    pub const PERIOD: Duration = Duration::from_secs(1);

    /// Create a disarmed ticker
    pub fn new() -> Self {
        Self { next_due: None }
    }

    /// Arm the ticker; the first tick lands one period after `now`
    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + Self::PERIOD);
    }

    /// Disarm the ticker and drop any pending tick
    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    /// Check if a deadline is armed
    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// Number of whole periods elapsed since the last poll
    /// A late poll returns every missed tick so wall-clock accuracy is kept
    /// even when the caller stalls.
    pub fn poll(&mut self, now: Instant) -> u32 {
        let Some(mut due) = self.next_due else {
            return 0;
        };

        let mut ticks = 0;
        while now >= due {
            ticks += 1;
            due += Self::PERIOD;
        }

        self.next_due = Some(due);
        ticks
    }

    /// Time until the next tick (for scheduling a repaint); None when disarmed
    pub fn time_to_next(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }
}

impl Default for SecondTicker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let timer = CountdownTimer::new();
        assert_eq!(timer.remaining(), (25, 0));
        assert!(!timer.is_running());
    }

    #[test]
    fn test_set_duration_all_valid_minutes() {
        let mut timer = CountdownTimer::new();
        for m in 1..=120 {
            timer.set_duration(m);
            assert_eq!(timer.remaining(), (m, 0));
        }
    }

    #[test]
    fn test_set_duration_clamps() {
        let mut timer = CountdownTimer::new();

        timer.set_duration(0);
        assert_eq!(timer.minutes(), 1);

        timer.set_duration(500);
        assert_eq!(timer.minutes(), 120);
    }

    #[test]
    fn test_set_duration_resets_seconds() {
        let mut timer = CountdownTimer::new();
        timer.start();
        timer.tick(); // (24, 59)
        timer.stop();

        timer.set_duration(10);
        assert_eq!(timer.remaining(), (10, 0));
    }

    #[test]
    fn test_set_duration_ignored_while_running() {
        let mut timer = CountdownTimer::new();
        timer.start();
        timer.tick(); // (24, 59)

        timer.set_duration(5);
        assert_eq!(timer.remaining(), (24, 59));
        assert!(timer.is_running());
    }

    #[test]
    fn test_tick_decrements_seconds() {
        let mut timer = CountdownTimer::new();
        timer.set_duration(10);
        timer.start();
        timer.tick(); // (9, 59)

        assert_eq!(timer.tick(), TickOutcome::Ticked);
        assert_eq!(timer.remaining(), (9, 58));
    }

    #[test]
    fn test_tick_borrows_a_minute() {
        let mut timer = CountdownTimer::new();
        timer.set_duration(10);
        timer.start();

        assert_eq!(timer.tick(), TickOutcome::Ticked);
        assert_eq!(timer.remaining(), (9, 59));
    }

    #[test]
    fn test_tick_completes_and_resets() {
        let mut timer = CountdownTimer::new();
        timer.set_duration(1);
        timer.start();

        // 1:00 -> 0:59 -> ... -> 0:00 is 60 ticks
        for _ in 0..60 {
            assert_eq!(timer.tick(), TickOutcome::Ticked);
        }
        assert_eq!(timer.remaining(), (0, 0));

        // The tick at 0:00 completes the session
        let outcome = timer.tick();
        assert!(outcome.is_completed());
        assert_eq!(timer.remaining(), (25, 0));
        assert!(!timer.is_running());
    }

    #[test]
    fn test_tick_ignored_while_idle() {
        let mut timer = CountdownTimer::new();
        assert_eq!(timer.tick(), TickOutcome::Idle);
        assert_eq!(timer.remaining(), (25, 0));
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut timer = CountdownTimer::new();
        timer.stop();
        timer.stop();
        assert!(!timer.is_running());

        timer.start();
        timer.stop();
        assert!(!timer.is_running());
    }

    #[test]
    fn test_ticker_first_tick_after_one_period() {
        let t0 = Instant::now();
        let mut ticker = SecondTicker::new();
        ticker.start(t0);

        assert_eq!(ticker.poll(t0 + Duration::from_millis(999)), 0);
        assert_eq!(ticker.poll(t0 + Duration::from_millis(1000)), 1);
    }

    #[test]
    fn test_ticker_catches_up_after_stall() {
        let t0 = Instant::now();
        let mut ticker = SecondTicker::new();
        ticker.start(t0);

        // Caller stalled for 3.5 periods: all three whole ticks arrive at once
        assert_eq!(ticker.poll(t0 + Duration::from_millis(3500)), 3);
        assert_eq!(ticker.poll(t0 + Duration::from_millis(3900)), 0);
        assert_eq!(ticker.poll(t0 + Duration::from_millis(4000)), 1);
    }

    #[test]
    fn test_ticker_cancel_drops_pending() {
        let t0 = Instant::now();
        let mut ticker = SecondTicker::new();
        ticker.start(t0);
        ticker.cancel();

        assert!(!ticker.is_armed());
        assert_eq!(ticker.poll(t0 + Duration::from_secs(5)), 0);
    }

    #[test]
    fn test_stop_start_cycle_yields_single_schedule() {
        let t0 = Instant::now();
        let mut ticker = SecondTicker::new();

        ticker.start(t0);
        // Stop just before the first tick would land, then restart
        ticker.cancel();
        let t_restart = t0 + Duration::from_millis(900);
        ticker.start(t_restart);

        // The old deadline (t0 + 1s) must not fire
        assert_eq!(ticker.poll(t0 + Duration::from_millis(1100)), 0);

        // Exactly one tick per elapsed period from the restart
        assert_eq!(ticker.poll(t_restart + Duration::from_millis(1000)), 1);
        assert_eq!(ticker.poll(t_restart + Duration::from_millis(2000)), 1);
    }

    #[test]
    fn test_ticker_time_to_next() {
        let t0 = Instant::now();
        let mut ticker = SecondTicker::new();
        assert_eq!(ticker.time_to_next(t0), None);

        ticker.start(t0);
        let remaining = ticker.time_to_next(t0 + Duration::from_millis(250));
        assert_eq!(remaining, Some(Duration::from_millis(750)));
    }
}
