//! Auto-advancing carousel state machine.
//!
//! The rotator cycles focus through `N` items.  One item is *active* (the
//! selected target) and one is *displayed* (what is on screen); they differ
//! only while a transition is in flight.  Three independently cancellable
//! [`Task`]s drive it from the owner's poll loop:
//!
//! * `advance`: repeating, every `interval`, moves to the next item;
//! * `transition`: one-shot, commits `display_index` after `transition`;
//! * `frame`: samples the progress ratio for the indicator.
//!
//! Every operation takes the current time explicitly, so tests run it on a
//! virtual clock and the app drives it from `tokio::time`.
//!
//! ```text
//!   Idle ──reveal──▶ Running ⇄ Paused
//!                      │  ▲
//!       interval/select│  │transition fires
//!                      ▼  │
//!                 Transitioning
//! ```

use std::time::{Duration, Instant};

use super::schedule::{earliest, Task};

/// Time between automatic advances.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(2000);
/// Delay between selecting an item and displaying it.
pub const DEFAULT_TRANSITION: Duration = Duration::from_millis(400);
/// Progress sampling cadence (~30 fps).
pub const FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Timing knobs for a rotator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotatorTimings {
    pub interval: Duration,
    pub transition: Duration,
}

impl RotatorTimings {
    /// A zero interval would make the advance task fire forever within a
    /// single poll, so it is floored at one millisecond.  The transition is
    /// capped at half the interval: every advance re-arms the transition, so
    /// a longer one would never get to commit.
    pub fn new(interval: Duration, transition: Duration) -> Self {
        let interval = interval.max(Duration::from_millis(1));
        Self {
            interval,
            transition: transition.min(interval / 2),
        }
    }
}

impl Default for RotatorTimings {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL, DEFAULT_TRANSITION)
    }
}

/// Observable snapshot of the rotator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotatorState {
    pub active_index: usize,
    pub display_index: usize,
    pub transitioning: bool,
    pub paused: bool,
    /// Fraction of the current interval elapsed, in `[0, 1]`.
    pub elapsed_ratio: f32,
}

/// Coarse lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Mounted but never revealed (or empty).
    Idle,
    Running,
    Paused,
    /// Torn down; every operation is a no-op.
    Unmounted,
}

pub struct Rotator {
    len: usize,
    timings: RotatorTimings,
    state: RotatorState,
    revealed: bool,
    mounted: bool,
    /// When the current advance cycle began; drives `elapsed_ratio`.
    cycle_start: Option<Instant>,
    advance: Task,
    transition: Task,
    frame: Task,
}

impl Rotator {
    pub fn new(len: usize, timings: RotatorTimings) -> Self {
        Self {
            len,
            timings,
            state: RotatorState {
                active_index: 0,
                display_index: 0,
                transitioning: false,
                paused: false,
                elapsed_ratio: 0.0,
            },
            revealed: false,
            mounted: true,
            cycle_start: None,
            advance: Task::default(),
            transition: Task::default(),
            frame: Task::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn state(&self) -> RotatorState {
        self.state
    }

    pub fn timings(&self) -> RotatorTimings {
        self.timings
    }

    pub fn phase(&self) -> Phase {
        if !self.mounted {
            Phase::Unmounted
        } else if !self.revealed || self.len == 0 {
            Phase::Idle
        } else if self.state.paused {
            Phase::Paused
        } else {
            Phase::Running
        }
    }

    /// Progress indicator value in percent.
    pub fn progress_percent(&self) -> f32 {
        self.state.elapsed_ratio * 100.0
    }

    fn is_running(&self) -> bool {
        self.phase() == Phase::Running
    }

    // ── operations ─────────────────────────────────────────────

    /// One-shot visibility activation.  Returns `true` on the first call.
    pub fn reveal(&mut self, now: Instant) -> bool {
        if !self.mounted || self.revealed {
            return false;
        }
        self.revealed = true;
        tracing::debug!(len = self.len, "rotator revealed");
        self.restart_cycle(now);
        true
    }

    /// Move to `index`.  Returns `true` when a transition was started.
    ///
    /// A call made while a transition is in flight supersedes its target;
    /// the abandoned target is never displayed.
    pub fn go_to(&mut self, index: usize, now: Instant) -> bool {
        if !self.mounted || index >= self.len {
            return false;
        }
        let s = &self.state;
        if (s.transitioning && index == s.active_index)
            || (!s.transitioning && index == s.display_index)
        {
            return false;
        }

        self.state.active_index = index;
        self.state.transitioning = true;
        self.transition.once(now + self.timings.transition);
        self.state.elapsed_ratio = 0.0;
        self.restart_cycle(now);
        tracing::debug!(
            target_index = index,
            display = self.state.display_index,
            "rotator transition started"
        );
        true
    }

    /// Advance to the next item, wrapping around.
    pub fn auto_advance(&mut self, now: Instant) -> bool {
        if self.len == 0 {
            return false;
        }
        let next = (self.state.active_index + 1) % self.len;
        self.go_to(next, now)
    }

    /// Jump to `index` on the viewer's behalf.  The advance cycle always
    /// restarts from zero so the pick gets a full interval on screen.
    pub fn select_manually(&mut self, index: usize, now: Instant) -> bool {
        if !self.mounted || index >= self.len {
            return false;
        }
        self.advance.cancel();
        let started = self.go_to(index, now);
        self.restart_cycle(now);
        started
    }

    /// Pausing drops partial progress; resuming starts a fresh cycle.
    pub fn set_paused(&mut self, paused: bool, now: Instant) {
        if !self.mounted || self.state.paused == paused {
            return;
        }
        self.state.paused = paused;
        if paused {
            self.stop_cycle();
        } else {
            self.restart_cycle(now);
        }
        tracing::debug!(paused, "rotator pause changed");
    }

    /// Cancel every scheduled task.  The rotator is inert afterwards.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.advance.cancel();
        self.transition.cancel();
        self.frame.cancel();
        self.cycle_start = None;
    }

    // ── reactor ────────────────────────────────────────────────

    /// Earliest pending deadline, if any task is armed.
    pub fn next_deadline(&self) -> Option<Instant> {
        if !self.mounted {
            return None;
        }
        earliest([
            self.advance.deadline(),
            self.transition.deadline(),
            self.frame.deadline(),
        ])
    }

    /// Fire every task due at `now`, each at its own deadline, then take one
    /// progress sample.  A transition due at the same instant as an advance
    /// commits first.
    pub fn poll(&mut self, now: Instant) {
        if !self.mounted {
            return;
        }

        loop {
            let transition_due = self.transition.due(now);
            let advance_due = self.advance.due(now);
            match (transition_due, advance_due) {
                (Some(t), Some(a)) if t <= a => self.fire_transition(t),
                (Some(t), None) => self.fire_transition(t),
                (_, Some(a)) => {
                    self.advance.consume(a);
                    self.auto_advance(a);
                }
                (None, None) => break,
            }
        }

        if self.frame.due(now).is_some() {
            self.sample(now);
            if self.is_running() && self.state.elapsed_ratio < 1.0 {
                self.frame.once(now + FRAME_INTERVAL);
            } else {
                self.frame.cancel();
            }
        }
    }

    fn fire_transition(&mut self, at: Instant) {
        self.transition.consume(at);
        self.state.display_index = self.state.active_index;
        self.state.transitioning = false;
    }

    fn sample(&mut self, now: Instant) {
        if let Some(start) = self.cycle_start {
            let elapsed = now.saturating_duration_since(start).as_secs_f32();
            let ratio = elapsed / self.timings.interval.as_secs_f32();
            self.state.elapsed_ratio = ratio.clamp(0.0, 1.0);
        }
    }

    fn restart_cycle(&mut self, at: Instant) {
        if !self.is_running() {
            return;
        }
        self.cycle_start = Some(at);
        self.state.elapsed_ratio = 0.0;
        self.advance.every(at, self.timings.interval);
        self.frame.once(at);
    }

    fn stop_cycle(&mut self) {
        self.advance.cancel();
        self.frame.cancel();
        self.cycle_start = None;
        self.state.elapsed_ratio = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn running(len: usize) -> (Rotator, Instant) {
        let t0 = Instant::now();
        let mut r = Rotator::new(len, RotatorTimings::default());
        assert!(r.reveal(t0));
        (r, t0)
    }

    #[test]
    fn starts_idle_at_zero_and_schedules_nothing() {
        let r = Rotator::new(4, RotatorTimings::default());
        assert_eq!(r.phase(), Phase::Idle);
        assert_eq!(r.state().active_index, 0);
        assert_eq!(r.state().display_index, 0);
        assert_eq!(r.next_deadline(), None);
    }

    #[test]
    fn reveal_is_one_shot() {
        let (mut r, t0) = running(4);
        assert_eq!(r.phase(), Phase::Running);
        assert!(!r.reveal(t0 + ms(10)));
    }

    #[test]
    fn four_items_wrap_after_three_advances() {
        let (mut r, t0) = running(4);
        let mut seen = Vec::new();
        for step in 1..=4u64 {
            r.poll(t0 + ms(2000 * step));
            seen.push(r.state().active_index);
        }
        assert_eq!(seen, vec![1, 2, 3, 0]);
    }

    #[test]
    fn transition_longer_than_interval_still_commits() {
        let timings = RotatorTimings::new(ms(250), ms(400));
        assert_eq!(timings.transition, ms(125));

        let t0 = Instant::now();
        let mut r = Rotator::new(4, timings);
        r.reveal(t0);
        r.poll(t0 + ms(375));
        let s = r.state();
        assert_eq!((s.active_index, s.display_index, s.transitioning), (1, 1, false));

        let mut shown = vec![s.display_index];
        for step in 1..=40u64 {
            r.poll(t0 + ms(375 + 25 * step));
            let d = r.state().display_index;
            if shown.last() != Some(&d) {
                shown.push(d);
            }
        }
        assert_eq!(shown, vec![1, 2, 3, 0, 1]);
    }

    #[test]
    fn transition_commits_after_delay() {
        let (mut r, t0) = running(4);
        r.poll(t0 + ms(2000));
        let s = r.state();
        assert_eq!((s.active_index, s.display_index, s.transitioning), (1, 0, true));

        r.poll(t0 + ms(2399));
        assert!(r.state().transitioning);

        r.poll(t0 + ms(2400));
        let s = r.state();
        assert_eq!((s.active_index, s.display_index, s.transitioning), (1, 1, false));
    }

    #[test]
    fn late_poll_replays_callbacks_in_order() {
        let (mut r, t0) = running(4);
        r.poll(t0 + ms(5000));
        let s = r.state();
        assert_eq!(s.active_index, 2);
        assert_eq!(s.display_index, 2);
        assert!(!s.transitioning);
    }

    #[test]
    fn newer_target_supersedes_in_flight_transition() {
        let t0 = Instant::now();
        let mut r = Rotator::new(4, RotatorTimings::default());
        assert!(r.go_to(1, t0));
        assert!(r.go_to(2, t0 + ms(100)));

        r.poll(t0 + ms(400));
        assert_eq!(r.state().display_index, 0, "abandoned target must not render");

        r.poll(t0 + ms(500));
        let s = r.state();
        assert_eq!((s.active_index, s.display_index, s.transitioning), (2, 2, false));
    }

    #[test]
    fn go_to_displayed_item_is_noop() {
        let t0 = Instant::now();
        let mut r = Rotator::new(4, RotatorTimings::default());
        assert!(!r.go_to(0, t0));
        assert!(!r.state().transitioning);
    }

    #[test]
    fn go_to_back_to_displayed_item_mid_transition_still_transitions() {
        let t0 = Instant::now();
        let mut r = Rotator::new(4, RotatorTimings::default());
        r.go_to(3, t0);
        assert!(r.go_to(0, t0 + ms(100)));
        r.poll(t0 + ms(500));
        assert_eq!(r.state().display_index, 0);
        assert!(!r.state().transitioning);
    }

    #[test]
    fn out_of_range_index_is_ignored() {
        let (mut r, t0) = running(4);
        assert!(!r.select_manually(9, t0));
        assert_eq!(r.state().active_index, 0);
    }

    #[test]
    fn repeated_manual_pick_is_idempotent() {
        let (mut r, t0) = running(4);
        assert!(r.select_manually(2, t0 + ms(300)));
        let after_first = r.state();
        let transition_deadline = r.transition.deadline();

        assert!(!r.select_manually(2, t0 + ms(300)));
        assert_eq!(r.state(), after_first);
        assert_eq!(r.transition.deadline(), transition_deadline);
    }

    #[test]
    fn manual_pick_gets_a_full_interval() {
        let (mut r, t0) = running(4);
        r.select_manually(3, t0 + ms(1900));

        r.poll(t0 + ms(3899));
        assert_eq!(r.state().active_index, 3);

        r.poll(t0 + ms(3900));
        assert_eq!(r.state().active_index, 0);
    }

    #[test]
    fn no_advance_while_paused_and_full_interval_after_resume() {
        let (mut r, t0) = running(4);
        r.set_paused(true, t0 + ms(1000));
        assert_eq!(r.phase(), Phase::Paused);

        r.poll(t0 + ms(10_000));
        assert_eq!(r.state().active_index, 0);

        r.set_paused(false, t0 + ms(10_000));
        r.poll(t0 + ms(11_999));
        assert_eq!(r.state().active_index, 0);
        r.poll(t0 + ms(12_000));
        assert_eq!(r.state().active_index, 1);
    }

    #[test]
    fn pause_mid_transition_still_commits_display() {
        let (mut r, t0) = running(4);
        r.poll(t0 + ms(2000));
        r.set_paused(true, t0 + ms(2100));
        r.poll(t0 + ms(2400));
        let s = r.state();
        assert_eq!((s.active_index, s.display_index, s.transitioning), (1, 1, false));
    }

    #[test]
    fn elapsed_ratio_resets_on_change_and_pause() {
        let (mut r, t0) = running(4);
        r.poll(t0 + ms(1000));
        assert!((r.state().elapsed_ratio - 0.5).abs() < 0.01);

        r.select_manually(3, t0 + ms(1000));
        assert_eq!(r.state().elapsed_ratio, 0.0);

        r.poll(t0 + ms(1500));
        assert!((r.state().elapsed_ratio - 0.25).abs() < 0.01);

        r.set_paused(true, t0 + ms(1500));
        assert_eq!(r.state().elapsed_ratio, 0.0);
        assert_eq!(r.progress_percent(), 0.0);
    }

    #[test]
    fn progress_never_exceeds_one() {
        let t0 = Instant::now();
        let mut r = Rotator::new(1, RotatorTimings::default());
        r.reveal(t0);
        // A single item never transitions, so the cycle keeps running out.
        r.poll(t0 + ms(1999));
        assert!(r.state().elapsed_ratio <= 1.0);
        assert!(r.progress_percent() > 99.0);
    }

    #[test]
    fn pause_before_reveal_keeps_idle_timers_off() {
        let t0 = Instant::now();
        let mut r = Rotator::new(4, RotatorTimings::default());
        r.set_paused(true, t0);
        r.reveal(t0);
        assert_eq!(r.phase(), Phase::Paused);
        assert_eq!(r.next_deadline(), None);

        r.set_paused(false, t0 + ms(50));
        assert_eq!(r.next_deadline(), Some(t0 + ms(50)));
    }

    #[test]
    fn empty_rotator_never_schedules() {
        let t0 = Instant::now();
        let mut r = Rotator::new(0, RotatorTimings::default());
        r.reveal(t0);
        assert_eq!(r.phase(), Phase::Idle);
        assert_eq!(r.next_deadline(), None);
        assert!(!r.auto_advance(t0));
        assert!(!r.select_manually(0, t0));
        r.poll(t0 + ms(60_000));
        assert_eq!(r.state().active_index, 0);
    }

    #[test]
    fn unmount_clears_every_task() {
        let (mut r, t0) = running(4);
        r.poll(t0 + ms(2000));
        assert!(r.next_deadline().is_some());

        r.unmount();
        assert_eq!(r.phase(), Phase::Unmounted);
        assert_eq!(r.next_deadline(), None);
        r.poll(t0 + ms(60_000));
        assert_eq!(r.state().display_index, 0);
        assert!(!r.select_manually(3, t0 + ms(60_000)));
    }

    #[test]
    fn zero_transition_commits_on_same_poll() {
        let t0 = Instant::now();
        let mut r = Rotator::new(3, RotatorTimings::new(ms(6000), Duration::ZERO));
        r.reveal(t0);
        r.poll(t0 + ms(6000));
        let s = r.state();
        assert_eq!((s.active_index, s.display_index, s.transitioning), (1, 1, false));
    }

    proptest! {
        #[test]
        fn display_converges_to_last_target(
            len in 2usize..8,
            ops in prop::collection::vec((0usize..8, 0u64..600), 1..40),
        ) {
            let t0 = Instant::now();
            let mut r = Rotator::new(len, RotatorTimings::default());
            let mut now = t0;
            let mut last = 0;
            for (index, gap) in ops {
                now += ms(gap);
                r.poll(now);
                let index = index % len;
                r.go_to(index, now);
                last = index;
            }
            r.poll(now + DEFAULT_TRANSITION);
            let s = r.state();
            prop_assert!(!s.transitioning);
            prop_assert_eq!(s.display_index, last);
            prop_assert_eq!(s.active_index, last);
        }
    }
}
