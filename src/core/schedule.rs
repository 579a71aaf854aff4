//! Deadline-based scheduled tasks for a single-threaded reactor.
//!
//! A [`Task`] is just an optional deadline plus an optional period.  Nothing
//! runs by itself: the owner polls with the current time and asks whether the
//! task is due.  Cancelling is clearing the deadline, so a cancelled task can
//! never fire late.

use std::time::{Duration, Instant};

/// A cancellable one-shot or repeating deadline.
#[derive(Debug, Clone, Default)]
pub struct Task {
    deadline: Option<Instant>,
    period: Option<Duration>,
}

impl Task {
    /// Arm as a one-shot task firing at `at`.  Replaces any previous arming.
    pub fn once(&mut self, at: Instant) {
        self.deadline = Some(at);
        self.period = None;
    }

    /// Arm as a repeating task whose first fire is one `period` after `start`.
    pub fn every(&mut self, start: Instant, period: Duration) {
        self.deadline = Some(start + period);
        self.period = Some(period);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
        self.period = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the deadline if the task is due at `now`.
    pub fn due(&self, now: Instant) -> Option<Instant> {
        self.deadline.filter(|d| *d <= now)
    }

    /// Consume one fire.  One-shot tasks disarm; repeating tasks re-arm one
    /// period after `fired_at`.
    pub fn consume(&mut self, fired_at: Instant) {
        match self.period {
            Some(period) => self.deadline = Some(fired_at + period),
            None => self.deadline = None,
        }
    }
}

/// Earliest of several optional deadlines.
pub fn earliest(deadlines: impl IntoIterator<Item = Option<Instant>>) -> Option<Instant> {
    deadlines.into_iter().flatten().min()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_fires_once() {
        let t0 = Instant::now();
        let mut task = Task::default();
        task.once(t0 + Duration::from_millis(400));

        assert_eq!(task.due(t0), None);
        let at = task.due(t0 + Duration::from_millis(500)).unwrap();
        task.consume(at);
        assert!(!task.is_armed());
    }

    #[test]
    fn repeating_task_rearms_from_fire_time() {
        let t0 = Instant::now();
        let period = Duration::from_millis(2000);
        let mut task = Task::default();
        task.every(t0, period);

        let at = task.due(t0 + period).unwrap();
        assert_eq!(at, t0 + period);
        task.consume(at);
        assert_eq!(task.deadline(), Some(t0 + period * 2));
    }

    #[test]
    fn cancelled_task_is_never_due() {
        let t0 = Instant::now();
        let mut task = Task::default();
        task.every(t0, Duration::from_millis(10));
        task.cancel();
        assert_eq!(task.due(t0 + Duration::from_secs(60)), None);
    }

    #[test]
    fn earliest_skips_unarmed() {
        let t0 = Instant::now();
        let later = t0 + Duration::from_secs(1);
        assert_eq!(earliest([None, Some(later), Some(t0)]), Some(t0));
        assert_eq!(earliest([None, None]), None);
    }
}
