//! Cancellable scheduled tasks on a virtual clock.
//!
//! The form controller never sleeps. Delayed effects (status clearing,
//! post-login redirect) are queued here and fire when the owner advances
//! time. A tokio driver advances by real elapsed time; tests advance by
//! whatever they like.

use std::time::Duration;

/// Handle returned by [`TimerQueue::schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Entry<T> {
    id: TimerId,
    deadline: Duration,
    task: T,
}

/// Queue of tasks keyed by deadline.
#[derive(Debug)]
pub struct TimerQueue<T> {
    now: Duration,
    next_id: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time, measured from queue creation.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `task` to fire `delay` from now.
    pub fn schedule(&mut self, delay: Duration, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            deadline: self.now + delay,
            task,
        });
        id
    }

    /// Cancel a pending task. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.entries.iter().position(|e| e.id == id) {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Time remaining until the earliest pending task.
    pub fn time_until_next(&self) -> Option<Duration> {
        self.entries
            .iter()
            .map(|e| e.deadline.saturating_sub(self.now))
            .min()
    }

    /// Move the clock forward and return every task that came due.
    ///
    /// Tasks are returned in deadline order; ties keep scheduling order.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<T> {
        self.now += elapsed;
        let now = self.now;

        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.entries.drain(..).partition(|e| e.deadline <= now);
        self.entries = pending;

        due.sort_by_key(|e| (e.deadline, e.id));
        due.into_iter().map(|e| e.task).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn fires_only_when_due() {
        let mut q = TimerQueue::new();
        q.schedule(ms(1500), "redirect");

        assert!(q.advance(ms(1499)).is_empty());
        assert_eq!(q.advance(ms(1)), vec!["redirect"]);
        assert!(q.is_empty());
    }

    #[test]
    fn cancelled_tasks_never_fire() {
        let mut q = TimerQueue::new();
        let id = q.schedule(ms(10), 1);
        assert!(q.is_pending(id));
        assert!(q.cancel(id));
        assert!(!q.cancel(id));
        assert!(q.advance(ms(100)).is_empty());
    }

    #[test]
    fn returns_tasks_in_deadline_order() {
        let mut q = TimerQueue::new();
        q.schedule(ms(30), "c");
        q.schedule(ms(10), "a");
        q.schedule(ms(20), "b");
        q.schedule(ms(10), "a2");
        assert_eq!(q.advance(ms(50)), vec!["a", "a2", "b", "c"]);
    }

    #[test]
    fn time_until_next_tracks_clock() {
        let mut q = TimerQueue::new();
        assert_eq!(q.time_until_next(), None);
        q.schedule(ms(5000), ());
        q.schedule(ms(1500), ());
        assert_eq!(q.time_until_next(), Some(ms(1500)));
        q.advance(ms(1000));
        assert_eq!(q.time_until_next(), Some(ms(500)));
        assert_eq!(q.now(), ms(1000));
    }
}
