//! Ordered queue of delayed steps on a virtual clock.
//!
//! Steps fire in due-time order, ties in scheduling order. Cancelling bumps
//! the queue generation, so every step scheduled under an older token is
//! discarded instead of firing.

use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CancelToken(u64);

#[derive(Debug)]
struct Scheduled<S> {
    token: CancelToken,
    step: S,
}

#[derive(Debug)]
pub struct StepQueue<S> {
    now: Duration,
    generation: u64,
    next_seq: u64,
    pending: BTreeMap<(Duration, u64), Scheduled<S>>,
}

impl<S> Default for StepQueue<S> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            generation: 0,
            next_seq: 0,
            pending: BTreeMap::new(),
        }
    }
}

impl<S> StepQueue<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn token(&self) -> CancelToken {
        CancelToken(self.generation)
    }

    pub fn is_live(&self, token: CancelToken) -> bool {
        token.0 == self.generation
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn schedule(&mut self, delay: Duration, step: S) -> CancelToken {
        let token = self.token();
        let key = (self.now + delay, self.next_seq);
        self.next_seq += 1;
        self.pending.insert(key, Scheduled { token, step });
        token
    }

    /// Invalidates every outstanding token. Returns how many steps were dropped.
    pub fn cancel_all(&mut self) -> usize {
        self.generation += 1;
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    /// Pops the next live step due at or before `deadline`, moving the clock
    /// to its due time.
    pub fn pop_until(&mut self, deadline: Duration) -> Option<S> {
        loop {
            let (&key, _) = self.pending.first_key_value()?;
            if key.0 > deadline {
                return None;
            }
            let scheduled = self.pending.remove(&key)?;
            self.now = self.now.max(key.0);
            if self.is_live(scheduled.token) {
                return Some(scheduled.step);
            }
        }
    }

    /// Pops the next live step regardless of its due time.
    pub fn pop_next(&mut self) -> Option<S> {
        self.pop_until(Duration::MAX)
    }

    pub fn advance_to(&mut self, instant: Duration) {
        self.now = self.now.max(instant);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_fire_in_due_order_then_fifo() {
        let mut queue = StepQueue::new();
        queue.schedule(Duration::from_millis(30), "late");
        queue.schedule(Duration::from_millis(10), "first");
        queue.schedule(Duration::from_millis(10), "second");
        assert_eq!(queue.pop_next(), Some("first"));
        assert_eq!(queue.pop_next(), Some("second"));
        assert_eq!(queue.now(), Duration::from_millis(10));
        assert_eq!(queue.pop_next(), Some("late"));
        assert_eq!(queue.pop_next(), None);
    }

    #[test]
    fn pop_until_respects_deadline() {
        let mut queue = StepQueue::new();
        queue.schedule(Duration::from_millis(100), 1);
        assert_eq!(queue.pop_until(Duration::from_millis(99)), None);
        assert_eq!(queue.pop_until(Duration::from_millis(100)), Some(1));
    }

    #[test]
    fn cancel_drops_pending_and_rotates_token() {
        let mut queue = StepQueue::new();
        let old = queue.schedule(Duration::from_millis(5), 'a');
        assert_eq!(queue.cancel_all(), 1);
        assert!(!queue.is_live(old));
        assert!(queue.is_empty());
        queue.schedule(Duration::ZERO, 'b');
        assert_eq!(queue.pop_next(), Some('b'));
    }
}
