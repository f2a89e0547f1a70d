use std::time::{Duration, Instant};

/// Trailing-edge debouncer holding the latest signalled value.
///
/// Every `signal` pushes the deadline out to `now + window`; `poll` yields the
/// most recent value once the burst has been quiet for a full window.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<Pending<T>>,
}

#[derive(Debug, Clone)]
struct Pending<T> {
    value: T,
    deadline: Instant,
    coalesced: u32,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn signal(&mut self, value: T, now: Instant) {
        let deadline = now + self.window;
        let coalesced = match self.pending.take() {
            Some(previous) => previous.coalesced.saturating_add(1),
            None => 1,
        };
        self.pending = Some(Pending {
            value,
            deadline,
            coalesced,
        });
    }

    /// Takes the pending value if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|pending| now >= pending.deadline);
        if !due {
            return None;
        }
        let pending = self.pending.take()?;
        tracing::trace!(
            coalesced = pending.coalesced,
            "debounce window elapsed; releasing latest value"
        );
        Some(pending.value)
    }

    /// Drops any pending value. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(150);

    #[test]
    fn burst_collapses_into_latest_value() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);
        for step in 0..50u64 {
            debouncer.signal(step, start + Duration::from_millis(step * 3));
        }
        let last_signal = start + Duration::from_millis(49 * 3);

        assert_eq!(debouncer.poll(last_signal + Duration::from_millis(149)), None);
        assert_eq!(debouncer.poll(last_signal + WINDOW), Some(49));
        assert_eq!(debouncer.poll(last_signal + WINDOW * 2), None);
    }

    #[test]
    fn new_signal_extends_deadline() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);
        debouncer.signal("a", start);
        assert_eq!(debouncer.next_deadline(), Some(start + WINDOW));

        let later = start + Duration::from_millis(100);
        debouncer.signal("b", later);
        assert_eq!(debouncer.next_deadline(), Some(later + WINDOW));
        assert_eq!(debouncer.poll(start + WINDOW), None);
    }

    #[test]
    fn cancel_discards_pending_value() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);
        debouncer.signal(1, start);
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.poll(start + WINDOW * 4), None);
    }
}
