use std::time::{Duration, Instant};

/// Measures the wall-clock delta between ticks, clamped to `max_delta`.
///
/// The clamp keeps a long gap (a backgrounded host, a debugger pause) from
/// turning into one large animation jump.
#[derive(Debug, Clone)]
pub struct FrameClock {
    max_delta: Duration,
    last: Option<Instant>,
}

impl FrameClock {
    pub fn new(max_delta: Duration) -> Self {
        Self {
            max_delta,
            last: None,
        }
    }

    pub fn max_delta(&self) -> Duration {
        self.max_delta
    }

    /// Returns the capped delta since the previous call. The first call
    /// yields zero. A timestamp earlier than the previous one also yields zero.
    pub fn advance(&mut self, now: Instant) -> Duration {
        let delta = match self.last {
            Some(last) => now.saturating_duration_since(last),
            None => Duration::ZERO,
        };
        if self.last.map_or(true, |last| now > last) {
            self.last = Some(now);
        }
        delta.min(self.max_delta)
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
