use std::time::Duration;

/// Gate in front of every network request.
pub trait RateLimiter: Send + Sync {
    /// Blocks until the next request is permitted.
    fn acquire(&self);
}

/// Sleeps a fixed delay before every request, regardless of history.
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl RateLimiter for FixedDelay {
    fn acquire(&self) {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
    }
}

/// No throttling. Selected when the configured delay is zero.
pub struct Unthrottled;

impl RateLimiter for Unthrottled {
    fn acquire(&self) {}
}
