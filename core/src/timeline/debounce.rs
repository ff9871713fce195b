//! Resize debouncing.

use std::time::{Duration, Instant};

/// Coalesces container resize requests; only the latest request in a window
/// takes effect once the window has elapsed without further requests.
#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    delay: Duration,
    pending: Option<(f64, f64)>,
    deadline: Option<Instant>,
}

impl ResizeDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            deadline: None,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Record a resize; restarts the window.
    pub fn request(&mut self, width: f64, height: f64, now: Instant) {
        self.pending = Some((width, height));
        self.deadline = Some(now + self.delay);
    }

    /// Returns the size to apply once the window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<(f64, f64)> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.pending.take()
            }
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
        self.deadline = None;
    }
}
