//! Trailing-edge debounce for fit-to-view
//!
//! The debouncer holds no thread or timer handle. Callers pass the current
//! `Instant` to [`FitDebouncer::trigger`] and [`FitDebouncer::poll`], which
//! keeps it deterministic under test.

use std::time::{Duration, Instant};
use tracing::trace;

/// Fires once, `window` after the most recent trigger
#[derive(Debug, Clone)]
pub struct FitDebouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl FitDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Schedule a fit, replacing any pending one
    pub fn trigger(&mut self, now: Instant) {
        let deadline = now + self.window;
        trace!(replaced = self.deadline.is_some(), "Fit scheduled");
        self.deadline = Some(deadline);
    }

    /// Returns true exactly once when the pending deadline has passed
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Drop the pending fit, if any
    pub fn cancel(&mut self) {
        if self.deadline.take().is_some() {
            trace!("Pending fit cancelled");
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// When the pending fit will fire
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

impl Drop for FitDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(200);

    #[test]
    fn test_fires_after_window() {
        let start = Instant::now();
        let mut debouncer = FitDebouncer::new(WINDOW);
        debouncer.trigger(start);

        assert!(!debouncer.poll(start + Duration::from_millis(199)));
        assert!(debouncer.poll(start + WINDOW));
        assert!(!debouncer.poll(start + Duration::from_millis(400)));
    }

    #[test]
    fn test_retrigger_extends_deadline() {
        let start = Instant::now();
        let mut debouncer = FitDebouncer::new(WINDOW);
        debouncer.trigger(start);
        debouncer.trigger(start + Duration::from_millis(150));

        assert!(!debouncer.poll(start + Duration::from_millis(250)));
        assert!(debouncer.poll(start + Duration::from_millis(350)));
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut debouncer = FitDebouncer::new(WINDOW);
        debouncer.trigger(start);
        assert!(debouncer.is_pending());

        debouncer.cancel();
        assert!(!debouncer.is_pending());
        assert!(!debouncer.poll(start + Duration::from_secs(1)));
    }

    #[test]
    fn test_idle_poll() {
        let mut debouncer = FitDebouncer::new(WINDOW);
        assert!(!debouncer.poll(Instant::now()));
        assert_eq!(debouncer.deadline(), None);
    }
}
