//! Timer-based input coalescing.

use std::time::Duration;

use tokio::time::Instant;

/// Coalesces rapidly changing input until it pauses for `window`.
///
/// Each [`push`](Self::push) replaces the pending value and restarts the
/// window. The value is released by [`poll`](Self::poll) once the deadline
/// passes, or immediately by [`flush`](Self::flush). [`cancel`](Self::cancel)
/// drops it without committing; owners call it on teardown.
///
/// Time comes from the tokio clock, so paused-time tests drive it with
/// `tokio::time::advance`.
#[derive(Debug)]
pub struct Debouncer<V> {
    window: Duration,
    pending: Option<Pending<V>>,
}

#[derive(Debug)]
struct Pending<V> {
    value: V,
    deadline: Instant,
}

impl<V> Debouncer<V> {
    /// Create a debouncer with the given quiet window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// The quiet window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Change the quiet window. A pending value keeps its current deadline.
    pub fn set_window(&mut self, window: Duration) {
        self.window = window;
    }

    /// Record a new value, restarting the window from `now`.
    pub fn push(&mut self, value: V, now: Instant) {
        self.pending = Some(Pending {
            value,
            deadline: now + self.window,
        });
    }

    /// The value waiting to be released, if any.
    pub fn pending(&self) -> Option<&V> {
        self.pending.as_ref().map(|p| &p.value)
    }

    /// When the pending value becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Returns `true` if a value is waiting.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Release the pending value if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<V> {
        match &self.pending {
            Some(p) if p.deadline <= now => self.pending.take().map(|p| p.value),
            _ => None,
        }
    }

    /// Release the pending value immediately.
    pub fn flush(&mut self) -> Option<V> {
        self.pending.take().map(|p| p.value)
    }

    /// Drop the pending value. Returns `true` if something was dropped.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Sleep until the pending value is due, then release it.
    ///
    /// Returns `None` immediately when nothing is pending.
    pub async fn wait(&mut self) -> Option<V> {
        let deadline = self.deadline()?;
        tokio::time::sleep_until(deadline).await;
        self.poll(Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(200);

    #[tokio::test(start_paused = true)]
    async fn test_releases_after_quiet_window() {
        let mut debouncer = Debouncer::new(WINDOW);
        debouncer.push("n", Instant::now());

        tokio::time::advance(Duration::from_millis(199)).await;
        assert_eq!(debouncer.poll(Instant::now()), None);

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(debouncer.poll(Instant::now()), Some("n"));
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_push_restarts_window() {
        let mut debouncer = Debouncer::new(WINDOW);
        debouncer.push("n", Instant::now());
        tokio::time::advance(Duration::from_millis(150)).await;
        debouncer.push("no", Instant::now());
        tokio::time::advance(Duration::from_millis(150)).await;
        assert_eq!(debouncer.poll(Instant::now()), None);
        tokio::time::advance(Duration::from_millis(50)).await;
        assert_eq!(debouncer.poll(Instant::now()), Some("no"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_value() {
        let mut debouncer = Debouncer::new(WINDOW);
        debouncer.push(1, Instant::now());
        assert!(debouncer.cancel());
        tokio::time::advance(WINDOW).await;
        assert_eq!(debouncer.poll(Instant::now()), None);
        assert_eq!(debouncer.wait().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_sleeps_until_deadline() {
        let mut debouncer = Debouncer::new(WINDOW);
        let start = Instant::now();
        debouncer.push("north", start);
        assert_eq!(debouncer.wait().await, Some("north"));
        assert!(Instant::now() >= start + WINDOW);
    }

    #[test]
    fn test_flush_is_immediate() {
        let mut debouncer = Debouncer::new(WINDOW);
        debouncer.push(7, Instant::now());
        assert_eq!(debouncer.flush(), Some(7));
        assert_eq!(debouncer.flush(), None);
    }
}
