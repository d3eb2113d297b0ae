//! Timing configuration for the scan controller.
//!
//! These are fixed constants of the lifecycle, exposed for configuration
//! rather than computed at runtime.

use std::time::Duration;

/// Debounce before default content is restored after a marker is lost.
pub const DEFAULT_RESET_DELAY: Duration = Duration::from_millis(2000);

/// Delay after `engine.start()` before the stream binding is checked.
pub const DEFAULT_VERIFY_DELAY: Duration = Duration::from_millis(800);

/// How long the stream binding check waits for a live stream.
pub const DEFAULT_VERIFY_TIMEOUT: Duration = Duration::from_millis(2000);

/// Pause between `engine.stop()` and `engine.start()` in the retry cycle.
pub const DEFAULT_RETRY_PAUSE: Duration = Duration::from_millis(300);

/// Timing constants of one scan controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanTimings {
    /// Reset-after-lost debounce.
    pub reset_delay: Duration,
    /// Delay before the first stream binding check.
    pub verify_delay: Duration,
    /// Bound on each stream binding check.
    pub verify_timeout: Duration,
    /// Pause inside the single retry cycle.
    pub retry_pause: Duration,
}

impl Default for ScanTimings {
    fn default() -> Self {
        Self {
            reset_delay: DEFAULT_RESET_DELAY,
            verify_delay: DEFAULT_VERIFY_DELAY,
            verify_timeout: DEFAULT_VERIFY_TIMEOUT,
            retry_pause: DEFAULT_RETRY_PAUSE,
        }
    }
}

impl ScanTimings {
    /// Set the reset debounce.
    pub fn with_reset_delay(mut self, delay: Duration) -> Self {
        self.reset_delay = delay;
        self
    }

    /// Set the stream binding check delay and timeout.
    pub fn with_verification(mut self, delay: Duration, timeout: Duration) -> Self {
        self.verify_delay = delay;
        self.verify_timeout = timeout;
        self
    }

    /// Set the retry pause.
    pub fn with_retry_pause(mut self, pause: Duration) -> Self {
        self.retry_pause = pause;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timings() {
        let t = ScanTimings::default();
        assert_eq!(t.reset_delay, Duration::from_secs(2));
        assert_eq!(t.verify_delay, Duration::from_millis(800));
        assert_eq!(t.verify_timeout, Duration::from_secs(2));
        assert_eq!(t.retry_pause, Duration::from_millis(300));
    }

    #[test]
    fn test_builder_methods() {
        let t = ScanTimings::default()
            .with_reset_delay(Duration::from_secs(1))
            .with_verification(Duration::from_millis(100), Duration::from_millis(1200));
        assert_eq!(t.reset_delay, Duration::from_secs(1));
        assert_eq!(t.verify_timeout, Duration::from_millis(1200));
        assert_eq!(t.retry_pause, DEFAULT_RETRY_PAUSE);
    }
}
