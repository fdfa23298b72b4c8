//! Retry pacing for a listener whose `accept()` keeps failing.

use std::time::Duration;

const FLOOR: Duration = Duration::from_millis(1);

/// How long the accept loop sleeps after consecutive `accept()` errors.
///
/// Typical causes are descriptor exhaustion (`EMFILE`) or a transient
/// network fault; sleeping lets the process recover instead of spinning.
/// The pause starts at `initial_delay`, doubles per repeated failure, and
/// never exceeds `max_delay`. The next accepted client resets it.
///
/// ```
/// use std::time::Duration;
///
/// use packetlink::server::BackoffConfig;
///
/// let backoff = BackoffConfig::new(Duration::from_millis(100), Duration::from_millis(250));
/// assert_eq!(backoff.next_delay(Duration::from_millis(100)), Duration::from_millis(200));
/// assert_eq!(backoff.next_delay(Duration::from_millis(200)), Duration::from_millis(250));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackoffConfig {
    /// Pause after the first failure in a run.
    pub initial_delay: Duration,
    /// Longest pause between attempts.
    pub max_delay: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self { Self::new(Duration::from_millis(10), Duration::from_secs(1)) }
}

impl BackoffConfig {
    /// Pause settings as given; see [`normalized`](Self::normalized).
    #[must_use]
    pub const fn new(initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            initial_delay,
            max_delay,
        }
    }

    /// Bring user-supplied delays into a usable shape: neither below one
    /// millisecond, and the smaller of the two used as the starting delay.
    #[must_use]
    pub fn normalized(self) -> Self {
        let a = self.initial_delay.max(FLOOR);
        let b = self.max_delay.max(FLOOR);
        Self::new(a.min(b), a.max(b))
    }

    /// Pause to use after a failure that followed a pause of `current`.
    #[must_use]
    pub fn next_delay(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max_delay)
    }
}
