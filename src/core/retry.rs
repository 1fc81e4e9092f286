use rand::Rng;
use std::time::Duration;

/// Backoff schedule for transient fetch failures. Injected into the
/// resolver so tests can collapse the delays or disable jitter.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: usize,
    pub base_delay: Duration,
    pub factor: u32,
    pub max_delay: Duration,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
            factor: 2,
            max_delay: Duration::from_secs(2),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before the retry that follows the given failed attempt
    /// (1-based). With jitter enabled the delay is drawn uniformly from
    /// [backoff/2, backoff].
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let exp = attempt.saturating_sub(1).min(16) as u32;
        let backoff = self
            .base_delay
            .saturating_mul(self.factor.saturating_pow(exp))
            .min(self.max_delay);

        if !self.jitter {
            return backoff;
        }

        let millis = backoff.as_millis() as u64;
        if millis == 0 {
            return backoff;
        }
        Duration::from_millis(rand::thread_rng().gen_range(millis / 2..=millis))
    }
}
