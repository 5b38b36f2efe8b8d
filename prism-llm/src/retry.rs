//! Bounded retry with capped exponential backoff for transient model errors.
//!
//! Applied at the call boundary, never by patching a client library's
//! internals. Exhaustion surfaces to the caller; no silent partial results.

use std::time::Duration;

use prism_core::config::RetryConfig;
use prism_core::errors::ModelError;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.base_delay_ms),
            Duration::from_millis(config.max_delay_ms),
        )
    }

    /// Delay before the retry following the given 0-based attempt.
    fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(1u32 << attempt.min(16))
            .min(self.max_delay)
    }

    /// Run `op`, retrying transient failures up to `max_attempts` total tries.
    pub fn run<T>(
        &self,
        label: &str,
        mut op: impl FnMut() -> Result<T, ModelError>,
    ) -> Result<T, ModelError> {
        let mut attempt = 0;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt + 1 < self.max_attempts => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        op = label,
                        error = %err,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "transient model error, retrying"
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                Err(err) if err.is_transient() => {
                    return Err(ModelError::RetriesExhausted {
                        attempts: self.max_attempts,
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn immediate(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::ZERO, Duration::ZERO)
    }

    #[test]
    fn success_passes_through() {
        let calls = Cell::new(0);
        let result = immediate(3).run("op", || {
            calls.set(calls.get() + 1);
            Ok::<_, ModelError>(42)
        });
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn transient_errors_retry_until_exhausted() {
        let calls = Cell::new(0);
        let result: Result<(), _> = immediate(3).run("op", || {
            calls.set(calls.get() + 1);
            Err(ModelError::Throttled {
                provider: "m".into(),
            })
        });
        assert_eq!(calls.get(), 3);
        assert!(matches!(
            result,
            Err(ModelError::RetriesExhausted { attempts: 3, .. })
        ));
    }

    #[test]
    fn recovery_mid_sequence_returns_ok() {
        let calls = Cell::new(0);
        let result = immediate(3).run("op", || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(ModelError::Timeout {
                    provider: "m".into(),
                })
            } else {
                Ok("done")
            }
        });
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn non_transient_errors_surface_immediately() {
        let calls = Cell::new(0);
        let result: Result<(), _> = immediate(3).run("op", || {
            calls.set(calls.get() + 1);
            Err(ModelError::MalformedOutput {
                reason: "bad".into(),
            })
        });
        assert_eq!(calls.get(), 1);
        assert!(matches!(result, Err(ModelError::MalformedOutput { .. })));
    }

    #[test]
    fn backoff_is_capped() {
        let policy = RetryPolicy::new(5, Duration::from_millis(4000), Duration::from_millis(10_000));
        assert_eq!(policy.delay_for(0), Duration::from_millis(4000));
        assert_eq!(policy.delay_for(1), Duration::from_millis(8000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(10_000));
        assert_eq!(policy.delay_for(10), Duration::from_millis(10_000));
    }
}
