//! Retry policy for failed delivery attempts.
//!
//! The backoff math is a pure function of the retry count so it can be
//! tested without a live queue; scheduling the delayed re-attempt is the
//! dispatch loop's job.

use chrono::Duration;

use crate::types::Timestamp;

/// Default number of delivery attempts before a notification is abandoned.
pub const DEFAULT_MAX_RETRIES: i32 = 3;

/// Base delay unit for exponential backoff.
const BACKOFF_BASE_SECS: i64 = 60;

/// Delay before the next attempt after `retry_count` failures.
///
/// Pure exponential: `2^retry_count * 60` seconds. No jitter, no ceiling.
pub fn backoff(retry_count: i32) -> Duration {
    // Clamped so the delay stays representable; 2^32 minutes is already
    // past any plausible max_retries.
    let exponent = retry_count.clamp(0, 32) as u32;
    Duration::seconds(BACKOFF_BASE_SECS.saturating_mul(1i64 << exponent))
}

/// The state-machine branch taken after a failed send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    /// Schedule another attempt no earlier than the contained time.
    Retry { scheduled_at: Timestamp },
    /// Retries exhausted; the notification is terminally failed.
    Exhausted,
}

/// Decide what happens after a failed attempt.
///
/// `retry_count` is the count *after* this failure has been recorded
/// (strictly incremented by one per failed attempt). A notification whose
/// count has reached `max_retries` is exhausted; otherwise it becomes
/// eligible again at `now + backoff(retry_count)`.
pub fn after_failure(retry_count: i32, max_retries: i32, now: Timestamp) -> FailureOutcome {
    if retry_count >= max_retries {
        FailureOutcome::Exhausted
    } else {
        FailureOutcome::Retry {
            scheduled_at: now + backoff(retry_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn backoff_doubles_per_attempt() {
        assert_eq!(backoff(0).num_seconds(), 60);
        assert_eq!(backoff(1).num_seconds(), 120);
        assert_eq!(backoff(2).num_seconds(), 240);
        assert_eq!(backoff(3).num_seconds(), 480);
    }

    #[test]
    fn backoff_does_not_overflow_on_absurd_counts() {
        // Clamped, not overflowed.
        assert!(backoff(1000).num_seconds() > 0);
    }

    #[test]
    fn failure_below_max_schedules_retry() {
        let now = Utc::now();
        match after_failure(1, 3, now) {
            FailureOutcome::Retry { scheduled_at } => {
                assert_eq!((scheduled_at - now).num_seconds(), 120);
            }
            FailureOutcome::Exhausted => panic!("expected a retry"),
        }
    }

    #[test]
    fn failure_at_max_is_exhausted() {
        let now = Utc::now();
        assert_eq!(after_failure(3, 3, now), FailureOutcome::Exhausted);
        assert_eq!(after_failure(4, 3, now), FailureOutcome::Exhausted);
    }

    #[test]
    fn retry_counts_are_monotonic_until_exhaustion() {
        // Simulate a notification failing repeatedly with max_retries = 3:
        // counts 1 and 2 schedule retries, count 3 is terminal.
        let now = Utc::now();
        let mut retry_count = 0;

        for expected in [1, 2] {
            retry_count += 1;
            assert_eq!(retry_count, expected);
            let outcome = after_failure(retry_count, DEFAULT_MAX_RETRIES, now);
            assert_eq!(
                outcome,
                FailureOutcome::Retry {
                    scheduled_at: now + backoff(retry_count)
                }
            );
        }

        retry_count += 1;
        assert_eq!(
            after_failure(retry_count, DEFAULT_MAX_RETRIES, now),
            FailureOutcome::Exhausted
        );
    }

    #[test]
    fn succeeds_on_third_attempt_with_two_recorded_failures() {
        // Two failures leave the notification retryable with count 2; the
        // third attempt may then succeed and the count stays at 2.
        let now = Utc::now();
        assert!(matches!(
            after_failure(2, 3, now),
            FailureOutcome::Retry { .. }
        ));
    }
}
