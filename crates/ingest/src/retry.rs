//! Retry policy for queued parse jobs.

/// Maximum classification attempts per message before the job is
/// terminally failed.
pub const MAX_PARSE_ATTEMPTS: i32 = 3;

/// First retry delay; doubles on each subsequent attempt.
pub const BACKOFF_BASE_SECS: i64 = 5;

/// Delay in seconds before the next run, given how many attempts have
/// already executed: 5s, 10s, 20s, ...
pub fn backoff_delay_secs(attempt: i32) -> i64 {
    let exponent = attempt.saturating_sub(1).clamp(0, 30) as u32;
    BACKOFF_BASE_SECS << exponent
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_per_attempt() {
        assert_eq!(backoff_delay_secs(1), 5);
        assert_eq!(backoff_delay_secs(2), 10);
        assert_eq!(backoff_delay_secs(3), 20);
        assert_eq!(backoff_delay_secs(4), 40);
    }

    #[test]
    fn test_backoff_clamps_degenerate_attempts() {
        assert_eq!(backoff_delay_secs(0), BACKOFF_BASE_SECS);
        assert_eq!(backoff_delay_secs(-7), BACKOFF_BASE_SECS);
        assert_eq!(backoff_delay_secs(i32::MAX), BACKOFF_BASE_SECS << 30);
    }
}
