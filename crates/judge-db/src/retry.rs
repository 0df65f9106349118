//! Write-conflict retry logic.
//!
//! A transition that loses a compare-and-swap, or finds the database locked
//! past the busy timeout, is recomputed from a fresh snapshot after an
//! exponential backoff with jitter. Genuine SQL or constraint errors are
//! never retried.

use std::future::Future;
use std::time::Duration;

use judge_config::DatabaseConfig;
use rand::Rng;
use tracing::warn;

use crate::error::DatabaseError;

/// Configuration for retry behavior on write conflicts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial one).
    pub max_attempts: u32,
    /// Initial delay before the first retry.
    pub base_delay: Duration,
    /// Maximum delay between retries (backoff is capped here).
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(500),
        }
    }
}

impl From<&DatabaseConfig> for RetryConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }
}

impl RetryConfig {
    /// Backoff before retry number `attempt` (1-based), without jitter.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2_u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Start counting attempts for one operation.
    #[must_use]
    pub const fn attempts(&self, label: &'static str) -> Attempts<'_> {
        Attempts {
            config: self,
            label,
            attempt: 0,
        }
    }
}

/// Attempt counter for a single retried operation.
#[derive(Debug)]
pub struct Attempts<'a> {
    config: &'a RetryConfig,
    label: &'static str,
    attempt: u32,
}

impl Attempts<'_> {
    /// Record a failed attempt.
    ///
    /// Sleeps and returns `Ok(())` if the error is a conflict and attempts
    /// remain; otherwise returns the error to propagate.
    ///
    /// # Errors
    ///
    /// Non-conflict errors are returned unchanged. A conflict on the last
    /// attempt becomes `DatabaseError::RetriesExhausted`.
    pub async fn backoff(&mut self, error: DatabaseError) -> Result<(), DatabaseError> {
        if !is_conflict(&error) {
            return Err(error);
        }
        self.attempt += 1;
        if self.attempt >= self.config.max_attempts {
            warn!(
                op = self.label,
                attempts = self.attempt,
                error = %error,
                "Giving up after repeated write conflicts"
            );
            return Err(DatabaseError::RetriesExhausted {
                attempts: self.attempt,
            });
        }

        let delay = jittered(self.config.delay_for(self.attempt));
        warn!(
            op = self.label,
            attempt = self.attempt,
            max_attempts = self.config.max_attempts,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %error,
            "Write conflict, retrying"
        );
        tokio::time::sleep(delay).await;
        Ok(())
    }
}

/// Spread concurrent retries out over `[delay / 2, delay]`.
fn jittered(delay: Duration) -> Duration {
    let half = delay / 2;
    let spread = u64::try_from(half.as_micros()).unwrap_or(u64::MAX);
    if spread == 0 {
        return delay;
    }
    half + Duration::from_micros(rand::rng().random_range(0..=spread))
}

/// Whether an error is worth recomputing the transition for.
///
/// Version mismatches surface as `WriteConflict`; lock contention that
/// outlasts the busy timeout surfaces as a libSQL error mentioning
/// `database is locked` or `SQLITE_BUSY`.
#[must_use]
pub fn is_conflict(error: &DatabaseError) -> bool {
    match error {
        DatabaseError::WriteConflict(_) => true,
        DatabaseError::LibSql(e) => is_busy_error(e),
        _ => false,
    }
}

fn is_busy_error(e: &libsql::Error) -> bool {
    let msg = e.to_string();
    msg.contains("database is locked")
        || msg.contains("database table is locked")
        || msg.contains("SQLITE_BUSY")
}

/// Run `op` until it succeeds, fails with a non-conflict error, or runs out
/// of attempts.
///
/// For operations that need mutable state across attempts, drive
/// [`Attempts`] directly.
///
/// # Errors
///
/// Returns the first non-conflict error, or `RetriesExhausted`.
pub async fn with_retries<T, F, Fut>(
    config: &RetryConfig,
    label: &'static str,
    mut op: F,
) -> Result<T, DatabaseError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DatabaseError>>,
{
    let mut attempts = config.attempts(label);
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(error) => attempts.backoff(error).await?,
        }
    }
}
