//! Retry logic with exponential backoff for fallible reaction backends.
//!
//! The mock service never fails, but the `Reaction` seam is where a real
//! generative backend plugs in, and those do fail transiently. Retries apply
//! only to `CompanionError::Service`; validation and precondition errors are
//! surfaced immediately.

use std::future::Future;
use std::time::Duration;
use tomo_core::{
    ColorTag, CompanionError, MemoryCategory, Reaction, ReportTrigger, UserSettings,
};

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Initial delay before the first retry.
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Multiplier for each subsequent delay.
    pub backoff_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_factor: 2.0,
        }
    }
}

impl RetryConfig {
    /// No backoff delays, for tests.
    pub fn instant(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_factor: 1.0,
        }
    }
}

/// Execute an async reaction operation with retry logic.
///
/// The `operation` closure is called repeatedly until it succeeds, returns a
/// non-retryable error, or `max_attempts` is exhausted.
pub async fn with_retry<F, Fut, T>(
    config: &RetryConfig,
    label: &str,
    operation: F,
) -> Result<T, CompanionError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, CompanionError>>,
{
    let mut delay = config.initial_delay;
    let mut last_error = CompanionError::service("no attempts made");

    for attempt in 1..=config.max_attempts {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!("{} succeeded on attempt {}", label, attempt);
                }
                return Ok(value);
            }
            Err(e @ CompanionError::Service(_)) => {
                tracing::warn!(
                    "{} failed on attempt {}/{}: {}",
                    label,
                    attempt,
                    config.max_attempts,
                    e
                );
                last_error = e;
            }
            // Precondition/validation failures won't get better on retry
            Err(e) => return Err(e),
        }

        if attempt < config.max_attempts {
            let sleep_time = delay + Duration::from_millis(rand_jitter());
            tracing::info!(
                "{} retrying in {:.1}s (attempt {}/{})",
                label,
                sleep_time.as_secs_f64(),
                attempt + 1,
                config.max_attempts
            );
            tokio::time::sleep(sleep_time).await;

            delay = Duration::from_secs_f64(
                (delay.as_secs_f64() * config.backoff_factor).min(config.max_delay.as_secs_f64()),
            );
        }
    }

    Err(last_error)
}

/// Simple jitter: random 0-500ms using timestamp as poor-man's random.
fn rand_jitter() -> u64 {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    (nanos % 500) as u64
}

/// Wraps any [`Reaction`] backend with retry-on-transient-failure semantics.
///
/// `RetryingReaction::new(real_backend)` is the intended composition for a
/// production replacement of the mock.
pub struct RetryingReaction<R> {
    inner: R,
    config: RetryConfig,
}

impl<R> RetryingReaction<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            config: RetryConfig::default(),
        }
    }

    pub fn with_config(inner: R, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

#[async_trait::async_trait]
impl<R: Reaction> Reaction for RetryingReaction<R> {
    async fn react(
        &self,
        settings: &UserSettings,
        trigger: ReportTrigger,
        context: &str,
    ) -> Result<String, CompanionError> {
        with_retry(&self.config, "react", || {
            self.inner.react(settings, trigger, context)
        })
        .await
    }

    async fn compliment(
        &self,
        settings: &UserSettings,
        color_tag: ColorTag,
        category: MemoryCategory,
    ) -> Result<String, CompanionError> {
        with_retry(&self.config, "compliment", || {
            self.inner.compliment(settings, color_tag, category)
        })
        .await
    }

    async fn schedule_advice(
        &self,
        settings: &UserSettings,
        title: &str,
        when_text: &str,
    ) -> Result<String, CompanionError> {
        with_retry(&self.config, "schedule_advice", || {
            self.inner.schedule_advice(settings, title, when_text)
        })
        .await
    }
}
