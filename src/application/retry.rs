use std::time::Duration;

use serde::Deserialize;

/// Wait inserted between two consecutive attempts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DelayStrategy {
    #[default]
    Immediate,
    Fixed { millis: u64 },
    Exponential { initial_millis: u64, max_millis: u64 },
}

impl DelayStrategy {
    /// Delay to wait after the `attempt`-th failure (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match self {
            DelayStrategy::Immediate => Duration::ZERO,
            DelayStrategy::Fixed { millis } => Duration::from_millis(*millis),
            DelayStrategy::Exponential { initial_millis, max_millis } => {
                let factor = 1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
                Duration::from_millis(initial_millis.saturating_mul(factor).min(*max_millis))
            }
        }
    }
}

/// How many times a transient failure is retried, and how long to wait in between.
///
/// `max_attempts: None` retries forever. That is the default: a profile fetch
/// keeps polling until the endpoint stops answering with a block payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct RetryPolicy {
    #[serde(default)]
    pub max_attempts: Option<u32>,
    #[serde(default)]
    pub delay: DelayStrategy,
}

impl RetryPolicy {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn bounded(max_attempts: u32) -> Self {
        Self { max_attempts: Some(max_attempts.max(1)), delay: DelayStrategy::Immediate }
    }

    pub fn with_delay(mut self, delay: DelayStrategy) -> Self {
        self.delay = delay;
        self
    }

    /// Whether another attempt may follow `attempts_made` failed ones.
    pub fn allows_another(&self, attempts_made: u32) -> bool {
        self.max_attempts.map_or(true, |max| attempts_made < max)
    }
}
