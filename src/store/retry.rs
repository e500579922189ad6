// ABOUTME: Bounded retry with a fixed backoff schedule.
// ABOUTME: Terminal outcomes (like a missing key) return immediately without using the budget.

use std::future::Future;
use std::time::Duration;

use super::backend::BackendError;
use crate::config::RetryConfig;

/// Retry schedule for storage requests. One attempt plus one retry per delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    delays: Vec<Duration>,
}

/// A request that gave up, with the number of attempts made.
#[derive(Debug)]
pub struct GaveUp {
    pub attempts: usize,
    pub error: BackendError,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn new(delays: Vec<Duration>) -> Self {
        Self { delays }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.delays.clone())
    }

    /// Same number of retries with no waiting, for tests.
    pub fn immediate(retries: usize) -> Self {
        Self::new(vec![Duration::ZERO; retries])
    }

    pub fn max_attempts(&self) -> usize {
        self.delays.len() + 1
    }

    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    /// Run `op` until it succeeds, fails terminally, or the schedule runs out.
    pub async fn run<T, F, Fut, P>(
        &self,
        operation: &str,
        key: &str,
        mut op: F,
        is_terminal: P,
    ) -> Result<T, GaveUp>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, BackendError>>,
        P: Fn(&BackendError) -> bool,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let error = match op().await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if is_terminal(&error) {
                return Err(GaveUp {
                    attempts: attempt,
                    error,
                });
            }

            let Some(delay) = self.delays.get(attempt - 1) else {
                tracing::error!(
                    operation,
                    key,
                    attempts = attempt,
                    "storage request failed, giving up: {error}"
                );
                return Err(GaveUp {
                    attempts: attempt,
                    error,
                });
            };

            tracing::warn!(
                operation,
                key,
                attempt,
                max_attempts = self.max_attempts(),
                "storage request failed, retrying in {delay:?}: {error}"
            );
            tokio::time::sleep(*delay).await;
        }
    }
}
