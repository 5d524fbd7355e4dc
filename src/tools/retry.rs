// src/tools/retry.rs

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::warn;

use crate::error::ToolError;

/// How a backoff delay is waited out. [`thread::sleep`] unless replaced.
pub type Sleeper = Arc<dyn Fn(Duration) + Send + Sync>;

pub fn thread_sleeper() -> Sleeper {
    Arc::new(thread::sleep)
}

/// Bounded retry with linear backoff (`backoff * attempt`).
///
/// The delay after attempt `n` is `backoff * n`; nothing is waited after the
/// final attempt.
#[derive(Clone)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
    sleeper: Sleeper,
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("attempts", &self.attempts)
            .field("backoff", &self.backoff)
            .finish_non_exhaustive()
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32, backoff: Duration) -> Self {
        Self {
            attempts,
            backoff,
            sleeper: thread_sleeper(),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Sleeper) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn run<T>(
        &self,
        operation: &'static str,
        mut call: impl FnMut() -> Result<T, ToolError>,
    ) -> Result<T, ToolError> {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;

        loop {
            match call() {
                Ok(value) => return Ok(value),
                Err(e) if attempt < attempts => {
                    warn!(operation, attempt, error = %e, "tool call failed, retrying");
                    (self.sleeper)(self.backoff * attempt);
                    attempt += 1;
                }
                Err(e) => {
                    return Err(ToolError::Exhausted {
                        operation,
                        attempts,
                        last: Box::new(e),
                    });
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}
