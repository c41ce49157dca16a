use std::future::Future;
use std::time::Duration;

use crate::client::{ApiErrorClass, FetchError, LeetCodeError};

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_DELAY: Duration = Duration::from_secs(2);

/// Fixed-interval retry: no jitter, no exponential growth. Only transient
/// failures are retried; authentication and permanent rejections return on
/// the first attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub async fn run<T, F, Fut>(&self, mut call: F) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LeetCodeError>>,
    {
        let mut attempt = 1u32;
        loop {
            let err = match call().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            match err.classification() {
                ApiErrorClass::Auth => return Err(FetchError::Authentication(err)),
                ApiErrorClass::Permanent => return Err(FetchError::Rejected(err)),
                ApiErrorClass::Transient if attempt >= self.max_attempts => {
                    return Err(FetchError::Transient {
                        attempts: attempt,
                        source: err,
                    });
                }
                ApiErrorClass::Transient => {
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_MAX_ATTEMPTS, DEFAULT_DELAY)
    }
}
