//! Retry decorator for generation clients.

use super::client::GenerationClient;
use super::error::GenerationError;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Bounded exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Delay before attempt `attempt + 1`, doubling each time.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_backoff
            .saturating_mul(1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX))
    }
}

/// Wraps a client and retries transient failures
/// (see [`GenerationError::is_retryable`]).
pub struct RetryingClient<C> {
    inner: C,
    policy: RetryPolicy,
}

impl<C: GenerationClient> RetryingClient<C> {
    pub fn new(inner: C, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<C: GenerationClient> GenerationClient for RetryingClient<C> {
    async fn send(
        &self,
        system_prompt: &str,
        user_payload: &str,
        structured_output: bool,
    ) -> Result<String, GenerationError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.inner.send(system_prompt, user_payload, structured_output).await {
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    let backoff = self.policy.backoff(attempt);
                    warn!(attempt, ?backoff, error = %e, "generation request failed, retrying");
                    sleep(backoff).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Replays scripted results and counts calls.
    struct ScriptedClient {
        script: Mutex<Vec<Result<String, GenerationError>>>,
        calls: AtomicU32,
    }

    impl ScriptedClient {
        fn new(mut script: Vec<Result<String, GenerationError>>) -> Self {
            script.reverse();
            Self {
                script: Mutex::new(script),
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerationClient for ScriptedClient {
        async fn send(&self, _: &str, _: &str, _: bool) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(GenerationError::Network("script exhausted".into())))
        }
    }

    fn no_wait(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_backoff: Duration::ZERO,
        }
    }

    fn server_error() -> GenerationError {
        GenerationError::Http {
            status: 503,
            message: "overloaded".into(),
        }
    }

    #[tokio::test]
    async fn retries_transient_errors_until_success() {
        let client = RetryingClient::new(
            ScriptedClient::new(vec![Err(server_error()), Ok("done".into())]),
            no_wait(3),
        );
        assert_eq!(client.send("s", "u", true).await.unwrap(), "done");
        assert_eq!(client.inner.calls(), 2);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let client = RetryingClient::new(
            ScriptedClient::new(vec![Err(server_error()), Err(server_error()), Err(server_error())]),
            no_wait(2),
        );
        let result = client.send("s", "u", true).await;
        assert!(matches!(result, Err(GenerationError::Http { status: 503, .. })));
        assert_eq!(client.inner.calls(), 2);
    }

    #[tokio::test]
    async fn does_not_retry_permanent_errors() {
        let client = RetryingClient::new(
            ScriptedClient::new(vec![Err(GenerationError::NoCredential), Ok("unused".into())]),
            no_wait(5),
        );
        assert!(matches!(
            client.send("s", "u", true).await,
            Err(GenerationError::NoCredential)
        ));
        assert_eq!(client.inner.calls(), 1);
    }

    #[test]
    fn backoff_doubles() {
        let policy = RetryPolicy {
            max_attempts: 4,
            base_backoff: Duration::from_millis(100),
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(400));
    }
}
