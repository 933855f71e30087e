//! Retry decorator driven by a policy carried on the input.

use crate::cancellation::CancellationToken;
use crate::errors::HandlerError;
use crate::handler::{Handler, HandlerOutcome};
use crate::request::{Request, RetrySelectivity};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Re-invokes the inner handler on failure according to the retry policy
/// carried by the input.
///
/// Inputs without a policy (or with `max_retries == 0`, or a missing input)
/// execute exactly once with the outcome propagated unchanged. Terminal
/// errors and cancellations are definitive outcomes, never retried, even
/// when an input's selectivity lists them. After the final attempt the last
/// error is returned unchanged; translating it is the concern of an outer
/// decorator.
pub struct RetryDecorator<I, T = ()> {
    inner: Arc<dyn Handler<I, T>>,
}

impl<I, T> RetryDecorator<I, T>
where
    I: Request,
{
    /// Creates a new retry decorator.
    #[must_use]
    pub fn new(inner: Arc<dyn Handler<I, T>>) -> Self {
        Self { inner }
    }
}

fn should_retry(error: &HandlerError, selectivity: Option<&RetrySelectivity>) -> bool {
    match error {
        // Unknown faults are presumed transient unless the input narrows
        // retrying to specific error types.
        HandlerError::Other(cause) => {
            selectivity.map_or(true, |selectivity| selectivity.matches(cause))
        }
        // Terminal kinds and cancellations are definitive outcomes.
        _ => false,
    }
}

#[async_trait]
impl<I, T> Handler<I, T> for RetryDecorator<I, T>
where
    I: Request + 'static,
    T: Send + Sync + 'static,
{
    async fn execute(&self, input: Option<&I>, token: &CancellationToken) -> HandlerOutcome<T> {
        let Some(policy) = input
            .and_then(|request| request.retry_policy())
            .filter(|policy| policy.max_retries > 0)
        else {
            return self.inner.execute(input, token).await;
        };

        let selectivity = input.and_then(|request| request.retry_selectivity());
        let mut remaining = policy.max_retries;

        loop {
            token.ensure_active()?;

            match self.inner.execute(input, token).await {
                Ok(result) => return Ok(result),
                Err(error) => {
                    if remaining == 0 || !should_retry(&error, selectivity.as_ref()) {
                        return Err(error);
                    }
                    remaining -= 1;
                    debug!(
                        input_type = std::any::type_name::<I>(),
                        remaining, %error,
                        "handler attempt failed; retrying"
                    );
                }
            }

            if !policy.retry_delay.is_zero() {
                tokio::select! {
                    () = tokio::time::sleep(policy.retry_delay) => {}
                    () = token.cancelled() => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RetryPolicy;
    use crate::result::BrokenRule;
    use crate::testing::{CountingHandler, FailingHandler, FlakyHandler};
    use pretty_assertions::assert_eq;
    use std::time::{Duration, Instant};
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("connection dropped")]
    struct ConnectionDropped;

    #[derive(Debug, Error)]
    #[error("disk full")]
    struct DiskFull;

    struct Plain;
    impl Request for Plain {}

    #[derive(Default)]
    struct Retrying {
        policy: RetryPolicy,
        selectivity: Option<RetrySelectivity>,
    }

    impl Request for Retrying {
        fn retry_policy(&self) -> Option<RetryPolicy> {
            Some(self.policy)
        }

        fn retry_selectivity(&self) -> Option<RetrySelectivity> {
            self.selectivity.clone()
        }
    }

    fn transient() -> HandlerError {
        HandlerError::Other(anyhow::Error::new(ConnectionDropped))
    }

    #[tokio::test]
    async fn test_no_policy_executes_exactly_once() {
        let inner = Arc::new(FailingHandler::<Plain>::new(transient));
        let decorator = RetryDecorator::new(inner.clone());
        let token = CancellationToken::new();

        let error = decorator.execute(Some(&Plain), &token).await.unwrap_err();

        assert!(matches!(error, HandlerError::Other(_)));
        assert_eq!(inner.call_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_input_executes_exactly_once() {
        let inner = Arc::new(FailingHandler::<Retrying>::new(transient));
        let decorator = RetryDecorator::new(inner.clone());
        let token = CancellationToken::new();

        let _ = decorator.execute(None, &token).await.unwrap_err();
        assert_eq!(inner.call_count(), 1);
    }

    #[tokio::test]
    async fn test_zero_max_retries_executes_exactly_once() {
        let inner = Arc::new(FailingHandler::<Retrying>::new(transient));
        let decorator = RetryDecorator::new(inner.clone());
        let token = CancellationToken::new();

        let input = Retrying::default();
        let _ = decorator.execute(Some(&input), &token).await.unwrap_err();
        assert_eq!(inner.call_count(), 1);
    }

    #[tokio::test]
    async fn test_always_failing_handler_runs_n_plus_one_attempts() {
        let inner = Arc::new(FailingHandler::<Retrying>::new(transient));
        let decorator = RetryDecorator::new(inner.clone());
        let token = CancellationToken::new();

        let input = Retrying {
            policy: RetryPolicy::new(3),
            ..Retrying::default()
        };
        let error = decorator.execute(Some(&input), &token).await.unwrap_err();

        assert!(matches!(error, HandlerError::Other(_)));
        assert_eq!(inner.call_count(), 4);
    }

    #[tokio::test]
    async fn test_success_after_failures_stops_retrying() {
        let inner = Arc::new(FlakyHandler::<Retrying>::new(2, transient));
        let decorator = RetryDecorator::new(inner.clone());
        let token = CancellationToken::new();

        let input = Retrying {
            policy: RetryPolicy::new(5),
            ..Retrying::default()
        };
        let result = decorator.execute(Some(&input), &token).await.unwrap();

        assert!(result.is_successful());
        assert_eq!(inner.call_count(), 3);
    }

    #[tokio::test]
    async fn test_delay_elapses_between_attempts() {
        let delay = Duration::from_millis(50);
        let inner = Arc::new(FailingHandler::<Retrying>::new(transient));
        let decorator = RetryDecorator::new(inner.clone());
        let token = CancellationToken::new();

        let input = Retrying {
            policy: RetryPolicy::new(2).with_delay(delay),
            ..Retrying::default()
        };

        let started = Instant::now();
        let _ = decorator.execute(Some(&input), &token).await.unwrap_err();
        let elapsed = started.elapsed();

        assert_eq!(inner.call_count(), 3);
        assert!(elapsed >= delay * 2);
    }

    #[tokio::test]
    async fn test_terminal_errors_are_never_retried() {
        let terminal_errors: Vec<fn() -> HandlerError> = vec![
            || HandlerError::Rule(BrokenRule::new("violated")),
            || HandlerError::Concurrency("stale row".into()),
            || HandlerError::DataNotFound("order 7".into()),
            || HandlerError::NoPermission("not admin".into()),
            || HandlerError::UserFacing("quota exceeded".into()),
        ];

        for make_error in terminal_errors {
            let inner = Arc::new(FailingHandler::<Retrying>::new(make_error));
            let decorator = RetryDecorator::new(inner.clone());
            let token = CancellationToken::new();

            let input = Retrying {
                policy: RetryPolicy::new(5),
                ..Retrying::default()
            };
            let _ = decorator.execute(Some(&input), &token).await.unwrap_err();
            assert_eq!(inner.call_count(), 1);
        }
    }

    #[tokio::test]
    async fn test_selectivity_retries_only_listed_types() {
        let inner = Arc::new(FailingHandler::<Retrying>::new(transient));
        let decorator = RetryDecorator::new(inner.clone());
        let token = CancellationToken::new();

        // ConnectionDropped is listed: retries happen.
        let input = Retrying {
            policy: RetryPolicy::new(2),
            selectivity: Some(RetrySelectivity::new().retry_on::<ConnectionDropped>()),
        };
        let _ = decorator.execute(Some(&input), &token).await.unwrap_err();
        assert_eq!(inner.call_count(), 3);

        // DiskFull is not listed: fail on the first attempt.
        let inner = Arc::new(FailingHandler::<Retrying>::new(|| {
            HandlerError::Other(anyhow::Error::new(DiskFull))
        }));
        let decorator = RetryDecorator::new(inner.clone());
        let input = Retrying {
            policy: RetryPolicy::new(2),
            selectivity: Some(RetrySelectivity::new().retry_on::<ConnectionDropped>()),
        };
        let _ = decorator.execute(Some(&input), &token).await.unwrap_err();
        assert_eq!(inner.call_count(), 1);
    }

    #[tokio::test]
    async fn test_selectivity_with_sources_matches_wrapped_errors() {
        let inner = Arc::new(FailingHandler::<Retrying>::new(|| {
            HandlerError::Other(anyhow::Error::new(ConnectionDropped).context("while syncing"))
        }));
        let decorator = RetryDecorator::new(inner.clone());
        let token = CancellationToken::new();

        let input = Retrying {
            policy: RetryPolicy::new(1),
            selectivity: Some(
                RetrySelectivity::new()
                    .retry_on::<ConnectionDropped>()
                    .check_sources(true),
            ),
        };
        let _ = decorator.execute(Some(&input), &token).await.unwrap_err();
        assert_eq!(inner.call_count(), 2);
    }

    #[tokio::test]
    async fn test_cancellation_prevents_further_attempts() {
        let token = Arc::new(CancellationToken::new());
        let cancel_token = Arc::clone(&token);

        let inner = Arc::new(FailingHandler::<Retrying>::with_side_effect(
            transient,
            move || cancel_token.cancel("shutdown"),
        ));
        let decorator = RetryDecorator::new(inner.clone());

        let input = Retrying {
            policy: RetryPolicy::new(5).with_delay(Duration::from_millis(10)),
            ..Retrying::default()
        };
        let error = decorator.execute(Some(&input), &token).await.unwrap_err();

        assert!(matches!(error, HandlerError::Cancelled(_)));
        assert_eq!(inner.call_count(), 1);
    }

    #[tokio::test]
    async fn test_cancellation_aborts_a_long_delay_early() {
        let token = Arc::new(CancellationToken::new());
        let cancel_token = Arc::clone(&token);

        let inner = Arc::new(FailingHandler::<Retrying>::with_side_effect(
            transient,
            move || cancel_token.cancel("shutdown"),
        ));
        let decorator = RetryDecorator::new(inner.clone());

        let input = Retrying {
            policy: RetryPolicy::new(1).with_delay(Duration::from_secs(60)),
            ..Retrying::default()
        };

        let started = Instant::now();
        let error = decorator.execute(Some(&input), &token).await.unwrap_err();
        let elapsed = started.elapsed();

        assert!(matches!(error, HandlerError::Cancelled(_)));
        assert!(elapsed < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_successful_input_without_policy_executes_once() {
        let inner = Arc::new(CountingHandler::<Plain>::new());
        let decorator = RetryDecorator::new(inner.clone());
        let token = CancellationToken::new();

        let result = decorator.execute(Some(&Plain), &token).await.unwrap();

        assert!(result.is_successful());
        assert_eq!(inner.call_count(), 1);
    }
}
