//! Error-translation decorator: converts the closed taxonomy of terminal
//! errors into failed results.

use crate::cancellation::CancellationToken;
use crate::errors::HandlerError;
use crate::handler::{Handler, HandlerOutcome};
use crate::request::Request;
use crate::result::{BrokenRule, ExecutionResult};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Observes translations performed by [`TranslationDecorator`].
///
/// Each hook is invoked exactly once per matching error, before the failed
/// result is produced, allowing side-effecting handling such as telemetry.
/// Every hook defaults to a no-op.
#[async_trait]
pub trait TranslationObserver<I>: Send + Sync
where
    I: Request,
{
    /// A broken-rule violation was translated.
    async fn on_broken_rule(&self, _input: Option<&I>, _rule: &BrokenRule) {}

    /// A concurrency conflict was translated.
    async fn on_concurrency_conflict(&self, _input: Option<&I>, _detail: &str) {}

    /// A data-not-found error was translated.
    async fn on_data_not_found(&self, _input: Option<&I>, _detail: &str) {}

    /// A permission denial was translated.
    async fn on_no_permission(&self, _input: Option<&I>, _detail: &str) {}

    /// A user-facing error was translated.
    async fn on_user_facing(&self, _input: Option<&I>, _message: &str) {}
}

/// A [`TranslationObserver`] that records translations through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTranslationObserver;

#[async_trait]
impl<I> TranslationObserver<I> for TracingTranslationObserver
where
    I: Request,
{
    async fn on_broken_rule(&self, _input: Option<&I>, rule: &BrokenRule) {
        debug!(input_type = std::any::type_name::<I>(), %rule, "broken rule translated to failed result");
    }

    async fn on_concurrency_conflict(&self, _input: Option<&I>, detail: &str) {
        warn!(input_type = std::any::type_name::<I>(), detail, "concurrency conflict translated to failed result");
    }

    async fn on_data_not_found(&self, _input: Option<&I>, detail: &str) {
        debug!(input_type = std::any::type_name::<I>(), detail, "data not found translated to failed result");
    }

    async fn on_no_permission(&self, _input: Option<&I>, detail: &str) {
        warn!(input_type = std::any::type_name::<I>(), detail, "permission denial translated to failed result");
    }

    async fn on_user_facing(&self, _input: Option<&I>, message: &str) {
        debug!(input_type = std::any::type_name::<I>(), message, "user-facing error translated to failed result");
    }
}

struct NoOpObserver;

#[async_trait]
impl<I> TranslationObserver<I> for NoOpObserver where I: Request {}

/// Converts terminal errors raised by the inner handler into failed results.
///
/// The closed taxonomy is matched in priority order: broken rule, then
/// concurrency conflict, then data-not-found, then permission denial, then
/// user-facing error. Anything outside the taxonomy - cancellations and
/// unknown faults - propagates unchanged; unknown errors are programming
/// errors, not domain outcomes.
pub struct TranslationDecorator<I, T = ()> {
    inner: Arc<dyn Handler<I, T>>,
    observer: Arc<dyn TranslationObserver<I>>,
}

impl<I, T> TranslationDecorator<I, T>
where
    I: Request + 'static,
{
    /// Creates a translation decorator with no-op hooks.
    #[must_use]
    pub fn new(inner: Arc<dyn Handler<I, T>>) -> Self {
        Self {
            inner,
            observer: Arc::new(NoOpObserver),
        }
    }

    /// Sets the observer invoked when an error is translated.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn TranslationObserver<I>>) -> Self {
        self.observer = observer;
        self
    }
}

#[async_trait]
impl<I, T> Handler<I, T> for TranslationDecorator<I, T>
where
    I: Request + 'static,
    T: Send + Sync + 'static,
{
    async fn execute(&self, input: Option<&I>, token: &CancellationToken) -> HandlerOutcome<T> {
        match self.inner.execute(input, token).await {
            Ok(result) => Ok(result),
            Err(HandlerError::Rule(rule)) => {
                self.observer.on_broken_rule(input, &rule).await;
                Ok(ExecutionResult::failed(vec![rule]))
            }
            Err(HandlerError::Concurrency(detail)) => {
                self.observer.on_concurrency_conflict(input, &detail).await;
                Ok(ExecutionResult::concurrency_conflict())
            }
            Err(HandlerError::DataNotFound(detail)) => {
                self.observer.on_data_not_found(input, &detail).await;
                Ok(ExecutionResult::data_not_found())
            }
            Err(HandlerError::NoPermission(detail)) => {
                self.observer.on_no_permission(input, &detail).await;
                Ok(ExecutionResult::no_permission())
            }
            Err(HandlerError::UserFacing(message)) => {
                self.observer.on_user_facing(input, &message).await;
                Ok(ExecutionResult::failed_with_message(message))
            }
            Err(error) => Err(error),
        }
    }
}
