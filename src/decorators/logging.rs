//! Logging decorator: concurrent start/end/error hooks around the inner
//! handler.

use super::fan_out::fan_out;
use crate::cancellation::CancellationToken;
use crate::collaborators::ExecutionLogger;
use crate::handler::{Handler, HandlerOutcome};
use crate::request::Request;
use async_trait::async_trait;
use std::sync::Arc;

/// Invokes every registered logger's hooks around the inner handler.
///
/// Start hooks run concurrently and are awaited before the inner handler
/// executes. On success the end hooks run concurrently with the result; on
/// error the error hooks run concurrently with the error and the end hooks
/// are not called. The error always propagates afterwards.
pub struct LoggingDecorator<I, T = ()> {
    inner: Arc<dyn Handler<I, T>>,
    loggers: Vec<Arc<dyn ExecutionLogger<I, T>>>,
}

impl<I, T> LoggingDecorator<I, T>
where
    I: Request,
{
    /// Creates a new logging decorator.
    #[must_use]
    pub fn new(
        inner: Arc<dyn Handler<I, T>>,
        loggers: Vec<Arc<dyn ExecutionLogger<I, T>>>,
    ) -> Self {
        Self { inner, loggers }
    }
}

#[async_trait]
impl<I, T> Handler<I, T> for LoggingDecorator<I, T>
where
    I: Request + 'static,
    T: Send + Sync + 'static,
{
    async fn execute(&self, input: Option<&I>, token: &CancellationToken) -> HandlerOutcome<T> {
        if self.loggers.is_empty() {
            return self.inner.execute(input, token).await;
        }

        fan_out(&self.loggers, |logger| logger.log_start(input, token)).await;

        match self.inner.execute(input, token).await {
            Ok(result) => {
                fan_out(&self.loggers, |logger| {
                    logger.log_end(input, &result, token)
                })
                .await;
                Ok(result)
            }
            Err(error) => {
                fan_out(&self.loggers, |logger| {
                    logger.log_error(input, &error, token)
                })
                .await;
                Err(error)
            }
        }
    }
}
