//! Cache-invalidation decorator: concurrent post-invalidation after a
//! successful execution.

use super::fan_out::fan_out;
use crate::cancellation::CancellationToken;
use crate::collaborators::CacheInvalidator;
use crate::handler::{Handler, HandlerOutcome};
use crate::request::Request;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Invokes every registered cache invalidator concurrently after the inner
/// handler, and only when it returned a successful result.
///
/// Failed results and errors leave the cache untouched; an error propagates
/// without invoking any invalidator.
pub struct CacheInvalidationDecorator<I, T = ()> {
    inner: Arc<dyn Handler<I, T>>,
    invalidators: Vec<Arc<dyn CacheInvalidator<I>>>,
}

impl<I, T> CacheInvalidationDecorator<I, T>
where
    I: Request,
{
    /// Creates a new cache-invalidation decorator.
    #[must_use]
    pub fn new(
        inner: Arc<dyn Handler<I, T>>,
        invalidators: Vec<Arc<dyn CacheInvalidator<I>>>,
    ) -> Self {
        Self { inner, invalidators }
    }
}

#[async_trait]
impl<I, T> Handler<I, T> for CacheInvalidationDecorator<I, T>
where
    I: Request + 'static,
    T: Send + Sync + 'static,
{
    async fn execute(&self, input: Option<&I>, token: &CancellationToken) -> HandlerOutcome<T> {
        let result = self.inner.execute(input, token).await?;

        if result.is_successful() && !self.invalidators.is_empty() {
            debug!(
                input_type = std::any::type_name::<I>(),
                invalidator_count = self.invalidators.len(),
                "invalidating caches after successful execution"
            );
            fan_out(&self.invalidators, |invalidator| {
                invalidator.invalidate_cache(input, token)
            })
            .await;
        }

        Ok(result)
    }
}
