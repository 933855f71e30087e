//! Collaborator contracts consumed by the fan-out decorators.
//!
//! Collaborators are registered per input type at composition time and are
//! read-only afterwards; each one is invoked once per pipeline execution,
//! concurrently with its siblings. All of them must tolerate a `None` input.

use crate::cancellation::CancellationToken;
use crate::errors::HandlerError;
use crate::request::Request;
use crate::result::{BrokenRule, ExecutionResult};
use async_trait::async_trait;

/// Validates an input before the inner handler runs.
#[async_trait]
pub trait Validator<I>: Send + Sync
where
    I: Request,
{
    /// Returns zero or more broken rules for the input.
    async fn validate(&self, input: Option<&I>, token: &CancellationToken) -> Vec<BrokenRule>;
}

/// Checks whether the current caller may execute an input.
#[async_trait]
pub trait PermissionChecker<I>: Send + Sync
where
    I: Request,
{
    /// Returns false to deny execution.
    async fn has_permission(&self, input: Option<&I>, token: &CancellationToken) -> bool;
}

/// Observes the lifecycle of a handler execution.
#[async_trait]
pub trait ExecutionLogger<I, T = ()>: Send + Sync
where
    I: Request,
{
    /// Called before the inner handler runs.
    async fn log_start(&self, input: Option<&I>, token: &CancellationToken);

    /// Called with the result after the inner handler returns.
    ///
    /// Not called when the inner handler fails with an error.
    async fn log_end(
        &self,
        input: Option<&I>,
        result: &ExecutionResult<T>,
        token: &CancellationToken,
    );

    /// Called with the error when the inner handler fails.
    async fn log_error(&self, input: Option<&I>, error: &HandlerError, token: &CancellationToken);
}

/// Invalidates cached query results after a successful execution.
///
/// The default [`invalidate_cache`](Self::invalidate_cache) clears every
/// region listed by [`regions_to_clear`](Self::regions_to_clear);
/// implementations with more specific needs override it.
#[async_trait]
pub trait CacheInvalidator<I>: Send + Sync
where
    I: Request,
{
    /// Returns the cache regions this invalidator owns.
    async fn regions_to_clear(&self, token: &CancellationToken) -> Vec<String>;

    /// Clears a single cache region.
    async fn clear_region(&self, region: &str, token: &CancellationToken);

    /// Invalidates all affected cache entries for a successful execution.
    async fn invalidate_cache(&self, _input: Option<&I>, token: &CancellationToken) {
        for region in self.regions_to_clear(token).await {
            self.clear_region(&region, token).await;
        }
    }
}
