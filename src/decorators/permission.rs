//! Permission decorator: concurrent pre-checks that short-circuit on denial.

use super::fan_out::fan_out;
use crate::cancellation::CancellationToken;
use crate::collaborators::PermissionChecker;
use crate::handler::{Handler, HandlerOutcome};
use crate::request::Request;
use crate::result::ExecutionResult;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Runs every registered permission checker concurrently before the inner
/// handler.
///
/// Any checker returning false denies the execution: the decorator returns
/// a failed result flagged `no_permission` without invoking the inner
/// handler. With no checkers registered the decorator is a transparent
/// pass-through.
pub struct PermissionDecorator<I, T = ()> {
    inner: Arc<dyn Handler<I, T>>,
    checkers: Vec<Arc<dyn PermissionChecker<I>>>,
}

impl<I, T> PermissionDecorator<I, T>
where
    I: Request,
{
    /// Creates a new permission decorator.
    #[must_use]
    pub fn new(
        inner: Arc<dyn Handler<I, T>>,
        checkers: Vec<Arc<dyn PermissionChecker<I>>>,
    ) -> Self {
        Self { inner, checkers }
    }
}

#[async_trait]
impl<I, T> Handler<I, T> for PermissionDecorator<I, T>
where
    I: Request + 'static,
    T: Send + Sync + 'static,
{
    async fn execute(&self, input: Option<&I>, token: &CancellationToken) -> HandlerOutcome<T> {
        if !self.checkers.is_empty() {
            let grants = fan_out(&self.checkers, |checker| {
                checker.has_permission(input, token)
            })
            .await;

            if grants.iter().any(|granted| !granted) {
                debug!(
                    input_type = std::any::type_name::<I>(),
                    "permission denied; inner handler skipped"
                );
                return Ok(ExecutionResult::no_permission());
            }
        }

        self.inner.execute(input, token).await
    }
}
