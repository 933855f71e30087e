//! Validation decorator: concurrent pre-checks that short-circuit on
//! broken rules.

use super::fan_out::fan_out;
use crate::cancellation::CancellationToken;
use crate::collaborators::Validator;
use crate::handler::{Handler, HandlerOutcome};
use crate::request::Request;
use crate::result::{BrokenRule, ExecutionResult};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Runs every registered validator concurrently against the input before
/// the inner handler.
///
/// When any validator reports broken rules, the merged, deduplicated set is
/// returned as a failed result and the inner handler is never invoked. With
/// no validators registered the decorator is a transparent pass-through.
pub struct ValidationDecorator<I, T = ()> {
    inner: Arc<dyn Handler<I, T>>,
    validators: Vec<Arc<dyn Validator<I>>>,
}

impl<I, T> ValidationDecorator<I, T>
where
    I: Request,
{
    /// Creates a new validation decorator.
    #[must_use]
    pub fn new(inner: Arc<dyn Handler<I, T>>, validators: Vec<Arc<dyn Validator<I>>>) -> Self {
        Self { inner, validators }
    }
}

#[async_trait]
impl<I, T> Handler<I, T> for ValidationDecorator<I, T>
where
    I: Request + 'static,
    T: Send + Sync + 'static,
{
    async fn execute(&self, input: Option<&I>, token: &CancellationToken) -> HandlerOutcome<T> {
        if !self.validators.is_empty() {
            let rule_sets = fan_out(&self.validators, |validator| {
                validator.validate(input, token)
            })
            .await;

            let rules: Vec<BrokenRule> = rule_sets.into_iter().flatten().collect();
            if !rules.is_empty() {
                debug!(
                    input_type = std::any::type_name::<I>(),
                    rule_count = rules.len(),
                    "validation failed; inner handler skipped"
                );
                return Ok(ExecutionResult::failed(rules));
            }
        }

        self.inner.execute(input, token).await
    }
}
