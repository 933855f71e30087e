//! Handler trait and adapters.
//!
//! A handler is a single async operation `execute(input, token) -> outcome`.
//! The innermost real handler and every decorator implement the same trait,
//! which is what lets the composition root stack decorators in any order.

use crate::cancellation::CancellationToken;
use crate::errors::HandlerError;
use crate::request::Request;
use crate::result::ExecutionResult;
use async_trait::async_trait;
use std::marker::PhantomData;

/// The outcome of a handler execution.
///
/// A failed [`ExecutionResult`] is a normal return value once translation
/// has occurred; an `Err` is an untranslated fault surfacing to the caller.
pub type HandlerOutcome<T> = Result<ExecutionResult<T>, HandlerError>;

/// A single-operation command or query handler.
///
/// A `None` input is valid and flows through the whole decorator chain
/// unchanged; collaborators must tolerate it.
#[async_trait]
pub trait Handler<I, T = ()>: Send + Sync
where
    I: Request,
{
    /// Executes the handler.
    async fn execute(&self, input: Option<&I>, token: &CancellationToken) -> HandlerOutcome<T>;
}

/// A function-based handler for closures and tests.
pub struct FnHandler<I, T, F>
where
    F: Fn(Option<&I>) -> HandlerOutcome<T> + Send + Sync,
{
    func: F,
    _marker: PhantomData<fn(&I) -> T>,
}

impl<I, T, F> FnHandler<I, T, F>
where
    F: Fn(Option<&I>) -> HandlerOutcome<T> + Send + Sync,
{
    /// Creates a new function-based handler.
    pub fn new(func: F) -> Self {
        Self {
            func,
            _marker: PhantomData,
        }
    }
}

impl<I, T, F> std::fmt::Debug for FnHandler<I, T, F>
where
    F: Fn(Option<&I>) -> HandlerOutcome<T> + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

#[async_trait]
impl<I, T, F> Handler<I, T> for FnHandler<I, T, F>
where
    I: Request,
    T: Send,
    F: Fn(Option<&I>) -> HandlerOutcome<T> + Send + Sync,
{
    async fn execute(&self, input: Option<&I>, _token: &CancellationToken) -> HandlerOutcome<T> {
        (self.func)(input)
    }
}
