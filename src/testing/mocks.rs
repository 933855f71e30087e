//! Mock handlers and collaborators for testing.

use crate::cancellation::CancellationToken;
use crate::collaborators::{
    CacheInvalidator, ExecutionLogger, PermissionChecker, Validator,
};
use crate::errors::HandlerError;
use crate::handler::{Handler, HandlerOutcome};
use crate::request::Request;
use crate::result::{BrokenRule, ExecutionResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

type ErrorFactory = Box<dyn Fn() -> HandlerError + Send + Sync>;
type SideEffect = Box<dyn Fn() + Send + Sync>;

/// A handler that always succeeds and counts invocations.
pub struct CountingHandler<I> {
    calls: AtomicUsize,
    _marker: PhantomData<fn(&I)>,
}

impl<I> CountingHandler<I> {
    /// Creates a new counting handler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            _marker: PhantomData,
        }
    }

    /// Returns the number of times the handler was invoked.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<I> Default for CountingHandler<I> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<I> Handler<I, ()> for CountingHandler<I>
where
    I: Request,
{
    async fn execute(&self, _input: Option<&I>, _token: &CancellationToken) -> HandlerOutcome<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ExecutionResult::ok(()))
    }
}

/// A handler that always fails with an error produced by a factory.
pub struct FailingHandler<I> {
    make_error: ErrorFactory,
    side_effect: Option<SideEffect>,
    calls: AtomicUsize,
    _marker: PhantomData<fn(&I)>,
}

impl<I> FailingHandler<I> {
    /// Creates a handler failing with the factory's error on every call.
    pub fn new(make_error: impl Fn() -> HandlerError + Send + Sync + 'static) -> Self {
        Self {
            make_error: Box::new(make_error),
            side_effect: None,
            calls: AtomicUsize::new(0),
            _marker: PhantomData,
        }
    }

    /// Creates a failing handler that also runs a side effect on every call.
    pub fn with_side_effect(
        make_error: impl Fn() -> HandlerError + Send + Sync + 'static,
        side_effect: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self {
            make_error: Box::new(make_error),
            side_effect: Some(Box::new(side_effect)),
            calls: AtomicUsize::new(0),
            _marker: PhantomData,
        }
    }

    /// Returns the number of times the handler was invoked.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<I> Handler<I, ()> for FailingHandler<I>
where
    I: Request,
{
    async fn execute(&self, _input: Option<&I>, _token: &CancellationToken) -> HandlerOutcome<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(side_effect) = &self.side_effect {
            side_effect();
        }
        Err((self.make_error)())
    }
}

/// A handler that fails a fixed number of times, then succeeds.
pub struct FlakyHandler<I> {
    failures_remaining: Mutex<usize>,
    make_error: ErrorFactory,
    calls: AtomicUsize,
    _marker: PhantomData<fn(&I)>,
}

impl<I> FlakyHandler<I> {
    /// Creates a handler that fails `failures` times before succeeding.
    pub fn new(
        failures: usize,
        make_error: impl Fn() -> HandlerError + Send + Sync + 'static,
    ) -> Self {
        Self {
            failures_remaining: Mutex::new(failures),
            make_error: Box::new(make_error),
            calls: AtomicUsize::new(0),
            _marker: PhantomData,
        }
    }

    /// Returns the number of times the handler was invoked.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<I> Handler<I, ()> for FlakyHandler<I>
where
    I: Request,
{
    async fn execute(&self, _input: Option<&I>, _token: &CancellationToken) -> HandlerOutcome<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut remaining = self.failures_remaining.lock();
        if *remaining > 0 {
            *remaining -= 1;
            return Err((self.make_error)());
        }
        Ok(ExecutionResult::ok(()))
    }
}

/// A handler that sleeps before succeeding.
pub struct SlowHandler<I> {
    delay: Duration,
    _marker: PhantomData<fn(&I)>,
}

impl<I> SlowHandler<I> {
    /// Creates a new slow handler.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<I> Handler<I, ()> for SlowHandler<I>
where
    I: Request,
{
    async fn execute(&self, _input: Option<&I>, _token: &CancellationToken) -> HandlerOutcome<()> {
        tokio::time::sleep(self.delay).await;
        Ok(ExecutionResult::ok(()))
    }
}

/// A handler returning the outcome produced by a factory on every call.
pub struct FnMockHandler<I, T = ()> {
    make_outcome: Box<dyn Fn() -> HandlerOutcome<T> + Send + Sync>,
    calls: AtomicUsize,
    _marker: PhantomData<fn(&I)>,
}

impl<I, T> FnMockHandler<I, T> {
    /// Creates a new mock handler.
    pub fn new(make_outcome: impl Fn() -> HandlerOutcome<T> + Send + Sync + 'static) -> Self {
        Self {
            make_outcome: Box::new(make_outcome),
            calls: AtomicUsize::new(0),
            _marker: PhantomData,
        }
    }

    /// Returns the number of times the handler was invoked.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<I, T> Handler<I, T> for FnMockHandler<I, T>
where
    I: Request,
    T: Send + Sync,
{
    async fn execute(&self, _input: Option<&I>, _token: &CancellationToken) -> HandlerOutcome<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.make_outcome)()
    }
}

/// A validator returning a fixed set of broken rules.
pub struct StaticValidator {
    rules: Vec<BrokenRule>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StaticValidator {
    /// Creates a validator that always reports the given rules.
    #[must_use]
    pub fn new(rules: Vec<BrokenRule>) -> Self {
        Self {
            rules,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Makes the validator sleep before responding.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Returns the number of times the validator was invoked.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<I> Validator<I> for StaticValidator
where
    I: Request,
{
    async fn validate(&self, _input: Option<&I>, _token: &CancellationToken) -> Vec<BrokenRule> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.rules.clone()
    }
}

/// A permission checker with a fixed verdict.
pub struct StaticPermissionChecker {
    grant: bool,
    delay: Option<Duration>,
}

impl StaticPermissionChecker {
    /// Creates a checker that always grants.
    #[must_use]
    pub fn granting() -> Self {
        Self {
            grant: true,
            delay: None,
        }
    }

    /// Creates a checker that always denies.
    #[must_use]
    pub fn denying() -> Self {
        Self {
            grant: false,
            delay: None,
        }
    }

    /// Makes the checker sleep before responding.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl<I> PermissionChecker<I> for StaticPermissionChecker
where
    I: Request,
{
    async fn has_permission(&self, _input: Option<&I>, _token: &CancellationToken) -> bool {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.grant
    }
}

/// A logger recording which hooks fired, in order.
pub struct RecordingLogger {
    events: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl RecordingLogger {
    /// Creates a new recording logger.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Makes every hook sleep before recording.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Returns the hooks that fired, in order.
    #[must_use]
    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    async fn record(&self, event: &str) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.events.lock().push(event.to_string());
    }
}

impl Default for RecordingLogger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<I, T> ExecutionLogger<I, T> for RecordingLogger
where
    I: Request,
    T: Send + Sync,
{
    async fn log_start(&self, _input: Option<&I>, _token: &CancellationToken) {
        self.record("start").await;
    }

    async fn log_end(
        &self,
        _input: Option<&I>,
        _result: &ExecutionResult<T>,
        _token: &CancellationToken,
    ) {
        self.record("end").await;
    }

    async fn log_error(
        &self,
        _input: Option<&I>,
        _error: &HandlerError,
        _token: &CancellationToken,
    ) {
        self.record("error").await;
    }
}

/// A cache invalidator recording which regions it cleared.
pub struct RecordingInvalidator {
    regions: Vec<String>,
    cleared: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl RecordingInvalidator {
    /// Creates an invalidator owning the given regions.
    #[must_use]
    pub fn new(regions: Vec<String>) -> Self {
        Self {
            regions,
            cleared: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Makes every clear sleep before recording.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Returns the regions cleared so far, in order.
    #[must_use]
    pub fn cleared(&self) -> Vec<String> {
        self.cleared.lock().clone()
    }
}

#[async_trait]
impl<I> CacheInvalidator<I> for RecordingInvalidator
where
    I: Request,
{
    async fn regions_to_clear(&self, _token: &CancellationToken) -> Vec<String> {
        self.regions.clone()
    }

    async fn clear_region(&self, region: &str, _token: &CancellationToken) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.cleared.lock().push(region.to_string());
    }
}
