//! Timing decorator: wall-clock measurement with threshold warnings.

use crate::cancellation::CancellationToken;
use crate::handler::{Handler, HandlerOutcome};
use crate::request::Request;
use crate::result::ExecutionResult;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Observes timings measured by [`TimingDecorator`].
#[async_trait]
pub trait TimingObserver<I, T = ()>: Send + Sync
where
    I: Request,
    T: Send + Sync,
{
    /// Fires after every inner call with the elapsed wall-clock time.
    ///
    /// `result` is `None` when the inner handler failed with an error.
    async fn on_completed(
        &self,
        _input: Option<&I>,
        _result: Option<&ExecutionResult<T>>,
        _elapsed: Duration,
    ) {
    }

    /// Fires additionally when the input carries a timing threshold and the
    /// elapsed time exceeded it.
    async fn on_threshold_exceeded(
        &self,
        _input: Option<&I>,
        _result: Option<&ExecutionResult<T>>,
        _elapsed: Duration,
        _threshold: Duration,
    ) {
    }
}

/// A [`TimingObserver`] that reports through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTimingObserver;

#[async_trait]
impl<I, T> TimingObserver<I, T> for TracingTimingObserver
where
    I: Request,
    T: Send + Sync,
{
    async fn on_completed(
        &self,
        _input: Option<&I>,
        _result: Option<&ExecutionResult<T>>,
        elapsed: Duration,
    ) {
        debug!(
            input_type = std::any::type_name::<I>(),
            ?elapsed,
            "handler execution timed"
        );
    }

    async fn on_threshold_exceeded(
        &self,
        _input: Option<&I>,
        _result: Option<&ExecutionResult<T>>,
        elapsed: Duration,
        threshold: Duration,
    ) {
        warn!(
            input_type = std::any::type_name::<I>(),
            ?elapsed,
            ?threshold,
            "handler execution exceeded its timing threshold"
        );
    }
}

/// Measures the wall-clock duration of exactly one inner call.
///
/// The completed hook always fires, including when the inner handler fails;
/// timing is observational and never suppresses errors. When the input
/// carries a timing threshold and the elapsed time exceeds it, the warning
/// hook fires as well.
pub struct TimingDecorator<I, T = ()> {
    inner: Arc<dyn Handler<I, T>>,
    observer: Arc<dyn TimingObserver<I, T>>,
}

impl<I, T> TimingDecorator<I, T>
where
    I: Request + 'static,
    T: Send + Sync + 'static,
{
    /// Creates a timing decorator reporting through `tracing`.
    #[must_use]
    pub fn new(inner: Arc<dyn Handler<I, T>>) -> Self {
        Self {
            inner,
            observer: Arc::new(TracingTimingObserver),
        }
    }

    /// Sets the observer the measured timings are reported to.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn TimingObserver<I, T>>) -> Self {
        self.observer = observer;
        self
    }
}

#[async_trait]
impl<I, T> Handler<I, T> for TimingDecorator<I, T>
where
    I: Request + 'static,
    T: Send + Sync + 'static,
{
    async fn execute(&self, input: Option<&I>, token: &CancellationToken) -> HandlerOutcome<T> {
        let started = Instant::now();
        let outcome = self.inner.execute(input, token).await;
        let elapsed = started.elapsed();

        let result = outcome.as_ref().ok();
        self.observer.on_completed(input, result, elapsed).await;

        if let Some(threshold) = input.and_then(|request| request.timing_threshold()) {
            if elapsed > threshold {
                self.observer
                    .on_threshold_exceeded(input, result, elapsed, threshold)
                    .await;
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HandlerError;
    use crate::testing::{CountingHandler, FailingHandler, SlowHandler};
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    struct Plain;
    impl Request for Plain {}

    struct Thresholded(Duration);
    impl Request for Thresholded {
        fn timing_threshold(&self) -> Option<Duration> {
            Some(self.0)
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        completions: Mutex<Vec<(bool, Duration)>>,
        warnings: Mutex<Vec<(Duration, Duration)>>,
    }

    #[async_trait]
    impl<I> TimingObserver<I> for RecordingObserver
    where
        I: Request,
    {
        async fn on_completed(
            &self,
            _input: Option<&I>,
            result: Option<&ExecutionResult<()>>,
            elapsed: Duration,
        ) {
            self.completions.lock().push((result.is_some(), elapsed));
        }

        async fn on_threshold_exceeded(
            &self,
            _input: Option<&I>,
            _result: Option<&ExecutionResult<()>>,
            elapsed: Duration,
            threshold: Duration,
        ) {
            self.warnings.lock().push((elapsed, threshold));
        }
    }

    #[tokio::test]
    async fn test_completed_hook_fires_on_success() {
        let inner = Arc::new(CountingHandler::<Plain>::new());
        let observer = Arc::new(RecordingObserver::default());
        let decorator = TimingDecorator::new(inner.clone()).with_observer(observer.clone());
        let token = CancellationToken::new();

        decorator.execute(Some(&Plain), &token).await.unwrap();

        let completions = observer.completions.lock();
        assert_eq!(completions.len(), 1);
        assert!(completions[0].0, "result should be present on success");
        assert_eq!(inner.call_count(), 1);
    }

    #[tokio::test]
    async fn test_completed_hook_fires_on_error_and_error_propagates() {
        let inner = Arc::new(FailingHandler::<Plain>::new(|| {
            HandlerError::Other(anyhow::anyhow!("boom"))
        }));
        let observer = Arc::new(RecordingObserver::default());
        let decorator = TimingDecorator::new(inner).with_observer(observer.clone());
        let token = CancellationToken::new();

        let error = decorator.execute(Some(&Plain), &token).await.unwrap_err();

        assert!(matches!(error, HandlerError::Other(_)));
        let completions = observer.completions.lock();
        assert_eq!(completions.len(), 1);
        assert!(!completions[0].0, "result should be absent on error");
    }

    #[tokio::test]
    async fn test_threshold_exceeded_fires_warning() {
        let inner = Arc::new(SlowHandler::<Thresholded>::new(Duration::from_millis(30)));
        let observer = Arc::new(RecordingObserver::default());
        let decorator = TimingDecorator::new(inner).with_observer(observer.clone());
        let token = CancellationToken::new();

        let input = Thresholded(Duration::from_millis(5));
        decorator.execute(Some(&input), &token).await.unwrap();

        let warnings = observer.warnings.lock();
        assert_eq!(warnings.len(), 1);
        let (elapsed, threshold) = warnings[0];
        assert!(elapsed > threshold);
        assert_eq!(threshold, Duration::from_millis(5));
    }

    #[tokio::test]
    async fn test_fast_execution_fires_no_warning() {
        let inner = Arc::new(CountingHandler::<Thresholded>::new());
        let observer = Arc::new(RecordingObserver::default());
        let decorator = TimingDecorator::new(inner).with_observer(observer.clone());
        let token = CancellationToken::new();

        let input = Thresholded(Duration::from_secs(5));
        decorator.execute(Some(&input), &token).await.unwrap();

        assert_eq!(observer.completions.lock().len(), 1);
        assert!(observer.warnings.lock().is_empty());
    }

    #[tokio::test]
    async fn test_no_threshold_capability_means_no_warning() {
        let inner = Arc::new(SlowHandler::<Plain>::new(Duration::from_millis(10)));
        let observer = Arc::new(RecordingObserver::default());
        let decorator = TimingDecorator::new(inner).with_observer(observer.clone());
        let token = CancellationToken::new();

        decorator.execute(Some(&Plain), &token).await.unwrap();

        assert!(observer.warnings.lock().is_empty());
    }
}
