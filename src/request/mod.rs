//! Request trait and optional capabilities.
//!
//! Inputs are opaque to the pipeline. A request may opt into behaviors by
//! returning a capability from the matching accessor; every accessor
//! defaults to "capability absent", so plain request types implement the
//! trait with an empty body. Capability probing is an explicit per-capability
//! function, never inheritance from a shared base.

use std::error::Error as StdError;
use std::time::Duration;

/// A command or query flowing through the handler pipeline.
pub trait Request: Send + Sync {
    /// Returns the retry policy carried by this request, if any.
    fn retry_policy(&self) -> Option<RetryPolicy> {
        None
    }

    /// Returns the retry selectivity carried by this request, if any.
    ///
    /// Selectivity narrows the retry policy to specific error types; it has
    /// no effect without a policy.
    fn retry_selectivity(&self) -> Option<RetrySelectivity> {
        None
    }

    /// Returns the duration above which the timing decorator should raise a
    /// warning, if this request carries a threshold.
    fn timing_threshold(&self) -> Option<Duration> {
        None
    }

    /// Whether cached data for this request is partitioned per principal.
    fn scoped_by_user(&self) -> bool {
        false
    }

    /// Whether cached data for this request is partitioned per locale.
    fn scoped_by_locale(&self) -> bool {
        false
    }
}

/// Retry policy carried by a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryPolicy {
    /// Maximum number of re-invocations after the first failed attempt.
    pub max_retries: u32,
    /// Delay between attempts. Zero means retry immediately.
    pub retry_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy with the given retry count and no delay.
    #[must_use]
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            retry_delay: Duration::ZERO,
        }
    }

    /// Sets the delay between attempts.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

type ErrorMatcher = fn(&(dyn StdError + 'static)) -> bool;

/// Narrows retrying to specific error types.
///
/// A matcher is registered per concrete error type with [`retry_on`]. When
/// `check_sources` is set, the whole source chain of the failure is checked,
/// not just the outermost error.
///
/// [`retry_on`]: RetrySelectivity::retry_on
#[derive(Debug, Clone, Default)]
pub struct RetrySelectivity {
    matchers: Vec<ErrorMatcher>,
    check_sources: bool,
}

impl RetrySelectivity {
    /// Creates an empty selectivity matching no error types.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an error type as retryable.
    #[must_use]
    pub fn retry_on<E: StdError + 'static>(mut self) -> Self {
        fn matches<E: StdError + 'static>(error: &(dyn StdError + 'static)) -> bool {
            error.is::<E>()
        }
        self.matchers.push(matches::<E>);
        self
    }

    /// Sets whether the source chain is checked in addition to the
    /// outermost error.
    #[must_use]
    pub fn check_sources(mut self, check: bool) -> Self {
        self.check_sources = check;
        self
    }

    /// Returns true when the failure matches a registered error type.
    #[must_use]
    pub fn matches(&self, failure: &anyhow::Error) -> bool {
        let mut chain = failure.chain();
        let Some(outermost) = chain.next() else {
            return false;
        };
        if self.matches_one(outermost) {
            return true;
        }
        self.check_sources && chain.any(|inner| self.matches_one(inner))
    }

    fn matches_one(&self, error: &(dyn StdError + 'static)) -> bool {
        self.matchers.iter().any(|matcher| matcher(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("connection dropped")]
    struct ConnectionDropped;

    #[derive(Debug, Error)]
    #[error("disk full")]
    struct DiskFull;

    #[test]
    fn test_empty_selectivity_matches_nothing() {
        let selectivity = RetrySelectivity::new();
        assert!(!selectivity.matches(&anyhow::Error::new(ConnectionDropped)));
    }

    #[test]
    fn test_matches_registered_type() {
        let selectivity = RetrySelectivity::new().retry_on::<ConnectionDropped>();
        assert!(selectivity.matches(&anyhow::Error::new(ConnectionDropped)));
        assert!(!selectivity.matches(&anyhow::Error::new(DiskFull)));
    }

    #[test]
    fn test_source_chain_requires_opt_in() {
        let wrapped = anyhow::Error::new(ConnectionDropped).context("while syncing");
        let selectivity = RetrySelectivity::new().retry_on::<ConnectionDropped>();
        assert!(!selectivity.matches(&wrapped));

        let selectivity = selectivity.check_sources(true);
        assert!(selectivity.matches(&wrapped));
    }

    #[test]
    fn test_default_request_has_no_capabilities() {
        struct Plain;
        impl Request for Plain {}

        let request = Plain;
        assert!(request.retry_policy().is_none());
        assert!(request.retry_selectivity().is_none());
        assert!(request.timing_threshold().is_none());
        assert!(!request.scoped_by_user());
        assert!(!request.scoped_by_locale());
    }
}
