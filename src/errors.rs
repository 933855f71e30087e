//! Error taxonomy for handler execution.
//!
//! The pipeline distinguishes a closed set of terminal domain errors, which
//! the translation decorator converts into failed results, from transient or
//! unknown faults, which propagate untranslated and are the only errors the
//! retry decorator may suppress between attempts.

use crate::result::BrokenRule;
use thiserror::Error;

/// An error raised by a handler or a decorator.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A domain rule was violated.
    #[error("broken rule: {0}")]
    Rule(BrokenRule),

    /// A concurrent modification conflict occurred.
    #[error("concurrency conflict: {0}")]
    Concurrency(String),

    /// The requested data does not exist.
    #[error("data not found: {0}")]
    DataNotFound(String),

    /// The caller lacks permission for the operation.
    #[error("no permission: {0}")]
    NoPermission(String),

    /// An error whose message is safe to surface to the end user verbatim.
    #[error("{0}")]
    UserFacing(String),

    /// The operation was cancelled cooperatively.
    #[error("operation cancelled: {0}")]
    Cancelled(String),

    /// Any other fault. Unknown errors are programming errors or transient
    /// infrastructure faults, not domain outcomes, and are never translated.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HandlerError {
    /// Returns true for error kinds that represent a definitive domain
    /// outcome rather than a transient fault.
    ///
    /// Terminal errors are never retried, regardless of any retry
    /// selectivity carried by the input.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Rule(_)
                | Self::Concurrency(_)
                | Self::DataNotFound(_)
                | Self::NoPermission(_)
                | Self::UserFacing(_)
        )
    }
}

/// Error raised when the cache region namer is given no query type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("a query type is required to derive a cache region")]
pub struct CacheRegionError;
