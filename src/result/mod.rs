//! Execution result type with factory methods for the closed failure taxonomy.

mod broken_rule;

pub use broken_rule::BrokenRule;

use serde::{Deserialize, Serialize};

/// The result of executing a handler pipeline.
///
/// `ExecutionResult` is immutable once created: every pipeline stage that
/// needs a different outcome produces a new result rather than mutating the
/// one it received. The payload type `T` defaults to `()` for command
/// handlers; query handlers carry their typed value in `payload`, which is
/// only populated on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult<T = ()> {
    /// Whether the execution succeeded.
    pub successful: bool,

    /// The success payload, present only when `successful` is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<T>,

    /// Validation failures, deduplicated by structural equality.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub broken_rules: Vec<BrokenRule>,

    /// A user-facing error message, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// The caller lacks permission for the operation.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub no_permission: bool,

    /// The requested data does not exist.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub data_not_found: bool,

    /// A concurrent modification conflict occurred.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub concurrency_conflict: bool,
}

impl<T> ExecutionResult<T> {
    fn failure() -> Self {
        Self {
            successful: false,
            payload: None,
            broken_rules: Vec::new(),
            error_message: None,
            no_permission: false,
            data_not_found: false,
            concurrency_conflict: false,
        }
    }

    /// Creates a successful result carrying a payload.
    #[must_use]
    pub fn ok(payload: T) -> Self {
        Self {
            successful: true,
            payload: Some(payload),
            broken_rules: Vec::new(),
            error_message: None,
            no_permission: false,
            data_not_found: false,
            concurrency_conflict: false,
        }
    }

    /// Creates a failed result carrying broken rules.
    ///
    /// Rules are deduplicated by structural equality while preserving the
    /// order in which they were reported.
    #[must_use]
    pub fn failed(rules: impl IntoIterator<Item = BrokenRule>) -> Self {
        let mut deduped: Vec<BrokenRule> = Vec::new();
        for rule in rules {
            if !deduped.contains(&rule) {
                deduped.push(rule);
            }
        }
        Self {
            broken_rules: deduped,
            ..Self::failure()
        }
    }

    /// Creates a failed result carrying a user-facing error message.
    #[must_use]
    pub fn failed_with_message(message: impl Into<String>) -> Self {
        Self {
            error_message: Some(message.into()),
            ..Self::failure()
        }
    }

    /// Creates a failed result flagged as a permission denial.
    #[must_use]
    pub fn no_permission() -> Self {
        Self {
            no_permission: true,
            ..Self::failure()
        }
    }

    /// Creates a failed result flagged as data-not-found.
    #[must_use]
    pub fn data_not_found() -> Self {
        Self {
            data_not_found: true,
            ..Self::failure()
        }
    }

    /// Creates a failed result flagged as a concurrency conflict.
    #[must_use]
    pub fn concurrency_conflict() -> Self {
        Self {
            concurrency_conflict: true,
            ..Self::failure()
        }
    }

    /// Returns true if the execution succeeded.
    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.successful
    }

    /// Returns true if the execution failed.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        !self.successful
    }

    /// Returns the payload, consuming the result.
    ///
    /// Only successful results carry a payload.
    #[must_use]
    pub fn into_payload(self) -> Option<T> {
        self.payload
    }
}

impl Default for ExecutionResult<()> {
    fn default() -> Self {
        Self::ok(())
    }
}
