//! # Dispatchflow
//!
//! A decorator pipeline for asynchronous command and query handlers.
//!
//! Dispatchflow wraps a business handler in composable cross-cutting
//! behaviors, each a decorator that is itself a handler:
//!
//! - **Validation**: fan out to validators and short-circuit on broken rules
//! - **Permission**: fan out to permission checkers and deny on any refusal
//! - **Logging**: notify execution loggers around the inner call
//! - **Retry**: re-invoke on transient failure per an input-carried policy
//! - **Cache invalidation**: clear cache regions after a successful run
//! - **Translation**: turn terminal errors into failed results at the edge
//! - **Timing**: measure the inner call and flag slow executions
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dispatchflow::prelude::*;
//!
//! // Stack decorators around the innermost real handler
//! let handler = Arc::new(PlaceOrderHandler::new(orders));
//! let handler = Arc::new(ValidationDecorator::new(handler, validators));
//! let pipeline = TranslationDecorator::new(handler);
//!
//! // Execute with cooperative cancellation
//! let token = CancellationToken::new();
//! let result = pipeline.execute(Some(&command), &token).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod caching;
pub mod cancellation;
pub mod collaborators;
pub mod decorators;
pub mod errors;
pub mod handler;
pub mod request;
pub mod result;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::caching::{CacheRegionNamer, ScopeContext, StaticScopeContext};
    pub use crate::cancellation::CancellationToken;
    pub use crate::collaborators::{
        CacheInvalidator, ExecutionLogger, PermissionChecker, Validator,
    };
    pub use crate::decorators::{
        CacheInvalidationDecorator, LoggingDecorator, PermissionDecorator, RetryDecorator,
        TimingDecorator, TimingObserver, TranslationDecorator, TranslationObserver,
        ValidationDecorator,
    };
    pub use crate::errors::{CacheRegionError, HandlerError};
    pub use crate::handler::{FnHandler, Handler, HandlerOutcome};
    pub use crate::request::{Request, RetryPolicy, RetrySelectivity};
    pub use crate::result::{BrokenRule, ExecutionResult};
}
