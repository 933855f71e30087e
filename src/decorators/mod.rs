//! Decorators wrapping a handler with composable cross-cutting behaviors.
//!
//! Every decorator implements [`Handler`](crate::handler::Handler) itself,
//! so the composition root can stack them in any order around the innermost
//! real handler.

mod cache;
mod fan_out;
mod logging;
mod permission;
mod retry;
mod timing;
mod translation;
mod validation;

pub use cache::CacheInvalidationDecorator;
pub use fan_out::fan_out;
pub use logging::LoggingDecorator;
pub use permission::PermissionDecorator;
pub use retry::RetryDecorator;
pub use timing::{TimingDecorator, TimingObserver, TracingTimingObserver};
pub use translation::{TranslationDecorator, TranslationObserver, TracingTranslationObserver};
pub use validation::ValidationDecorator;
