//! Cooperative cancellation primitives.

mod token;

pub use token::CancellationToken;
