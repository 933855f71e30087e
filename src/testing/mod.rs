//! Test support: mock handlers and collaborators.

mod mocks;

pub use mocks::{
    CountingHandler, FailingHandler, FlakyHandler, FnMockHandler, RecordingInvalidator,
    RecordingLogger, SlowHandler, StaticPermissionChecker, StaticValidator,
};
