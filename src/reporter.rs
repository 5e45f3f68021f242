//! Reporter capability interface.
//!
//! This is the narrow surface the frame stack, the runner and the diagnostic
//! channel consume from a test reporter. Three implementations ship with the crate:
//!
//! - [`crate::harness::Tester`]: the host reporter (sub-tests on threads).
//! - [`crate::frame::NilFrame`]: masks the outer reporter, forwards cleanups.
//! - [`crate::example::ExampleReporter`]: inline reporter for doc-style examples.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A reporter installed on a frame stack.
pub type Frame = Arc<dyn Reporter>;

/// Body of a sub-test. Receives the fresh reporter of the sub-test scope.
pub type SubTest = Box<dyn FnOnce(Frame) + Send + 'static>;

/// Callback run when a test scope finishes.
pub type Cleanup = Box<dyn FnOnce() + Send + 'static>;

/// Type-erasure helper so frames can be checked for a concrete reporter type.
pub trait AsAny: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// The capabilities the core requires of a test reporter.
///
/// `fail_now` and `skip_now` end the current test. Reporters that cannot unwind
/// (see [`crate::example::ExampleReporter`]) return normally instead and ignore
/// every later call, so callers must not rely on them diverging.
pub trait Reporter: AsAny {
    /// Full name of the test scope (`parent/child` for sub-tests).
    fn name(&self) -> &str;

    /// Advisory: the calling function is a test helper.
    fn mark_helper(&self);

    /// Record a failure message; the test keeps running.
    fn errorf(&self, args: fmt::Arguments<'_>);

    /// Record an informational message.
    fn log(&self, args: fmt::Arguments<'_>);

    /// Mark the test failed and stop it.
    fn fail_now(&self);

    /// Mark the test skipped and stop it.
    fn skip_now(&self);

    /// Run `body` as a named sub-test. Returns `false` if the sub-test failed
    /// (or could not be started).
    fn run(&self, name: &str, body: SubTest) -> bool;

    /// Declare that the current sub-test may run concurrently with its siblings.
    fn parallel(&self);

    /// Register `f` to run when this test scope finishes, after its sub-tests.
    fn cleanup(&self, f: Cleanup);

    /// Whether a failure has been recorded for this scope.
    fn failed(&self) -> bool;
}

impl fmt::Debug for dyn Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter").field("name", &self.name()).finish_non_exhaustive()
    }
}
