//! Reporter for doc-style examples.
//!
//! Examples have no host test to report into, so [`ExampleReporter`] runs sub-tests
//! inline, prints failures to stdout (where example output is read from) and never
//! unwinds: after `fail_now` or `skip_now` every further call is ignored. A panic
//! in a sub-test fails that sub-test; cleanups run on every exit path.
//!
//! ```
//! use casebook::{Flags, Runner, frame};
//!
//! let passed = casebook::example::run(|t| {
//!     frame::install(&t);
//!     let mut runner = Runner::new(|n: i64| assert!(n > 0));
//!     runner.add_case("one", 1, Flags::NONE);
//!     runner.add_case("two", 2, Flags::NONE);
//!     runner.run();
//! });
//! assert!(passed);
//! ```

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::errors::panic_message;
use crate::reporter::{Cleanup, Frame, Reporter, SubTest};

pub struct ExampleReporter {
    name: String,
    failed: AtomicBool,
    halted: AtomicBool,
    cleanups: Mutex<Vec<Cleanup>>,
}

impl ExampleReporter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            failed: AtomicBool::new(false),
            halted: AtomicBool::new(false),
            cleanups: Mutex::new(Vec::new()),
        }
    }

    /// Run the registered cleanups, most recent first.
    pub fn finish(&self) {
        let cleanups = std::mem::take(&mut *self.cleanups.lock());
        for cleanup in cleanups.into_iter().rev() {
            cleanup();
        }
    }

    /// Whether `fail_now` or `skip_now` has been called.
    pub fn halted(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }
}

impl Reporter for ExampleReporter {
    fn name(&self) -> &str {
        &self.name
    }

    fn mark_helper(&self) {}

    fn errorf(&self, args: fmt::Arguments<'_>) {
        if self.halted() {
            return;
        }
        self.failed.store(true, Ordering::SeqCst);
        println!("{args}");
    }

    fn log(&self, _args: fmt::Arguments<'_>) {}

    fn fail_now(&self) {
        if self.halted() {
            return;
        }
        self.failed.store(true, Ordering::SeqCst);
        self.halted.store(true, Ordering::SeqCst);
    }

    fn skip_now(&self) {
        self.halted.store(true, Ordering::SeqCst);
    }

    fn run(&self, name: &str, body: SubTest) -> bool {
        if self.halted() {
            return false;
        }
        let child = Arc::new(ExampleReporter::new(format!("{}/{}", self.name, name)));
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| body(child.clone())));
        child.finish();
        if let Err(payload) = outcome {
            child.errorf(format_args!("panicked: {}", panic_message(&*payload)));
            child.failed.store(true, Ordering::SeqCst);
        }

        let passed = !child.failed();
        if !passed {
            self.failed.store(true, Ordering::SeqCst);
        }
        passed
    }

    fn parallel(&self) {}

    // Accepted even after a halt so installed frames are still popped.
    fn cleanup(&self, f: Cleanup) {
        self.cleanups.lock().push(f);
    }

    fn failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }
}

/// Run `body` under a root [`ExampleReporter`] and report whether it passed.
///
/// A panic in `body` is re-raised once the root's cleanups have run.
pub fn run(body: impl FnOnce(Frame)) -> bool {
    let root = Arc::new(ExampleReporter::new("example"));
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| body(root.clone())));
    root.finish();
    if let Err(payload) = outcome {
        panic::resume_unwind(payload);
    }
    !root.failed()
}
