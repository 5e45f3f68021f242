//! Nil-frame sentinel.

use std::fmt;

use crate::reporter::{Cleanup, Frame, Reporter, SubTest};

/// A frame that says "no usable reporter here".
///
/// Peeks that find a `NilFrame` on top report nothing, as if the stack were empty.
/// Every reporter method is a no-op except [`Reporter::cleanup`], which is forwarded
/// to the reporter captured at construction so a simulation of "no reporter" can
/// still be torn down by the enclosing test.
pub struct NilFrame {
    inner: Frame,
}

impl NilFrame {
    pub fn new(inner: Frame) -> Self {
        Self { inner }
    }
}

/// Build a nil-frame sentinel that forwards cleanups to `inner`.
pub fn nil_frame(inner: Frame) -> Frame {
    std::sync::Arc::new(NilFrame::new(inner))
}

impl Reporter for NilFrame {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn mark_helper(&self) {}

    fn errorf(&self, _args: fmt::Arguments<'_>) {}

    fn log(&self, _args: fmt::Arguments<'_>) {}

    fn fail_now(&self) {}

    fn skip_now(&self) {}

    fn run(&self, _name: &str, _body: SubTest) -> bool {
        false
    }

    fn parallel(&self) {}

    fn cleanup(&self, f: Cleanup) {
        self.inner.cleanup(f);
    }

    fn failed(&self) -> bool {
        false
    }
}
