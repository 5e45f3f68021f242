//! Per-task reporter frames.
//!
//! Helpers deep inside a test retrieve "the current reporter" from here instead of
//! having it threaded through every call. Frames live on a stack per task; the top
//! frame of a task is the active reporter for everything running on that task.
//!
//! The free functions in this module work on the process-global registry and treat
//! every [`FrameError`] as unrecoverable (they panic). Use a [`FrameRegistry`]
//! directly to get the errors back as values.

pub mod nil;
mod registry;

use std::sync::Arc;
use std::sync::LazyLock;

pub use nil::{NilFrame, nil_frame};
pub use registry::FrameRegistry;

use crate::errors::{FrameError, raise};
pub use crate::reporter::Frame;
use crate::reporter::Reporter;

static GLOBAL: LazyLock<FrameRegistry> = LazyLock::new(FrameRegistry::new);

/// The process-global registry.
pub fn global() -> &'static FrameRegistry {
    &GLOBAL
}

#[track_caller]
fn unwrap_frame<T>(result: Result<T, FrameError>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => raise(err),
    }
}

/// Push `frame` onto the calling task's stack.
#[track_caller]
pub fn push_frame(frame: Frame) {
    unwrap_frame(global().push(frame));
}

/// Pop the calling task's top frame.
///
/// # Panics
///
/// Panics with [`FrameError::EmptyStack`] when nothing was pushed.
#[track_caller]
pub fn pop_frame() -> Frame {
    unwrap_frame(global().pop())
}

/// The active reporter of the calling task, if any.
#[track_caller]
pub fn peek() -> Option<Frame> {
    unwrap_frame(global().peek())
}

/// The active reporter of the calling task, if it is a `R`.
#[track_caller]
pub fn peek_as<R: Reporter>() -> Option<Arc<R>> {
    unwrap_frame(global().peek_as::<R>())
}

/// The active reporter of the calling task.
///
/// # Panics
///
/// Panics with [`FrameError::NoTestFrame`] when no usable frame is installed.
#[track_caller]
pub fn must_peek() -> Frame {
    unwrap_frame(global().must_peek())
}

/// The active reporter of the calling task as a `R`.
///
/// # Panics
///
/// Panics with [`FrameError::NoTestFrame`] when the top frame is missing or not a `R`.
#[track_caller]
pub fn must_peek_as<R: Reporter>() -> Arc<R> {
    unwrap_frame(global().must_peek_as::<R>())
}

/// Push `frame` and pop it again when the frame's own scope cleans up.
///
/// The cleanup runs on the task that owns the scope, which is the task calling
/// `install` for every reporter in this crate.
#[track_caller]
pub fn install(frame: &Frame) {
    push_frame(Arc::clone(frame));
    frame.cleanup(Box::new(|| {
        if let Err(err) = global().pop() {
            raise(err);
        }
    }));
}
