//! Error taxonomy for the frame registry and harness configuration.
//!
//! Frame errors describe a broken host or a caller bug; the module-level frame
//! helpers raise them as panics, while [`crate::frame::FrameRegistry`] hands them
//! back as values so callers (and tests) can inspect them.

use thiserror::Error;

use crate::task::TaskId;

/// Failures of the task probe and the per-task frame stacks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// The task probe produced no identity information at all.
    #[error("no stack information available for the current task")]
    NoStack,

    /// The task probe produced output that does not contain a task identifier.
    #[error("unexpected stack format: {0:?}")]
    UnexpectedStackFormat(String),

    /// `pop` was called without a matching `push`.
    #[error("frame stack of task {0} is empty")]
    EmptyStack(TaskId),

    /// No frame with the required capability is installed on the task.
    #[error("no test frame installed on task {0}")]
    NoTestFrame(TaskId),
}

/// Errors raised while reading harness configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(key: &'static str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Raise an unrecoverable error (implemented as a panic) with its display text.
#[cold]
#[track_caller]
pub(crate) fn raise(err: impl std::fmt::Display) -> ! {
    panic!("{err}");
}

/// Text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}
