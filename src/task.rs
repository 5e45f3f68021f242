//! Task identity probe.
//!
//! A task is the unit of concurrent execution the frame stacks are keyed by. In this
//! crate every test and sub-test runs on its own OS thread, so the default probe
//! identifies the current thread.

use std::fmt;
use std::thread;

use crate::errors::FrameError;

/// Opaque identifier of the currently executing task.
///
/// Stable for the lifetime of the task; two live tasks never share one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw identity source: returns the text a task identifier is parsed from.
///
/// `None` means the host could not produce anything.
pub type Probe = fn() -> Option<String>;

/// Default probe: the `Debug` rendering of the current [`thread::ThreadId`].
pub fn thread_probe() -> Option<String> {
    Some(format!("{:?}", thread::current().id()))
}

/// Parse probe output into a [`TaskId`].
///
/// Accepts `ThreadId(N)` and a bare decimal `N`.
///
/// # Errors
///
/// - [`FrameError::NoStack`] when the probe returned nothing (or only whitespace).
/// - [`FrameError::UnexpectedStackFormat`] when the text carries no identifier.
pub fn parse_task_id(raw: Option<&str>) -> Result<TaskId, FrameError> {
    let raw = raw.map(str::trim).filter(|text| !text.is_empty()).ok_or(FrameError::NoStack)?;

    let digits = raw
        .strip_prefix("ThreadId(")
        .and_then(|rest| rest.strip_suffix(')'))
        .unwrap_or(raw);

    digits
        .parse::<u64>()
        .map(TaskId)
        .map_err(|_| FrameError::UnexpectedStackFormat(raw.to_string()))
}

/// Identify the current task through `probe`.
pub fn current_with(probe: Probe) -> Result<TaskId, FrameError> {
    parse_task_id(probe().as_deref())
}
