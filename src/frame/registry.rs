//! Per-task frame stacks behind a single reader/writer lock.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::nil::NilFrame;
use crate::errors::FrameError;
use crate::reporter::{AsAny, Frame, Reporter};
use crate::task::{self, Probe, TaskId};

/// Mapping from task to its stack of reporter frames.
///
/// Every operation targets the stack of the calling task. An absent entry is an
/// empty stack, and a stack that drains is removed again. The lock is never held
/// while user code runs: frames are cloned out before they are handed back.
pub struct FrameRegistry {
    probe: Probe,
    stacks: RwLock<HashMap<TaskId, Vec<Frame>>>,
}

impl Default for FrameRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameRegistry {
    /// Registry keyed by the current thread.
    pub fn new() -> Self {
        Self::with_probe(task::thread_probe)
    }

    /// Registry keyed by a custom task probe.
    pub fn with_probe(probe: Probe) -> Self {
        Self {
            probe,
            stacks: RwLock::new(HashMap::new()),
        }
    }

    /// Identify the calling task.
    pub fn current_task(&self) -> Result<TaskId, FrameError> {
        task::current_with(self.probe)
    }

    /// Append `frame` to the calling task's stack.
    pub fn push(&self, frame: Frame) -> Result<(), FrameError> {
        let task = self.current_task()?;
        let depth = {
            let mut stacks = self.stacks.write();
            let stack = stacks.entry(task).or_default();
            stack.push(frame);
            stack.len()
        };
        tracing::trace!(%task, depth, "pushed frame");
        Ok(())
    }

    /// Remove and return the top of the calling task's stack.
    pub fn pop(&self) -> Result<Frame, FrameError> {
        let task = self.current_task()?;
        let (frame, depth) = {
            let mut stacks = self.stacks.write();
            let stack = stacks.get_mut(&task).ok_or(FrameError::EmptyStack(task))?;
            let frame = stack.pop().ok_or(FrameError::EmptyStack(task))?;
            let depth = stack.len();
            if depth == 0 {
                stacks.remove(&task);
            }
            (frame, depth)
        };
        tracing::trace!(%task, depth, "popped frame");
        Ok(frame)
    }

    /// Number of frames on the calling task's stack.
    pub fn depth(&self) -> Result<usize, FrameError> {
        let task = self.current_task()?;
        Ok(self.stacks.read().get(&task).map_or(0, Vec::len))
    }

    /// Raw top of the calling task's stack, nil frames included.
    pub fn top(&self) -> Result<Option<Frame>, FrameError> {
        let task = self.current_task()?;
        Ok(self.stacks.read().get(&task).and_then(|stack| stack.last().cloned()))
    }

    /// The active reporter of the calling task.
    ///
    /// `None` when the stack is empty or its top is a [`NilFrame`].
    pub fn peek(&self) -> Result<Option<Frame>, FrameError> {
        Ok(self.top()?.filter(|frame| !is_nil(frame)))
    }

    /// The active reporter, if it is a `R`.
    pub fn peek_as<R: Reporter>(&self) -> Result<Option<Arc<R>>, FrameError> {
        let Some(frame) = self.peek()? else {
            return Ok(None);
        };
        Ok(AsAny::into_any(frame).downcast::<R>().ok())
    }

    /// As [`FrameRegistry::peek`], but a missing frame is [`FrameError::NoTestFrame`].
    pub fn must_peek(&self) -> Result<Frame, FrameError> {
        let task = self.current_task()?;
        self.peek()?.ok_or(FrameError::NoTestFrame(task))
    }

    /// As [`FrameRegistry::peek_as`], but a missing frame is [`FrameError::NoTestFrame`].
    pub fn must_peek_as<R: Reporter>(&self) -> Result<Arc<R>, FrameError> {
        let task = self.current_task()?;
        self.peek_as::<R>()?.ok_or(FrameError::NoTestFrame(task))
    }

    /// Number of tasks that currently hold at least one frame.
    pub fn task_count(&self) -> usize {
        self.stacks.read().len()
    }
}

fn is_nil(frame: &Frame) -> bool {
    AsAny::as_any(&**frame).is::<NilFrame>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::example::ExampleReporter;
    use std::thread;

    fn reporter(name: &str) -> Frame {
        Arc::new(ExampleReporter::new(name))
    }

    fn broken_probe() -> Option<String> {
        None
    }

    fn garbled_probe() -> Option<String> {
        Some("task #?".to_string())
    }

    // ========================================
    // Stack discipline
    // ========================================

    #[test]
    fn test_empty_registry_peeks_nothing() {
        let registry = FrameRegistry::new();
        assert!(registry.peek().unwrap().is_none());
        assert_eq!(registry.depth().unwrap(), 0);
    }

    #[test]
    fn test_push_then_peek_returns_top() {
        let registry = FrameRegistry::new();
        registry.push(reporter("outer")).unwrap();
        registry.push(reporter("inner")).unwrap();

        assert_eq!(registry.peek().unwrap().unwrap().name(), "inner");
        assert_eq!(registry.depth().unwrap(), 2);
    }

    #[test]
    fn test_pop_restores_previous_top() {
        let registry = FrameRegistry::new();
        registry.push(reporter("outer")).unwrap();
        registry.push(reporter("inner")).unwrap();

        assert_eq!(registry.pop().unwrap().name(), "inner");
        assert_eq!(registry.peek().unwrap().unwrap().name(), "outer");
    }

    #[test]
    fn test_draining_a_stack_forgets_the_task() {
        let registry = FrameRegistry::new();
        registry.push(reporter("only")).unwrap();
        assert_eq!(registry.task_count(), 1);

        registry.pop().unwrap();
        assert_eq!(registry.task_count(), 0);
    }

    #[test]
    fn test_pop_on_empty_stack_fails() {
        let registry = FrameRegistry::new();
        let task = registry.current_task().unwrap();
        assert_eq!(registry.pop().unwrap_err(), FrameError::EmptyStack(task));
    }

    #[test]
    fn test_must_peek_without_frame_fails() {
        let registry = FrameRegistry::new();
        let task = registry.current_task().unwrap();
        assert_eq!(registry.must_peek().unwrap_err(), FrameError::NoTestFrame(task));
    }

    // ========================================
    // Capability checks
    // ========================================

    #[test]
    fn test_peek_as_matches_concrete_type() {
        let registry = FrameRegistry::new();
        registry.push(reporter("example")).unwrap();

        let found = registry.peek_as::<ExampleReporter>().unwrap();
        assert_eq!(found.unwrap().name(), "example");
        assert!(registry.peek_as::<NilFrame>().unwrap().is_none());
    }

    #[test]
    fn test_nil_frame_masks_every_capability() {
        let registry = FrameRegistry::new();
        let outer = reporter("outer");
        registry.push(Arc::clone(&outer)).unwrap();
        registry.push(Arc::new(NilFrame::new(outer))).unwrap();

        assert!(registry.peek().unwrap().is_none());
        assert!(registry.peek_as::<ExampleReporter>().unwrap().is_none());
        assert!(registry.peek_as::<NilFrame>().unwrap().is_none());
        assert!(registry.must_peek().is_err());
        // The raw top still sees the sentinel.
        assert_eq!(registry.top().unwrap().unwrap().name(), "outer");
    }

    // ========================================
    // Task isolation
    // ========================================

    #[test]
    fn test_stacks_are_isolated_per_thread() {
        let registry = Arc::new(FrameRegistry::new());
        registry.push(reporter("main")).unwrap();

        let other = Arc::clone(&registry);
        let seen = thread::spawn(move || {
            let before = other.peek().unwrap().map(|f| f.name().to_string());
            other.push(reporter("worker")).unwrap();
            let after = other.peek().unwrap().map(|f| f.name().to_string());
            other.pop().unwrap();
            (before, after)
        })
        .join()
        .unwrap();

        assert_eq!(seen, (None, Some("worker".to_string())));
        assert_eq!(registry.peek().unwrap().unwrap().name(), "main");
    }

    // ========================================
    // Probe failures
    // ========================================

    #[test]
    fn test_broken_probe_reports_no_stack() {
        let registry = FrameRegistry::with_probe(broken_probe);
        assert_eq!(registry.push(reporter("x")).unwrap_err(), FrameError::NoStack);
        assert_eq!(registry.peek().unwrap_err(), FrameError::NoStack);
    }

    #[test]
    fn test_garbled_probe_reports_unexpected_format() {
        let registry = FrameRegistry::with_probe(garbled_probe);
        assert_eq!(
            registry.pop().unwrap_err(),
            FrameError::UnexpectedStackFormat("task #?".to_string())
        );
    }
}
