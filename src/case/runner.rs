//! Table runner: registers cases and runs each one as a sub-test.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::Case;
use super::describe::Describe;
use super::executor::{Executor, IntoExecutor};
use super::flags::Flags;
use crate::diagnostics;
use crate::frame::{self, Frame};

/// Runs a table of cases of payload type `T` under the reporter that was active
/// when the runner was created.
///
/// Cases marked debug put the runner in focus mode: only they run. Skipped cases
/// are reported as skipped sub-tests and never reach the executor.
pub struct Runner<T> {
    reporter: Frame,
    executor: Executor<T>,
    cases: Vec<Case<T>>,
}

impl<T> Runner<T>
where
    T: Describe + Clone + Send + 'static,
{
    /// Create a runner around `executor`, capturing the active reporter.
    ///
    /// # Panics
    ///
    /// Panics when no reporter is installed on the calling task.
    #[track_caller]
    pub fn new<M>(executor: impl IntoExecutor<T, M>) -> Self {
        let reporter = frame::must_peek();
        let executor = match executor.into_executor() {
            Some(executor) => executor,
            None => {
                diagnostics::invalid(["test executor cannot be nil"]);
                Executor::empty()
            }
        };
        Self {
            reporter,
            executor,
            cases: Vec::new(),
        }
    }

    /// Register a case. `name` wins over a name found on the payload; `flags`
    /// combine with the payload's own debug and skip markers.
    pub fn add_case(&mut self, name: &str, payload: T, flags: Flags) -> &mut Self {
        let index = self.cases.len() + 1;
        let case = Case::new(payload, index, name).with_flags(flags);
        tracing::trace!(case = case.name(), index, ?flags, "case registered");
        self.cases.push(case);
        self
    }

    pub fn cases(&self) -> &[Case<T>] {
        &self.cases
    }

    /// Run every runnable case as a sub-test of the captured reporter, then attach
    /// focus-mode and skip warnings to the active test.
    #[track_caller]
    pub fn run(&self) {
        if self.cases.is_empty() {
            diagnostics::invalid(["no test cases provided"]);
            return;
        }

        let total = self.cases.len();
        let focused = self.cases.iter().filter(|case| case.debug()).count();
        let skipped = Arc::new(AtomicUsize::new(0));

        for case in self.cases.iter().filter(|case| focused == 0 || case.debug()) {
            let case = case.clone();
            let name = case.name().to_string();
            let executor = self.executor.clone();
            let skipped = Arc::clone(&skipped);
            tracing::debug!(case = %name, skip = case.skip(), parallel = case.parallel(), "running case");

            self.reporter.run(
                &name,
                Box::new(move |t| {
                    frame::install(&t);
                    if case.skip() {
                        skipped.fetch_add(1, Ordering::SeqCst);
                        t.skip_now();
                        return;
                    }
                    if case.parallel() {
                        t.parallel();
                    }
                    let name = case.name().to_string();
                    executor.execute(&name, case.into_payload());
                }),
            );
        }

        if focused > 0 && focused != total {
            diagnostics::warning(&format!("only {focused} of {total} cases were evaluated (debug mode)"));
        }
        match skipped.load(Ordering::SeqCst) {
            0 => {}
            all if all == total => diagnostics::warning("all cases were skipped"),
            some => diagnostics::warning(&format!("{some} of {total} cases were skipped")),
        }
    }
}
