//! Host reporter: every sub-test runs on its own thread.
//!
//! ## Lifecycle of a sub-test
//!
//! 1. The parent's [`Reporter::run`] spawns a thread for the sub-test and blocks.
//! 2. The sub-test either finishes (the parent adopts its report and continues), or
//!    calls [`Reporter::parallel`], which hands control back to the parent and then
//!    waits until the parent's body has returned.
//! 3. When a body returns, the test releases its paused parallel sub-tests, waits
//!    for all of them, runs its cleanups (most recent first) on its own thread and
//!    produces a [`TestReport`].
//!
//! `fail_now` and `skip_now` unwind the calling test with a private payload; any
//! other panic in a body is caught and recorded as a failure.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use super::config::HarnessConfig;
use super::report::{Outcome, TestReport};
use crate::errors::panic_message;
use crate::reporter::{Cleanup, Frame, Reporter, SubTest};

/// Unwinding payload of `fail_now` / `skip_now`.
struct Halt;

/// Messages from a sub-test to its parent.
enum Signal {
    Parallel,
    Done(TestReport),
}

/// State shared by every test below one root.
pub(crate) struct Shared {
    config: HarnessConfig,
    slots: Slots,
    stopped: AtomicBool,
}

impl Shared {
    pub(crate) fn new(config: HarnessConfig) -> Self {
        Self {
            slots: Slots::new(config.parallelism.get()),
            config,
            stopped: AtomicBool::new(false),
        }
    }
}

/// Counting semaphore bounding released parallel sub-tests.
struct Slots {
    free: Mutex<usize>,
    freed: Condvar,
}

impl Slots {
    fn new(count: usize) -> Self {
        Self {
            free: Mutex::new(count),
            freed: Condvar::new(),
        }
    }

    fn acquire(&self) {
        let mut free = self.free.lock();
        while *free == 0 {
            self.freed.wait(&mut free);
        }
        *free -= 1;
    }

    fn release(&self) {
        *self.free.lock() += 1;
        self.freed.notify_one();
    }
}

/// Connection of a sub-test to its parent.
struct Link {
    signal: Sender<Signal>,
    release: Mutex<Option<Receiver<()>>>,
}

/// A parallel sub-test waiting for its parent's body to return.
struct Pending {
    index: usize,
    release: Sender<()>,
    signal: Receiver<Signal>,
}

#[derive(Default)]
struct State {
    errors: Vec<String>,
    logs: Vec<String>,
    cleanups: Vec<Cleanup>,
    children: Vec<Option<TestReport>>,
    pending: Vec<Pending>,
    names: HashMap<String, usize>,
}

/// The harness reporter handed to test bodies.
pub struct Tester {
    name: String,
    /// Names of this test's ancestors below the root, and its own.
    levels: Vec<String>,
    shared: Arc<Shared>,
    link: Option<Link>,
    state: Mutex<State>,
    failed: AtomicBool,
    skipped: AtomicBool,
    body_returned: AtomicBool,
    finished: AtomicBool,
    holds_slot: AtomicBool,
}

impl Tester {
    pub(crate) fn root(name: &str, shared: Arc<Shared>) -> Self {
        Self::with_link(name.to_string(), Vec::new(), shared, None)
    }

    fn with_link(name: String, levels: Vec<String>, shared: Arc<Shared>, link: Option<Link>) -> Self {
        Self {
            name,
            levels,
            shared,
            link,
            state: Mutex::new(State::default()),
            failed: AtomicBool::new(false),
            skipped: AtomicBool::new(false),
            body_returned: AtomicBool::new(false),
            finished: AtomicBool::new(false),
            holds_slot: AtomicBool::new(false),
        }
    }

    /// Whether `skip_now` was called.
    pub fn skipped(&self) -> bool {
        self.skipped.load(Ordering::SeqCst)
    }

    /// Run `body` as this test on the current thread and report the result.
    pub(crate) fn drive(self: &Arc<Self>, body: impl FnOnce(Frame)) -> TestReport {
        let started = Instant::now();
        tracing::debug!(test = %self.name, "test started");

        let frame: Frame = self.clone();
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| body(frame))) {
            self.absorb_panic(payload);
        }
        self.body_returned.store(true, Ordering::SeqCst);

        if self.holds_slot.swap(false, Ordering::SeqCst) {
            self.shared.slots.release();
        }
        self.await_parallel();
        self.run_cleanups();
        self.finished.store(true, Ordering::SeqCst);

        let report = self.snapshot(started.elapsed());
        tracing::debug!(test = %self.name, outcome = %report.outcome, "test finished");
        report
    }

    fn absorb_panic(&self, payload: Box<dyn Any + Send>) {
        if payload.is::<Halt>() {
            return;
        }
        self.failed.store(true, Ordering::SeqCst);
        self.state
            .lock()
            .errors
            .push(format!("panicked: {}", panic_message(&*payload)));
    }

    fn await_parallel(&self) {
        let pending = std::mem::take(&mut self.state.lock().pending);
        for child in &pending {
            let _ = child.release.send(());
        }
        for child in pending {
            match child.signal.recv() {
                Ok(Signal::Done(report)) => self.adopt(child.index, report),
                Ok(Signal::Parallel) | Err(_) => self.lost(child.index),
            }
        }
    }

    fn run_cleanups(&self) {
        loop {
            // Pop under the lock, run outside it: cleanups may register more cleanups.
            let Some(cleanup) = self.state.lock().cleanups.pop() else {
                break;
            };
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(cleanup)) {
                self.absorb_panic(payload);
            }
        }
    }

    fn adopt(&self, index: usize, report: TestReport) {
        if report.failed() {
            self.failed.store(true, Ordering::SeqCst);
            self.shared.stopped.store(true, Ordering::SeqCst);
        }
        if let Some(slot) = self.state.lock().children.get_mut(index) {
            *slot = Some(report);
        }
    }

    fn lost(&self, index: usize) {
        self.errorf(format_args!("sub-test #{index} exited without reporting"));
    }

    fn signal(&self, signal: Signal) {
        if let Some(link) = &self.link {
            // The parent only disappears when it was torn down by a panic.
            let _ = link.signal.send(signal);
        }
    }

    fn snapshot(&self, duration: Duration) -> TestReport {
        let mut state = self.state.lock();
        let outcome = if self.failed.load(Ordering::SeqCst) {
            Outcome::Failed
        } else if self.skipped() {
            Outcome::Skipped
        } else {
            Outcome::Passed
        };
        TestReport {
            name: self.name.clone(),
            outcome,
            errors: std::mem::take(&mut state.errors),
            logs: std::mem::take(&mut state.logs),
            duration,
            children: state.children.drain(..).flatten().collect(),
        }
    }

    fn spawn_child(&self, name: &str) -> (Arc<Tester>, usize, Receiver<Signal>, Sender<()>) {
        let (signal_tx, signal_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();

        let mut state = self.state.lock();
        let unique = unique_name(&mut state.names, name);
        let mut levels = self.levels.clone();
        levels.push(unique.clone());

        let child = Tester::with_link(
            format!("{}/{}", self.name, unique),
            levels,
            Arc::clone(&self.shared),
            Some(Link {
                signal: signal_tx,
                release: Mutex::new(Some(release_rx)),
            }),
        );
        state.children.push(None);
        (Arc::new(child), state.children.len() - 1, signal_rx, release_tx)
    }
}

impl Reporter for Tester {
    fn name(&self) -> &str {
        &self.name
    }

    // Attribution in Rust goes through `#[track_caller]`; nothing to record.
    fn mark_helper(&self) {}

    fn errorf(&self, args: fmt::Arguments<'_>) {
        let message = args.to_string();
        if self.finished.load(Ordering::SeqCst) {
            tracing::warn!(test = %self.name, %message, "error reported after test finished");
        }
        self.failed.store(true, Ordering::SeqCst);
        self.state.lock().errors.push(message);
    }

    fn log(&self, args: fmt::Arguments<'_>) {
        self.state.lock().logs.push(args.to_string());
    }

    fn fail_now(&self) {
        self.failed.store(true, Ordering::SeqCst);
        panic::resume_unwind(Box::new(Halt));
    }

    fn skip_now(&self) {
        self.skipped.store(true, Ordering::SeqCst);
        panic::resume_unwind(Box::new(Halt));
    }

    fn run(&self, name: &str, body: SubTest) -> bool {
        if self.body_returned.load(Ordering::SeqCst) {
            self.errorf(format_args!("sub-test {name:?} started after {} returned", self.name));
            return false;
        }
        if self.shared.config.fail_fast && self.shared.stopped.load(Ordering::SeqCst) {
            return false;
        }

        let mut levels: Vec<&str> = self.levels.iter().map(String::as_str).collect();
        levels.push(name);
        if !self.shared.config.selects(&levels) {
            tracing::debug!(parent = %self.name, sub_test = name, "filtered out");
            return true;
        }

        let (child, index, signal, release) = self.spawn_child(name);
        let thread_name = child.name.replace('\0', "");
        let worker = Arc::clone(&child);
        let spawned = thread::Builder::new().name(thread_name).spawn(move || {
            let report = worker.drive(body);
            worker.signal(Signal::Done(report));
        });
        if let Err(err) = spawned {
            self.errorf(format_args!("failed to start sub-test {}: {err}", child.name));
            return false;
        }

        // A parallel test blocked on a sub-test lends its slot to that sub-test's
        // descendants and takes one back once the sub-test finishes or pauses.
        let lent = self.holds_slot.swap(false, Ordering::SeqCst);
        if lent {
            self.shared.slots.release();
        }
        let received = signal.recv();
        if lent {
            self.shared.slots.acquire();
            self.holds_slot.store(true, Ordering::SeqCst);
        }

        match received {
            Ok(Signal::Done(report)) => {
                let passed = !report.failed();
                self.adopt(index, report);
                passed
            }
            Ok(Signal::Parallel) => {
                self.state.lock().pending.push(Pending { index, release, signal });
                true
            }
            Err(_) => {
                self.lost(index);
                false
            }
        }
    }

    fn parallel(&self) {
        let Some(link) = &self.link else {
            // The root has no siblings.
            return;
        };
        let Some(release) = link.release.lock().take() else {
            return;
        };

        tracing::debug!(test = %self.name, "paused for parallel run");
        let _ = link.signal.send(Signal::Parallel);
        let _ = release.recv();

        self.shared.slots.acquire();
        self.holds_slot.store(true, Ordering::SeqCst);
        tracing::debug!(test = %self.name, "resumed in parallel");
    }

    fn cleanup(&self, f: Cleanup) {
        self.state.lock().cleanups.push(f);
    }

    fn failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }
}

/// Deduplicate sibling names: `x`, `x#01`, `x#02`; an empty name is `#00`.
///
/// A generated name is never handed out twice, even when a sibling was given
/// that name literally: such a sibling gets a further suffix (`x#01#01`).
fn unique_name(seen: &mut HashMap<String, usize>, name: &str) -> String {
    let issued = seen.get(name).copied();
    if issued.is_none() && !name.is_empty() {
        seen.insert(name.to_string(), 1);
        return name.to_string();
    }

    let mut count = issued.unwrap_or(0);
    loop {
        let candidate = format!("{name}#{count:02}");
        count += 1;
        if !seen.contains_key(&candidate) {
            seen.insert(name.to_string(), count);
            seen.insert(candidate.clone(), 1);
            return candidate;
        }
    }
}
