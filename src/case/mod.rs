//! Test cases and the table runner.
//!
//! - `flags`: gating bits passed at registration
//! - `describe`: payload introspection (name, debug, skip)
//! - `executor`: the two accepted test-function shapes
//! - `runner`: registration, focus filtering and sub-test scheduling

pub mod describe;
pub mod executor;
mod flags;
pub mod runner;

pub use describe::{Describe, Plain, is_debugging, is_skipping, name_or_default};
pub use executor::{Executor, IntoExecutor};
pub use flags::Flags;
pub use runner::Runner;

/// One registered case. Immutable once the runner has it.
#[derive(Debug, Clone)]
pub struct Case<T> {
    index: usize,
    name: String,
    payload: T,
    debug: bool,
    skip: bool,
    parallel: bool,
}

impl<T: Describe> Case<T> {
    /// Introspect `payload` for its name and markers. `index` is 1-based.
    pub fn new(payload: T, index: usize, hint: &str) -> Self {
        Self {
            index,
            name: name_or_default(&payload, hint, index),
            debug: is_debugging(&payload),
            skip: is_skipping(&payload),
            parallel: false,
            payload,
        }
    }
}

impl<T> Case<T> {
    /// Combine the introspected markers with registration flags.
    ///
    /// `DEBUG` forces debug and cancels an introspected skip; `SKIP` always skips;
    /// `PARALLEL` is only ever set from flags.
    pub fn with_flags(mut self, flags: Flags) -> Self {
        let debug_flag = flags.contains(Flags::DEBUG);
        self.skip = (self.skip && !debug_flag) || flags.contains(Flags::SKIP);
        self.debug = self.debug || debug_flag;
        self.parallel = self.parallel || flags.contains(Flags::PARALLEL);
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn skip(&self) -> bool {
        self.skip
    }

    pub fn parallel(&self) -> bool {
        self.parallel
    }

    pub(crate) fn into_payload(self) -> T {
        self.payload
    }
}
