//! Host test harness.
//!
//! libtest has no notion of sub-tests, so this module provides the reporter the
//! rest of the crate drives: named sub-tests on their own threads, `parallel()`
//! scheduling, skip and fail-now semantics, cleanups, and a [`TestReport`] tree.
//!
//! ```ignore
//! #[test]
//! fn table() {
//!     casebook::harness::run("table", |t| {
//!         casebook::frame::install(&t);
//!         // register and run cases ...
//!     })
//!     .assert_passed();
//! }
//! ```

mod config;
mod report;
mod tester;

use std::sync::Arc;

pub use config::{FAIL_FAST_VAR, HarnessConfig, PARALLEL_VAR, RUN_VAR, VERBOSE_VAR};
pub use report::{Outcome, TestReport, TestSummary};
pub use tester::Tester;

use crate::logging;
use crate::reporter::Frame;
use tester::Shared;

/// Runs root tests under one configuration.
#[derive(Debug, Clone, Default)]
pub struct Harness {
    config: HarnessConfig,
}

impl Harness {
    pub fn new(config: HarnessConfig) -> Self {
        Self { config }
    }

    /// Harness configured from the environment; invalid settings fall back to defaults.
    pub fn from_env() -> Self {
        match HarnessConfig::from_env() {
            Ok(config) => Self::new(config),
            Err(err) => {
                tracing::warn!(%err, "ignoring invalid harness configuration");
                Self::default()
            }
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Run `body` as a root test on the calling thread.
    ///
    /// Returns once the body, all of its sub-tests and all cleanups have finished.
    pub fn run(&self, name: &str, body: impl FnOnce(Frame)) -> TestReport {
        logging::init();

        let shared = Arc::new(Shared::new(self.config.clone()));
        let root = Arc::new(Tester::root(name, shared));
        let report = root.drive(body);

        if self.config.verbose {
            eprintln!("{report}");
        }
        report
    }
}

/// Run `body` as a root test with the environment configuration.
pub fn run(name: &str, body: impl FnOnce(Frame)) -> TestReport {
    Harness::from_env().run(name, body)
}
