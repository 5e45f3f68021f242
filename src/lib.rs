#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Table-driven test orchestration.
//!
//! A test registers *cases* (a name, a payload and gating flags) with a
//! [`Runner`]; the runner spawns one named sub-test per case through the active
//! [`Reporter`], honoring debug focus, skip and parallel markers, and attaches
//! warnings about focus mode and skipped cases to the enclosing test.
//!
//! The active reporter of each task (thread) lives on a per-task frame stack, so
//! helpers deep inside a test can fail it without the reporter being passed
//! around. See [`frame`].
//!
//! ```
//! use casebook::harness::Harness;
//! use casebook::{Describe, Flags, Runner, frame};
//!
//! #[derive(Clone, Describe)]
//! struct Sum {
//!     name: &'static str,
//!     terms: (i32, i32),
//!     want: i32,
//! }
//!
//! let report = Harness::default().run("sums", |t| {
//!     frame::install(&t);
//!     let mut runner = Runner::new(|c: Sum| assert_eq!(c.terms.0 + c.terms.1, c.want));
//!     runner.add_case("", Sum { name: "small", terms: (1, 2), want: 3 }, Flags::NONE);
//!     runner.add_case("", Sum { name: "negative", terms: (-1, -2), want: -3 }, Flags::PARALLEL);
//!     runner.run();
//! });
//! report.assert_passed();
//! assert!(report.find("sums/negative").is_some());
//! ```
//!
//! ## Panic Policy
//!
//! - **Library code**: Use `Result` or `Option` with `?`. [`frame::FrameRegistry`] returns
//!   [`FrameError`] values; the free functions in [`frame`] turn them into panics because a broken
//!   frame stack cannot be reported anywhere else.
//!
//! - **Diagnostics**: [`diagnostics`] panics when no reporter is installed rather than letting a
//!   misconfigured test pass.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

// `#[derive(Describe)]` expands to `::casebook::...` paths, also inside this crate.
extern crate self as casebook;

pub mod case;
pub mod diagnostics;
pub mod errors;
pub mod example;
pub mod frame;
pub mod harness;
pub mod logging;
pub mod reporter;
pub mod task;

pub use casebook_derive::Describe;

pub use case::{Case, Describe, Executor, Flags, IntoExecutor, Plain, Runner};
pub use errors::{ConfigError, FrameError};
pub use frame::{Frame, must_peek, must_peek_as, peek, peek_as, pop_frame, push_frame};
pub use harness::{Harness, HarnessConfig, Outcome, TestReport};
pub use reporter::Reporter;
pub use task::TaskId;
