//! Invalid-test and warning reports attached to the active test.
//!
//! Every function reports through the reporter on top of the calling task's frame
//! stack. When there is none (or a [`crate::frame::NilFrame`] masks it) they panic
//! instead: a helper that cannot report must not let its test pass.

use std::error::Error;

use crate::frame;

const INVALID_TEST: &str = "INVALID TEST";
const MARKER: &str = "<== ";

fn join<I>(head: &str, messages: I) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut joined = head.to_string();
    for message in messages {
        joined.push('\n');
        joined.push_str(message.as_ref());
    }
    joined
}

/// Report `text` as a fatal failure of the active test, or panic without one.
#[track_caller]
fn fail(text: String) {
    let Some(reporter) = frame::peek() else {
        panic!("{text}");
    };
    reporter.mark_helper();
    reporter.errorf(format_args!("{MARKER}{text}"));
    reporter.fail_now();
}

/// Fail the active test as invalid: the test itself is set up wrongly.
///
/// ```should_panic
/// // No reporter installed: always a panic.
/// casebook::diagnostics::invalid(["no test cases provided"]);
/// ```
#[track_caller]
pub fn invalid<I>(messages: I)
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fail(join(INVALID_TEST, messages));
}

/// Fail the active test as invalid because of `err`.
#[track_caller]
pub fn error<I>(err: &dyn Error, messages: I)
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let head = format!("{INVALID_TEST}\nERROR: {err}");
    fail(join(&head, messages));
}

/// Attach a warning to the active test. The test is marked failed but keeps running.
#[track_caller]
pub fn warning(message: &str) {
    let text = format!("WARNING: {message}");
    let Some(reporter) = frame::peek() else {
        panic!("{text}");
    };
    reporter.mark_helper();
    reporter.errorf(format_args!("{MARKER}{text}"));
}
