//! End-to-end runner scenarios: parallel speedup, skipping, debug focus, naming.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use casebook::harness::{Harness, HarnessConfig, Outcome, TestReport};
use casebook::{Describe, Flags, Runner, frame};

fn harness(parallelism: usize) -> Harness {
    let parallelism = NonZeroUsize::new(parallelism).unwrap();
    Harness::new(HarnessConfig::default().with_parallelism(parallelism))
}

/// Run `cases` through a counting executor and return the report and the call count.
fn run_table(cases: &[(&'static str, Flags)]) -> (TestReport, usize) {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let cases = cases.to_vec();
    let report = harness(4).run("table", move |t| {
        frame::install(&t);
        let mut runner = Runner::new(move |_: u32| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        for (i, (name, flags)) in cases.into_iter().enumerate() {
            runner.add_case(name, i as u32, flags);
        }
        runner.run();
    });
    (report, calls.load(Ordering::SeqCst))
}

fn sub_test_outcomes(report: &TestReport) -> Vec<(&str, Outcome)> {
    report.children.iter().map(|c| (c.name.as_str(), c.outcome)).collect()
}

// ========================================
// Parallel
// ========================================

const CASE_SLEEP: Duration = Duration::from_millis(50);

#[test]
fn parallel_cases_overlap() {
    let started = Instant::now();
    let report = harness(4).run("parallel", |t| {
        frame::install(&t);
        let mut runner = Runner::new(|_: u8| thread::sleep(CASE_SLEEP));
        for i in 0..4 {
            runner.add_case(&format!("sleep-{i}"), i, Flags::PARALLEL);
        }
        runner.run();
    });
    let elapsed = started.elapsed();

    report.assert_passed();
    assert_eq!(report.summary().passed, 4);
    // Four 10ms cases must finish within 12ms; with 50ms sleeps the same 1.2x
    // budget is 60ms, while running them one after another takes at least 200ms.
    assert!(elapsed < CASE_SLEEP * 6 / 5, "took {elapsed:?}");
}

#[test]
fn parallel_and_sequential_cases_mix() {
    let (report, calls) = run_table(&[("seq", Flags::NONE), ("par-a", Flags::PARALLEL), ("par-b", Flags::PARALLEL)]);
    report.assert_passed();
    assert_eq!(calls, 3);
    let outcomes = sub_test_outcomes(&report);
    assert_eq!(
        outcomes,
        vec![
            ("table/seq", Outcome::Passed),
            ("table/par-a", Outcome::Passed),
            ("table/par-b", Outcome::Passed),
        ]
    );
}

// ========================================
// Skipping
// ========================================

#[test]
fn partial_skip_warns_with_counts() {
    let (report, calls) = run_table(&[("skip-1", Flags::SKIP), ("eval-2", Flags::NONE), ("skip-3", Flags::SKIP)]);
    assert_eq!(calls, 1);
    assert_eq!(report.errors, vec!["<== WARNING: 2 of 3 cases were skipped".to_string()]);
    insta::assert_snapshot!(report.outline(), @r"
    FAIL table
        <== WARNING: 2 of 3 cases were skipped
        SKIP table/skip-1
        PASS table/eval-2
        SKIP table/skip-3
    ");
}

#[test]
fn all_skipped_warns() {
    let (report, calls) = run_table(&[("a", Flags::SKIP), ("b", Flags::SKIP)]);
    assert_eq!(calls, 0);
    assert_eq!(report.errors, vec!["<== WARNING: all cases were skipped".to_string()]);
    assert_eq!(report.summary().skipped, 2);
}

#[test]
fn skipped_parallel_case_is_still_counted() {
    let (report, calls) = run_table(&[("a", Flags::SKIP | Flags::PARALLEL), ("b", Flags::PARALLEL)]);
    assert_eq!(calls, 1);
    assert_eq!(report.errors, vec!["<== WARNING: 1 of 2 cases were skipped".to_string()]);
}

// ========================================
// Debug focus
// ========================================

#[test]
fn debug_case_focuses_the_run() {
    let (report, calls) = run_table(&[
        ("test", Flags::NONE),
        ("debug", Flags::DEBUG),
        ("skip", Flags::SKIP),
        ("parallel", Flags::PARALLEL),
    ]);
    assert_eq!(calls, 1);
    assert_eq!(sub_test_outcomes(&report), vec![("table/debug", Outcome::Passed)]);
    assert_eq!(
        report.errors,
        vec!["<== WARNING: only 1 of 4 cases were evaluated (debug mode)".to_string()]
    );
}

#[test]
fn all_debug_runs_everything_quietly() {
    let (report, calls) = run_table(&[("a", Flags::DEBUG), ("b", Flags::DEBUG)]);
    assert_eq!(calls, 2);
    report.assert_passed();
    assert!(report.errors.is_empty());
}

#[test]
fn focused_skip_counts_against_the_focused_set() {
    let (report, calls) = run_table(&[("a", Flags::DEBUG | Flags::SKIP), ("b", Flags::DEBUG), ("c", Flags::NONE)]);
    assert_eq!(calls, 1);
    assert_eq!(
        report.errors,
        vec![
            "<== WARNING: only 2 of 3 cases were evaluated (debug mode)".to_string(),
            "<== WARNING: 1 of 3 cases were skipped".to_string(),
        ]
    );
}

#[derive(Clone, Describe)]
struct Marked {
    name: &'static str,
    debug: bool,
    skip: bool,
}

#[test]
fn debug_flag_overrides_payload_skip() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let report = harness(1).run("marked", move |t| {
        frame::install(&t);
        let mut runner = Runner::new(move |_: Marked| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        let payload = |name, debug, skip| Marked { name, debug, skip };
        runner.add_case("", payload("rescued", false, true), Flags::DEBUG);
        runner.add_case("", payload("focused", true, false), Flags::NONE);
        runner.add_case("", payload("ignored", false, false), Flags::NONE);
        runner.run();
    });
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        sub_test_outcomes(&report),
        vec![("marked/rescued", Outcome::Passed), ("marked/focused", Outcome::Passed)]
    );
}

// ========================================
// Naming and invalid tables
// ========================================

#[derive(Clone, Describe)]
#[allow(non_snake_case)]
struct Titled {
    Name: String,
}

#[test]
fn payload_names_are_trimmed_and_defaulted() {
    let report = harness(1).run("names", |t| {
        frame::install(&t);
        let mut runner = Runner::new(|_: Titled| {});
        runner.add_case("", Titled { Name: "first".into() }, Flags::NONE);
        runner.add_case("", Titled { Name: "   ".into() }, Flags::NONE);
        runner.add_case("", Titled { Name: " padded ".into() }, Flags::NONE);
        let names: Vec<_> = runner.cases().iter().map(|c| c.name().to_string()).collect();
        assert_eq!(names, vec!["first", "testcase-002", "padded"]);
        runner.run();
    });
    report.assert_passed();
    assert!(report.find("names/padded").is_some());
}

#[test]
fn duplicate_case_names_get_suffixes() {
    let (report, _) = run_table(&[("same", Flags::NONE), ("same", Flags::NONE)]);
    let names: Vec<_> = report.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["table/same", "table/same#01"]);
}

#[test]
fn empty_table_is_invalid() {
    let report = harness(1).run("empty", |t| {
        frame::install(&t);
        Runner::new(|_: u8| {}).run();
    });
    assert!(report.failed());
    assert!(report.children.is_empty());
    assert_eq!(report.errors, vec!["<== INVALID TEST\nno test cases provided".to_string()]);
}

#[test]
fn run_filter_selects_cases() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let config = HarnessConfig::default().with_filter("eval");
    let report = Harness::new(config).run("filtered", move |t| {
        frame::install(&t);
        let mut runner = Runner::new(move |_: u8| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        runner.add_case("eval-1", 1, Flags::NONE);
        runner.add_case("other-2", 2, Flags::NONE);
        runner.run();
    });
    report.assert_passed();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
