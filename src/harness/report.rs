//! Test reports produced by the harness.

use std::fmt;
use std::fmt::Write as _;
use std::time::Duration;

/// Final state of a test or sub-test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed,
    Skipped,
}

impl Outcome {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "PASS",
            Self::Failed => "FAIL",
            Self::Skipped => "SKIP",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result tree of one test and its sub-tests.
#[derive(Debug, Clone)]
pub struct TestReport {
    /// Full name (`parent/child` for sub-tests)
    pub name: String,
    pub outcome: Outcome,
    /// Messages recorded through `errorf` (and caught panics)
    pub errors: Vec<String>,
    /// Messages recorded through `log`
    pub logs: Vec<String>,
    pub duration: Duration,
    /// Sub-tests in the order they were started
    pub children: Vec<TestReport>,
}

/// Summary of the sub-tests below a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TestSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl TestReport {
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Passed
    }

    pub fn failed(&self) -> bool {
        self.outcome == Outcome::Failed
    }

    /// Find a report by full name in this tree.
    pub fn find(&self, name: &str) -> Option<&TestReport> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    /// Count every sub-test below this report, at any depth.
    pub fn summary(&self) -> TestSummary {
        let mut summary = TestSummary::default();
        for child in &self.children {
            summary.total += 1;
            match child.outcome {
                Outcome::Passed => summary.passed += 1,
                Outcome::Failed => summary.failed += 1,
                Outcome::Skipped => summary.skipped += 1,
            }
            let nested = child.summary();
            summary.total += nested.total;
            summary.passed += nested.passed;
            summary.failed += nested.failed;
            summary.skipped += nested.skipped;
        }
        summary
    }

    /// Timing-free text tree: one `OUTCOME name` line per test, messages indented.
    pub fn outline(&self) -> String {
        let mut lines = Vec::new();
        self.outline_into(0, &mut lines);
        lines.join("\n")
    }

    fn outline_into(&self, depth: usize, lines: &mut Vec<String>) {
        let indent = "    ".repeat(depth);
        lines.push(format!("{indent}{} {}", self.outcome, self.name));
        for message in &self.errors {
            for line in message.lines() {
                lines.push(format!("{indent}    {line}"));
            }
        }
        for child in &self.children {
            child.outline_into(depth + 1, lines);
        }
    }

    /// Panic with the outline unless the root passed.
    #[track_caller]
    pub fn assert_passed(&self) {
        if self.failed() {
            panic!("test {} failed\n{}", self.name, self.outline());
        }
    }

    fn render(&self, depth: usize, out: &mut String) -> fmt::Result {
        let indent = "    ".repeat(depth);
        writeln!(
            out,
            "{indent}--- {}: {} ({:.2}s)",
            self.outcome,
            self.name,
            self.duration.as_secs_f64()
        )?;
        for message in self.logs.iter().chain(&self.errors) {
            for line in message.lines() {
                writeln!(out, "{indent}    {line}")?;
            }
        }
        for child in &self.children {
            child.render(depth + 1, out)?;
        }
        Ok(())
    }
}

impl fmt::Display for TestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.render(0, &mut out)?;
        f.write_str(out.trim_end())
    }
}
