/*
[INPUT]:  Outcomes of individual harness checks
[OUTPUT]: Timed PASS/FAIL records and a printable summary
[POS]:    Reporting layer - shared between runner and binary
[UPDATE]: When changing report format or exit code rules
*/

use std::fmt::Write as _;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub section: &'static str,
    pub name: String,
    pub passed: bool,
    pub elapsed: Duration,
    /// Failure reason
    pub detail: Option<String>,
}

/// Results of one harness run, in execution order
#[derive(Debug, Default)]
pub struct Report {
    outcomes: Vec<CheckOutcome>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: CheckOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn outcomes(&self) -> &[CheckOutcome] {
        &self.outcomes
    }

    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes.iter().filter(|o| !o.passed)
    }

    pub fn total_elapsed(&self) -> Duration {
        self.outcomes.iter().map(|o| o.elapsed).sum()
    }

    /// Process exit status: 1 when any check failed
    pub fn exit_code(&self) -> u8 {
        if self.failed() == 0 { 0 } else { 1 }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut section = "";
        for outcome in &self.outcomes {
            if outcome.section != section {
                section = outcome.section;
                let _ = writeln!(out, "\n== {section} ==");
            }
            let status = if outcome.passed { "PASS" } else { "FAIL" };
            let _ = writeln!(
                out,
                "[{status}] {:<48} {:>7}ms",
                outcome.name,
                outcome.elapsed.as_millis()
            );
            if let Some(detail) = &outcome.detail {
                let _ = writeln!(out, "       {detail}");
            }
        }

        let _ = writeln!(
            out,
            "\nTotal: {}  Passed: {}  Failed: {}  Time: {}ms",
            self.outcomes.len(),
            self.passed(),
            self.failed(),
            self.total_elapsed().as_millis()
        );
        if self.failed() > 0 {
            let _ = writeln!(out, "Failed checks:");
            for failure in self.failures() {
                let _ = writeln!(out, "  - {} / {}", failure.section, failure.name);
            }
        }
        out
    }
}
