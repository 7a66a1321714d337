//! Checkpoint assertions and the probe transcript.
//!
//! Every probe reports through [`Transcript::check`] and friends: a verdict
//! line is written immediately (literal `PASS`/`WARN`/`FAIL` prefix, one line
//! per checkpoint) and a [`ProbeRecord`] is retained so callers can inspect or
//! aggregate after the run. A failed checkpoint never aborts the process; on a
//! half-booted kernel the transcript itself is the only signal an operator
//! gets, so reporting must always complete.

use serde::{Deserialize, Serialize};
use std::io::Write;

/// Outcome of a single checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Warn,
    Fail,
}

impl Verdict {
    /// Fixed literal prefix used on the transcript line.
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Verdict::Pass => "PASS",
            Verdict::Warn => "WARN",
            Verdict::Fail => "FAIL",
        }
    }
}

/// One recorded checkpoint result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeRecord {
    /// Name of the probe (or sub-checkpoint) that reported.
    pub probe: String,
    /// Verdict for this checkpoint.
    pub verdict: Verdict,
    /// Optional expected/actual or context detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Aggregate counts over a transcript.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub warned: usize,
    pub failed: usize,
}

impl RunSummary {
    /// Returns true when no checkpoint failed (warnings are tolerated).
    #[must_use]
    pub fn all_clear(&self) -> bool {
        self.failed == 0
    }
}

enum Sink {
    Stdout,
    Memory(Vec<u8>),
}

/// Line-oriented verdict reporter.
pub struct Transcript {
    sink: Sink,
    records: Vec<ProbeRecord>,
}

impl Transcript {
    /// Transcript writing to process stdout (the normal suite path).
    #[must_use]
    pub fn stdout() -> Self {
        Self {
            sink: Sink::Stdout,
            records: Vec::new(),
        }
    }

    /// Transcript capturing output in memory, for tests.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            sink: Sink::Memory(Vec::new()),
            records: Vec::new(),
        }
    }

    /// Evaluate a condition and report `PASS`/`FAIL` without extra detail.
    pub fn check(&mut self, probe: &str, ok: bool) -> Verdict {
        self.report(probe, if ok { Verdict::Pass } else { Verdict::Fail }, None)
    }

    /// Evaluate a condition with a context string carried on the line.
    pub fn check_with(&mut self, probe: &str, ok: bool, detail: String) -> Verdict {
        self.report(
            probe,
            if ok { Verdict::Pass } else { Verdict::Fail },
            Some(detail),
        )
    }

    /// Compare expected vs actual; failures carry both values.
    pub fn check_eq<T: PartialEq + std::fmt::Debug>(
        &mut self,
        probe: &str,
        expected: T,
        actual: T,
    ) -> Verdict {
        let ok = expected == actual;
        self.check_with(probe, ok, format!("expected {expected:?}, actual {actual:?}"))
    }

    /// Report a non-fatal warning (legitimate but noteworthy condition).
    pub fn warn(&mut self, probe: &str, detail: String) -> Verdict {
        self.report(probe, Verdict::Warn, Some(detail))
    }

    fn report(&mut self, probe: &str, verdict: Verdict, detail: Option<String>) -> Verdict {
        let line = match &detail {
            Some(d) => format!("{} {probe}: {d}", verdict.prefix()),
            None => format!("{} {probe}", verdict.prefix()),
        };
        self.write_line(&line);
        self.records.push(ProbeRecord {
            probe: probe.to_string(),
            verdict,
            detail,
        });
        verdict
    }

    /// Write a raw transcript line (banners, summary). Not recorded.
    pub fn banner(&mut self, line: &str) {
        self.write_line(line);
    }

    /// Write without a trailing newline and flush (liveness dots).
    pub fn progress(&mut self, text: &str) {
        match &mut self.sink {
            Sink::Stdout => {
                let mut out = std::io::stdout().lock();
                let _ = write!(out, "{text}");
                let _ = out.flush();
            }
            Sink::Memory(buf) => {
                let _ = write!(buf, "{text}");
            }
        }
    }

    fn write_line(&mut self, line: &str) {
        match &mut self.sink {
            Sink::Stdout => {
                let mut out = std::io::stdout().lock();
                let _ = writeln!(out, "{line}");
            }
            Sink::Memory(buf) => {
                let _ = writeln!(buf, "{line}");
            }
        }
    }

    /// All recorded checkpoints, in report order.
    #[must_use]
    pub fn records(&self) -> &[ProbeRecord] {
        &self.records
    }

    /// Aggregate counts over the records so far.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        let passed = self.count(Verdict::Pass);
        let warned = self.count(Verdict::Warn);
        let failed = self.count(Verdict::Fail);
        RunSummary {
            total: self.records.len(),
            passed,
            warned,
            failed,
        }
    }

    fn count(&self, verdict: Verdict) -> usize {
        self.records.iter().filter(|r| r.verdict == verdict).count()
    }

    /// Render the records as JSONL, one checkpoint per line.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        self.records
            .iter()
            .filter_map(|r| serde_json::to_string(r).ok())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Captured text for in-memory transcripts; `None` for stdout.
    #[must_use]
    pub fn rendered(&self) -> Option<String> {
        match &self.sink {
            Sink::Stdout => None,
            Sink::Memory(buf) => Some(String::from_utf8_lossy(buf).into_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_and_fail_lines_use_literal_prefixes() {
        let mut t = Transcript::in_memory();
        t.check("alpha", true);
        t.check_with("beta", false, "expected 1, actual 2".to_string());
        t.warn("gamma", "no environment".to_string());
        let text = t.rendered().unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "PASS alpha");
        assert_eq!(lines[1], "FAIL beta: expected 1, actual 2");
        assert_eq!(lines[2], "WARN gamma: no environment");
    }

    #[test]
    fn check_eq_carries_expected_and_actual() {
        let mut t = Transcript::in_memory();
        assert_eq!(t.check_eq("fib", 6765u64, 6765u64), Verdict::Pass);
        assert_eq!(t.check_eq("fib", 6765u64, 6766u64), Verdict::Fail);
        let detail = t.records()[1].detail.as_deref().unwrap();
        assert!(detail.contains("6765") && detail.contains("6766"));
    }

    #[test]
    fn summary_counts_by_verdict() {
        let mut t = Transcript::in_memory();
        t.check("a", true);
        t.check("b", true);
        t.check("c", false);
        t.warn("d", "note".to_string());
        let s = t.summary();
        assert_eq!(s.total, 4);
        assert_eq!(s.passed, 2);
        assert_eq!(s.warned, 1);
        assert_eq!(s.failed, 1);
        assert!(!s.all_clear());
    }

    #[test]
    fn jsonl_round_trips_records() {
        let mut t = Transcript::in_memory();
        t.check("a", true);
        t.check_with("b", false, "boom".to_string());
        for line in t.to_jsonl().lines() {
            let rec: ProbeRecord = serde_json::from_str(line).expect("valid jsonl line");
            assert!(!rec.probe.is_empty());
        }
    }

    #[test]
    fn failed_checkpoint_does_not_abort() {
        let mut t = Transcript::in_memory();
        let v = t.check("doomed", false);
        assert_eq!(v, Verdict::Fail);
        // still usable afterwards
        assert_eq!(t.check("next", true), Verdict::Pass);
    }
}
