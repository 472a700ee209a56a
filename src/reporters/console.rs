use std::fmt::Write as _;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};
use chrono::Local;
use log::error;

use crate::core::config::validate_report_name;
use crate::core::error::Result;
use crate::core::test::{is_on_time, Test, TestResult, TestSequence};
use crate::reporters::TestReporter;

const NOW_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const NANOS_IN_MILLIS: u64 = 1_000_000;
const ABSENT: &str = "*";

/// Line-oriented reporter writing one bracketed line per lifecycle event.
///
/// Lines look like `[2024-01-31 10:00:00][report] [TEST][OK][name]... summary`.
/// The sink sits behind a mutex so lines from concurrent callers never tear.
pub struct ConsoleTestReporter<W: Write + Send = io::Stdout> {
    report_name: String,
    sink: Mutex<W>,
}

impl ConsoleTestReporter<io::Stdout> {
    /// Create a reporter writing to standard output
    pub fn new(report_name: impl Into<String>) -> Result<Self> {
        Self::with_sink(report_name, io::stdout())
    }
}

impl<W: Write + Send> ConsoleTestReporter<W> {
    /// Create a reporter writing to an arbitrary sink
    pub fn with_sink(report_name: impl Into<String>, sink: W) -> Result<Self> {
        let report_name = report_name.into();
        validate_report_name(&report_name)?;
        Ok(Self {
            report_name,
            sink: Mutex::new(sink),
        })
    }

    pub fn report_name(&self) -> &str {
        &self.report_name
    }

    /// Consume the reporter and hand back its sink
    pub fn into_sink(self) -> W {
        self.sink.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn output(&self, message: &str) {
        let line = format!("[{}][{}] {}", now(), self.report_name, message);
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(sink, "{}", line).and_then(|_| sink.flush()) {
            error!("Report '{}' failed to write line: {}", self.report_name, e);
        }
    }
}

impl<W: Write + Send> TestReporter for ConsoleTestReporter<W> {
    fn suite_start(&self) {
        self.output("[START] REPORT START");
    }

    fn suite_end(&self, execution_time_nanos: u64) {
        self.output(&suite_end_body(execution_time_nanos));
    }

    fn sequence_start(&self, sequence: &dyn TestSequence) {
        self.output(&sequence_start_body(sequence));
    }

    fn sequence_end(&self, sequence: &dyn TestSequence, execution_time_nanos: u64) {
        self.output(&sequence_end_body(sequence, execution_time_nanos));
    }

    fn test(&self, test: &dyn Test, result: &TestResult, execution_time_nanos: u64) {
        self.output(&test_body(test, result, execution_time_nanos));
    }
}

fn now() -> String {
    Local::now().format(NOW_FORMAT).to_string()
}

/// Render nanoseconds as `"<n>ns (<n / 1_000_000>ms)"`, truncating the millis.
pub fn format_duration(nanos: u64) -> String {
    format!("{}ns ({}ms)", nanos, nanos / NANOS_IN_MILLIS)
}

fn opt_name(name: Option<&str>) -> &str {
    name.unwrap_or(ABSENT)
}

fn opt_nanos(nanos: Option<u64>) -> String {
    nanos.map_or_else(|| ABSENT.to_string(), |n| n.to_string())
}

fn exec_time_tag(on_time: bool) -> &'static str {
    if on_time { "EXECTIMEOK" } else { "EXECTIMEKO" }
}

// Appends " <Subject> executed in ..." or the on-time/late variant with the budget.
fn push_timing(out: &mut String, subject: &str, max_time_nanos: Option<u64>, elapsed: u64) {
    let _ = match max_time_nanos {
        None => write!(out, " {} executed in {}", subject, format_duration(elapsed)),
        Some(max) if max >= elapsed => write!(
            out,
            " {} executed on time. Executed in {} (max: {})",
            subject,
            format_duration(elapsed),
            format_duration(max)
        ),
        Some(max) => write!(
            out,
            " {} FAILED to execute on time. Executed in {} (max: {})",
            subject,
            format_duration(elapsed),
            format_duration(max)
        ),
    };
}

pub fn suite_end_body(execution_time_nanos: u64) -> String {
    format!("[END] REPORT END [{}]", format_duration(execution_time_nanos))
}

pub fn sequence_start_body(sequence: &dyn TestSequence) -> String {
    format!(
        "[SEQSTART][{}][{}][{}][{}]",
        opt_name(sequence.name()),
        sequence.iterations(),
        sequence.size(),
        opt_nanos(sequence.max_time_nanos())
    )
}

pub fn sequence_end_body(sequence: &dyn TestSequence, execution_time_nanos: u64) -> String {
    let max_time = sequence.max_time_nanos();
    let mut body = format!(
        "[SEQEND][{}][{}][{}][{}][{}][{}]",
        opt_name(sequence.name()),
        sequence.iterations(),
        sequence.size(),
        opt_nanos(max_time),
        execution_time_nanos,
        exec_time_tag(is_on_time(max_time, execution_time_nanos))
    );
    push_timing(&mut body, "Sequence", max_time, execution_time_nanos);
    body
}

pub fn test_body(test: &dyn Test, result: &TestResult, execution_time_nanos: u64) -> String {
    let max_time = test.max_time_nanos();
    let mut body = format!(
        "[TEST][{}][{}][{}][{}][{}][{}] ",
        if result.ok { "OK" } else { "KO" },
        opt_name(test.name()),
        test.iterations(),
        opt_nanos(max_time),
        execution_time_nanos,
        exec_time_tag(is_on_time(max_time, execution_time_nanos))
    );

    body.push_str(if result.ok { "Test executed OK" } else { "Test FAILED" });
    match &result.message {
        Some(message) => {
            let _ = write!(body, ": {}", message);
        }
        None => body.push_str(". "),
    }
    if let Some(cause) = &result.cause {
        let _ = write!(body, " [Exception thrown: {}: {}]", cause.kind, cause.message);
    }

    push_timing(&mut body, "Test", max_time, execution_time_nanos);
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::HarnessError;
    use crate::core::test::{FailureCause, SequenceInfo, TestInfo};
    use std::sync::Arc;
    use std::thread;

    fn lines(reporter: ConsoleTestReporter<Vec<u8>>) -> Vec<String> {
        String::from_utf8(reporter.into_sink())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    // Drops the "[yyyy-MM-dd HH:mm:ss]" prefix.
    fn without_timestamp(line: &str) -> &str {
        assert_eq!(&line[..1], "[");
        assert_eq!(&line[20..21], "]");
        &line[21..]
    }

    fn seq(name: Option<&str>, iterations: u32, size: usize, max: Option<u64>) -> SequenceInfo {
        SequenceInfo {
            name: name.map(str::to_string),
            iterations,
            size,
            max_time_nanos: max,
        }
    }

    fn test_info(name: Option<&str>, max: Option<u64>) -> TestInfo {
        TestInfo {
            name: name.map(str::to_string),
            iterations: 1,
            max_time_nanos: max,
        }
    }

    #[test]
    fn test_format_duration_truncates() {
        assert_eq!(format_duration(1_500_000), "1500000ns (1ms)");
        assert_eq!(format_duration(999_999), "999999ns (0ms)");
        assert_eq!(format_duration(0), "0ns (0ms)");
        assert_eq!(format_duration(2_000_000), "2000000ns (2ms)");
    }

    #[test]
    fn test_empty_report_name_rejected() {
        let result = ConsoleTestReporter::with_sink("", Vec::new());
        assert!(matches!(result, Err(HarnessError::InvalidArgument(_))));
        assert!(matches!(ConsoleTestReporter::new(""), Err(HarnessError::InvalidArgument(_))));
    }

    #[test]
    fn test_suite_scenario() {
        let reporter = ConsoleTestReporter::with_sink("suite", Vec::new()).unwrap();
        let sequence = seq(None, 5, 3, None);

        reporter.suite_start();
        reporter.sequence_start(&sequence);
        reporter.sequence_end(&sequence, 2_000_000);
        reporter.suite_end(2_000_000);

        let lines = lines(reporter);
        let bodies: Vec<&str> = lines.iter().map(|l| without_timestamp(l)).collect();
        assert_eq!(
            bodies,
            vec![
                "[suite] [START] REPORT START",
                "[suite] [SEQSTART][*][5][3][*]",
                "[suite] [SEQEND][*][5][3][*][2000000][EXECTIMEOK] Sequence executed in 2000000ns (2ms)",
                "[suite] [END] REPORT END [2000000ns (2ms)]",
            ]
        );
    }

    #[test]
    fn test_sequence_end_budget_variants() {
        let on_time = sequence_end_body(&seq(Some("s"), 1, 2, Some(2_000_000)), 2_000_000);
        assert_eq!(
            on_time,
            "[SEQEND][s][1][2][2000000][2000000][EXECTIMEOK] Sequence executed on time. \
             Executed in 2000000ns (2ms) (max: 2000000ns (2ms))"
        );

        let late = sequence_end_body(&seq(Some("s"), 1, 2, Some(1_000_000)), 3_500_000);
        assert_eq!(
            late,
            "[SEQEND][s][1][2][1000000][3500000][EXECTIMEKO] Sequence FAILED to execute on time. \
             Executed in 3500000ns (3ms) (max: 1000000ns (1ms))"
        );
    }

    #[test]
    fn test_failed_test_over_budget() {
        let body = test_body(&test_info(Some("t1"), Some(1000)), &TestResult::failed("bad"), 1500);
        assert_eq!(
            body,
            "[TEST][KO][t1][1][1000][1500][EXECTIMEKO] Test FAILED: bad Test FAILED to execute on time. \
             Executed in 1500ns (0ms) (max: 1000ns (0ms))"
        );
    }

    #[test]
    fn test_passing_test_without_message() {
        let body = test_body(&test_info(None, None), &TestResult::ok(), 42);
        assert_eq!(body, "[TEST][OK][*][1][*][42][EXECTIMEOK] Test executed OK.  Test executed in 42ns (0ms)");
    }

    #[test]
    fn test_cause_is_appended() {
        let result = TestResult::failed("render error")
            .with_cause(FailureCause::new("template::ParseError", "unexpected token"));
        let body = test_body(&test_info(Some("t2"), Some(5000)), &result, 5000);
        assert_eq!(
            body,
            "[TEST][KO][t2][1][5000][5000][EXECTIMEOK] Test FAILED: render error \
             [Exception thrown: template::ParseError: unexpected token] Test executed on time. \
             Executed in 5000ns (0ms) (max: 5000ns (0ms))"
        );
    }

    #[test]
    fn test_unbudgeted_always_on_time() {
        for elapsed in [0, 1, 1_000_000_000, u64::MAX] {
            assert!(sequence_end_body(&seq(None, 1, 1, None), elapsed).contains("[EXECTIMEOK]"));
            assert!(test_body(&test_info(None, None), &TestResult::ok(), elapsed).contains("[EXECTIMEOK]"));
        }
    }

    #[test]
    fn test_timestamp_shape() {
        let stamp = now();
        assert_eq!(stamp.len(), 19);
        assert_eq!(&stamp[4..5], "-");
        assert_eq!(&stamp[10..11], " ");
        assert_eq!(&stamp[13..14], ":");
    }

    #[test]
    fn test_concurrent_lines_do_not_tear() {
        let reporter = Arc::new(ConsoleTestReporter::with_sink("mt", Vec::new()).unwrap());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let reporter = Arc::clone(&reporter);
                thread::spawn(move || {
                    let test = test_info(Some(&format!("t{}", i)), Some(100));
                    for _ in 0..50 {
                        reporter.test(&test, &TestResult::ok(), 10);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let reporter = Arc::try_unwrap(reporter).ok().unwrap();
        let lines = lines(reporter);
        assert_eq!(lines.len(), 400);
        for line in &lines {
            let body = without_timestamp(line);
            assert!(body.starts_with("[mt] [TEST][OK][t"));
            assert!(body.ends_with("Test executed on time. Executed in 10ns (0ms) (max: 100ns (0ms))"));
        }
    }

    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_errors_are_swallowed() {
        let reporter = ConsoleTestReporter::with_sink("broken", BrokenSink).unwrap();
        reporter.suite_start();
        reporter.test(&test_info(None, None), &TestResult::ok(), 1);
        reporter.suite_end(1);
    }
}
