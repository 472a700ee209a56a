use std::path::Path;
use log::debug;
use serde::{Serialize, Deserialize};

use crate::core::error::{HarnessError, Result};
use crate::core::test::{is_on_time, SequenceInfo, TestInfo, TestResult};
use crate::reporters::TestReporter;

/// A suite that has already been executed, as recorded by a runner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteRecord {
    pub total_time_nanos: u64,
    #[serde(default)]
    pub sequences: Vec<SequenceRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceRecord {
    pub sequence: SequenceInfo,
    pub elapsed_nanos: u64,
    #[serde(default)]
    pub tests: Vec<TestRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRecord {
    pub test: TestInfo,
    pub result: TestResult,
    pub elapsed_nanos: u64,
}

impl SuiteRecord {
    /// Load a recorded suite. `.toml` files are read as TOML, anything else as JSON.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            HarnessError::ConfigError(format!("Failed to read suite file {}: {}", path.display(), e))
        })?;

        if path.extension().and_then(|ext| ext.to_str()) == Some("toml") {
            Self::from_toml(&contents)
        } else {
            Self::from_json(&contents)
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| HarnessError::ConfigError(format!("Failed to parse TOML suite: {}", e)))
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        serde_json::from_str(contents)
            .map_err(|e| HarnessError::ConfigError(format!("Failed to parse JSON suite: {}", e)))
    }
}

/// Totals gathered while replaying a suite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub sequences: usize,
    pub tests: usize,
    pub failed_tests: usize,
    pub late_tests: usize,
    pub late_sequences: usize,
}

impl ReplaySummary {
    /// Returns `true` if every test passed and nothing ran over budget.
    pub fn is_success(&self) -> bool {
        self.failed_tests == 0 && self.late_tests == 0 && self.late_sequences == 0
    }
}

/// Pushes the events of a recorded suite through a reporter in lifecycle order.
pub struct SuiteReplayer<'a> {
    reporter: &'a dyn TestReporter,
}

impl<'a> SuiteReplayer<'a> {
    pub fn new(reporter: &'a dyn TestReporter) -> Self {
        Self { reporter }
    }

    pub fn replay(&self, suite: &SuiteRecord) -> ReplaySummary {
        let mut summary = ReplaySummary::default();

        self.reporter.suite_start();

        for record in &suite.sequences {
            let sequence = &record.sequence;
            debug!("Replaying sequence {:?} ({} tests)", sequence.name, record.tests.len());
            self.reporter.sequence_start(sequence);

            for test in &record.tests {
                debug!("Replaying test {:?}", test.test.name);
                self.reporter.test(&test.test, &test.result, test.elapsed_nanos);

                summary.tests += 1;
                if !test.result.ok {
                    summary.failed_tests += 1;
                }
                if !is_on_time(test.test.max_time_nanos, test.elapsed_nanos) {
                    summary.late_tests += 1;
                }
            }

            self.reporter.sequence_end(sequence, record.elapsed_nanos);

            summary.sequences += 1;
            if !is_on_time(sequence.max_time_nanos, record.elapsed_nanos) {
                summary.late_sequences += 1;
            }
        }

        self.reporter.suite_end(suite.total_time_nanos);

        summary
    }
}
