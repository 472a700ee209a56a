pub mod console;

use crate::core::test::{Test, TestResult, TestSequence};

/// Receives lifecycle events from whatever drives a test suite.
///
/// Every method is a notification: implementations must not fail back into
/// the caller, so a broken reporter never aborts the suite it is observing.
pub trait TestReporter {
    /// Report the start of the suite
    fn suite_start(&self);

    /// Report the end of the suite along with its total execution time
    fn suite_end(&self, execution_time_nanos: u64);

    /// Report that a sequence is about to run
    fn sequence_start(&self, sequence: &dyn TestSequence);

    /// Report a finished sequence and check it against its budget
    fn sequence_end(&self, sequence: &dyn TestSequence, execution_time_nanos: u64);

    /// Report the result of a single test and check it against its budget
    fn test(&self, test: &dyn Test, result: &TestResult, execution_time_nanos: u64);
}
