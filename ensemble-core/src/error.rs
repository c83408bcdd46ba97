use thiserror::Error;

/// Lookup and declaration errors raised against a suite.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SuiteError {
    /// The requested group is not part of the suite.
    #[error("Group not found: {0}")]
    GroupNotFound(String),

    /// The group resolved but has nothing to run.
    #[error("Group has no tests: {0}")]
    GroupEmpty(String),

    /// The group has no report with this name.
    #[error("Report not found: {report} (in group {group})")]
    ReportNotFound {
        /// Group that was searched
        group: String,
        /// Requested report name
        report: String,
    },

    /// The report has no test with this name.
    #[error("Test not found: {test} (in report {report})")]
    TestNotFound {
        /// Report that was searched
        report: String,
        /// Requested test name
        test: String,
    },

    /// Two tests in one report share a name.
    #[error("Duplicate test {test} in report {report}")]
    DuplicateTest {
        /// Report receiving the test
        report: String,
        /// Name declared twice
        test: String,
    },

    /// A report declared a second control test.
    #[error("Report {report} already has control {existing}; cannot mark {test} as control")]
    MultipleControls {
        /// Report receiving the test
        report: String,
        /// Control already declared
        existing: String,
        /// Test rejected as a second control
        test: String,
    },
}
