//! Entity Model
//!
//! The three-level tree a suite is made of: a [`Group`] owns [`Report`]s,
//! a report owns [`Test`]s. Entities are built once while declaration
//! files are loaded and are read-only afterwards.

use crate::SuiteError;
use std::fmt;
use std::hint::black_box;
use std::sync::Arc;

/// Shared, thread-safe handle to a test's unit of work.
pub type Work = Arc<dyn Fn() + Send + Sync>;

/// A named unit of benchmark work, optionally the control of its report.
#[derive(Clone)]
pub struct Test {
    name: String,
    work: Work,
    is_control: bool,
}

impl Test {
    /// Create a test from a closure. The closure's return value is passed
    /// through [`black_box`] so the work is never optimised away.
    pub fn new<F, R>(name: impl Into<String>, is_control: bool, work: F) -> Self
    where
        F: Fn() -> R + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            work: Arc::new(move || {
                black_box(work());
            }),
            is_control,
        }
    }

    /// Test name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this test is the baseline of its report
    pub fn is_control(&self) -> bool {
        self.is_control
    }

    /// Invoke the work once
    pub fn call(&self) {
        (self.work)()
    }

    /// Shared handle to the work closure
    pub fn work(&self) -> &Work {
        &self.work
    }
}

impl fmt::Debug for Test {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Test")
            .field("name", &self.name)
            .field("is_control", &self.is_control)
            .finish_non_exhaustive()
    }
}

/// A named, ordered collection of tests comparing implementations of one operation.
#[derive(Debug, Clone)]
pub struct Report {
    name: String,
    tests: Vec<Test>,
}

impl Report {
    /// Create an empty report
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tests: Vec::new(),
        }
    }

    /// Report name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tests in declaration order
    pub fn tests(&self) -> &[Test] {
        &self.tests
    }

    /// True iff the report holds at least one test
    pub fn has_tests(&self) -> bool {
        !self.tests.is_empty()
    }

    /// The control test, if one was declared
    pub fn control(&self) -> Option<&Test> {
        self.tests.iter().find(|t| t.is_control())
    }

    /// Look up a test by name
    pub fn find_test(&self, name: &str) -> Result<&Test, SuiteError> {
        self.tests
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| SuiteError::TestNotFound {
                report: self.name.clone(),
                test: name.to_string(),
            })
    }

    /// Append a test, rejecting duplicate names and a second control.
    pub(crate) fn push(&mut self, test: Test) -> Result<(), SuiteError> {
        if self.tests.iter().any(|t| t.name() == test.name()) {
            return Err(SuiteError::DuplicateTest {
                report: self.name.clone(),
                test: test.name,
            });
        }
        if test.is_control() {
            if let Some(existing) = self.control() {
                return Err(SuiteError::MultipleControls {
                    report: self.name.clone(),
                    existing: existing.name().to_string(),
                    test: test.name,
                });
            }
        }
        self.tests.push(test);
        Ok(())
    }
}

/// Top-level named collection of reports.
#[derive(Debug, Clone)]
pub struct Group {
    name: String,
    reports: Vec<Report>,
}

impl Group {
    /// Create an empty group
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reports: Vec::new(),
        }
    }

    /// Group name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reports in declaration order
    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    /// True iff the group holds at least one report
    pub fn has_reports(&self) -> bool {
        !self.reports.is_empty()
    }

    /// True iff any report holds a test
    pub fn has_tests(&self) -> bool {
        self.reports.iter().any(Report::has_tests)
    }

    /// Total number of tests across all reports
    pub fn size(&self) -> usize {
        self.reports.iter().map(|r| r.tests().len()).sum()
    }

    /// Look up a report by name
    pub fn find_report(&self, name: &str) -> Result<&Report, SuiteError> {
        self.reports
            .iter()
            .find(|r| r.name() == name)
            .ok_or_else(|| SuiteError::ReportNotFound {
                group: self.name.clone(),
                report: name.to_string(),
            })
    }

    pub(crate) fn push(&mut self, report: Report) {
        self.reports.push(report);
    }
}
