//! Declaration API
//!
//! [`SuiteBuilder`] is the single writer of a suite. Declaration files
//! receive a `&mut SuiteBuilder` and describe their groups through nested
//! scopes:
//!
//! ```
//! use ensemble_core::SuiteBuilder;
//!
//! let mut suite = SuiteBuilder::new();
//! suite.group("arithmetic", |g| {
//!     g.report("add", |r| {
//!         r.control("Integer", || 1 + 1);
//!         r.test("Float", || 1.0 + 1.0);
//!     });
//! });
//!
//! let suite = suite.finish().unwrap();
//! assert_eq!(suite.find_group("arithmetic").unwrap().size(), 2);
//! ```
//!
//! Only the innermost scope handle can append, so there is always exactly
//! one current group and, inside it, one current report.

use crate::{Group, Report, Suite, SuiteError, Test};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Incrementally builds a [`Suite`] from declaration calls.
#[derive(Debug, Default)]
pub struct SuiteBuilder {
    groups: Vec<Group>,
    errors: Vec<SuiteError>,
    loaded_files: Vec<PathBuf>,
    loaded: bool,
}

impl SuiteBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the named group, creating it if this is its first declaration.
    ///
    /// Re-declaring a group keeps its position and appends to its reports.
    pub fn group(&mut self, name: &str, body: impl FnOnce(&mut GroupScope<'_>)) -> &mut Self {
        let index = match self.groups.iter().position(|g| g.name() == name) {
            Some(index) => index,
            None => {
                self.groups.push(Group::new(name));
                self.groups.len() - 1
            }
        };

        let mut scope = GroupScope {
            group: &mut self.groups[index],
            errors: &mut self.errors,
        };
        body(&mut scope);
        self
    }

    /// Errors recorded by declaration calls, in the order they happened
    pub fn errors(&self) -> &[SuiteError] {
        &self.errors
    }

    /// Snapshot of the groups declared so far, ignoring recorded errors
    pub fn suite(&self) -> Suite {
        Suite::new(self.groups.iter().cloned().map(Arc::new))
    }

    /// Snapshot of the declared suite, or the first declaration error.
    pub fn finish(&self) -> Result<Suite, SuiteError> {
        match self.errors.first() {
            Some(err) => Err(err.clone()),
            None => Ok(self.suite()),
        }
    }

    /// Whether a loader has already populated this builder
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Mark loading as complete; later loads reuse what was declared.
    pub fn mark_loaded(&mut self) {
        self.loaded = true;
    }

    /// Record that a declaration file was executed.
    ///
    /// Returns `false` when the file had already been recorded.
    pub fn record_file(&mut self, path: &Path) -> bool {
        if self.loaded_files.iter().any(|p| p == path) {
            return false;
        }
        self.loaded_files.push(path.to_path_buf());
        true
    }

    /// Declaration files executed so far, in load order
    pub fn loaded_files(&self) -> &[PathBuf] {
        &self.loaded_files
    }
}

/// Scope of the group currently being declared.
pub struct GroupScope<'a> {
    group: &'a mut Group,
    errors: &'a mut Vec<SuiteError>,
}

impl GroupScope<'_> {
    /// Name of the current group
    pub fn name(&self) -> &str {
        self.group.name()
    }

    /// Append a new report to the current group and declare its tests.
    pub fn report(&mut self, name: &str, body: impl FnOnce(&mut ReportScope<'_>)) -> &mut Self {
        let mut report = Report::new(name);
        let mut scope = ReportScope {
            report: &mut report,
            errors: &mut *self.errors,
        };
        body(&mut scope);
        self.group.push(report);
        self
    }
}

/// Scope of the report currently being declared.
pub struct ReportScope<'a> {
    report: &'a mut Report,
    errors: &'a mut Vec<SuiteError>,
}

impl ReportScope<'_> {
    /// Name of the current report
    pub fn name(&self) -> &str {
        self.report.name()
    }

    /// Append the baseline test of this report
    pub fn control<F, R>(&mut self, name: &str, work: F) -> &mut Self
    where
        F: Fn() -> R + Send + Sync + 'static,
    {
        self.push(Test::new(name, true, work))
    }

    /// Append a test to this report
    pub fn test<F, R>(&mut self, name: &str, work: F) -> &mut Self
    where
        F: Fn() -> R + Send + Sync + 'static,
    {
        self.push(Test::new(name, false, work))
    }

    fn push(&mut self, test: Test) -> &mut Self {
        if let Err(err) = self.report.push(test) {
            self.errors.push(err);
        }
        self
    }
}
