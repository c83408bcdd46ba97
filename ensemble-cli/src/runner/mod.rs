//! Group Runners
//!
//! A runner executes the work unit of each group under an isolation
//! strategy. Work units come from a caller-supplied factory that is always
//! invoked inside the isolation boundary.
//!
//! ```text
//!  Suite ──► Runner ──► for each group:
//!                         factory(&group) ─► WorkUnit ─► run inside boundary
//!                                                          │
//!                         Ok / Failure ◄── captured ◄──────┘
//! ```
//!
//! - [`ProcessRunner`]: one forked child per group, result over a one-shot pipe
//! - [`ThreadRunner`]: one dedicated thread per group, failures in a write-once map
//!
//! A failing group never stops the others: every group runs to completion
//! and failures are reported individually before the aggregate error.

mod process;
mod thread;

pub use process::ProcessRunner;
pub use thread::ThreadRunner;

use crate::shell::Shell;
use ensemble_core::{Group, Suite, SuiteError};
use ensemble_ipc::Outcome;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Once};
use thiserror::Error;

/// Executable unit produced for one group
pub type WorkUnit<'a> = Box<dyn FnOnce() -> anyhow::Result<()> + 'a>;

/// Produces the work unit of a group; called once per group, inside the isolation boundary
pub type WorkFactory<'a> = dyn Fn(&Group) -> WorkUnit<'a> + Sync + 'a;

/// Errors surfaced to the caller of a runner
#[derive(Debug, Error)]
pub enum RunError {
    /// Pipe, fork, thread spawn or wait failed
    #[error("Failed to start isolated worker: {0}")]
    Spawn(#[from] std::io::Error),

    /// The single group run by [`Runner::run_group`] failed
    #[error("Group {group} failed: {message}")]
    GroupFailed {
        /// Name of the failed group
        group: String,
        /// Failure message as raised by the work unit
        message: String,
        /// Captured trace, empty when none was available
        trace: String,
    },

    /// One or more groups of a batch failed, in declaration order
    #[error("{} group(s) failed: {}", .0.len(), .0.join(", "))]
    GroupsFailed(Vec<String>),

    /// Group lookup failed
    #[error(transparent)]
    Suite(#[from] SuiteError),
}

/// Isolation strategy
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum RunnerKind {
    /// Fork a child process per group
    #[default]
    Process,
    /// Spawn a thread per group
    Thread,
}

impl RunnerKind {
    /// Build the runner for this strategy
    pub fn build(self, shell: Arc<dyn Shell>) -> Box<dyn Runner> {
        match self {
            RunnerKind::Process => Box::new(ProcessRunner::new(shell)),
            RunnerKind::Thread => Box::new(ThreadRunner::new(shell)),
        }
    }
}

/// Strategy for executing groups' work units
pub trait Runner {
    /// Run exactly one group. Fails, after reporting, if its work fails.
    fn run_group(&self, group: &Group, factory: &WorkFactory<'_>) -> Result<(), RunError>;

    /// Run every group concurrently and fail only after all of them finished.
    fn run_groups(&self, groups: &[Arc<Group>], factory: &WorkFactory<'_>)
    -> Result<(), RunError>;

    /// Run the named group, or every group of the suite when no name is given.
    fn run(
        &self,
        suite: &Suite,
        group_name: Option<&str>,
        factory: &WorkFactory<'_>,
    ) -> Result<(), RunError> {
        match group_name {
            Some(name) => {
                let group = suite.find_group(name)?;
                self.run_group(group, factory)
            }
            None => self.run_groups(suite.groups(), factory),
        }
    }
}

/// A work-unit failure captured at the isolation boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// What went wrong
    pub message: String,
    /// Backtrace or other diagnostic detail; may be empty
    pub trace: String,
}

impl Failure {
    /// A failure without a trace
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            trace: String::new(),
        }
    }

    fn from_error(err: &anyhow::Error) -> Self {
        let backtrace = err.backtrace();
        let trace = match backtrace.status() {
            BacktraceStatus::Captured => backtrace.to_string(),
            _ => String::new(),
        };
        Self {
            message: format!("{err:#}"),
            trace,
        }
    }

    fn from_panic(panic: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = panic.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic.downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        Self {
            message: format!("panicked: {message}"),
            trace: PANIC_TRACE.take().unwrap_or_default(),
        }
    }

    fn into_error(self, group: &str) -> RunError {
        RunError::GroupFailed {
            group: group.to_string(),
            message: self.message,
            trace: self.trace,
        }
    }
}

impl From<Failure> for Outcome {
    fn from(failure: Failure) -> Self {
        Outcome::Error {
            message: failure.message,
            trace: failure.trace,
        }
    }
}

thread_local! {
    /// Set while this thread is inside [`execute`]
    static CAPTURING: Cell<bool> = const { Cell::new(false) };
    /// Backtrace of the last panic raised while capturing
    static PANIC_TRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

static PANIC_HOOK: Once = Once::new();

/// Chain a hook that records the backtrace at the panic site.
///
/// The panicking frames are gone once `catch_unwind` returns.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if CAPTURING.try_with(Cell::get).unwrap_or(false) {
                let trace = Backtrace::force_capture().to_string();
                let _ = PANIC_TRACE.try_with(|slot| slot.replace(Some(trace)));
            }
            previous(info);
        }));
    });
}

/// Obtain the group's work unit and run it, capturing errors and panics.
fn execute(group: &Group, factory: &WorkFactory<'_>) -> Result<(), Failure> {
    install_panic_hook();
    PANIC_TRACE.take();

    let was_capturing = CAPTURING.replace(true);
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let unit = factory(group);
        unit()
    }));
    CAPTURING.set(was_capturing);

    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(Failure::from_error(&err)),
        Err(panic) => Err(Failure::from_panic(panic)),
    }
}

fn report_success(shell: &dyn Shell, group: &str) {
    shell.say(&format!("Group '{group}' completed"));
}

fn report_failure(shell: &dyn Shell, group: &str, failure: &Failure) {
    shell.say_error(&format!("Group '{group}' failed: {}", failure.message));
    if !failure.trace.is_empty() {
        shell.say_error(&failure.trace);
    }
}

/// Turn the names of failed groups into the aggregate result.
fn aggregate(failed: Vec<String>) -> Result<(), RunError> {
    if failed.is_empty() {
        Ok(())
    } else {
        Err(RunError::GroupsFailed(failed))
    }
}
