//! Thread Runner
//!
//! Each group runs on a dedicated thread of the current process. Lower
//! overhead than forking, but CPU-bound groups only run in parallel as far
//! as the work itself allows.
//!
//! ```text
//! idle ──spawn all──► spawned ──join all (declaration order)──► joined ──► report
//! ```
//!
//! Failures are written into [`FailureMap`]: one slot per group, written at
//! most once by that group's own thread and read only after every thread
//! has been joined.

use super::{
    Failure, RunError, Runner, WorkFactory, aggregate, execute, report_failure, report_success,
};
use crate::shell::Shell;
use ensemble_core::Group;
use std::sync::{Arc, OnceLock};
use std::thread;
use tracing::debug;

/// Runs each group on its own thread.
pub struct ThreadRunner {
    shell: Arc<dyn Shell>,
}

/// Per-group failure slots, indexed like the group list.
struct FailureMap {
    slots: Vec<OnceLock<Failure>>,
}

impl FailureMap {
    fn new(len: usize) -> Self {
        Self {
            slots: (0..len).map(|_| OnceLock::new()).collect(),
        }
    }

    /// Record a failure. Later writes to the same slot are ignored.
    fn record(&self, index: usize, failure: Failure) {
        let _ = self.slots[index].set(failure);
    }

    fn into_failures(self) -> impl Iterator<Item = Option<Failure>> {
        self.slots.into_iter().map(OnceLock::into_inner)
    }
}

impl ThreadRunner {
    /// Create a thread runner reporting to `shell`
    pub fn new(shell: Arc<dyn Shell>) -> Self {
        Self { shell }
    }
}

fn thread_name(group: &Group) -> String {
    format!("ensemble-{}", group.name())
}

impl Runner for ThreadRunner {
    fn run_group(&self, group: &Group, factory: &WorkFactory<'_>) -> Result<(), RunError> {
        let result = thread::scope(|scope| {
            let handle = thread::Builder::new()
                .name(thread_name(group))
                .spawn_scoped(scope, || execute(group, factory))?;
            debug!(group = group.name(), "spawned worker thread");
            Ok::<_, std::io::Error>(
                handle
                    .join()
                    .unwrap_or_else(|_| Err(Failure::new("worker thread panicked"))),
            )
        })?;
        debug!(group = group.name(), "joined worker thread");

        match result {
            Ok(()) => {
                report_success(self.shell.as_ref(), group.name());
                Ok(())
            }
            Err(failure) => {
                report_failure(self.shell.as_ref(), group.name(), &failure);
                Err(failure.into_error(group.name()))
            }
        }
    }

    fn run_groups(
        &self,
        groups: &[Arc<Group>],
        factory: &WorkFactory<'_>,
    ) -> Result<(), RunError> {
        let failures = FailureMap::new(groups.len());

        thread::scope(|scope| {
            let failures = &failures;
            let mut handles = Vec::with_capacity(groups.len());

            for (index, group) in groups.iter().enumerate() {
                let spawned = thread::Builder::new()
                    .name(thread_name(group))
                    .spawn_scoped(scope, move || {
                        if let Err(failure) = execute(group, factory) {
                            failures.record(index, failure);
                        }
                    });
                match spawned {
                    Ok(handle) => {
                        debug!(group = group.name(), "spawned worker thread");
                        handles.push((index, handle));
                    }
                    Err(e) => failures.record(
                        index,
                        Failure::new(format!("Failed to spawn worker thread: {e}")),
                    ),
                }
            }

            // Join in declaration order, whatever order the threads finish in.
            for (index, handle) in handles {
                if handle.join().is_err() {
                    failures.record(index, Failure::new("worker thread panicked"));
                }
                debug!(group = groups[index].name(), "joined worker thread");
            }
        });

        let mut failed = Vec::new();
        for (group, failure) in groups.iter().zip(failures.into_failures()) {
            match failure {
                None => report_success(self.shell.as_ref(), group.name()),
                Some(failure) => {
                    report_failure(self.shell.as_ref(), group.name(), &failure);
                    failed.push(group.name().to_string());
                }
            }
        }

        aggregate(failed)
    }
}
