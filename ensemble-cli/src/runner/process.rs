//! Process-Isolated Runner
//!
//! Each group runs in a freshly forked child. Parent and child share no
//! memory after the fork; the only link is a one-shot pipe carrying the
//! child's outcome.
//!
//! ```text
//! idle ──fork──► forked ──read to EOF──► awaiting-result ──waitpid──► joined
//! ```
//!
//! The child leaves with `_exit`, so exit handlers and destructors inherited
//! from the parent never run twice.

use super::{
    Failure, RunError, Runner, WorkFactory, aggregate, execute, report_failure, report_success,
};
use crate::shell::Shell;
use ensemble_core::Group;
use ensemble_ipc::{ChannelReader, Outcome, PayloadError, channel};
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;
use std::sync::Arc;
use tracing::debug;

/// Runs each group in its own child process.
pub struct ProcessRunner {
    shell: Arc<dyn Shell>,
}

/// A forked child that has not been joined yet
struct Worker {
    group: String,
    pid: libc::pid_t,
    reader: ChannelReader,
}

impl ProcessRunner {
    /// Create a process runner reporting to `shell`
    pub fn new(shell: Arc<dyn Shell>) -> Self {
        Self { shell }
    }

    /// Fork a child that runs the group's work unit and reports over a fresh pipe.
    fn fork(&self, group: &Group, factory: &WorkFactory<'_>) -> Result<Worker, RunError> {
        let (reader, writer) = channel()?;

        let pid = unsafe { libc::fork() };
        if pid < 0 {
            return Err(RunError::Spawn(std::io::Error::last_os_error()));
        }

        if pid == 0 {
            // Child: never returns into the caller.
            drop(reader);
            let outcome = match execute(group, factory) {
                Ok(()) => Outcome::Success,
                Err(failure) => Outcome::from(failure),
            };
            let code = match writer.send(&outcome) {
                Ok(()) => 0,
                Err(_) => 1,
            };
            unsafe { libc::_exit(code) }
        }

        drop(writer);
        debug!(group = group.name(), pid, "forked worker");
        Ok(Worker {
            group: group.name().to_string(),
            pid,
            reader,
        })
    }

    fn finish(&self, worker: Worker) -> Result<(), Failure> {
        let group = worker.group.clone();
        let result = worker.join();
        match &result {
            Ok(()) => report_success(self.shell.as_ref(), &group),
            Err(failure) => report_failure(self.shell.as_ref(), &group, failure),
        }
        result
    }
}

impl Worker {
    /// Collect the child's payload, then reap it.
    fn join(self) -> Result<(), Failure> {
        let Worker { group, pid, reader } = self;

        // Reading to EOF closes the read end when `reader` is consumed.
        let payload = reader.recv();
        let status = wait_for(pid).map_err(|e| Failure::new(format!("waitpid failed: {e}")))?;
        debug!(group = %group, pid, %status, "joined worker");

        settle(payload, status)
    }
}

/// Combine what the child reported with how it exited.
fn settle(payload: Result<Outcome, PayloadError>, status: ExitStatus) -> Result<(), Failure> {
    match payload {
        Ok(Outcome::Success) if status.success() => Ok(()),
        Ok(Outcome::Success) => Err(Failure::new(format!(
            "worker reported success but exited abnormally ({status})"
        ))),
        Ok(Outcome::Error { message, trace }) => Err(Failure { message, trace }),
        Err(e) => Err(Failure::new(format!("{e} ({status})"))),
    }
}

/// Block until the child exits, retrying on EINTR.
fn wait_for(pid: libc::pid_t) -> Result<ExitStatus, std::io::Error> {
    let mut status: libc::c_int = 0;
    loop {
        let ret = unsafe { libc::waitpid(pid, &mut status, 0) };
        if ret == pid {
            return Ok(ExitStatus::from_raw(status));
        }
        let err = std::io::Error::last_os_error();
        if err.kind() != std::io::ErrorKind::Interrupted {
            return Err(err);
        }
    }
}

impl Runner for ProcessRunner {
    fn run_group(&self, group: &Group, factory: &WorkFactory<'_>) -> Result<(), RunError> {
        let worker = self.fork(group, factory)?;
        self.finish(worker)
            .map_err(|failure| failure.into_error(group.name()))
    }

    fn run_groups(
        &self,
        groups: &[Arc<Group>],
        factory: &WorkFactory<'_>,
    ) -> Result<(), RunError> {
        let mut failed = Vec::new();

        // Start every child before waiting on any of them.
        let workers: Vec<_> = groups
            .iter()
            .map(|group| (group.name(), self.fork(group, factory)))
            .collect();

        for (name, worker) in workers {
            let result = match worker {
                Ok(worker) => self.finish(worker),
                Err(e) => {
                    let failure = Failure::new(e.to_string());
                    report_failure(self.shell.as_ref(), name, &failure);
                    Err(failure)
                }
            };
            if result.is_err() {
                failed.push(name.to_string());
            }
        }

        aggregate(failed)
    }
}
