#![warn(missing_docs)]
//! # Ensemble
//!
//! Benchmark-authoring and execution harness with crash isolation.
//!
//! - **Declaration API**: groups, reports, controls and tests declared from
//!   plain Rust functions in files under a tests directory
//! - **Process Isolation**: every group runs in a forked child; a crashing
//!   group never takes the suite down
//! - **Thread Isolation**: lighter-weight alternative, one thread per group
//! - **Fail-Late**: all groups run to completion before failures are reported
//!
//! ## Quick Start
//!
//! ```ignore
//! // benches/suite/arithmetic.rs
//! use ensemble::prelude::*;
//!
//! fn register(suite: &mut SuiteBuilder) {
//!     suite.group("arithmetic", |g| {
//!         g.report("add", |r| {
//!             r.control("Integer", || 1 + 1);
//!             r.test("Float", || 1.0 + 1.0);
//!         });
//!     });
//! }
//!
//! ensemble::declare!(register);
//! ```

// Re-export core types
pub use ensemble_core::{
    Declaration, DeclarationSet, DeclarationSource, Group, GroupScope, RegisterFn, Registered,
    Report, ReportScope, Suite, SuiteBuilder, SuiteError, Test, Work,
};

// Re-export runner and loader types
pub use ensemble_cli::{
    ConsoleShell, EnsembleConfig, Failure, LoadError, MemoryShell, ProcessRunner, RunError,
    Runner, RunnerKind, Shell, SuiteConfig, SuiteLoader, ThreadRunner, WorkFactory, WorkUnit,
};

/// Internal re-exports for macro use
#[doc(hidden)]
pub mod internal {
    pub use inventory;
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Group, GroupScope, Report, ReportScope, Runner, RunnerKind, Suite, SuiteBuilder, Test,
        declare,
    };
}

/// Register a declaration entry point for the current source file.
///
/// The entry point runs when the loader discovers this file in the
/// tests directory.
///
/// ```ignore
/// fn register(suite: &mut ensemble::SuiteBuilder) {
///     suite.group("strings", |_| {});
/// }
/// ensemble::declare!(register);
/// ```
#[macro_export]
macro_rules! declare {
    ($register:path) => {
        $crate::internal::inventory::submit! {
            $crate::Declaration::new(file!(), $register)
        }
    };
}

/// Run the Ensemble CLI harness.
///
/// Call this from your suite binary's `main()`:
/// ```ignore
/// fn main() {
///     ensemble::run().unwrap();
/// }
/// ```
pub use ensemble_cli::run;
