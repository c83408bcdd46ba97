//! Ensemble Demo Suite
//!
//! Declaration files live next to this file and are picked up by the loader
//! through the workspace `ensemble.toml`.
//!
//! Run with:
//!   cargo bench -p ensemble                              # Run every group, one process each
//!   cargo bench -p ensemble -- run --strategy thread     # One thread per group
//!   cargo bench -p ensemble -- run collections           # Run only one group
//!   cargo bench -p ensemble -- run --groups crash_test   # Watch a group fail in isolation
//!   cargo bench -p ensemble -- list                      # List the suite

mod arithmetic_suite;
mod collections_suite;
mod crash_suite;
mod setup;
mod strings_suite;

fn main() -> anyhow::Result<()> {
    ensemble::run()
}
