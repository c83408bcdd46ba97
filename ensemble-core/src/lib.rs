#![warn(missing_docs)]
//! Ensemble Core - Suite Data Model
//!
//! This crate provides the data a benchmark suite is made of:
//! - `Group` / `Report` / `Test` entity tree
//! - `Suite` registry with lookup, validation and filtering
//! - `SuiteBuilder` declaration API used by benchmark declaration files
//! - `Declaration` registry connecting files on disk to their entry points

mod builder;
mod declaration;
mod error;
mod model;
mod suite;

pub use builder::{GroupScope, ReportScope, SuiteBuilder};
pub use declaration::{Declaration, DeclarationSet, DeclarationSource, RegisterFn, Registered};
pub use error::SuiteError;
pub use model::{Group, Report, Test, Work};
pub use suite::Suite;

/// Anchor to prevent LTO from stripping inventory entries
#[used]
#[doc(hidden)]
pub static REGISTRY_ANCHOR: fn() = || for _ in inventory::iter::<Declaration> {};
