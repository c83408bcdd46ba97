//! Declaration Registry
//!
//! A declaration file contributes one or more entry points that populate a
//! [`SuiteBuilder`]. Entry points are found by the source file that
//! declares them: the loader walks the tests directory and asks a
//! [`DeclarationSource`] which entry points belong to each file it finds.

use crate::SuiteBuilder;
use std::path::Path;

/// Entry point of a declaration file
pub type RegisterFn = fn(&mut SuiteBuilder);

/// A registration entry point tagged with the file that declares it.
///
/// Submitted through `inventory` by the `declare!` macro.
#[derive(Debug, Clone, Copy)]
pub struct Declaration {
    /// Source path as reported by `file!()`
    pub file: &'static str,
    /// Function that declares this file's groups
    pub register: RegisterFn,
}

impl Declaration {
    /// Create a declaration (usable in `inventory::submit!`)
    pub const fn new(file: &'static str, register: RegisterFn) -> Self {
        Self { file, register }
    }

    /// Whether this declaration belongs to the file at `path`.
    ///
    /// `file!()` paths are relative to the compiler's working directory, so
    /// a declaration matches any path that ends with its recorded path.
    pub fn matches(&self, path: &Path) -> bool {
        path.ends_with(self.file)
    }
}

inventory::collect!(Declaration);

/// Resolves the entry points declared by a file on disk.
pub trait DeclarationSource {
    /// Entry points for `path`, in registration order
    fn entry_points(&self, path: &Path) -> Vec<RegisterFn>;
}

/// Declarations compiled into the current binary via `declare!`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Registered;

impl DeclarationSource for Registered {
    fn entry_points(&self, path: &Path) -> Vec<RegisterFn> {
        inventory::iter::<Declaration>
            .into_iter()
            .filter(|d| d.matches(path))
            .map(|d| d.register)
            .collect()
    }
}

/// An explicit list of declarations, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct DeclarationSet {
    declarations: Vec<Declaration>,
}

impl DeclarationSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry point for files ending with `file`
    pub fn with(mut self, file: &'static str, register: RegisterFn) -> Self {
        self.declarations.push(Declaration::new(file, register));
        self
    }
}

impl DeclarationSource for DeclarationSet {
    fn entry_points(&self, path: &Path) -> Vec<RegisterFn> {
        self.declarations
            .iter()
            .filter(|d| d.matches(path))
            .map(|d| d.register)
            .collect()
    }
}
