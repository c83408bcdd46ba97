//! Suite Loader
//!
//! Discovers declaration files and turns them into a [`Suite`].
//!
//! Loading order:
//! - the setup file, if one is configured
//! - every file in the tests directory whose name matches the pattern,
//!   sorted by path
//!
//! Loading a file runs the entry points registered for it against the
//! [`SuiteBuilder`]. Files are loaded once per builder; later calls reuse
//! what was declared and only re-apply the group filter.

use crate::config::SuiteConfig;
use ensemble_core::{DeclarationSource, Suite, SuiteBuilder, SuiteError};
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised while loading a suite
#[derive(Debug, Error)]
pub enum LoadError {
    /// The configured tests directory does not exist
    #[error("Tests directory not found: {}", .0.display())]
    MissingTestsDir(PathBuf),

    /// The configured setup file does not exist
    #[error("Setup file not found: {}", .0.display())]
    MissingSetupFile(PathBuf),

    /// The file-name pattern could not be compiled
    #[error("Invalid file pattern {pattern:?}: {source}")]
    InvalidPattern {
        /// Pattern as configured
        pattern: String,
        /// Underlying regex error
        source: regex::Error,
    },

    /// Listing the tests directory or resolving a file failed
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// Path being read
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// A declaration or group lookup error
    #[error(transparent)]
    Suite(#[from] SuiteError),
}

/// Translate a file-name glob (`*`, `?`) into an anchored regex.
fn glob_to_regex(pattern: &str) -> Result<Regex, LoadError> {
    let mut re = String::with_capacity(pattern.len() + 8);
    re.push('^');
    for c in pattern.chars() {
        match c {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            c => re.push_str(&regex::escape(&c.to_string())),
        }
    }
    re.push('$');

    Regex::new(&re).map_err(|source| LoadError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Loads declaration files and applies the group filter
pub struct SuiteLoader<'a> {
    config: &'a SuiteConfig,
    source: &'a dyn DeclarationSource,
    group_names: Vec<String>,
}

impl<'a> SuiteLoader<'a> {
    /// Create a loader that keeps every group
    pub fn new(config: &'a SuiteConfig, source: &'a dyn DeclarationSource) -> Self {
        Self {
            config,
            source,
            group_names: Vec::new(),
        }
    }

    /// Restrict the loaded suite to these groups (empty keeps all)
    pub fn with_groups(mut self, group_names: Vec<String>) -> Self {
        self.group_names = group_names;
        self
    }

    /// Load the suite into `builder` (first call only) and return the filtered view.
    ///
    /// Fails on the first unknown group name; no partial suite is returned.
    pub fn load(&self, builder: &mut SuiteBuilder) -> Result<Suite, LoadError> {
        if !builder.is_loaded() {
            self.load_files(builder)?;
            builder.mark_loaded();
        }

        let suite = builder.finish()?;
        if self.group_names.is_empty() {
            return Ok(suite);
        }
        Ok(suite.filter(&self.group_names)?)
    }

    fn load_files(&self, builder: &mut SuiteBuilder) -> Result<(), LoadError> {
        if let Some(setup) = &self.config.setup_file {
            if !setup.is_file() {
                return Err(LoadError::MissingSetupFile(setup.clone()));
            }
            self.load_file(builder, setup)?;
        }

        for path in self.discover()? {
            self.load_file(builder, &path)?;
        }
        Ok(())
    }

    /// Declaration files in the tests directory, sorted by path.
    pub fn discover(&self) -> Result<Vec<PathBuf>, LoadError> {
        let dir = &self.config.tests_dir;
        if !dir.is_dir() {
            return Err(LoadError::MissingTestsDir(dir.clone()));
        }

        let pattern = glob_to_regex(&self.config.pattern)?;
        let io_err = |source| LoadError::Io {
            path: dir.clone(),
            source,
        };

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            let matches = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.is_match(name));
            if matches && path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn load_file(&self, builder: &mut SuiteBuilder, path: &Path) -> Result<(), LoadError> {
        let path = path.canonicalize().map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if !builder.record_file(&path) {
            return Ok(());
        }

        let entry_points = self.source.entry_points(&path);
        if entry_points.is_empty() {
            warn!(path = %path.display(), "no declarations registered for file");
            return Ok(());
        }

        debug!(path = %path.display(), count = entry_points.len(), "loading declarations");
        for register in entry_points {
            register(builder);
        }
        Ok(())
    }
}
