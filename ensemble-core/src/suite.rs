//! Suite
//!
//! Read-only registry of groups, keyed by name, in declaration order.

use crate::{Group, SuiteError};
use std::sync::Arc;

/// An ordered set of uniquely named groups.
///
/// Cloning and filtering share the underlying groups.
#[derive(Debug, Clone, Default)]
pub struct Suite {
    groups: Vec<Arc<Group>>,
}

impl Suite {
    /// Build a suite from groups. Later groups with a name already present are dropped.
    pub fn new(groups: impl IntoIterator<Item = Arc<Group>>) -> Self {
        let mut suite = Self::default();
        for group in groups {
            if !suite.is_valid_group(group.name()) {
                suite.groups.push(group);
            }
        }
        suite
    }

    /// Groups in declaration order
    pub fn groups(&self) -> &[Arc<Group>] {
        &self.groups
    }

    /// Group names in declaration order
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name())
    }

    /// Number of groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether the suite holds no groups
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Look up a group by name
    pub fn find_group(&self, name: &str) -> Result<&Arc<Group>, SuiteError> {
        self.groups
            .iter()
            .find(|g| g.name() == name)
            .ok_or_else(|| SuiteError::GroupNotFound(name.to_string()))
    }

    /// Whether a group with this name exists
    pub fn is_valid_group(&self, name: &str) -> bool {
        self.groups.iter().any(|g| g.name() == name)
    }

    /// Restrict the suite to the named groups, keeping declaration order.
    ///
    /// Fails on the first unknown name; nothing is returned in that case.
    pub fn filter<S: AsRef<str>>(&self, names: &[S]) -> Result<Suite, SuiteError> {
        if let Some(unknown) = names
            .iter()
            .map(AsRef::as_ref)
            .find(|name| !self.is_valid_group(name))
        {
            return Err(SuiteError::GroupNotFound(unknown.to_string()));
        }

        Ok(Suite {
            groups: self
                .groups
                .iter()
                .filter(|g| names.iter().any(|n| n.as_ref() == g.name()))
                .cloned()
                .collect(),
        })
    }
}
