//! Declared dependency structures

use crate::constraint::VersionConstraint;
use serde::Serialize;
use std::fmt;

/// A named, version-constrained requirement declared by a chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    /// Chart name of the required release
    pub name: String,
    /// Version range the deployed chart must satisfy
    #[serde(rename = "version")]
    pub constraint: VersionConstraint,
}

impl Dependency {
    /// Creates a new dependency from an already parsed constraint
    pub fn new(name: impl Into<String>, constraint: VersionConstraint) -> Self {
        Self {
            name: name.into(),
            constraint,
        }
    }

    /// Returns the constraint as written in the declaration
    pub fn required_version(&self) -> &str {
        self.constraint.as_str()
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.constraint)
    }
}

/// A validated dependency declaration
///
/// Names are unique and every constraint parsed successfully; the only way to
/// obtain one outside tests is through [`crate::declaration::parse_declaration`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Declaration {
    dependencies: Vec<Dependency>,
}

impl Declaration {
    /// Creates an empty declaration
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_validated(dependencies: Vec<Dependency>) -> Self {
        Self { dependencies }
    }

    /// Returns the dependencies in declaration order
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter()
    }
}
