//! Namespace inclusion policy
//!
//! An empty pattern selects every namespace except the Kubernetes system
//! namespaces. A non-empty pattern is an unanchored regular expression and may
//! select system namespaces explicitly.

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;

/// Namespaces excluded when no pattern is given
pub const SYSTEM_NAMESPACES: &[&str] = &["kube-system", "kube-public", "kube-node-lease"];

/// Returns true for Kubernetes system namespaces (`default` is not one)
pub fn is_system_namespace(namespace: &str) -> bool {
    SYSTEM_NAMESPACES.contains(&namespace)
}

/// Compiled namespace filter
#[derive(Debug, Clone)]
pub struct NamespaceFilter {
    pattern: String,
    regex: Option<Regex>,
}

impl NamespaceFilter {
    /// Compile a filter from a pattern string
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = if pattern.is_empty() {
            None
        } else {
            Some(Regex::new(pattern)?)
        };
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// Pattern the filter was built from, empty for the default policy
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn matches(&self, namespace: &str) -> bool {
        match &self.regex {
            Some(regex) => regex.is_match(namespace),
            None => !is_system_namespace(namespace),
        }
    }

    /// Select the matching namespaces from a full listing
    pub fn matching_namespaces<'a, I>(&self, all: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        all.into_iter()
            .filter(|ns| self.matches(ns))
            .cloned()
            .collect()
    }

    /// Build the scope for one run from a full namespace listing
    pub fn scope<'a, I>(&self, all: I) -> NamespaceScope
    where
        I: IntoIterator<Item = &'a String>,
    {
        NamespaceScope {
            pattern: self.pattern.clone(),
            namespaces: self.matching_namespaces(all),
        }
    }
}

/// Namespaces a run is allowed to look in
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NamespaceScope {
    /// Pattern that produced the scope, empty for the default policy
    pub pattern: String,
    /// Matching namespaces in name order
    pub namespaces: BTreeSet<String>,
}

impl NamespaceScope {
    pub fn new(pattern: impl Into<String>, namespaces: impl IntoIterator<Item = String>) -> Self {
        Self {
            pattern: pattern.into(),
            namespaces: namespaces.into_iter().collect(),
        }
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.namespaces.contains(namespace)
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}
