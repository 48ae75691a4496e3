//! Structured error taxonomy reported to users
//!
//! Every failed dependency and every aborted chart check produces exactly one
//! [`StructuredError`]. The fieldless [`ErrorKind`] is the stable machine tag,
//! `Display` gives the human sentence and [`StructuredError::message`] the
//! short description used in JSON/YAML output.

use crate::error::DeclarationError;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Machine-readable error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    DependencyNotFound,
    VersionMismatch,
    MultipleDeployments,
    DuplicateInNamespace,
    InvalidDependencyFile,
    InvalidVersionConstraint,
    DirectoryError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::DependencyNotFound => "dependency_not_found",
            ErrorKind::VersionMismatch => "version_mismatch",
            ErrorKind::MultipleDeployments => "multiple_deployments",
            ErrorKind::DuplicateInNamespace => "duplicate_in_namespace",
            ErrorKind::InvalidDependencyFile => "invalid_dependency_file",
            ErrorKind::InvalidVersionConstraint => "invalid_version_constraint",
            ErrorKind::DirectoryError => "directory_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flat context attached to an error in serialized output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_pattern: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub found_namespaces: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub found_releases: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_line: Option<usize>,
}

impl ErrorDetails {
    pub fn is_empty(&self) -> bool {
        *self == ErrorDetails::default()
    }
}

/// A categorized, context-carrying failure
///
/// `subject` is the dependency or chart name the error is about and may be
/// empty for run-level failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuredError {
    #[error(
        "Dependency not found: {subject} (required: {required_version}, search pattern: {})",
        display_pattern(.search_pattern)
    )]
    DependencyNotFound {
        subject: String,
        required_version: String,
        search_pattern: String,
    },

    #[error(
        "Version constraint not satisfied: {subject} (found: {found_version}, required: {required_version}, namespace: {namespace})"
    )]
    VersionMismatch {
        subject: String,
        required_version: String,
        found_version: String,
        namespace: String,
        release: String,
    },

    #[error("Multiple deployments found: {subject} in namespaces: {}", .found_namespaces.join(", "))]
    MultipleDeployments {
        subject: String,
        required_version: String,
        found_namespaces: Vec<String>,
    },

    #[error(
        "Multiple instances in namespace: {subject} in {namespace} (releases: {})",
        .found_releases.join(", ")
    )]
    DuplicateInNamespace {
        subject: String,
        required_version: String,
        namespace: String,
        found_releases: Vec<String>,
    },

    #[error("Invalid dependencies file: {file}{}: {message}", line_suffix(.line))]
    InvalidDependencyFile {
        subject: String,
        file: String,
        line: Option<usize>,
        first_line: Option<usize>,
        message: String,
    },

    #[error("Invalid version constraint: {message} for chart {subject}")]
    InvalidVersionConstraint {
        subject: String,
        constraint: String,
        file: String,
        line: Option<usize>,
        message: String,
    },

    #[error("Release directory error: {message}")]
    DirectoryError {
        subject: String,
        required_version: Option<String>,
        message: String,
    },
}

fn display_pattern(pattern: &str) -> &str {
    if pattern.is_empty() {
        "<all non-system namespaces>"
    } else {
        pattern
    }
}

fn line_suffix(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!(" (line {line})"),
        None => String::new(),
    }
}

impl StructuredError {
    /// Run-level or per-dependency directory failure
    pub fn directory(subject: impl Into<String>, message: impl Into<String>) -> Self {
        StructuredError::DirectoryError {
            subject: subject.into(),
            required_version: None,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            StructuredError::DependencyNotFound { .. } => ErrorKind::DependencyNotFound,
            StructuredError::VersionMismatch { .. } => ErrorKind::VersionMismatch,
            StructuredError::MultipleDeployments { .. } => ErrorKind::MultipleDeployments,
            StructuredError::DuplicateInNamespace { .. } => ErrorKind::DuplicateInNamespace,
            StructuredError::InvalidDependencyFile { .. } => ErrorKind::InvalidDependencyFile,
            StructuredError::InvalidVersionConstraint { .. } => {
                ErrorKind::InvalidVersionConstraint
            }
            StructuredError::DirectoryError { .. } => ErrorKind::DirectoryError,
        }
    }

    pub fn subject(&self) -> &str {
        match self {
            StructuredError::DependencyNotFound { subject, .. }
            | StructuredError::VersionMismatch { subject, .. }
            | StructuredError::MultipleDeployments { subject, .. }
            | StructuredError::DuplicateInNamespace { subject, .. }
            | StructuredError::InvalidDependencyFile { subject, .. }
            | StructuredError::InvalidVersionConstraint { subject, .. }
            | StructuredError::DirectoryError { subject, .. } => subject,
        }
    }

    /// Short description of the failure
    pub fn message(&self) -> &str {
        match self {
            StructuredError::DependencyNotFound { .. } => {
                "No releases found matching the dependency requirements"
            }
            StructuredError::VersionMismatch { .. } => {
                "Deployed version does not satisfy version constraint"
            }
            StructuredError::MultipleDeployments { .. } => {
                "Dependency found in multiple namespaces, cannot determine which to use"
            }
            StructuredError::DuplicateInNamespace { .. } => {
                "Multiple instances of the same chart found in single namespace"
            }
            StructuredError::InvalidDependencyFile { message, .. }
            | StructuredError::InvalidVersionConstraint { message, .. }
            | StructuredError::DirectoryError { message, .. } => message,
        }
    }

    /// Kind-specific context flattened for serialization
    pub fn details(&self) -> ErrorDetails {
        match self {
            StructuredError::DependencyNotFound {
                required_version,
                search_pattern,
                ..
            } => ErrorDetails {
                required_version: Some(required_version.clone()),
                search_pattern: Some(search_pattern.clone()).filter(|p| !p.is_empty()),
                ..Default::default()
            },
            StructuredError::VersionMismatch {
                required_version,
                found_version,
                namespace,
                release,
                ..
            } => ErrorDetails {
                required_version: Some(required_version.clone()),
                found_version: Some(found_version.clone()),
                namespace: Some(namespace.clone()),
                release: Some(release.clone()),
                ..Default::default()
            },
            StructuredError::MultipleDeployments {
                required_version,
                found_namespaces,
                ..
            } => ErrorDetails {
                required_version: Some(required_version.clone()),
                found_namespaces: found_namespaces.clone(),
                ..Default::default()
            },
            StructuredError::DuplicateInNamespace {
                required_version,
                namespace,
                found_releases,
                ..
            } => ErrorDetails {
                required_version: Some(required_version.clone()),
                namespace: Some(namespace.clone()),
                found_releases: found_releases.clone(),
                ..Default::default()
            },
            StructuredError::InvalidDependencyFile {
                file,
                line,
                first_line,
                ..
            } => ErrorDetails {
                file: Some(file.clone()),
                line: *line,
                first_line: *first_line,
                ..Default::default()
            },
            StructuredError::InvalidVersionConstraint {
                constraint,
                file,
                line,
                ..
            } => ErrorDetails {
                required_version: Some(constraint.clone()),
                file: Some(file.clone()),
                line: *line,
                ..Default::default()
            },
            StructuredError::DirectoryError {
                required_version, ..
            } => ErrorDetails {
                required_version: required_version.clone(),
                ..Default::default()
            },
        }
    }
}

impl Serialize for StructuredError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let details = self.details();
        let mut state = serializer.serialize_struct("StructuredError", 4)?;
        state.serialize_field("type", &self.kind())?;
        state.serialize_field("chart", self.subject())?;
        state.serialize_field("message", self.message())?;
        if details.is_empty() {
            state.skip_field("details")?;
        } else {
            state.serialize_field("details", &details)?;
        }
        state.end()
    }
}

impl From<DeclarationError> for StructuredError {
    fn from(err: DeclarationError) -> Self {
        let file = err.file().display().to_string();
        let line = err.line();
        match err {
            DeclarationError::InvalidConstraint {
                name,
                constraint,
                source,
                ..
            } => StructuredError::InvalidVersionConstraint {
                subject: name,
                constraint,
                file,
                line,
                message: source.to_string(),
            },
            DeclarationError::DuplicateName {
                ref name,
                first_line,
                ..
            } => StructuredError::InvalidDependencyFile {
                subject: name.clone(),
                file,
                line,
                first_line: Some(first_line),
                message: err.to_string(),
            },
            DeclarationError::EmptyConstraint { ref name, .. } => {
                StructuredError::InvalidDependencyFile {
                    subject: name.clone(),
                    file,
                    line,
                    first_line: None,
                    message: err.to_string(),
                }
            }
            other => StructuredError::InvalidDependencyFile {
                subject: String::new(),
                file,
                line,
                first_line: None,
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::ConstraintError;
    use std::path::PathBuf;

    fn mismatch() -> StructuredError {
        StructuredError::VersionMismatch {
            subject: "redis".to_string(),
            required_version: ">=6.0.0 <7.0.0".to_string(),
            found_version: "7.0.0".to_string(),
            namespace: "prod".to_string(),
            release: "cache".to_string(),
        }
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(mismatch().kind(), ErrorKind::VersionMismatch);
        assert_eq!(ErrorKind::VersionMismatch.as_str(), "version_mismatch");
        assert_eq!(ErrorKind::DirectoryError.to_string(), "directory_error");
        assert_eq!(
            ErrorKind::InvalidVersionConstraint.as_str(),
            "invalid_version_constraint"
        );
    }

    #[test]
    fn test_version_mismatch_display() {
        assert_eq!(
            mismatch().to_string(),
            "Version constraint not satisfied: redis (found: 7.0.0, required: >=6.0.0 <7.0.0, namespace: prod)"
        );
        assert_eq!(
            mismatch().message(),
            "Deployed version does not satisfy version constraint"
        );
    }

    #[test]
    fn test_not_found_display_with_default_pattern() {
        let err = StructuredError::DependencyNotFound {
            subject: "redis".to_string(),
            required_version: "^6.0.0".to_string(),
            search_pattern: String::new(),
        };
        assert!(err.to_string().contains("search pattern: <all non-system namespaces>"));
        assert!(err.details().search_pattern.is_none());
    }

    #[test]
    fn test_multiple_deployments_display() {
        let err = StructuredError::MultipleDeployments {
            subject: "redis".to_string(),
            required_version: "^6.0.0".to_string(),
            found_namespaces: vec!["prod".to_string(), "staging".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Multiple deployments found: redis in namespaces: prod, staging"
        );
        assert_eq!(err.details().found_namespaces.len(), 2);
    }

    #[test]
    fn test_invalid_dependency_file_display() {
        let err = StructuredError::InvalidDependencyFile {
            subject: String::new(),
            file: "chart/dependencies.yaml".to_string(),
            line: Some(4),
            first_line: None,
            message: "dependency name cannot be empty".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid dependencies file: chart/dependencies.yaml (line 4): dependency name cannot be empty"
        );
    }

    #[test]
    fn test_serialize_shape() {
        let json = serde_json::to_value(mismatch()).unwrap();
        assert_eq!(json["type"], "version_mismatch");
        assert_eq!(json["chart"], "redis");
        assert_eq!(json["details"]["found_version"], "7.0.0");
        assert_eq!(json["details"]["release"], "cache");
        assert!(json["details"].get("file").is_none());
    }

    #[test]
    fn test_serialize_skips_empty_details() {
        let json = serde_json::to_value(StructuredError::directory("", "boom")).unwrap();
        assert_eq!(json["type"], "directory_error");
        assert_eq!(json["message"], "boom");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_from_duplicate_declaration_error() {
        let err: StructuredError = DeclarationError::DuplicateName {
            file: PathBuf::from("dependencies.yaml"),
            line: 5,
            first_line: 2,
            name: "redis".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::InvalidDependencyFile);
        assert_eq!(err.subject(), "redis");
        let details = err.details();
        assert_eq!(details.line, Some(5));
        assert_eq!(details.first_line, Some(2));
    }

    #[test]
    fn test_from_invalid_constraint_declaration_error() {
        let err: StructuredError = DeclarationError::InvalidConstraint {
            file: PathBuf::from("dependencies.yaml"),
            line: 3,
            name: "redis".to_string(),
            constraint: "".to_string(),
            source: ConstraintError::Empty,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::InvalidVersionConstraint);
        assert_eq!(err.details().file.as_deref(), Some("dependencies.yaml"));
    }
}
