//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ConfigError: Issues with CLI configuration and chart discovery
//! - DirectoryError: Issues querying the release directory (helm, kubectl, inventory)
//! - DeclarationError: Invalid chart metadata or dependency declarations
//!
//! Constraint parsing and evaluation errors live next to the evaluator in
//! [`crate::constraint`].

use std::path::PathBuf;
use thiserror::Error;

use crate::constraint::ConstraintError;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Release directory related errors
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// Declaration related errors
    #[error(transparent)]
    Declaration(#[from] DeclarationError),
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No chart paths were given
    #[error("at least one chart path is required")]
    NoChartPaths,

    /// Namespace pattern is not a valid regular expression
    #[error("invalid namespace pattern '{pattern}': {source}")]
    InvalidNamespacePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Chart path glob could not be parsed
    #[error("invalid chart path pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    /// Chart path glob matched no directories
    #[error("no chart directories match '{pattern}'")]
    NoChartsMatched { pattern: String },
}

/// Errors raised by a release directory
#[derive(Error, Debug)]
pub enum DirectoryError {
    /// Required command line tool is not installed
    #[error("{tool} not found in PATH")]
    ToolNotFound { tool: String },

    /// Command exited with a failure status
    #[error("{command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// Command output could not be decoded
    #[error("failed to parse {command} output: {message}")]
    InvalidOutput { command: String, message: String },

    /// Process could not be spawned or waited on
    #[error("failed to run {command}: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Release inventory file is unreadable or malformed
    #[error("invalid release inventory {path}: {message}")]
    InvalidInventory { path: PathBuf, message: String },
}

/// Errors related to chart metadata and dependency declarations
#[derive(Error, Debug)]
pub enum DeclarationError {
    /// Declaration file exists but could not be read
    #[error("failed to read {file}: {source}")]
    Unreadable {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Declaration is not valid YAML or has the wrong shape
    #[error("failed to parse {file}: {message}")]
    Malformed {
        file: PathBuf,
        line: Option<usize>,
        message: String,
    },

    /// Entry without a chart name
    #[error("dependency name cannot be empty")]
    EmptyName { file: PathBuf, line: usize },

    /// Entry without a version constraint
    #[error("version constraint cannot be empty for dependency {name}")]
    EmptyConstraint {
        file: PathBuf,
        line: usize,
        name: String,
    },

    /// Second entry for a chart name already declared
    #[error("duplicate dependency: {name}")]
    DuplicateName {
        file: PathBuf,
        line: usize,
        first_line: usize,
        name: String,
    },

    /// Constraint expression does not parse
    #[error("invalid version constraint '{constraint}' for dependency {name}: {source}")]
    InvalidConstraint {
        file: PathBuf,
        line: usize,
        name: String,
        constraint: String,
        #[source]
        source: ConstraintError,
    },

    /// Chart directory or Chart.yaml is unusable
    #[error("invalid chart {path}: {message}")]
    InvalidChart { path: PathBuf, message: String },
}

impl ConfigError {
    /// Creates a new InvalidNamespacePattern error
    pub fn invalid_namespace_pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        ConfigError::InvalidNamespacePattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// Creates a new NoChartsMatched error
    pub fn no_charts_matched(pattern: impl Into<String>) -> Self {
        ConfigError::NoChartsMatched {
            pattern: pattern.into(),
        }
    }
}

impl DirectoryError {
    /// Creates a new ToolNotFound error
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        DirectoryError::ToolNotFound { tool: tool.into() }
    }

    /// Creates a new CommandFailed error
    pub fn command_failed(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        DirectoryError::CommandFailed {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// Creates a new InvalidOutput error
    pub fn invalid_output(command: impl Into<String>, message: impl Into<String>) -> Self {
        DirectoryError::InvalidOutput {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidInventory error
    pub fn invalid_inventory(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        DirectoryError::InvalidInventory {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl DeclarationError {
    /// Creates a new Malformed error
    pub fn malformed(
        file: impl Into<PathBuf>,
        line: Option<usize>,
        message: impl Into<String>,
    ) -> Self {
        DeclarationError::Malformed {
            file: file.into(),
            line,
            message: message.into(),
        }
    }

    /// Creates a new InvalidChart error
    pub fn invalid_chart(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        DeclarationError::InvalidChart {
            path: path.into(),
            message: message.into(),
        }
    }

    /// File the error refers to
    pub fn file(&self) -> &PathBuf {
        match self {
            DeclarationError::Unreadable { file, .. }
            | DeclarationError::Malformed { file, .. }
            | DeclarationError::EmptyName { file, .. }
            | DeclarationError::EmptyConstraint { file, .. }
            | DeclarationError::DuplicateName { file, .. }
            | DeclarationError::InvalidConstraint { file, .. } => file,
            DeclarationError::InvalidChart { path, .. } => path,
        }
    }

    /// Best-effort 1-based line of the offending entry
    pub fn line(&self) -> Option<usize> {
        match self {
            DeclarationError::Malformed { line, .. } => *line,
            DeclarationError::EmptyName { line, .. }
            | DeclarationError::EmptyConstraint { line, .. }
            | DeclarationError::DuplicateName { line, .. }
            | DeclarationError::InvalidConstraint { line, .. } => Some(*line),
            DeclarationError::Unreadable { .. } | DeclarationError::InvalidChart { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_no_chart_paths() {
        let msg = format!("{}", ConfigError::NoChartPaths);
        assert!(msg.contains("chart path is required"));
    }

    #[test]
    fn test_config_error_invalid_namespace_pattern() {
        let source = regex::Regex::new("[unclosed").unwrap_err();
        let err = ConfigError::invalid_namespace_pattern("[unclosed", source);
        let msg = format!("{}", err);
        assert!(msg.contains("invalid namespace pattern"));
        assert!(msg.contains("[unclosed"));
    }

    #[test]
    fn test_config_error_no_charts_matched() {
        let err = ConfigError::no_charts_matched("charts/*");
        assert_eq!(err.to_string(), "no chart directories match 'charts/*'");
    }

    #[test]
    fn test_directory_error_tool_not_found() {
        let err = DirectoryError::tool_not_found("helm");
        assert_eq!(err.to_string(), "helm not found in PATH");
    }

    #[test]
    fn test_directory_error_command_failed() {
        let err = DirectoryError::command_failed("helm list", "Kubernetes cluster unreachable");
        let msg = format!("{}", err);
        assert!(msg.contains("helm list failed"));
        assert!(msg.contains("unreachable"));
    }

    #[test]
    fn test_directory_error_invalid_output() {
        let err = DirectoryError::invalid_output("kubectl get namespaces", "expected value");
        assert!(err.to_string().contains("failed to parse kubectl get namespaces output"));
    }

    #[test]
    fn test_declaration_error_duplicate() {
        let err = DeclarationError::DuplicateName {
            file: PathBuf::from("chart/dependencies.yaml"),
            line: 6,
            first_line: 2,
            name: "redis".to_string(),
        };
        assert_eq!(err.to_string(), "duplicate dependency: redis");
        assert_eq!(err.line(), Some(6));
        assert_eq!(err.file(), &PathBuf::from("chart/dependencies.yaml"));
    }

    #[test]
    fn test_declaration_error_invalid_constraint() {
        let err = DeclarationError::InvalidConstraint {
            file: PathBuf::from("dependencies.yaml"),
            line: 3,
            name: "redis".to_string(),
            constraint: ">>6".to_string(),
            source: ConstraintError::Empty,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("invalid version constraint '>>6'"));
        assert!(msg.contains("redis"));
    }

    #[test]
    fn test_declaration_error_invalid_chart_has_no_line() {
        let err = DeclarationError::invalid_chart("/charts/web", "Chart.yaml not found");
        assert_eq!(err.line(), None);
        assert!(err.to_string().contains("Chart.yaml not found"));
    }

    #[test]
    fn test_app_error_from_config_error() {
        let app_err: AppError = ConfigError::NoChartPaths.into();
        let msg = format!("{}", app_err);
        assert!(msg.contains("chart path is required"));
    }

    #[test]
    fn test_app_error_from_directory_error() {
        let app_err: AppError = DirectoryError::tool_not_found("kubectl").into();
        assert!(matches!(app_err, AppError::Directory(_)));
    }
}
