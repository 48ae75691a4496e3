//! Run configuration
//!
//! `CheckConfig` is the explicit configuration handed to the checker; it is
//! built from CLI arguments and validated before any chart is touched.

use crate::cli::CliArgs;
use crate::error::ConfigError;
use crate::namespace::NamespaceFilter;
use crate::output::{OutputFormat, Verbosity};
use std::path::PathBuf;

/// Configuration for one depcheck run
#[derive(Debug, Clone, Default)]
pub struct CheckConfig {
    /// Chart directories or glob patterns, in argument order
    pub chart_paths: Vec<String>,
    /// Namespace regex, empty for all non-system namespaces
    pub namespace_pattern: String,
    /// Report format
    pub output: OutputFormat,
    /// Output verbosity
    pub verbosity: Verbosity,
    /// Kubeconfig file for helm and kubectl
    pub kubeconfig: Option<PathBuf>,
    /// Kubeconfig context for helm and kubectl
    pub kube_context: Option<String>,
    /// Offline release inventory used instead of the cluster
    pub releases_file: Option<PathBuf>,
    /// Whether to show a progress spinner
    pub progress: bool,
}

impl CheckConfig {
    /// Create a configuration for the given chart paths with defaults elsewhere
    pub fn new<I, S>(chart_paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            chart_paths: chart_paths.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Set the namespace pattern
    pub fn with_namespace_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.namespace_pattern = pattern.into();
        self
    }

    /// Build configuration from CLI arguments
    pub fn from_cli(args: &CliArgs) -> Self {
        let verbosity = if args.quiet {
            Verbosity::Quiet
        } else if args.verbose > 0 {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };

        Self {
            chart_paths: args.chart_paths.clone(),
            namespace_pattern: args.namespace_pattern.clone(),
            output: args.output,
            verbosity,
            kubeconfig: args.kubeconfig.clone(),
            kube_context: args.kube_context.clone(),
            releases_file: args.releases_file.clone(),
            progress: !args.no_progress && !args.quiet && args.output == OutputFormat::Text,
        }
    }

    /// Check the configuration and compile the namespace filter
    pub fn validate(&self) -> Result<NamespaceFilter, ConfigError> {
        if self.chart_paths.iter().all(|p| p.trim().is_empty()) {
            return Err(ConfigError::NoChartPaths);
        }
        NamespaceFilter::new(&self.namespace_pattern)
            .map_err(|e| ConfigError::invalid_namespace_pattern(&self.namespace_pattern, e))
    }
}
