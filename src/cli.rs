//! CLI argument parsing module for depcheck

use crate::output::OutputFormat;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Parse an output format name: text, json or yaml
fn parse_output_format(s: &str) -> Result<OutputFormat, String> {
    s.parse()
}

/// Helm chart dependency checker
#[derive(Parser, Debug, Clone)]
#[command(
    name = "depcheck",
    version,
    about = "Check that a Helm chart's declared dependencies are deployed at compatible versions"
)]
pub struct CliArgs {
    /// Chart directories or glob patterns (e.g. charts/*)
    #[arg(required = true, value_name = "CHART_PATH")]
    pub chart_paths: Vec<String>,

    /// Regular expression selecting namespaces (default: all non-system namespaces)
    #[arg(short = 'p', long, default_value = "")]
    pub namespace_pattern: String,

    /// Output format: text, json or yaml
    #[arg(short, long, default_value = "text", value_parser = parse_output_format)]
    pub output: OutputFormat,

    /// Increase verbosity (-v debug logs, -vv trace logs)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only print failures
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to the kubeconfig file
    #[arg(long, value_name = "PATH")]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use
    #[arg(long, value_name = "NAME")]
    pub kube_context: Option<String>,

    /// Read releases from an inventory file instead of the cluster
    #[arg(long, value_name = "FILE")]
    pub releases_file: Option<PathBuf>,

    /// Disable the progress spinner
    #[arg(long)]
    pub no_progress: bool,
}
