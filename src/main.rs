//! depcheck - Helm chart dependency compatibility checker
//!
//! Checks that the charts a Helm chart declares in `dependencies.yaml` are
//! deployed in the cluster at versions satisfying the declared constraints.

use clap::Parser;
use depcheck::cli::CliArgs;
use depcheck::config::CheckConfig;
use depcheck::directory::{HelmDirectory, InventoryDirectory, ReleaseDirectory};
use depcheck::error::AppError;
use depcheck::orchestrator::Checker;
use depcheck::output::{create_formatter, OutputConfig};
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Exit code for configuration and operational errors
const EXIT_ERROR: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing(args.verbose);

    // Run the main logic and handle errors
    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Install the stderr log subscriber
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .with_env_var("DEPCHECK_LOG")
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

/// Pick the release directory: an inventory file or the live cluster
fn build_directory(config: &CheckConfig) -> Result<Arc<dyn ReleaseDirectory>, AppError> {
    match &config.releases_file {
        Some(path) => Ok(Arc::new(InventoryDirectory::from_file(path)?)),
        None => Ok(Arc::new(
            HelmDirectory::new()
                .with_kubeconfig(config.kubeconfig.clone())
                .with_context(config.kube_context.clone()),
        )),
    }
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let config = CheckConfig::from_cli(&args);
    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        charts = ?config.chart_paths,
        pattern = %config.namespace_pattern,
        "depcheck starting"
    );

    let directory = build_directory(&config)?;
    let checker = Checker::new(config, directory)?;
    let report = checker.run().await?;

    // Colors only when a person is watching
    let color = io::stdout().is_terminal();
    let output_config =
        OutputConfig::new(checker.config().output, checker.config().verbosity).with_color(color);
    let formatter = create_formatter(output_config);

    let mut stdout = io::stdout().lock();
    formatter.format(&report, &mut stdout)?;
    stdout.flush()?;

    if report.success {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
