//! Check orchestrator coordinating a whole run
//!
//! This module provides:
//! - Workflow coordination: discover → validate → scope → resolve → aggregate
//! - One lazily computed namespace scope shared by every chart of a run
//! - Per-chart isolation: a broken chart never stops the others

use crate::aggregate::aggregate;
use crate::config::CheckConfig;
use crate::declaration::{load_declaration, read_chart_info, validate_chart_path};
use crate::directory::ReleaseDirectory;
use crate::discovery::expand_chart_paths;
use crate::domain::{ChartReport, CheckReport, RunReport, StructuredError};
use crate::error::AppError;
use crate::namespace::{NamespaceFilter, NamespaceScope};
use crate::progress::CheckProgress;
use crate::resolve::Resolver;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Namespace scope of a run, or the enumeration failure message
type ScopeCache = Option<Result<NamespaceScope, String>>;

/// Checker for the charts of one run
pub struct Checker {
    config: CheckConfig,
    directory: Arc<dyn ReleaseDirectory>,
    filter: NamespaceFilter,
}

impl Checker {
    /// Create a checker, validating the configuration
    pub fn new(
        config: CheckConfig,
        directory: Arc<dyn ReleaseDirectory>,
    ) -> Result<Self, AppError> {
        let filter = config.validate()?;
        Ok(Self {
            config,
            directory,
            filter,
        })
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Check every configured chart
    pub async fn run(&self) -> Result<RunReport, AppError> {
        self.run_with_progress(self.config.progress).await
    }

    /// Check every configured chart with optional progress display
    ///
    /// Only chart discovery can fail the run; everything after that is
    /// reported inside the chart reports.
    pub async fn run_with_progress(&self, show_progress: bool) -> Result<RunReport, AppError> {
        let charts = expand_chart_paths(&self.config.chart_paths)?;
        info!(
            charts = charts.len(),
            pattern = %self.filter.pattern(),
            directory = self.directory.name(),
            "starting dependency check"
        );

        let mut progress = CheckProgress::new(show_progress);
        progress.start_charts(charts.len());

        let mut scope = None;
        let mut chart_results = Vec::with_capacity(charts.len());
        for chart in &charts {
            progress.checking(&chart.display().to_string());
            chart_results.push(self.check(chart, &mut scope, &mut progress).await);
            progress.chart_done();
        }
        progress.finish();

        let report = RunReport::new(chart_results);
        info!(
            success = report.success,
            total = report.total_summary.total,
            failed = report.total_summary.failed(),
            "dependency check finished"
        );
        Ok(report)
    }

    /// Check a single chart directory
    pub async fn check_chart(&self, chart_dir: &Path) -> ChartReport {
        let mut scope = None;
        self.check(chart_dir, &mut scope, &mut CheckProgress::disabled())
            .await
    }

    async fn check(
        &self,
        chart_dir: &Path,
        scope: &mut ScopeCache,
        progress: &mut CheckProgress,
    ) -> ChartReport {
        if let Err(e) = validate_chart_path(chart_dir) {
            warn!(chart = %chart_dir.display(), error = %e, "invalid chart");
            return ChartReport::new(chart_dir, "", CheckReport::aborted(e.into()));
        }

        let info = match read_chart_info(chart_dir) {
            Ok(info) => info,
            Err(e) => {
                warn!(chart = %chart_dir.display(), error = %e, "invalid chart metadata");
                return ChartReport::new(chart_dir, "", CheckReport::aborted(e.into()));
            }
        };

        let declaration = match load_declaration(chart_dir) {
            Ok(declaration) => declaration,
            Err(e) => {
                warn!(chart = %info.name, error = %e, "invalid dependency declaration");
                return ChartReport::new(chart_dir, info.name, CheckReport::aborted(e.into()));
            }
        };

        if declaration.is_empty() {
            debug!(chart = %info.name, "no dependencies declared");
            return ChartReport::new(chart_dir, info.name, CheckReport::empty());
        }

        let scope = match self.namespace_scope(scope, progress).await {
            Ok(scope) => scope,
            Err(message) => {
                return ChartReport::new(
                    chart_dir,
                    info.name.clone(),
                    CheckReport::aborted(StructuredError::directory(info.name, message)),
                );
            }
        };

        let resolver = Resolver::new(self.directory.as_ref());
        let mut results = Vec::with_capacity(declaration.len());
        for dependency in declaration.iter() {
            progress.checking(&format!("{} / {}", info.name, dependency.name));
            results.push(resolver.resolve(dependency, &scope).await);
        }

        let report = aggregate(results, &scope);
        info!(
            chart = %info.name,
            version = %info.version,
            success = report.success(),
            dependencies = report.summary().total,
            "checked chart"
        );
        ChartReport::new(chart_dir, info.name, report)
    }

    /// Enumerate and filter namespaces on first use
    async fn namespace_scope(
        &self,
        cache: &mut ScopeCache,
        progress: &mut CheckProgress,
    ) -> Result<NamespaceScope, String> {
        if let Some(cached) = cache.as_ref() {
            return cached.clone();
        }

        progress.listing_namespaces(self.directory.name());
        let result = match self.directory.list_namespaces().await {
            Ok(all) => {
                let scope = self.filter.scope(&all);
                debug!(
                    listed = all.len(),
                    matched = scope.namespaces.len(),
                    pattern = %scope.pattern,
                    "computed namespace scope"
                );
                Ok(scope)
            }
            Err(e) => {
                warn!(error = %e, "namespace listing failed");
                Err(format!("failed to get matching namespaces: {e}"))
            }
        };
        *cache = Some(result.clone());
        result
    }
}
