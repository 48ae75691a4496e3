//! Integration tests for depcheck
//!
//! These tests verify:
//! - End-to-end chart checks against an in-memory release inventory
//! - Outcome classification and structured error mapping
//! - Determinism and summary consistency of reports
//! - Multi-chart runs and chart discovery

use async_trait::async_trait;
use depcheck::config::CheckConfig;
use depcheck::directory::{InventoryDirectory, ReleaseDirectory};
use depcheck::domain::{ErrorKind, Outcome, Release, RunReport};
use depcheck::error::DirectoryError;
use depcheck::namespace::NamespaceScope;
use depcheck::orchestrator::Checker;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Test fixture directory creation helper
fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Create a chart directory with an optional dependencies.yaml
fn create_chart(root: &Path, name: &str, dependencies: Option<&str>) -> String {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    let chart_yaml = format!(
        "apiVersion: v2\nname: {name}\ndescription: test chart\nversion: 1.0.0\n"
    );
    fs::write(dir.join("Chart.yaml"), chart_yaml).unwrap();
    if let Some(content) = dependencies {
        fs::write(dir.join("dependencies.yaml"), content).unwrap();
    }
    dir.display().to_string()
}

async fn check(
    paths: Vec<String>,
    pattern: &str,
    directory: Arc<dyn ReleaseDirectory>,
) -> RunReport {
    let config = CheckConfig::new(paths).with_namespace_pattern(pattern);
    Checker::new(config, directory)
        .expect("valid configuration")
        .run_with_progress(false)
        .await
        .expect("chart discovery succeeds")
}

const REDIS_RANGE: &str = r#"dependencies:
  - name: redis
    version: ">=6.0.0 <7.0.0"
"#;

mod scenarios {
    use super::*;

    /// A single deployed release inside the range is satisfied
    #[tokio::test]
    async fn test_satisfied_dependency() {
        let temp_dir = create_test_dir();
        let chart = create_chart(temp_dir.path(), "web", Some(REDIS_RANGE));
        let directory = Arc::new(
            InventoryDirectory::new().with_release(Release::new("redis", "prod", "redis", "6.2.1")),
        );

        let report = check(vec![chart], "", directory).await;

        assert!(report.success);
        let chart = &report.chart_results[0];
        assert_eq!(chart.report.summary().satisfied, 1);
        let dependency = &chart.report.dependencies()[0];
        assert_eq!(dependency.outcome(), Outcome::Satisfied);
        assert_eq!(dependency.found_releases()[0].namespace, "prod");
        assert!(chart.report.errors().is_empty());
    }

    /// The upper bound of a range is exclusive
    #[tokio::test]
    async fn test_version_mismatch() {
        let temp_dir = create_test_dir();
        let chart = create_chart(temp_dir.path(), "web", Some(REDIS_RANGE));
        let directory = Arc::new(
            InventoryDirectory::new().with_release(Release::new("redis", "prod", "redis", "7.0.0")),
        );

        let report = check(vec![chart], "", directory).await;

        assert!(!report.success);
        let chart = &report.chart_results[0];
        assert_eq!(chart.report.summary().mismatched, 1);
        assert_eq!(
            chart.report.dependencies()[0].outcome(),
            Outcome::VersionMismatch
        );
        let error = &chart.report.errors()[0];
        assert_eq!(error.kind(), ErrorKind::VersionMismatch);
        assert_eq!(error.details().found_version.as_deref(), Some("7.0.0"));
    }

    #[tokio::test]
    async fn test_dependency_not_found() {
        let temp_dir = create_test_dir();
        let chart = create_chart(
            temp_dir.path(),
            "web",
            Some("dependencies:\n  - name: redis\n    version: ^6.0.0\n"),
        );
        let directory = Arc::new(InventoryDirectory::new().with_namespace("prod"));

        let report = check(vec![chart], "", directory).await;

        assert!(!report.success);
        let chart = &report.chart_results[0];
        assert_eq!(chart.report.summary().not_found, 1);
        let dependency = &chart.report.dependencies()[0];
        assert_eq!(dependency.outcome(), Outcome::NotFound);
        assert!(dependency.found_releases().is_empty());
        assert_eq!(chart.report.errors()[0].kind(), ErrorKind::DependencyNotFound);
    }

    #[tokio::test]
    async fn test_multiple_namespaces() {
        let temp_dir = create_test_dir();
        let chart = create_chart(temp_dir.path(), "web", Some(REDIS_RANGE));
        let directory = Arc::new(
            InventoryDirectory::new()
                .with_release(Release::new("redis", "staging", "redis", "6.1.0"))
                .with_release(Release::new("redis", "prod", "redis", "6.2.1")),
        );

        let report = check(vec![chart], "", directory).await;

        let chart = &report.chart_results[0];
        let dependency = &chart.report.dependencies()[0];
        assert_eq!(dependency.outcome(), Outcome::MultipleFound);
        assert_eq!(dependency.found_releases().len(), 2);
        let error = &chart.report.errors()[0];
        assert_eq!(error.kind(), ErrorKind::MultipleDeployments);
        assert_eq!(
            error.details().found_namespaces,
            vec!["prod".to_string(), "staging".to_string()]
        );
    }

    #[tokio::test]
    async fn test_duplicate_declaration_entries() {
        let temp_dir = create_test_dir();
        let chart = create_chart(
            temp_dir.path(),
            "web",
            Some(
                r#"dependencies:
  - name: redis
    version: ^6.0.0
  - name: redis
    version: ^6.1.0
"#,
            ),
        );
        let directory = Arc::new(InventoryDirectory::new());

        let report = check(vec![chart], "", directory.clone()).await;

        let chart = &report.chart_results[0];
        assert!(!chart.success());
        assert!(chart.report.dependencies().is_empty());
        assert_eq!(chart.report.summary().total, 0);
        assert_eq!(chart.report.errors().len(), 1);
        let error = &chart.report.errors()[0];
        assert_eq!(error.kind(), ErrorKind::InvalidDependencyFile);
        assert!(error.details().line.is_some());
        assert_eq!(directory.query_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_declaration_file() {
        let temp_dir = create_test_dir();
        let chart = create_chart(temp_dir.path(), "web", None);
        let directory = Arc::new(InventoryDirectory::new());

        let report = check(vec![chart], "", directory.clone()).await;

        assert!(report.success);
        assert_eq!(report.total_summary.total, 0);
        assert!(report.chart_results[0].report.dependencies().is_empty());
        assert_eq!(directory.query_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_constraint_aborts_check() {
        let temp_dir = create_test_dir();
        let chart = create_chart(
            temp_dir.path(),
            "web",
            Some("dependencies:\n  - name: redis\n    version: \">=banana\"\n"),
        );
        let directory = Arc::new(InventoryDirectory::new());

        let report = check(vec![chart], "", directory).await;

        let chart = &report.chart_results[0];
        assert!(chart.report.dependencies().is_empty());
        assert_eq!(
            chart.report.errors()[0].kind(),
            ErrorKind::InvalidVersionConstraint
        );
    }
}

mod namespaces {
    use super::*;

    fn spread_inventory() -> Arc<InventoryDirectory> {
        Arc::new(
            InventoryDirectory::new()
                .with_release(Release::new("redis", "kube-system", "redis", "6.0.0"))
                .with_release(Release::new("redis", "prod-eu", "redis", "6.2.1"))
                .with_release(Release::new("redis", "staging", "redis", "6.1.0")),
        )
    }

    #[tokio::test]
    async fn test_pattern_narrows_search() {
        let temp_dir = create_test_dir();
        let chart = create_chart(temp_dir.path(), "web", Some(REDIS_RANGE));

        let report = check(vec![chart], "^prod", spread_inventory()).await;

        assert!(report.success);
        let dependency = &report.chart_results[0].report.dependencies()[0];
        assert_eq!(dependency.found_releases()[0].namespace, "prod-eu");
        assert_eq!(
            report.matched_namespaces.iter().collect::<Vec<_>>(),
            vec!["prod-eu"]
        );
    }

    #[tokio::test]
    async fn test_default_excludes_system_namespaces() {
        let temp_dir = create_test_dir();
        let chart = create_chart(temp_dir.path(), "web", Some(REDIS_RANGE));

        let report = check(vec![chart], "", spread_inventory()).await;

        assert!(!report.matched_namespaces.contains("kube-system"));
        let error = &report.chart_results[0].report.errors()[0];
        assert_eq!(error.kind(), ErrorKind::MultipleDeployments);
        assert_eq!(error.details().found_namespaces.len(), 2);
    }

    #[tokio::test]
    async fn test_explicit_pattern_can_select_system_namespace() {
        let temp_dir = create_test_dir();
        let chart = create_chart(temp_dir.path(), "web", Some(REDIS_RANGE));

        let report = check(vec![chart], "kube-system", spread_inventory()).await;

        assert!(report.success);
    }

    #[tokio::test]
    async fn test_not_found_reports_search_pattern() {
        let temp_dir = create_test_dir();
        let chart = create_chart(temp_dir.path(), "web", Some(REDIS_RANGE));

        let report = check(vec![chart], "^qa$", spread_inventory()).await;

        let error = &report.chart_results[0].report.errors()[0];
        assert_eq!(error.kind(), ErrorKind::DependencyNotFound);
        assert_eq!(error.details().search_pattern.as_deref(), Some("^qa$"));
    }
}

mod properties {
    use super::*;

    const MIXED: &str = r#"dependencies:
  - name: redis
    version: ">=6.0.0 <7.0.0"
  - name: postgresql
    version: ^12.0.0
  - name: kafka
    version: ~3.4.0
  - name: nginx
    version: "1.x"
"#;

    fn mixed_releases() -> InventoryDirectory {
        InventoryDirectory::new()
            .with_release(Release::new("cache", "prod", "redis", "6.2.1"))
            .with_release(Release::new("db-a", "prod", "postgresql", "12.1.0"))
            .with_release(Release::new("db-b", "prod", "postgresql", "12.2.0"))
            .with_release(Release::new("db", "staging", "postgresql", "12.3.0"))
            .with_release(Release::new("kafka", "prod", "kafka", "3.5.0"))
    }

    fn mixed_inventory() -> Arc<InventoryDirectory> {
        Arc::new(mixed_releases())
    }

    #[tokio::test]
    async fn test_reports_are_idempotent() {
        let temp_dir = create_test_dir();
        let chart = create_chart(temp_dir.path(), "web", Some(MIXED));

        let first = check(vec![chart.clone()], "", mixed_inventory()).await;
        let second = check(vec![chart], "", mixed_inventory()).await;

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_summary_is_consistent() {
        let temp_dir = create_test_dir();
        let chart = create_chart(temp_dir.path(), "web", Some(MIXED));

        let report = check(vec![chart], "", mixed_inventory()).await;
        let chart = &report.chart_results[0];
        let summary = chart.report.summary();

        assert_eq!(summary.total, chart.report.dependencies().len());
        assert_eq!(
            summary.satisfied
                + summary.not_found
                + summary.mismatched
                + summary.multiple
                + summary.errors,
            summary.total
        );
        assert_eq!(chart.report.errors().len(), summary.failed());
        assert_eq!(chart.success(), summary.failed() == 0);
    }

    /// Duplicates within one namespace win over the cross-namespace spread
    #[tokio::test]
    async fn test_same_namespace_duplicates_take_precedence() {
        let temp_dir = create_test_dir();
        let chart = create_chart(temp_dir.path(), "web", Some(MIXED));

        let report = check(vec![chart], "", mixed_inventory()).await;
        let chart = &report.chart_results[0];

        let outcomes: Vec<_> = chart
            .report
            .dependencies()
            .iter()
            .map(|d| (d.name().to_string(), d.outcome()))
            .collect();
        assert_eq!(
            outcomes,
            vec![
                ("redis".to_string(), Outcome::Satisfied),
                ("postgresql".to_string(), Outcome::MultipleFound),
                ("kafka".to_string(), Outcome::VersionMismatch),
                ("nginx".to_string(), Outcome::NotFound),
            ]
        );

        let kinds: Vec<_> = chart.report.errors().iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                ErrorKind::DuplicateInNamespace,
                ErrorKind::VersionMismatch,
                ErrorKind::DependencyNotFound,
            ]
        );
        let details = chart.report.errors()[0].details();
        assert_eq!(details.namespace.as_deref(), Some("prod"));
        assert_eq!(
            details.found_releases,
            vec!["db-a".to_string(), "db-b".to_string()]
        );
    }

    /// Inventory whose lookups fail for a single chart name
    struct FailingLookup {
        inventory: InventoryDirectory,
        failing_chart: &'static str,
    }

    #[async_trait]
    impl ReleaseDirectory for FailingLookup {
        fn name(&self) -> &'static str {
            "failing-lookup"
        }

        async fn list_namespaces(&self) -> Result<BTreeSet<String>, DirectoryError> {
            self.inventory.list_namespaces().await
        }

        async fn list_releases(
            &self,
            scope: &NamespaceScope,
        ) -> Result<Vec<Release>, DirectoryError> {
            self.inventory.list_releases(scope).await
        }

        async fn find_releases(
            &self,
            chart_name: &str,
            scope: &NamespaceScope,
        ) -> Result<Vec<Release>, DirectoryError> {
            if chart_name == self.failing_chart {
                return Err(DirectoryError::command_failed("helm list", "connection reset"));
            }
            self.inventory.find_releases(chart_name, scope).await
        }
    }

    /// A failed lookup only affects the dependency being looked up
    #[tokio::test]
    async fn test_lookup_failure_is_isolated() {
        let temp_dir = create_test_dir();
        let chart = create_chart(temp_dir.path(), "web", Some(MIXED));
        let directory = Arc::new(FailingLookup {
            inventory: mixed_releases(),
            failing_chart: "kafka",
        });

        let report = check(vec![chart], "", directory).await;
        let chart = &report.chart_results[0];

        let outcomes: Vec<_> = chart
            .report
            .dependencies()
            .iter()
            .map(|d| d.outcome())
            .collect();
        assert_eq!(
            outcomes,
            vec![
                Outcome::Satisfied,
                Outcome::MultipleFound,
                Outcome::Error,
                Outcome::NotFound,
            ]
        );
        assert_eq!(chart.report.summary().errors, 1);
        assert_eq!(chart.report.summary().satisfied, 1);

        let errors = chart.report.errors();
        assert_eq!(errors.len(), 3);
        let directory_errors: Vec<_> = errors
            .iter()
            .enumerate()
            .filter(|(_, e)| e.kind() == ErrorKind::DirectoryError)
            .map(|(index, e)| (index, e.subject().to_string()))
            .collect();
        assert_eq!(directory_errors, vec![(1, "kafka".to_string())]);
        assert!(errors[1].message().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_prerelease_needs_opt_in() {
        let temp_dir = create_test_dir();
        let chart = create_chart(
            temp_dir.path(),
            "web",
            Some("dependencies:\n  - name: redis\n    version: \">=6.0.0\"\n"),
        );
        let directory = Arc::new(
            InventoryDirectory::new()
                .with_release(Release::new("redis", "prod", "redis", "6.1.0-rc.1")),
        );

        let report = check(vec![chart], "", directory).await;

        assert_eq!(
            report.chart_results[0].report.dependencies()[0].outcome(),
            Outcome::VersionMismatch
        );
    }
}

mod multi_chart {
    use super::*;

    #[tokio::test]
    async fn test_totals_sum_chart_summaries() {
        let temp_dir = create_test_dir();
        let ok = create_chart(temp_dir.path(), "ok", Some(REDIS_RANGE));
        let missing = create_chart(
            temp_dir.path(),
            "missing",
            Some("dependencies:\n  - name: mongodb\n    version: ^6.0.0\n"),
        );
        let empty = create_chart(temp_dir.path(), "empty", None);
        let directory = Arc::new(
            InventoryDirectory::new().with_release(Release::new("redis", "prod", "redis", "6.2.1")),
        );

        let report = check(vec![ok, missing, empty], "", directory).await;

        assert!(!report.success);
        assert_eq!(report.chart_results.len(), 3);
        assert_eq!(report.total_summary.total, 2);
        assert_eq!(report.total_summary.satisfied, 1);
        assert_eq!(report.total_summary.not_found, 1);
        assert_eq!(report.errors.len(), 1);
        let successes: Vec<_> = report.chart_results.iter().map(|c| c.success()).collect();
        assert_eq!(successes, vec![true, false, true]);
    }

    #[tokio::test]
    async fn test_glob_pattern_discovers_charts() {
        let temp_dir = create_test_dir();
        create_chart(temp_dir.path(), "b-chart", None);
        create_chart(temp_dir.path(), "a-chart", Some(REDIS_RANGE));
        fs::write(temp_dir.path().join("notes.txt"), "not a chart").unwrap();
        let directory = Arc::new(
            InventoryDirectory::new().with_release(Release::new("redis", "prod", "redis", "6.2.1")),
        );

        let pattern = format!("{}/*", temp_dir.path().display());
        let report = check(vec![pattern], "", directory).await;

        assert!(report.success);
        let names: Vec<_> = report
            .chart_results
            .iter()
            .map(|c| c.chart_name.as_str())
            .collect();
        assert_eq!(names, vec!["a-chart", "b-chart"]);
    }

    #[tokio::test]
    async fn test_inventory_file_directory() {
        let temp_dir = create_test_dir();
        let chart = create_chart(temp_dir.path(), "web", Some(REDIS_RANGE));
        let inventory_path = temp_dir.path().join("inventory.yaml");
        fs::write(
            &inventory_path,
            r#"namespaces: [prod, staging]
releases:
  - name: cache
    namespace: prod
    chart: redis
    version: 6.2.1
  - name: old-cache
    namespace: staging
    chart: redis
    version: 5.0.0
    status: superseded
"#,
        )
        .unwrap();
        let directory = Arc::new(InventoryDirectory::from_file(&inventory_path).unwrap());

        let report = check(vec![chart], "", directory).await;

        assert!(report.success);
        assert_eq!(
            report.matched_namespaces.iter().collect::<Vec<_>>(),
            vec!["prod", "staging"]
        );
    }
}
