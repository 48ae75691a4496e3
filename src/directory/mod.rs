//! Release directories for discovering deployed releases
//!
//! This module provides:
//! - The `ReleaseDirectory` trait the resolution engine queries
//! - A Helm/kubectl backed directory for live clusters
//! - An in-memory inventory directory, loadable from YAML

mod helm;
mod inventory;

pub use helm::{split_chart_reference, HelmDirectory};
pub use inventory::InventoryDirectory;

use crate::domain::Release;
use crate::error::DirectoryError;
use crate::namespace::NamespaceScope;
use async_trait::async_trait;
use std::collections::BTreeSet;

/// Source of namespaces and deployed releases
///
/// Implementations return only deployed releases and report connectivity or
/// permission problems as errors, never as an empty listing.
#[async_trait]
pub trait ReleaseDirectory: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// List every namespace visible to the directory
    async fn list_namespaces(&self) -> Result<BTreeSet<String>, DirectoryError>;

    /// List deployed releases in the namespaces of a scope
    async fn list_releases(&self, scope: &NamespaceScope) -> Result<Vec<Release>, DirectoryError>;

    /// Deployed releases of one chart within a scope
    async fn find_releases(
        &self,
        chart_name: &str,
        scope: &NamespaceScope,
    ) -> Result<Vec<Release>, DirectoryError> {
        let releases = self.list_releases(scope).await?;
        Ok(releases
            .into_iter()
            .filter(|r| r.chart.name == chart_name && scope.contains(&r.namespace))
            .collect())
    }
}
