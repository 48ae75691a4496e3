//! In-memory release inventory
//!
//! Inventory files describe a cluster snapshot:
//!
//! ```yaml
//! namespaces: [prod, staging]
//! releases:
//!   - name: cache
//!     namespace: prod
//!     chart: redis
//!     version: 6.2.1
//!     status: deployed
//! ```

use super::ReleaseDirectory;
use crate::domain::{Release, ReleaseStatus};
use crate::error::DirectoryError;
use crate::namespace::NamespaceScope;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default, Deserialize)]
struct InventoryFile {
    #[serde(default)]
    namespaces: Vec<String>,
    #[serde(default)]
    releases: Vec<InventoryRelease>,
}

#[derive(Debug, Deserialize)]
struct InventoryRelease {
    name: String,
    namespace: String,
    chart: String,
    version: String,
    #[serde(default)]
    status: ReleaseStatus,
    #[serde(default = "default_revision")]
    revision: u64,
    #[serde(default)]
    updated: Option<DateTime<Utc>>,
}

fn default_revision() -> u64 {
    1
}

impl From<InventoryRelease> for Release {
    fn from(raw: InventoryRelease) -> Self {
        let release = Release::new(raw.name, raw.namespace, raw.chart, raw.version)
            .with_status(raw.status)
            .with_revision(raw.revision);
        match raw.updated {
            Some(updated) => release.with_updated(updated),
            None => release,
        }
    }
}

/// Release directory backed by a fixed list of releases
#[derive(Debug, Default)]
pub struct InventoryDirectory {
    namespaces: BTreeSet<String>,
    releases: Vec<Release>,
    queries: AtomicUsize,
}

impl InventoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a namespace without releases
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespaces.insert(namespace.into());
        self
    }

    /// Add a release (its namespace becomes visible too)
    pub fn with_release(mut self, release: Release) -> Self {
        self.namespaces.insert(release.namespace.clone());
        self.releases.push(release);
        self
    }

    /// Parse an inventory document
    pub fn from_yaml_str(content: &str, source: &Path) -> Result<Self, DirectoryError> {
        let file: InventoryFile = if content.trim().is_empty() {
            InventoryFile::default()
        } else {
            serde_yaml::from_str(content)
                .map_err(|e| DirectoryError::invalid_inventory(source, e.to_string()))?
        };

        let mut directory = file
            .namespaces
            .into_iter()
            .fold(Self::new(), |dir, ns| dir.with_namespace(ns));
        for release in file.releases {
            directory = directory.with_release(release.into());
        }
        Ok(directory)
    }

    /// Load an inventory file
    pub fn from_file(path: &Path) -> Result<Self, DirectoryError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DirectoryError::invalid_inventory(path, e.to_string()))?;
        Self::from_yaml_str(&content, path)
    }

    /// Number of namespace or release queries served so far
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReleaseDirectory for InventoryDirectory {
    fn name(&self) -> &'static str {
        "inventory"
    }

    async fn list_namespaces(&self) -> Result<BTreeSet<String>, DirectoryError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.namespaces.clone())
    }

    async fn list_releases(&self, scope: &NamespaceScope) -> Result<Vec<Release>, DirectoryError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .releases
            .iter()
            .filter(|r| r.status.is_deployed() && scope.contains(&r.namespace))
            .cloned()
            .collect())
    }
}
