//! Deployed release records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Chart identity of a release
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChartInfo {
    pub name: String,
    pub version: String,
}

impl ChartInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Helm release state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReleaseStatus {
    #[default]
    Deployed,
    Failed,
    PendingInstall,
    PendingUpgrade,
    PendingRollback,
    Superseded,
    Uninstalling,
    Uninstalled,
    #[serde(other)]
    Unknown,
}

impl ReleaseStatus {
    /// Parse a status string as printed by Helm (`deployed`, `pending-install`, ...)
    pub fn parse(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "deployed" => ReleaseStatus::Deployed,
            "failed" => ReleaseStatus::Failed,
            "pending-install" => ReleaseStatus::PendingInstall,
            "pending-upgrade" => ReleaseStatus::PendingUpgrade,
            "pending-rollback" => ReleaseStatus::PendingRollback,
            "superseded" => ReleaseStatus::Superseded,
            "uninstalling" => ReleaseStatus::Uninstalling,
            "uninstalled" => ReleaseStatus::Uninstalled,
            _ => ReleaseStatus::Unknown,
        }
    }

    /// Returns true for the only state a dependency can be satisfied by
    pub fn is_deployed(&self) -> bool {
        matches!(self, ReleaseStatus::Deployed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseStatus::Deployed => "deployed",
            ReleaseStatus::Failed => "failed",
            ReleaseStatus::PendingInstall => "pending-install",
            ReleaseStatus::PendingUpgrade => "pending-upgrade",
            ReleaseStatus::PendingRollback => "pending-rollback",
            ReleaseStatus::Superseded => "superseded",
            ReleaseStatus::Uninstalling => "uninstalling",
            ReleaseStatus::Uninstalled => "uninstalled",
            ReleaseStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A discovered instance of some chart in some namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Release name
    pub name: String,
    /// Namespace the release lives in
    pub namespace: String,
    /// Chart the release was installed from
    pub chart: ChartInfo,
    /// Current release state
    pub status: ReleaseStatus,
    /// Release revision number
    pub revision: u64,
    /// When the release was last deployed, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

impl Release {
    /// Creates a deployed release at revision 1
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        chart_name: impl Into<String>,
        chart_version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            chart: ChartInfo::new(chart_name, chart_version),
            status: ReleaseStatus::Deployed,
            revision: 1,
            updated: None,
        }
    }

    pub fn with_status(mut self, status: ReleaseStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_revision(mut self, revision: u64) -> Self {
        self.revision = revision;
        self
    }

    pub fn with_updated(mut self, updated: DateTime<Utc>) -> Self {
        self.updated = Some(updated);
        self
    }

    /// `namespace/name` identifier
    pub fn qualified_name(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}
