//! Helm-backed release directory
//!
//! Namespaces come from `kubectl get namespaces -o json` and releases from
//! `helm list --namespace <ns> --deployed --max 0 --output json`, one call per
//! namespace in scope.

use super::ReleaseDirectory;
use crate::constraint::parse_version;
use crate::domain::{Release, ReleaseStatus};
use crate::error::DirectoryError;
use crate::namespace::NamespaceScope;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{debug, trace};

#[derive(Debug, Deserialize)]
struct NamespaceList {
    #[serde(default)]
    items: Vec<NamespaceItem>,
}

#[derive(Debug, Deserialize)]
struct NamespaceItem {
    metadata: NamespaceMetadata,
}

#[derive(Debug, Deserialize)]
struct NamespaceMetadata {
    name: String,
}

/// Helm prints revisions as strings, older versions as numbers
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Revision {
    Number(u64),
    Text(String),
}

impl Revision {
    fn value(&self) -> u64 {
        match self {
            Revision::Number(n) => *n,
            Revision::Text(s) => s.trim().parse().unwrap_or(0),
        }
    }
}

#[derive(Debug, Deserialize)]
struct HelmListEntry {
    name: String,
    #[serde(default)]
    namespace: String,
    #[serde(default)]
    revision: Option<Revision>,
    #[serde(default)]
    updated: String,
    #[serde(default)]
    status: String,
    chart: String,
}

/// Split a Helm `chart` column (`redis-17.3.7`) into name and version
///
/// The split happens at the first `-` whose suffix is a semantic version, so
/// `my-app-1.0.0-rc.1` yields `("my-app", "1.0.0-rc.1")`. Without such a
/// suffix the whole string is the name and the version is empty.
pub fn split_chart_reference(chart: &str) -> (String, String) {
    for (index, _) in chart.match_indices('-') {
        let (name, rest) = chart.split_at(index);
        let version = &rest[1..];
        if !name.is_empty() && parse_version(version).is_ok() {
            return (name.to_string(), version.to_string());
        }
    }
    (chart.to_string(), String::new())
}

/// Parse Helm's `updated` column (`2024-01-15 10:00:00.123456 +0000 UTC`)
fn parse_updated(updated: &str) -> Option<DateTime<Utc>> {
    let stamp = updated
        .split_whitespace()
        .take(3)
        .collect::<Vec<_>>()
        .join(" ");
    DateTime::parse_from_str(&stamp, "%Y-%m-%d %H:%M:%S%.f %z")
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_namespaces(output: &[u8]) -> Result<BTreeSet<String>, DirectoryError> {
    let list: NamespaceList = serde_json::from_slice(output)
        .map_err(|e| DirectoryError::invalid_output("kubectl get namespaces", e.to_string()))?;
    Ok(list.items.into_iter().map(|item| item.metadata.name).collect())
}

fn parse_releases(output: &[u8], namespace: &str) -> Result<Vec<Release>, DirectoryError> {
    if output.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    let entries: Vec<HelmListEntry> = serde_json::from_slice(output)
        .map_err(|e| DirectoryError::invalid_output("helm list", e.to_string()))?;

    Ok(entries
        .into_iter()
        .map(|entry| {
            let (chart_name, chart_version) = split_chart_reference(&entry.chart);
            let namespace = if entry.namespace.is_empty() {
                namespace.to_string()
            } else {
                entry.namespace
            };
            let release = Release::new(entry.name, namespace, chart_name, chart_version)
                .with_status(ReleaseStatus::parse(&entry.status))
                .with_revision(entry.revision.as_ref().map_or(0, Revision::value));
            match parse_updated(&entry.updated) {
                Some(updated) => release.with_updated(updated),
                None => release,
            }
        })
        .filter(|release| release.status.is_deployed())
        .collect())
}

/// Release directory that shells out to `helm` and `kubectl`
#[derive(Debug, Clone)]
pub struct HelmDirectory {
    helm_bin: String,
    kubectl_bin: String,
    kubeconfig: Option<PathBuf>,
    context: Option<String>,
}

impl Default for HelmDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl HelmDirectory {
    pub fn new() -> Self {
        Self {
            helm_bin: "helm".to_string(),
            kubectl_bin: "kubectl".to_string(),
            kubeconfig: None,
            context: None,
        }
    }

    /// Use a specific kubeconfig file
    pub fn with_kubeconfig(mut self, kubeconfig: Option<PathBuf>) -> Self {
        self.kubeconfig = kubeconfig;
        self
    }

    /// Use a specific kubeconfig context
    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.context = context;
        self
    }

    /// Override the helm and kubectl executables
    pub fn with_binaries(mut self, helm: impl Into<String>, kubectl: impl Into<String>) -> Self {
        self.helm_bin = helm.into();
        self.kubectl_bin = kubectl.into();
        self
    }

    fn kubectl_args(&self) -> Vec<String> {
        let mut args = vec![
            "get".to_string(),
            "namespaces".to_string(),
            "--output".to_string(),
            "json".to_string(),
        ];
        if let Some(kubeconfig) = &self.kubeconfig {
            args.push("--kubeconfig".to_string());
            args.push(kubeconfig.display().to_string());
        }
        if let Some(context) = &self.context {
            args.push("--context".to_string());
            args.push(context.clone());
        }
        args
    }

    fn helm_list_args(&self, namespace: &str) -> Vec<String> {
        let mut args = vec![
            "list".to_string(),
            "--namespace".to_string(),
            namespace.to_string(),
            "--deployed".to_string(),
            // helm stops at 256 releases unless told otherwise
            "--max".to_string(),
            "0".to_string(),
            "--output".to_string(),
            "json".to_string(),
        ];
        if let Some(kubeconfig) = &self.kubeconfig {
            args.push("--kubeconfig".to_string());
            args.push(kubeconfig.display().to_string());
        }
        if let Some(context) = &self.context {
            args.push("--kube-context".to_string());
            args.push(context.clone());
        }
        args
    }

    async fn run(&self, program: &str, args: &[String]) -> Result<Vec<u8>, DirectoryError> {
        let command = format!("{} {}", program, args.first().map_or("", String::as_str));
        debug!(program, ?args, "running command");

        let output = Command::new(program)
            .args(args)
            .output()
            .await
            .map_err(|source| {
                if source.kind() == ErrorKind::NotFound {
                    DirectoryError::tool_not_found(program)
                } else {
                    DirectoryError::Io {
                        command: command.clone(),
                        source,
                    }
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(DirectoryError::command_failed(command, stderr));
        }

        trace!(program, bytes = output.stdout.len(), "command finished");
        Ok(output.stdout)
    }
}

#[async_trait]
impl ReleaseDirectory for HelmDirectory {
    fn name(&self) -> &'static str {
        "helm"
    }

    async fn list_namespaces(&self) -> Result<BTreeSet<String>, DirectoryError> {
        let output = self.run(&self.kubectl_bin, &self.kubectl_args()).await?;
        let namespaces = parse_namespaces(&output)?;
        debug!(count = namespaces.len(), "listed namespaces");
        Ok(namespaces)
    }

    async fn list_releases(&self, scope: &NamespaceScope) -> Result<Vec<Release>, DirectoryError> {
        let mut releases = Vec::new();
        for namespace in &scope.namespaces {
            let output = self.run(&self.helm_bin, &self.helm_list_args(namespace)).await?;
            let found = parse_releases(&output, namespace)?;
            debug!(namespace = %namespace, count = found.len(), "listed releases");
            releases.extend(found);
        }
        Ok(releases)
    }
}
